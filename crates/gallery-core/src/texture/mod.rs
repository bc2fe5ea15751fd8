//! Procedural card face rasterization.
//!
//! Every card face is drawn from scratch into a fixed 512x760 RGBA raster:
//! rounded frame, near-white preview region (the cover overlay is a separate
//! surface composited by the scene), title/artist, progress track and
//! transport glyphs. Rendering is pure and callable at arbitrary frequency;
//! the caller discards prior rasters after rebinding.

mod font;

pub use font::{truncate_to_width, FontLibrary};

use crate::constants::*;
use crate::item::{CardVisualState, MediaItem};
use tiny_skia::{
    Color, FillRule, GradientStop, LinearGradient, Paint, Path, PathBuilder, Pixmap, Point,
    SpreadMode, Stroke, Transform,
};

/// An owned, immutable card raster. Premultiplied RGBA, always 512x760.
pub struct CardTexture {
    pixmap: Pixmap,
}

impl CardTexture {
    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    /// Premultiplied RGBA bytes, row-major.
    pub fn data(&self) -> &[u8] {
        self.pixmap.data()
    }
}

/// Draws card faces. Holds the resolved font faces so repeated renders do not
/// re-query the system font database.
pub struct CardTextureRenderer {
    fonts: FontLibrary,
}

impl Default for CardTextureRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl CardTextureRenderer {
    pub fn new() -> Self {
        Self {
            fonts: FontLibrary::from_system(),
        }
    }

    /// A renderer that skips all text. Card geometry is unchanged; used by
    /// tests and headless environments without system fonts.
    pub fn without_fonts() -> Self {
        Self {
            fonts: FontLibrary::empty(),
        }
    }

    /// Render one card face. Output is always exactly 512x760 regardless of
    /// string content; `visual.progress` is clamped to [0, 1] before drawing.
    pub fn render_card(&self, item: &MediaItem, visual: &CardVisualState) -> CardTexture {
        let mut pixmap = Pixmap::new(CARD_TEXTURE_WIDTH, CARD_TEXTURE_HEIGHT)
            .expect("card raster dimensions are nonzero");

        self.draw_frame(&mut pixmap, visual.is_active);
        self.draw_preview(&mut pixmap);
        self.draw_labels(&mut pixmap, item);
        self.draw_progress(&mut pixmap, item, visual);
        self.draw_transport(&mut pixmap, visual);

        CardTexture { pixmap }
    }

    fn draw_frame(&self, pixmap: &mut Pixmap, active: bool) {
        let w = CARD_TEXTURE_WIDTH as f32;
        let h = CARD_TEXTURE_HEIGHT as f32;
        let Some(path) = rounded_rect_path(0.0, 0.0, w, h, CARD_CORNER_RADIUS) else {
            return;
        };
        let (top, bottom) = if active {
            (rgb(34, 38, 52), rgb(20, 22, 30))
        } else {
            (rgb(24, 26, 34), rgb(14, 15, 20))
        };
        fill(pixmap, &path, vertical_gradient(0.0, h, top, bottom));

        let mut border = Paint::default();
        border.anti_alias = true;
        border.set_color(if active {
            rgba(255, 255, 255, 110)
        } else {
            rgba(255, 255, 255, 60)
        });
        let stroke = Stroke {
            width: if active {
                CARD_BORDER_WIDTH_ACTIVE
            } else {
                CARD_BORDER_WIDTH
            },
            ..Stroke::default()
        };
        pixmap.stroke_path(&path, &border, &stroke, Transform::identity(), None);
    }

    fn draw_preview(&self, pixmap: &mut Pixmap) {
        let (x, y, w, h) = preview_region();
        let Some(path) = rounded_rect_path(x, y, w, h, PREVIEW_CORNER_RADIUS) else {
            return;
        };
        fill(
            pixmap,
            &path,
            vertical_gradient(y, y + h, rgb(250, 250, 252), rgb(232, 234, 240)),
        );
    }

    fn draw_labels(&self, pixmap: &mut Pixmap, item: &MediaItem) {
        if !self.fonts.has_fonts() {
            return;
        }
        let max_width = text_max_width();
        let title = truncate_to_width(&item.title, max_width, |s| {
            self.fonts.measure(s, TITLE_PX, true)
        });
        let artist = truncate_to_width(&item.artist, max_width, |s| {
            self.fonts.measure(s, ARTIST_PX, false)
        });
        self.fonts.draw(
            pixmap,
            &title,
            PREVIEW_INSET,
            TITLE_BASELINE_Y,
            TITLE_PX,
            true,
            rgb(255, 255, 255),
        );
        self.fonts.draw(
            pixmap,
            &artist,
            PREVIEW_INSET,
            TITLE_BASELINE_Y + ARTIST_BASELINE_GAP,
            ARTIST_PX,
            false,
            rgba(255, 255, 255, 191), // 75% opacity
        );
    }

    fn draw_progress(&self, pixmap: &mut Pixmap, item: &MediaItem, visual: &CardVisualState) {
        let (x, _, w, _) = preview_region();

        if let Some(track) = rounded_rect_path(x, TRACK_Y, w, TRACK_HEIGHT, TRACK_HEIGHT / 2.0) {
            let mut back = Paint::default();
            back.anti_alias = true;
            back.set_color(rgba(255, 255, 255, 70));
            pixmap.fill_path(&track, &back, FillRule::Winding, Transform::identity(), None);
        }

        if visual.is_active {
            let fill_w = progress_fill_width(w, visual.progress);
            if fill_w > 0.0 {
                if let Some(filled) =
                    rounded_rect_path(x, TRACK_Y, fill_w, TRACK_HEIGHT, TRACK_HEIGHT / 2.0)
                {
                    let mut front = Paint::default();
                    front.anti_alias = true;
                    front.set_color(rgb(255, 255, 255));
                    pixmap.fill_path(
                        &filled,
                        &front,
                        FillRule::Winding,
                        Transform::identity(),
                        None,
                    );
                }
            }
        }

        if self.fonts.has_fonts() {
            let progress = visual.progress.clamp(0.0, 1.0) as f64;
            let elapsed = progress * item.duration_sec;
            let remaining = item.duration_sec - elapsed;
            let left = format_timestamp(elapsed);
            let right = format!("-{}", format_timestamp(remaining));
            let color = rgba(255, 255, 255, 200);
            self.fonts.draw(
                pixmap,
                &left,
                x,
                TIME_LABEL_BASELINE_Y,
                TIME_LABEL_PX,
                false,
                color,
            );
            let right_w = self.fonts.measure(&right, TIME_LABEL_PX, false);
            self.fonts.draw(
                pixmap,
                &right,
                x + w - right_w,
                TIME_LABEL_BASELINE_Y,
                TIME_LABEL_PX,
                false,
                color,
            );
        }
    }

    fn draw_transport(&self, pixmap: &mut Pixmap, visual: &CardVisualState) {
        let cx = CARD_TEXTURE_WIDTH as f32 / 2.0;
        let cy = GLYPH_CENTER_Y;
        let mut paint = Paint::default();
        paint.anti_alias = true;
        paint.set_color(rgba(255, 255, 255, 230));

        if let Some(p) = skip_glyph_path(cx - GLYPH_SPACING, cy, GLYPH_SIZE_SMALL, true) {
            pixmap.fill_path(&p, &paint, FillRule::Winding, Transform::identity(), None);
        }
        let center = if visual.is_active && visual.is_playing {
            pause_glyph_path(cx, cy, GLYPH_SIZE_LARGE)
        } else {
            play_glyph_path(cx, cy, GLYPH_SIZE_LARGE)
        };
        if let Some(p) = center {
            pixmap.fill_path(&p, &paint, FillRule::Winding, Transform::identity(), None);
        }
        if let Some(p) = skip_glyph_path(cx + GLYPH_SPACING, cy, GLYPH_SIZE_SMALL, false) {
            pixmap.fill_path(&p, &paint, FillRule::Winding, Transform::identity(), None);
        }
    }
}

/// Preview region rectangle in raster pixels: top floor(H*2/3) of the card,
/// inset 18 px on all sides. Shared with the scene's overlay placement math.
pub fn preview_region() -> (f32, f32, f32, f32) {
    (
        PREVIEW_INSET,
        PREVIEW_INSET,
        CARD_TEXTURE_WIDTH as f32 - 2.0 * PREVIEW_INSET,
        PREVIEW_HEIGHT - 2.0 * PREVIEW_INSET,
    )
}

/// Maximum rendered width for title/artist before truncation kicks in.
#[inline]
pub fn text_max_width() -> f32 {
    (CARD_TEXTURE_WIDTH as f32 - 2.0 * PREVIEW_INSET) - TEXT_WIDTH_SLACK
}

/// Filled portion of the progress track. Out-of-range fractions never draw
/// outside the track.
#[inline]
pub fn progress_fill_width(track_width: f32, fraction: f32) -> f32 {
    track_width * fraction.clamp(0.0, 1.0)
}

/// `M:SS` timestamp; negative inputs render as `0:00`.
pub fn format_timestamp(seconds: f64) -> String {
    let total = seconds.max(0.0) as u64;
    format!("{}:{:02}", total / 60, total % 60)
}

// ---------------- tiny-skia drawing helpers ----------------

fn rgb(r: u8, g: u8, b: u8) -> Color {
    Color::from_rgba8(r, g, b, 255)
}

fn rgba(r: u8, g: u8, b: u8, a: u8) -> Color {
    Color::from_rgba8(r, g, b, a)
}

fn fill(pixmap: &mut Pixmap, path: &Path, paint: Paint) {
    pixmap.fill_path(path, &paint, FillRule::Winding, Transform::identity(), None);
}

fn vertical_gradient(y0: f32, y1: f32, top: Color, bottom: Color) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.anti_alias = true;
    match LinearGradient::new(
        Point::from_xy(0.0, y0),
        Point::from_xy(0.0, y1),
        vec![GradientStop::new(0.0, top), GradientStop::new(1.0, bottom)],
        SpreadMode::Pad,
        Transform::identity(),
    ) {
        Some(shader) => paint.shader = shader,
        None => paint.set_color(top),
    }
    paint
}

fn rounded_rect_path(x: f32, y: f32, w: f32, h: f32, radius: f32) -> Option<Path> {
    let r = radius.min(w / 2.0).min(h / 2.0).max(0.0);
    // Cubic circle-quadrant approximation constant.
    let k = 0.552_284_8 * r;
    let (x1, y1) = (x + w, y + h);
    let mut pb = PathBuilder::new();
    pb.move_to(x + r, y);
    pb.line_to(x1 - r, y);
    pb.cubic_to(x1 - r + k, y, x1, y + r - k, x1, y + r);
    pb.line_to(x1, y1 - r);
    pb.cubic_to(x1, y1 - r + k, x1 - r + k, y1, x1 - r, y1);
    pb.line_to(x + r, y1);
    pb.cubic_to(x + r - k, y1, x, y1 - r + k, x, y1 - r);
    pb.line_to(x, y + r);
    pb.cubic_to(x, y + r - k, x + r - k, y, x + r, y);
    pb.close();
    pb.finish()
}

fn play_glyph_path(cx: f32, cy: f32, size: f32) -> Option<Path> {
    let half = size / 2.0;
    let mut pb = PathBuilder::new();
    pb.move_to(cx - half * 0.6, cy - half);
    pb.line_to(cx - half * 0.6, cy + half);
    pb.line_to(cx + half * 0.9, cy);
    pb.close();
    pb.finish()
}

fn pause_glyph_path(cx: f32, cy: f32, size: f32) -> Option<Path> {
    let half = size / 2.0;
    let bar_w = size * 0.22;
    let gap = size * 0.12;
    let mut pb = PathBuilder::new();
    for side in [-1.0f32, 1.0] {
        let x0 = cx + side * gap + if side < 0.0 { -bar_w } else { 0.0 };
        pb.move_to(x0, cy - half);
        pb.line_to(x0 + bar_w, cy - half);
        pb.line_to(x0 + bar_w, cy + half);
        pb.line_to(x0, cy + half);
        pb.close();
    }
    pb.finish()
}

/// Previous/next glyph: a stop bar plus a triangle pointing at it.
fn skip_glyph_path(cx: f32, cy: f32, size: f32, backward: bool) -> Option<Path> {
    let half = size / 2.0;
    let dir = if backward { -1.0f32 } else { 1.0 };
    let bar_w = size * 0.14;
    let mut pb = PathBuilder::new();
    // stop bar at the pointed-to edge
    let bx = cx + dir * half;
    pb.move_to(bx, cy - half);
    pb.line_to(bx - dir * bar_w, cy - half);
    pb.line_to(bx - dir * bar_w, cy + half);
    pb.line_to(bx, cy + half);
    pb.close();
    // triangle pointing toward the bar
    let tip = cx + dir * (half - bar_w * 1.4);
    let base = cx - dir * half;
    pb.move_to(base, cy - half);
    pb.line_to(base, cy + half);
    pb.line_to(tip, cy);
    pb.close();
    pb.finish()
}
