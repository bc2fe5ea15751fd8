//! Minimal text support for the card raster: system font discovery via
//! `fontdb`, metrics and outlines via `ttf-parser`, filled as `tiny-skia`
//! paths. Plain left-to-right advance layout; no shaping.

use tiny_skia::{Color, FillRule, Paint, PathBuilder, Pixmap, Transform};

const ELLIPSIS: char = '\u{2026}';

struct FaceData {
    data: Vec<u8>,
    index: u32,
}

impl FaceData {
    fn parse(&self) -> Option<ttf_parser::Face<'_>> {
        ttf_parser::Face::parse(&self.data, self.index).ok()
    }
}

/// Regular and bold sans-serif faces resolved from the host system.
///
/// Font absence is non-fatal: an empty library measures everything at zero
/// width and draws nothing, leaving the card geometry untouched.
pub struct FontLibrary {
    regular: Option<FaceData>,
    bold: Option<FaceData>,
}

impl FontLibrary {
    /// Discover system sans-serif faces. Logs and degrades when none resolve.
    pub fn from_system() -> Self {
        let mut db = fontdb::Database::new();
        db.load_system_fonts();
        let regular = query_face(&db, fontdb::Weight::NORMAL);
        let bold = query_face(&db, fontdb::Weight::BOLD);
        if regular.is_none() {
            log::warn!("no system sans-serif font found; card text will be blank");
        }
        Self { regular, bold }
    }

    /// A library with no faces. Used by tests and headless callers that only
    /// care about the non-text card geometry.
    pub fn empty() -> Self {
        Self {
            regular: None,
            bold: None,
        }
    }

    pub fn has_fonts(&self) -> bool {
        self.regular.is_some() || self.bold.is_some()
    }

    fn face_data(&self, bold: bool) -> Option<&FaceData> {
        if bold {
            self.bold.as_ref().or(self.regular.as_ref())
        } else {
            self.regular.as_ref().or(self.bold.as_ref())
        }
    }

    /// Rendered advance width of `text` at `px` pixels, or 0.0 without fonts.
    pub fn measure(&self, text: &str, px: f32, bold: bool) -> f32 {
        let Some(data) = self.face_data(bold) else {
            return 0.0;
        };
        let Some(face) = data.parse() else {
            return 0.0;
        };
        let scale = px / face.units_per_em() as f32;
        text.chars()
            .filter_map(|c| face.glyph_index(c))
            .filter_map(|gid| face.glyph_hor_advance(gid))
            .map(|adv| adv as f32 * scale)
            .sum()
    }

    /// Fill `text` onto `pixmap` with its baseline at (`x`, `baseline_y`).
    pub fn draw(
        &self,
        pixmap: &mut Pixmap,
        text: &str,
        x: f32,
        baseline_y: f32,
        px: f32,
        bold: bool,
        color: Color,
    ) {
        let Some(data) = self.face_data(bold) else {
            return;
        };
        let Some(face) = data.parse() else {
            return;
        };
        let scale = px / face.units_per_em() as f32;
        let mut paint = Paint::default();
        paint.set_color(color);
        paint.anti_alias = true;

        let mut pen_x = x;
        for c in text.chars() {
            let Some(gid) = face.glyph_index(c) else {
                continue;
            };
            let mut outline = GlyphOutline {
                builder: PathBuilder::new(),
                scale,
                offset_x: pen_x,
                offset_y: baseline_y,
            };
            if face.outline_glyph(gid, &mut outline).is_some() {
                if let Some(path) = outline.builder.finish() {
                    pixmap.fill_path(
                        &path,
                        &paint,
                        FillRule::Winding,
                        Transform::identity(),
                        None,
                    );
                }
            }
            if let Some(adv) = face.glyph_hor_advance(gid) {
                pen_x += adv as f32 * scale;
            }
        }
    }
}

fn query_face(db: &fontdb::Database, weight: fontdb::Weight) -> Option<FaceData> {
    let id = db.query(&fontdb::Query {
        families: &[fontdb::Family::SansSerif],
        weight,
        ..fontdb::Query::default()
    })?;
    db.with_face_data(id, |data, index| FaceData {
        data: data.to_vec(),
        index,
    })
}

/// Shorten `text` with a trailing ellipsis until `measure` reports a width
/// within `max_width`. Pure in the supplied measure function.
pub fn truncate_to_width(text: &str, max_width: f32, measure: impl Fn(&str) -> f32) -> String {
    if measure(text) <= max_width {
        return text.to_string();
    }
    let mut chars: Vec<char> = text.chars().collect();
    while !chars.is_empty() {
        chars.pop();
        let mut candidate: String = chars.iter().collect();
        candidate.push(ELLIPSIS);
        if measure(&candidate) <= max_width {
            return candidate;
        }
    }
    ELLIPSIS.to_string()
}

/// Bridges ttf-parser's y-up glyph outlines into a y-down pixel-space path.
struct GlyphOutline {
    builder: PathBuilder,
    scale: f32,
    offset_x: f32,
    offset_y: f32,
}

impl GlyphOutline {
    #[inline]
    fn map(&self, x: f32, y: f32) -> (f32, f32) {
        (
            self.offset_x + x * self.scale,
            self.offset_y - y * self.scale,
        )
    }
}

impl ttf_parser::OutlineBuilder for GlyphOutline {
    fn move_to(&mut self, x: f32, y: f32) {
        let (x, y) = self.map(x, y);
        self.builder.move_to(x, y);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        let (x, y) = self.map(x, y);
        self.builder.line_to(x, y);
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        let (x1, y1) = self.map(x1, y1);
        let (x, y) = self.map(x, y);
        self.builder.quad_to(x1, y1, x, y);
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        let (x1, y1) = self.map(x1, y1);
        let (x2, y2) = self.map(x2, y2);
        let (x, y) = self.map(x, y);
        self.builder.cubic_to(x1, y1, x2, y2, x, y);
    }

    fn close(&mut self) {
        self.builder.close();
    }
}
