// Layout, rendering and interaction tuning constants shared by the core
// modules and their tests.

// Card raster dimensions (pixels)
pub const CARD_TEXTURE_WIDTH: u32 = 512;
pub const CARD_TEXTURE_HEIGHT: u32 = 760;

// Card frame
pub const CARD_CORNER_RADIUS: f32 = 45.0;
pub const CARD_BORDER_WIDTH: f32 = 1.0;
pub const CARD_BORDER_WIDTH_ACTIVE: f32 = 1.5;

// Preview (cover) region: top floor(H * 2/3) of the raster, inset on all sides
pub const PREVIEW_HEIGHT: f32 = 506.0; // floor(760 * 2 / 3)
pub const PREVIEW_INSET: f32 = 18.0;
pub const PREVIEW_CORNER_RADIUS: f32 = 32.0;
pub const COVER_FIT_FRACTION: f32 = 0.97; // keep cover off the rounded corners

// Text metrics
pub const TITLE_PX: f32 = 22.0;
pub const ARTIST_PX: f32 = 15.0;
pub const ARTIST_BASELINE_GAP: f32 = 28.0;
pub const TIME_LABEL_PX: f32 = 12.0;
pub const TEXT_WIDTH_SLACK: f32 = 10.0; // truncation target is display width minus this

// Vertical placement below the preview region
pub const TITLE_BASELINE_Y: f32 = 530.0;
pub const TRACK_Y: f32 = 596.0;
pub const TRACK_HEIGHT: f32 = 2.5;
pub const TIME_LABEL_BASELINE_Y: f32 = 620.0;
pub const GLYPH_CENTER_Y: f32 = 688.0;

// Transport glyph sizing
pub const GLYPH_SIZE_SMALL: f32 = 40.0;
pub const GLYPH_SIZE_LARGE: f32 = 62.0;
pub const GLYPH_SPACING: f32 = 110.0;

// Billboard world-space size, fixed 4 : 5.8 aspect
pub const BILLBOARD_WIDTH: f32 = 4.0;
pub const BILLBOARD_HEIGHT: f32 = 5.8;

// Fibonacci-sphere shells
pub const SHELL_BASE_RADIUS: f32 = 35.0;
pub const SHELL_STEP: f32 = 8.0;
pub const SHELL_COUNT: usize = 3;

// Camera
pub const CAMERA_FOV_Y: f32 = std::f32::consts::FRAC_PI_4;
pub const CAMERA_ZNEAR: f32 = 0.1;
pub const CAMERA_ZFAR: f32 = 1000.0;
pub const CAMERA_SMOOTHING: f32 = 0.1; // eye moves this fraction toward target per tick
pub const DEFAULT_ZOOM_RADIUS: f32 = 90.0;
pub const ORBIT_PITCH_LIMIT: f32 = 1.2; // radians
pub const ORBIT_SENSITIVITY: f32 = 0.005; // radians per pixel dragged

// Zoom stepping: faster when far out, finer when close in
pub const ZOOM_BASE_FACTOR: f32 = 0.05;
pub const ZOOM_RATE_REF_RADIUS: f32 = 50.0;
pub const ZOOM_RATE_MIN: f32 = 0.8;
pub const ZOOM_RATE_MAX: f32 = 2.5;
pub const POINTER_ZOOM_MIN: f32 = 10.0;
pub const POINTER_ZOOM_MAX: f32 = 300.0;
pub const TOUCH_ZOOM_MIN: f32 = 15.0;
pub const TOUCH_ZOOM_MAX: f32 = 250.0;

// Gesture classification
pub const DRAG_THRESHOLD_PX: f32 = 5.0;

// Idle bob applied per card each frame
pub const BOB_AMPLITUDE: f32 = 0.15; // world units
pub const BOB_RATE: f32 = 1.5; // phase advance per second
pub const BOB_INDEX_OFFSET: f32 = 0.7; // desynchronizes motion across cards

// Redraw throttling for the active card
pub const ACTIVE_REFRESH_INTERVAL_SEC: f64 = 0.5;

// Cover loading
pub const COVER_MAX_RETRIES: u32 = 3;
pub const COVER_RETRY_DELAY_FIRST_MS: u64 = 500;
pub const COVER_RETRY_DELAY_NEXT_MS: u64 = 1000;
