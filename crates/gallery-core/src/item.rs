//! Caller-supplied media metadata and the per-update playback snapshot.

/// One entry in the gallery. Immutable once handed to the gallery; the scene
/// keeps the id as a non-owning association for picking.
#[derive(Clone, Debug)]
pub struct MediaItem {
    /// Unique, stable identifier. Drives entity lookup and selection.
    pub id: u64,
    pub title: String,
    pub artist: String,
    pub album: String,
    /// Opaque cover reference (file path, URL, ...) resolved by a `CoverSource`.
    pub cover: Option<String>,
    pub duration_sec: f64,
    /// Opaque reference to the playable media; never interpreted here.
    pub media_ref: String,
}

/// Ephemeral visual state of one card, derived from the playback snapshot.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CardVisualState {
    pub is_active: bool,
    pub is_playing: bool,
    /// Fraction of the media already played. Clamped to [0, 1] when drawn.
    pub progress: f32,
}

/// Playback-adjacent state pushed by the caller at an arbitrary cadence.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PlaybackSnapshot {
    pub current_item_id: Option<u64>,
    pub is_playing: bool,
    pub current_time_sec: f64,
}
