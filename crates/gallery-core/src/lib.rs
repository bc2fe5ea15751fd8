pub mod camera;
pub mod constants;
pub mod cover;
pub mod gallery;
pub mod input;
pub mod item;
pub mod layout;
pub mod pick;
pub mod scene;
pub mod scheduler;
pub mod texture;

pub static CARD_WGSL: &str = include_str!("../shaders/card.wgsl");

pub use camera::{CameraController, ZoomKind};
pub use constants::*;
pub use cover::{CoverError, CoverHandle, CoverImage, CoverLoad, CoverSource, NullCoverSource};
pub use gallery::{bob_offset, Gallery};
pub use input::InputRouter;
pub use item::{CardVisualState, MediaItem, PlaybackSnapshot};
pub use layout::{card_position, shell_radius};
pub use scene::{billboard_axes, overlay_placement, CardEntity, CoverOverlay, SceneGraph};
pub use scheduler::{Refresh, UpdateScheduler};
pub use texture::{
    format_timestamp, progress_fill_width, truncate_to_width, CardTexture, CardTextureRenderer,
};
