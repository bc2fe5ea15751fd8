//! Asynchronous cover retrieval with bounded retries.
//!
//! Each load is an explicit state machine `Requested -> (Resolved |
//! Retrying(n) -> ... | Failed)` driven from the render loop via `tick`.
//! Completions are tagged with the scene generation that started them; the
//! scene drops the whole load set on rebuild, so a late completion can never
//! touch a disposed entity.

use instant::Instant;
use std::time::Duration;
use thiserror::Error;

use crate::constants::{COVER_MAX_RETRIES, COVER_RETRY_DELAY_FIRST_MS, COVER_RETRY_DELAY_NEXT_MS};

/// A decoded cover raster. RGBA bytes, row-major; the source decides the
/// alpha convention to match the frontend's compositing.
#[derive(Clone, Debug)]
pub struct CoverImage {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

/// Recoverable cover retrieval errors. Never surfaced to the caller; an
/// exhausted load leaves the preview region blank.
#[derive(Debug, Error)]
pub enum CoverError {
    #[error("cover fetch failed: {0}")]
    Fetch(String),
    #[error("decoded raster has zero dimension ({0}x{1})")]
    InvalidRaster(u32, u32),
}

/// In-flight fetch handle. Polled (never blocked on) from the loop thread.
pub trait CoverHandle {
    /// `None` while pending; a result exactly once when settled.
    fn poll(&mut self) -> Option<Result<CoverImage, CoverError>>;
}

/// Collaborator-supplied fetch capability: reference -> decoded raster.
pub trait CoverSource {
    fn request(&self, reference: &str) -> Box<dyn CoverHandle>;
}

/// A source for galleries without cover art; every request settles with an
/// error and the retry path runs dry harmlessly.
pub struct NullCoverSource;

impl CoverSource for NullCoverSource {
    fn request(&self, _reference: &str) -> Box<dyn CoverHandle> {
        struct Never(bool);
        impl CoverHandle for Never {
            fn poll(&mut self) -> Option<Result<CoverImage, CoverError>> {
                if self.0 {
                    return None;
                }
                self.0 = true;
                Some(Err(CoverError::Fetch("no cover source".into())))
            }
        }
        Box::new(Never(false))
    }
}

enum LoadState {
    /// Request issued (or about to be on the next tick).
    Requested(Option<Box<dyn CoverHandle>>),
    /// Waiting out the backoff before the next retry.
    Retrying { resume_at: Instant },
    Resolved,
    Failed,
}

/// One cover load bound to an entity of a specific scene generation.
pub struct CoverLoad {
    pub item_id: u64,
    pub generation: u64,
    reference: String,
    attempt: u32,
    state: LoadState,
}

impl CoverLoad {
    pub fn new(item_id: u64, generation: u64, reference: String) -> Self {
        Self {
            item_id,
            generation,
            reference,
            attempt: 0,
            state: LoadState::Requested(None),
        }
    }

    pub fn is_settled(&self) -> bool {
        matches!(self.state, LoadState::Resolved | LoadState::Failed)
    }

    /// Advance the state machine. Returns a decoded image exactly once, on
    /// the tick its fetch resolves with a usable raster.
    pub fn tick(&mut self, source: &dyn CoverSource, now: Instant) -> Option<CoverImage> {
        match &mut self.state {
            LoadState::Requested(handle) => {
                let handle = handle.get_or_insert_with(|| source.request(&self.reference));
                match handle.poll() {
                    None => None,
                    Some(Ok(image)) if image.width > 0 && image.height > 0 => {
                        self.state = LoadState::Resolved;
                        Some(image)
                    }
                    Some(Ok(image)) => {
                        // Zero-dimension decode: transient, same retry path.
                        self.retry_or_fail(
                            now,
                            CoverError::InvalidRaster(image.width, image.height),
                        );
                        None
                    }
                    Some(Err(err)) => {
                        self.retry_or_fail(now, err);
                        None
                    }
                }
            }
            LoadState::Retrying { resume_at } => {
                if now >= *resume_at {
                    self.state = LoadState::Requested(Some(source.request(&self.reference)));
                }
                None
            }
            LoadState::Resolved | LoadState::Failed => None,
        }
    }

    fn retry_or_fail(&mut self, now: Instant, err: CoverError) {
        if self.attempt >= COVER_MAX_RETRIES {
            log::debug!("cover load for item {} gave up: {err}", self.item_id);
            self.state = LoadState::Failed;
            return;
        }
        let delay_ms = if self.attempt == 0 {
            COVER_RETRY_DELAY_FIRST_MS
        } else {
            COVER_RETRY_DELAY_NEXT_MS
        };
        self.attempt += 1;
        log::debug!(
            "cover load for item {} failed ({err}); retry {} in {delay_ms}ms",
            self.item_id,
            self.attempt
        );
        self.state = LoadState::Retrying {
            resume_at: now + Duration::from_millis(delay_ms),
        };
    }
}
