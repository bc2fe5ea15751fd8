//! Redraw scheduling: decides which card textures a playback update must
//! regenerate, coalescing high-frequency upstream updates.

use smallvec::SmallVec;

use crate::constants::ACTIVE_REFRESH_INTERVAL_SEC;
use crate::item::PlaybackSnapshot;

/// One texture regeneration order.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Refresh {
    pub item_id: u64,
    pub is_active: bool,
    pub is_playing: bool,
}

/// Bounds the active card's redraw rate to ~2/sec irrespective of how often
/// the caller pushes playback state. Non-active cards are only refreshed when
/// they transition out of the active/playing state.
#[derive(Default)]
pub struct UpdateScheduler {
    last: Option<PlaybackSnapshot>,
    last_refresh_media_time: f64,
}

impl UpdateScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Plan the refreshes a new snapshot requires. At most two: the card
    /// leaving the active state and the card currently active.
    pub fn plan(&mut self, snapshot: &PlaybackSnapshot) -> SmallVec<[Refresh; 2]> {
        let mut plans: SmallVec<[Refresh; 2]> = SmallVec::new();

        let (prev_current, prev_playing) = match &self.last {
            Some(prev) => (prev.current_item_id, prev.is_playing),
            None => (None, false),
        };
        let current_changed = prev_current != snapshot.current_item_id;
        let playing_changed = prev_playing != snapshot.is_playing;

        // The card that just stopped being active gets one inactive redraw.
        if current_changed {
            if let Some(old_id) = prev_current {
                plans.push(Refresh {
                    item_id: old_id,
                    is_active: false,
                    is_playing: false,
                });
            }
        }

        if let Some(current_id) = snapshot.current_item_id {
            let flags_transitioned = current_changed || playing_changed || self.last.is_none();
            let media_elapsed = (snapshot.current_time_sec - self.last_refresh_media_time).abs();
            if flags_transitioned || media_elapsed >= ACTIVE_REFRESH_INTERVAL_SEC {
                plans.push(Refresh {
                    item_id: current_id,
                    is_active: true,
                    is_playing: snapshot.is_playing,
                });
                self.last_refresh_media_time = snapshot.current_time_sec;
            }
        }

        self.last = Some(snapshot.clone());
        plans
    }

    /// Forget history (item-set rebuild); the next snapshot counts as a
    /// transition.
    pub fn reset(&mut self) {
        self.last = None;
        self.last_refresh_media_time = 0.0;
    }
}
