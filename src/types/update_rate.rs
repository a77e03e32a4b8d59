//! Update rate control for sample subscriptions

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Delivery rate for a subscription
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub enum UpdateRate {
    /// Every sample, as fast as the simulator sends them
    #[default]
    Native,

    /// At most this many samples per second, newest sample wins.
    /// `Max(0)` is treated as `Native`.
    Max(u32),
}

impl UpdateRate {
    /// Minimum spacing between delivered samples, if any.
    pub fn throttle_interval(self) -> Option<Duration> {
        match self {
            UpdateRate::Native | UpdateRate::Max(0) => None,
            UpdateRate::Max(hz) => Some(Duration::from_secs_f64(1.0 / hz as f64)),
        }
    }
}
