//! Player configuration section

use crate::error::ValidationError;
use crate::validation::RangeChecks;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Player preferences read by the playback controller
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PlayerConfig {
    /// Seconds jumped by a single skip forward/backward
    pub seek_time_secs: u64,

    /// Minutes until the sleep timer stops playback
    pub sleep_timer_minutes: u64,

    /// Let the sleep timer wait for the end of the chapter instead of cutting it off
    pub stop_after_current_chapter: bool,

    /// "Previous" restarts the current chapter when playback is further in than this
    pub previous_restart_threshold_ms: u64,

    /// How often the playback position is saved while playing
    pub position_sync_interval_ms: u64,
}

impl PlayerConfig {
    pub fn seek_increment(&self) -> Duration {
        Duration::from_secs(self.seek_time_secs)
    }

    pub fn sleep_timer_duration(&self) -> Duration {
        Duration::from_secs(self.sleep_timer_minutes.saturating_mul(60))
    }

    pub fn previous_restart_threshold(&self) -> Duration {
        Duration::from_millis(self.previous_restart_threshold_ms)
    }

    pub fn position_sync_interval(&self) -> Duration {
        Duration::from_millis(self.position_sync_interval_ms)
    }

    /// Checks every field, reporting all that are out of range
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        RangeChecks::new()
            .check("player.seek_time_secs", self.seek_time_secs, 1..=300)
            .check("player.sleep_timer_minutes", self.sleep_timer_minutes, 1..=240)
            .check(
                "player.previous_restart_threshold_ms",
                self.previous_restart_threshold_ms,
                0..=60_000,
            )
            .check(
                "player.position_sync_interval_ms",
                self.position_sync_interval_ms,
                100..=60_000,
            )
            .finish()
    }
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            seek_time_secs: 20,
            sleep_timer_minutes: 20,
            stop_after_current_chapter: false,
            previous_restart_threshold_ms: 2000,
            position_sync_interval_ms: 1000,
        }
    }
}
