//! Playback speed

use crate::error::{CoreError, CoreResult};
use crate::types::Validator;
use serde::{Deserialize, Serialize};

/// Playback speed multiplier (0.5x - 3.0x)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlaybackSpeed(f32);

impl PlaybackSpeed {
    pub const MIN: f32 = 0.5;
    pub const MAX: f32 = 3.0;

    /// Creates a new playback speed, rejecting values outside 0.5 - 3.0
    pub fn new(speed: f32) -> CoreResult<Self> {
        if !(Self::MIN..=Self::MAX).contains(&speed) {
            Err(CoreError::InvalidSpeed(speed))
        } else {
            Ok(Self(speed))
        }
    }

    /// Returns the speed value
    pub fn value(&self) -> f32 {
        self.0
    }
}

impl Default for PlaybackSpeed {
    fn default() -> Self {
        Self(1.0)
    }
}

impl Validator for PlaybackSpeed {
    fn validate(&self) -> Result<(), Vec<String>> {
        if !(Self::MIN..=Self::MAX).contains(&self.0) {
            Err(vec![format!(
                "Speed must be between {} and {}",
                Self::MIN,
                Self::MAX
            )])
        } else {
            Ok(())
        }
    }
}
