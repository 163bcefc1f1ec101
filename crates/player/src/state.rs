//! Controller state

use std::fmt;

/// Lifecycle state of the playback controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    /// Nothing prepared yet
    Idle,
    /// Released; only `play()` brings the controller back
    Dead,
    /// Current chapter loaded, not playing
    Prepared,
    Started,
    Paused,
    /// Last chapter played to its end
    PlaybackCompleted,
    /// The engine reported a failure or the chapter source could not be opened
    Error,
}

impl PlaybackState {
    pub fn is_started(&self) -> bool {
        *self == PlaybackState::Started
    }

    /// States in which a seek within the current chapter is meaningful
    pub fn is_seekable(&self) -> bool {
        matches!(
            self,
            PlaybackState::Prepared
                | PlaybackState::Started
                | PlaybackState::Paused
                | PlaybackState::PlaybackCompleted
        )
    }
}

impl fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PlaybackState::Idle => "idle",
            PlaybackState::Dead => "dead",
            PlaybackState::Prepared => "prepared",
            PlaybackState::Started => "started",
            PlaybackState::Paused => "paused",
            PlaybackState::PlaybackCompleted => "playback-completed",
            PlaybackState::Error => "error",
        };
        f.write_str(name)
    }
}

/// Play state reported to the application shell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackStatus {
    Playing,
    Paused,
    Stopped,
}

/// Skip direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}
