//! Contract between the controller and the audio rendering engine
//!
//! The engine itself (decoding, output) lives outside this crate. An adapter
//! implements [`Renderer`] and reports asynchronous state changes through the
//! channel handed to [`Renderer::attach`].

use crate::error::EngineResult;
use crossbeam_channel::Sender;
use std::path::{Path, PathBuf};

/// Playback state as reported by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Idle,
    Buffering,
    Ready,
    Ended,
}

/// Asynchronous notification from the engine
#[derive(Debug, Clone, PartialEq)]
pub enum RendererEvent {
    StateChanged {
        play_when_ready: bool,
        state: EngineState,
    },
    Error(String),
}

impl RendererEvent {
    /// The engine reached the end of the source while it was supposed to be playing
    pub fn is_completion(&self) -> bool {
        matches!(
            self,
            RendererEvent::StateChanged {
                play_when_ready: true,
                state: EngineState::Ended,
            }
        )
    }
}

/// A chapter file handed to the engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaSource {
    path: PathBuf,
}

impl MediaSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Adapter around an audio rendering engine
///
/// Calls other than `prepare` are fire-and-forget intents; the engine
/// acknowledges them later through [`RendererEvent`]s.
pub trait Renderer: Send {
    /// Registers the channel the engine reports its events on
    fn attach(&mut self, events: Sender<RendererEvent>);

    /// Opens `source` and starts buffering at `start_ms`
    ///
    /// Always supersedes a previous preparation, including after `release`.
    fn prepare(&mut self, source: &MediaSource, start_ms: u64) -> EngineResult<()>;

    fn set_play_when_ready(&mut self, play_when_ready: bool);

    fn seek_to(&mut self, position_ms: u64);

    fn set_speed(&mut self, speed: f32);

    /// Frees the engine's resources
    fn release(&mut self);

    /// Current offset into the source, `None` while it cannot be determined
    fn current_position(&self) -> Option<u64>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completion_requires_play_when_ready() {
        let ended_playing = RendererEvent::StateChanged {
            play_when_ready: true,
            state: EngineState::Ended,
        };
        let ended_paused = RendererEvent::StateChanged {
            play_when_ready: false,
            state: EngineState::Ended,
        };
        let ready = RendererEvent::StateChanged {
            play_when_ready: true,
            state: EngineState::Ready,
        };

        assert!(ended_playing.is_completion());
        assert!(!ended_paused.is_completion());
        assert!(!ready.is_completion());
        assert!(!RendererEvent::Error("boom".into()).is_completion());
    }

    #[test]
    fn test_media_source_path() {
        let source = MediaSource::new("/books/a/01.mp3");
        assert_eq!(source.path(), Path::new("/books/a/01.mp3"));
    }
}
