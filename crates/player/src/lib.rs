//! Player - Playback controller for StoryStream
//!
//! [`PlaybackController`] drives an external audio [`Renderer`] through a
//! book's chapters, keeps the saved position in a [`PositionStore`] in step
//! with what is heard and runs the sleep timer.

mod controller;
mod error;
mod events;
mod listener;
mod renderer;
mod scheduler;
mod sleep_timer;
mod state;
mod store;

pub use controller::PlaybackController;
pub use error::{EngineError, EngineResult, PlayerError, PlayerResult, StoreError, StoreResult};
pub use events::{EventHub, PlayerEvent};
pub use renderer::{EngineState, MediaSource, Renderer, RendererEvent};
pub use scheduler::{TaskHandle, TaskScheduler};
pub use state::{Direction, PlaybackState, PlaybackStatus};
pub use store::{BookProgress, JsonFileStore, MemoryStore, PositionStore};
pub use storystream_config::{ConfigManager, PlayerConfig};
pub use storystream_core::{Book, Chapter, Duration, PlaybackSpeed};

