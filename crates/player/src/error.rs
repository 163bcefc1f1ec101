// FILE: crates/player/src/error.rs

use std::path::PathBuf;
use storystream_core::CoreError;
use thiserror::Error;

/// Errors reported by a [`crate::Renderer`] implementation
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Source not found: {}", .0.display())]
    SourceNotFound(PathBuf),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Decode error: {0}")]
    DecodeError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type EngineResult<T> = Result<T, EngineError>;

/// Errors surfaced by the playback controller
///
/// Commands issued in a state that has no transition for them are not
/// errors; they are logged and ignored.
#[derive(Error, Debug)]
pub enum PlayerError {
    #[error("Chapter source unavailable: {}: {source}", .path.display())]
    SourceUnavailable {
        path: PathBuf,
        #[source]
        source: EngineError,
    },

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type PlayerResult<T> = Result<T, PlayerError>;

/// Errors raised by a [`crate::PositionStore`]
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Failed to write progress file {}: {source}", .path.display())]
    Persist {
        path: PathBuf,
        source: std::io::Error,
    },
}

pub type StoreResult<T> = Result<T, StoreError>;
