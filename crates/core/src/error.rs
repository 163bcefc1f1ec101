//! Error types for the StoryStream domain model

use thiserror::Error;

/// Result type for domain operations
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors raised when a domain invariant would be violated
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoreError {
    /// A book must contain at least one chapter
    #[error("Book has no chapters")]
    EmptyBook,

    /// The requested chapter path is not part of the book
    #[error("Chapter not found: {path}")]
    ChapterNotFound { path: String },

    /// Playback speed outside the supported range
    #[error("Invalid playback speed: {0} (must be between 0.5 and 3.0)")]
    InvalidSpeed(f32),
}
