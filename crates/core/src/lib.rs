//! Core domain model shared by the StoryStream crates

pub mod error;
pub mod types;

pub use error::{CoreError, CoreResult};
pub use types::{Book, BookId, Chapter, Duration, PlaybackSpeed, Timestamp, Validator};
