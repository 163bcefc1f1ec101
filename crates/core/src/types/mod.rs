//! Domain types for StoryStream
//!
//! - `book`: Book, Chapter and BookId
//! - `playback`: playback speed
//! - `common`: durations, timestamps and the `Validator` trait

mod book;
mod common;
mod playback;

pub use book::{Book, BookId, Chapter};
pub use common::{Duration, Timestamp, Validator};
pub use playback::PlaybackSpeed;
