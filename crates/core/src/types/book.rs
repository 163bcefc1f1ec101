//! Book and chapter domain models

use crate::error::{CoreError, CoreResult};
use crate::types::{Duration, PlaybackSpeed, Timestamp, Validator};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use uuid::Uuid;

/// Unique identifier for a book
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BookId(Uuid);

impl BookId {
    /// Creates a new random BookId
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a BookId from a UUID string
    pub fn from_string(s: &str) -> Result<Self, uuid::Error> {
        Ok(Self(Uuid::parse_str(s)?))
    }

    /// Returns the BookId as a string
    pub fn as_string(&self) -> String {
        self.0.to_string()
    }
}

impl Default for BookId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for BookId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One playable file of a book
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chapter {
    /// Path relative to the book root; identifies the chapter
    pub path: String,
    pub title: String,
    pub duration: Duration,
}

impl Chapter {
    /// Creates a new chapter
    pub fn new(path: impl Into<String>, title: impl Into<String>, duration: Duration) -> Self {
        Self {
            path: path.into(),
            title: title.into(),
            duration,
        }
    }
}

impl Validator for Chapter {
    fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.path.trim().is_empty() {
            errors.push("Chapter path cannot be empty".to_string());
        }

        if self.duration.is_zero() {
            errors.push("Chapter duration must be greater than zero".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// An audiobook: ordered chapters plus the persisted listening progress.
///
/// A `Book` always has at least one chapter and its current chapter always
/// refers to one of them. Deserialization enforces the same rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BookRecord", into = "BookRecord")]
pub struct Book {
    pub id: BookId,
    pub title: String,
    pub root: PathBuf,
    chapters: Vec<Chapter>,
    current: usize,
    position: Duration,
    speed: PlaybackSpeed,
    last_played: Option<Timestamp>,
}

impl Book {
    /// Creates a book positioned at the start of its first chapter
    pub fn new(
        title: impl Into<String>,
        root: impl Into<PathBuf>,
        chapters: Vec<Chapter>,
    ) -> CoreResult<Self> {
        if chapters.is_empty() {
            return Err(CoreError::EmptyBook);
        }

        Ok(Self {
            id: BookId::new(),
            title: title.into(),
            root: root.into(),
            chapters,
            current: 0,
            position: Duration::ZERO,
            speed: PlaybackSpeed::default(),
            last_played: None,
        })
    }

    pub fn chapters(&self) -> &[Chapter] {
        &self.chapters
    }

    pub fn current_chapter(&self) -> &Chapter {
        &self.chapters[self.current]
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    /// Relative media path of the current chapter
    pub fn current_path(&self) -> &str {
        &self.current_chapter().path
    }

    /// Offset into the current chapter
    pub fn position(&self) -> Duration {
        self.position
    }

    pub fn speed(&self) -> PlaybackSpeed {
        self.speed
    }

    pub fn last_played(&self) -> Option<Timestamp> {
        self.last_played
    }

    pub fn next_chapter(&self) -> Option<&Chapter> {
        self.chapters.get(self.current + 1)
    }

    pub fn previous_chapter(&self) -> Option<&Chapter> {
        self.current
            .checked_sub(1)
            .and_then(|idx| self.chapters.get(idx))
    }

    pub fn is_first_chapter(&self) -> bool {
        self.current == 0
    }

    /// Finds the index of the chapter with the given relative path
    pub fn chapter_index(&self, path: &str) -> Option<usize> {
        self.chapters.iter().position(|ch| ch.path == path)
    }

    /// Moves the bookmark to `position` inside the chapter at `path`
    pub fn set_position(&mut self, position: Duration, path: &str) -> CoreResult<()> {
        let index = self
            .chapter_index(path)
            .ok_or_else(|| CoreError::ChapterNotFound {
                path: path.to_string(),
            })?;

        self.current = index;
        self.set_offset(position);
        Ok(())
    }

    /// Moves the bookmark within the current chapter
    pub fn set_offset(&mut self, position: Duration) {
        self.position = position;
        self.last_played = Some(Timestamp::now());
    }

    pub fn set_speed(&mut self, speed: PlaybackSpeed) {
        self.speed = speed;
    }

    /// Absolute file path of a chapter
    pub fn chapter_file(&self, chapter: &Chapter) -> PathBuf {
        self.root.join(&chapter.path)
    }

    /// Absolute file path of the current chapter
    pub fn current_file(&self) -> PathBuf {
        self.chapter_file(self.current_chapter())
    }
}

impl Validator for Book {
    fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.title.trim().is_empty() {
            errors.push("Title cannot be empty".to_string());
        }

        for chapter in &self.chapters {
            if let Err(chapter_errors) = chapter.validate() {
                errors.extend(chapter_errors);
            }
        }

        if self.position > self.current_chapter().duration {
            errors.push("Position is past the end of the current chapter".to_string());
        }

        if let Err(speed_errors) = self.speed.validate() {
            errors.extend(speed_errors);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Serialized form of a [`Book`]; the current chapter is stored by path
#[derive(Serialize, Deserialize)]
struct BookRecord {
    id: BookId,
    title: String,
    root: PathBuf,
    chapters: Vec<Chapter>,
    current_path: String,
    position: Duration,
    speed: PlaybackSpeed,
    last_played: Option<Timestamp>,
}

impl From<Book> for BookRecord {
    fn from(book: Book) -> Self {
        let current_path = book.current_path().to_string();
        Self {
            id: book.id,
            title: book.title,
            root: book.root,
            chapters: book.chapters,
            current_path,
            position: book.position,
            speed: book.speed,
            last_played: book.last_played,
        }
    }
}

impl TryFrom<BookRecord> for Book {
    type Error = CoreError;

    fn try_from(record: BookRecord) -> CoreResult<Self> {
        if record.chapters.is_empty() {
            return Err(CoreError::EmptyBook);
        }

        let current = record
            .chapters
            .iter()
            .position(|ch| ch.path == record.current_path)
            .ok_or(CoreError::ChapterNotFound {
                path: record.current_path,
            })?;

        Ok(Self {
            id: record.id,
            title: record.title,
            root: record.root,
            chapters: record.chapters,
            current,
            position: record.position,
            speed: record.speed,
            last_played: record.last_played,
        })
    }
}
