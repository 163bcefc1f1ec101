//! Persistence of listening progress
//!
//! The controller calls [`PositionStore::update`] while holding its lock,
//! so implementations must return promptly.

use crate::error::{StoreError, StoreResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};
use storystream_core::{Book, BookId, CoreResult, Duration, PlaybackSpeed, Timestamp};
use tempfile::NamedTempFile;

/// Synchronous sink for a book's position, chapter and speed
pub trait PositionStore: Send + Sync {
    fn update(&self, book: &Book) -> StoreResult<()>;
}

/// The persisted part of a [`Book`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookProgress {
    pub book_id: BookId,
    pub chapter: String,
    pub position_ms: u64,
    pub speed: f32,
    pub updated_at: Timestamp,
}

impl BookProgress {
    pub fn from_book(book: &Book) -> Self {
        Self {
            book_id: book.id,
            chapter: book.current_path().to_string(),
            position_ms: book.position().as_millis(),
            speed: book.speed().value(),
            updated_at: Timestamp::now(),
        }
    }

    /// Restores chapter, offset and speed onto `book`
    pub fn apply_to(&self, book: &mut Book) -> CoreResult<()> {
        book.set_position(Duration::from_millis(self.position_ms), &self.chapter)?;
        book.set_speed(PlaybackSpeed::new(self.speed)?);
        Ok(())
    }
}

#[derive(Debug, Default)]
struct MemoryInner {
    books: HashMap<BookId, Book>,
    history: Vec<BookProgress>,
}

/// Keeps the latest snapshot of every book in memory, plus every update received
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<MemoryInner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn get(&self, id: &BookId) -> Option<Book> {
        self.lock().books.get(id).cloned()
    }

    /// Every update in the order it was received
    pub fn history(&self) -> Vec<BookProgress> {
        self.lock().history.clone()
    }

    pub fn update_count(&self) -> usize {
        self.lock().history.len()
    }
}

impl PositionStore for MemoryStore {
    fn update(&self, book: &Book) -> StoreResult<()> {
        let mut inner = self.lock();
        inner.history.push(BookProgress::from_book(book));
        inner.books.insert(book.id, book.clone());
        Ok(())
    }
}

/// Stores one `<book-id>.json` progress file per book
///
/// Files are written to a temporary file and renamed into place.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    /// Creates the store, creating `dir` if needed
    pub fn new(dir: impl Into<PathBuf>) -> StoreResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn progress_path(&self, id: &BookId) -> PathBuf {
        self.dir.join(format!("{}.json", id))
    }

    /// Loads the saved progress for a book, if any
    pub fn load(&self, id: &BookId) -> StoreResult<Option<BookProgress>> {
        let path = self.progress_path(id);
        if !path.exists() {
            return Ok(None);
        }

        let contents = fs::read_to_string(&path)?;
        Ok(Some(serde_json::from_str(&contents)?))
    }

    pub fn save(&self, progress: &BookProgress) -> StoreResult<()> {
        let path = self.progress_path(&progress.book_id);
        let json = serde_json::to_string_pretty(progress)?;

        let mut temp_file = NamedTempFile::new_in(&self.dir)?;
        temp_file.write_all(json.as_bytes())?;
        temp_file.flush()?;
        temp_file
            .persist(&path)
            .map_err(|e| StoreError::Persist {
                path: path.clone(),
                source: e.error,
            })?;

        log::trace!("saved progress to {}", path.display());
        Ok(())
    }
}

impl PositionStore for JsonFileStore {
    fn update(&self, book: &Book) -> StoreResult<()> {
        self.save(&BookProgress::from_book(book))
    }
}
