//! Shared helpers for the player integration tests

#![allow(dead_code)]

use crossbeam_channel::Sender;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread;
use std::time::{Duration as StdDuration, Instant};
use storystream_player::{
    Book, Chapter, Duration, EngineError, EngineResult, MediaSource, MemoryStore,
    PlaybackController, PlayerConfig, PositionStore, Renderer, RendererEvent,
};

pub const BOOK_ROOT: &str = "/books/test";

/// A renderer call as seen by the engine
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Prepare { path: PathBuf, start_ms: u64 },
    PlayWhenReady(bool),
    SeekTo(u64),
    SetSpeed(f32),
    Release,
}

#[derive(Default)]
struct Inner {
    calls: Vec<Call>,
    position: Option<u64>,
    events: Option<Sender<RendererEvent>>,
    failing: Vec<String>,
}

/// Renderer that records every call and lets the test play the engine's part
///
/// Clones share state, so a test keeps one clone after handing the other to
/// the controller.
#[derive(Clone, Default)]
pub struct RecordingRenderer {
    inner: Arc<Mutex<Inner>>,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    fn inner(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.inner().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.inner().calls.clear();
    }

    pub fn prepared_paths(&self) -> Vec<PathBuf> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Prepare { path, .. } => Some(path),
                _ => None,
            })
            .collect()
    }

    /// Position reported to the controller; `None` means unknown
    pub fn set_position(&self, position: Option<u64>) {
        self.inner().position = position;
    }

    /// Makes `prepare` fail for sources whose path ends with `suffix`
    pub fn fail_prepare(&self, suffix: &str) {
        self.inner().failing.push(suffix.to_string());
    }

    /// Delivers an event as the engine would, from another thread
    pub fn emit(&self, event: RendererEvent) {
        let sender = self.inner().events.clone().expect("renderer not attached");
        sender.send(event).expect("listener gone");
    }
}

impl Renderer for RecordingRenderer {
    fn attach(&mut self, events: Sender<RendererEvent>) {
        self.inner().events = Some(events);
    }

    fn prepare(&mut self, source: &MediaSource, start_ms: u64) -> EngineResult<()> {
        let mut inner = self.inner();
        let path = source.path().to_path_buf();
        let failing = inner
            .failing
            .iter()
            .any(|suffix| path.to_string_lossy().ends_with(suffix.as_str()));
        if failing {
            return Err(EngineError::SourceNotFound(path));
        }
        inner.calls.push(Call::Prepare { path, start_ms });
        Ok(())
    }

    fn set_play_when_ready(&mut self, play_when_ready: bool) {
        self.inner().calls.push(Call::PlayWhenReady(play_when_ready));
    }

    fn seek_to(&mut self, position_ms: u64) {
        self.inner().calls.push(Call::SeekTo(position_ms));
    }

    fn set_speed(&mut self, speed: f32) {
        self.inner().calls.push(Call::SetSpeed(speed));
    }

    fn release(&mut self) {
        self.inner().calls.push(Call::Release);
    }

    fn current_position(&self) -> Option<u64> {
        self.inner().position
    }
}

/// Two chapters: `a.mp3` (5000ms) and `b.mp3` (3000ms)
pub fn two_chapter_book() -> Book {
    Book::new(
        "Test Book",
        BOOK_ROOT,
        vec![
            Chapter::new("a.mp3", "Chapter A", Duration::from_millis(5000)),
            Chapter::new("b.mp3", "Chapter B", Duration::from_millis(3000)),
        ],
    )
    .unwrap()
}

pub fn chapter_file(name: &str) -> PathBuf {
    PathBuf::from(BOOK_ROOT).join(name)
}

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub struct Harness {
    pub controller: PlaybackController,
    pub renderer: RecordingRenderer,
    pub store: Arc<MemoryStore>,
}

pub fn harness() -> Harness {
    harness_with(two_chapter_book(), PlayerConfig::default())
}

pub fn harness_with(book: Book, config: PlayerConfig) -> Harness {
    init_logging();
    let renderer = RecordingRenderer::new();
    let store = Arc::new(MemoryStore::new());
    let controller = PlaybackController::new(
        book,
        renderer.clone(),
        Arc::clone(&store) as Arc<dyn PositionStore>,
        config,
    )
    .expect("controller");

    Harness {
        controller,
        renderer,
        store,
    }
}

/// Polls `condition` until it holds or `timeout` passes
pub fn wait_until(timeout: StdDuration, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    loop {
        if condition() {
            return true;
        }
        if Instant::now() >= deadline {
            return false;
        }
        thread::sleep(StdDuration::from_millis(10));
    }
}
