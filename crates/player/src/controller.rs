//! Playback state machine
//!
//! Every command, every position-sync tick, the sleep timer and every
//! renderer event take the same lock before touching the controller. The
//! state, the book and both task handles live together behind that lock so
//! they always change as one.

use crate::error::{PlayerError, PlayerResult};
use crate::events::{EventHub, PlayerEvent};
use crate::listener::{self, LISTENER_POLL};
use crate::renderer::{MediaSource, Renderer, RendererEvent};
use crate::scheduler::{TaskHandle, TaskScheduler};
use crate::sleep_timer::{SleepTimer, TimerExpiry};
use crate::state::{Direction, PlaybackState, PlaybackStatus};
use crate::store::PositionStore;
use crossbeam_channel::Receiver;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use storystream_config::{ConfigManager, PlayerConfig};
use storystream_core::{Book, CoreError, Duration, PlaybackSpeed};

/// Mediates between application commands and the audio renderer
///
/// Commands that make no sense in the current state (pausing while paused,
/// seeking before anything is prepared) are logged and ignored. Only failures
/// to open a chapter or to start the worker pool are returned as errors.
pub struct PlaybackController {
    shared: Arc<Shared>,
}

struct Shared {
    core: Mutex<Core>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Core> {
        self.core.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

struct Core {
    this: Weak<Shared>,
    state: PlaybackState,
    book: Book,
    renderer: Box<dyn Renderer>,
    store: Arc<dyn PositionStore>,
    events: EventHub,
    config: PlayerConfig,
    /// Created on first use and dropped on release
    scheduler: Option<TaskScheduler>,
    updater: Option<TaskHandle>,
    updater_generation: u64,
    sleep_timer: SleepTimer,
}

impl PlaybackController {
    /// Attaches to `renderer` and prepares the book's current chapter
    pub fn new<R>(
        book: Book,
        renderer: R,
        store: Arc<dyn PositionStore>,
        config: PlayerConfig,
    ) -> PlayerResult<Self>
    where
        R: Renderer + 'static,
    {
        let (event_tx, event_rx) = crossbeam_channel::unbounded();
        let mut renderer: Box<dyn Renderer> = Box::new(renderer);
        renderer.attach(event_tx);

        let shared = Arc::new_cyclic(|this| Shared {
            core: Mutex::new(Core {
                this: this.clone(),
                state: PlaybackState::Idle,
                book,
                renderer,
                store,
                events: EventHub::new(),
                config,
                scheduler: None,
                updater: None,
                updater_generation: 0,
                sleep_timer: SleepTimer::default(),
            }),
        });

        // Detached: the listener exits once the controller is gone
        listener::spawn(
            Arc::downgrade(&shared),
            event_rx,
            LISTENER_POLL,
            |shared: &Shared, event| shared.lock().on_renderer_event(event),
        )?;

        shared.lock().prepare()?;
        log::info!("Playback controller ready");

        Ok(Self { shared })
    }

    pub fn play(&self) -> PlayerResult<()> {
        self.shared.lock().play()
    }

    pub fn pause(&self) {
        self.shared.lock().pause()
    }

    /// Jumps by the configured seek increment within the current chapter
    ///
    /// Counts from the renderer's position when it reports one, otherwise
    /// from the saved offset. Forward skips stop at the chapter's duration
    /// and backward skips at zero; neither crosses into another chapter.
    pub fn skip(&self, direction: Direction) -> PlayerResult<()> {
        self.shared.lock().skip(direction)
    }

    /// Moves to `position` inside the chapter identified by `chapter_path`
    pub fn change_position(&self, position: Duration, chapter_path: &str) -> PlayerResult<()> {
        self.shared.lock().change_position(position, chapter_path)
    }

    pub fn next(&self) -> PlayerResult<()> {
        self.shared.lock().next()
    }

    /// Restarts the chapter, or goes to the previous one near its start
    pub fn previous(&self) -> PlayerResult<()> {
        self.shared.lock().previous()
    }

    pub fn set_playback_speed(&self, speed: f32) -> PlayerResult<()> {
        self.shared.lock().set_playback_speed(speed)
    }

    pub fn toggle_sleep_timer(&self) -> PlayerResult<()> {
        self.shared.lock().toggle_sleep_timer()
    }

    /// Stops playback and frees the renderer and the worker pool
    ///
    /// A later `play()` prepares everything again.
    pub fn release(&self) {
        self.shared.lock().release()
    }

    /// Snapshot of the book with its current progress
    pub fn get_book(&self) -> Book {
        self.shared.lock().book.clone()
    }

    pub fn state(&self) -> PlaybackState {
        self.shared.lock().state
    }

    pub fn is_sleep_timer_active(&self) -> bool {
        self.shared.lock().sleep_timer.is_active()
    }

    pub fn is_updater_active(&self) -> bool {
        self.shared.lock().updater_active()
    }

    pub fn subscribe(&self) -> Receiver<PlayerEvent> {
        self.shared.lock().events.subscribe()
    }

    pub fn config(&self) -> PlayerConfig {
        self.shared.lock().config.clone()
    }

    /// Replaces the preferences
    ///
    /// A running position updater is restarted with the new interval. The
    /// sleep timer keeps its current countdown.
    pub fn set_config(&self, config: PlayerConfig) -> PlayerResult<()> {
        self.shared.lock().set_config(config)
    }

    /// Reads the preferences through `manager`, falling back to defaults
    pub fn reload_config(&self, manager: &ConfigManager) -> PlayerResult<()> {
        let config = manager.load_or_default().player;
        log::info!("Reloaded player config from {}", manager.path().display());
        self.set_config(config)
    }
}

impl Core {
    fn scheduler(&mut self) -> PlayerResult<&TaskScheduler> {
        let scheduler = match self.scheduler.take() {
            Some(scheduler) => scheduler,
            None => TaskScheduler::new()?,
        };
        Ok(&*self.scheduler.insert(scheduler))
    }

    /// Loads the current chapter into the renderer at the book's offset
    fn prepare(&mut self) -> PlayerResult<()> {
        let path = self.book.current_file();
        let start_ms = self.book.position().as_millis();

        if let Err(source) = self.renderer.prepare(&MediaSource::new(path.clone()), start_ms) {
            log::error!("Failed to prepare {}: {}", path.display(), source);
            self.stop_updater();
            self.state = PlaybackState::Error;
            self.events.publish(PlayerEvent::Error(source.to_string()));
            return Err(PlayerError::SourceUnavailable { path, source });
        }

        self.renderer.set_speed(self.book.speed().value());
        self.state = PlaybackState::Prepared;
        log::debug!("Prepared {} at {}ms", path.display(), start_ms);
        Ok(())
    }

    fn play(&mut self) -> PlayerResult<()> {
        match self.state {
            PlaybackState::Idle | PlaybackState::Dead | PlaybackState::Error => {
                self.prepare()?;
                self.start()
            }
            PlaybackState::PlaybackCompleted => {
                self.seek_current(Duration::ZERO);
                self.start()
            }
            PlaybackState::Prepared | PlaybackState::Paused => self.start(),
            PlaybackState::Started => {
                log::warn!("play() ignored: already started");
                Ok(())
            }
        }
    }

    fn start(&mut self) -> PlayerResult<()> {
        self.start_updater()?;
        self.renderer.set_play_when_ready(true);
        self.state = PlaybackState::Started;
        self.events
            .publish(PlayerEvent::PlayStateChanged(PlaybackStatus::Playing));
        Ok(())
    }

    fn set_config(&mut self, config: PlayerConfig) -> PlayerResult<()> {
        let interval_changed =
            config.position_sync_interval() != self.config.position_sync_interval();
        self.config = config;

        if interval_changed && self.updater_active() {
            self.start_updater()?;
        }
        Ok(())
    }

    fn pause(&mut self) {
        if !self.state.is_started() {
            log::warn!("pause() ignored in state {}", self.state);
            return;
        }

        self.renderer.set_play_when_ready(false);
        self.stop_updater();
        self.state = PlaybackState::Paused;
        self.events
            .publish(PlayerEvent::PlayStateChanged(PlaybackStatus::Paused));
    }

    fn change_position(&mut self, position: Duration, chapter_path: &str) -> PlayerResult<()> {
        if self.state == PlaybackState::Dead {
            log::warn!("change_position() ignored: player released");
            return Ok(());
        }

        let index = self
            .book
            .chapter_index(chapter_path)
            .ok_or_else(|| CoreError::ChapterNotFound {
                path: chapter_path.to_string(),
            })?;

        if index != self.book.current_index() {
            let was_started = self.state.is_started();
            self.book.set_position(position, chapter_path)?;
            self.persist();
            self.prepare()?;

            if was_started {
                self.renderer.set_play_when_ready(true);
                if !self.updater_active() {
                    self.start_updater()?;
                }
                self.state = PlaybackState::Started;
                self.events
                    .publish(PlayerEvent::PlayStateChanged(PlaybackStatus::Playing));
            } else {
                self.events
                    .publish(PlayerEvent::PlayStateChanged(PlaybackStatus::Paused));
            }
        } else if self.state.is_seekable() {
            self.seek_current(position);
        } else {
            log::warn!("Seek ignored in state {}", self.state);
        }

        Ok(())
    }

    fn skip(&mut self, direction: Direction) -> PlayerResult<()> {
        if self.state == PlaybackState::Dead {
            log::warn!("skip() ignored: player released");
            return Ok(());
        }

        let increment = Duration::from(self.config.seek_increment());
        let current = self.playback_position();
        let target = match direction {
            Direction::Forward => current
                .saturating_add(increment)
                .min(self.book.current_chapter().duration),
            Direction::Backward => current.saturating_sub(increment),
        };

        let path = self.book.current_path().to_string();
        self.change_position(target, &path)
    }

    fn next(&mut self) -> PlayerResult<()> {
        match self.book.next_chapter() {
            Some(chapter) => {
                let path = chapter.path.clone();
                self.change_position(Duration::ZERO, &path)
            }
            None => {
                log::debug!("next() ignored: already at the last chapter");
                Ok(())
            }
        }
    }

    fn previous(&mut self) -> PlayerResult<()> {
        if self.state == PlaybackState::Dead {
            log::warn!("previous() ignored: player released");
            return Ok(());
        }

        let position = self.playback_position();
        let threshold = Duration::from(self.config.previous_restart_threshold());

        if position > threshold || self.book.is_first_chapter() {
            if self.state.is_seekable() {
                self.seek_current(Duration::ZERO);
            } else {
                self.book.set_offset(Duration::ZERO);
                self.persist();
            }
            return Ok(());
        }

        match self.book.previous_chapter() {
            Some(chapter) => {
                let path = chapter.path.clone();
                self.change_position(Duration::ZERO, &path)
            }
            None => Ok(()),
        }
    }

    fn set_playback_speed(&mut self, speed: f32) -> PlayerResult<()> {
        let speed = PlaybackSpeed::new(speed)?;
        self.book.set_speed(speed);
        self.persist();

        if self.state == PlaybackState::Dead {
            log::warn!("Speed {} stored; renderer is released", speed.value());
        } else {
            self.renderer.set_speed(speed.value());
        }
        Ok(())
    }

    fn toggle_sleep_timer(&mut self) -> PlayerResult<()> {
        if self.sleep_timer.cancel() {
            log::info!("Sleep timer cancelled");
            self.events.publish(PlayerEvent::SleepTimerChanged(false));
            return Ok(());
        }

        if self.state == PlaybackState::Dead {
            log::warn!("Sleep timer not started: player released");
            return Ok(());
        }

        let delay = self.config.sleep_timer_duration();
        let stop_after_current_chapter = self.config.stop_after_current_chapter;
        let generation = self.sleep_timer.next_generation();
        let this = self.this.clone();

        let task = self.scheduler()?.schedule_once(delay, move || {
            if let Some(shared) = this.upgrade() {
                shared.lock().on_sleep_timer_expired(generation);
            }
        });
        self.sleep_timer.arm(task, generation, stop_after_current_chapter);

        log::info!("Sleep timer set for {:?}", delay);
        self.events.publish(PlayerEvent::SleepTimerChanged(true));
        Ok(())
    }

    fn release(&mut self) {
        if self.state == PlaybackState::Dead {
            log::warn!("release() ignored: already released");
            return;
        }

        self.stop_updater();
        self.renderer.release();
        let timer_was_active = self.sleep_timer.cancel();
        self.state = PlaybackState::Dead;

        self.events
            .publish(PlayerEvent::PlayStateChanged(PlaybackStatus::Stopped));
        if timer_was_active {
            self.events.publish(PlayerEvent::SleepTimerChanged(false));
        }

        if let Some(scheduler) = self.scheduler.take() {
            scheduler.shutdown();
        }
        log::info!("Playback released");
    }

    fn on_sleep_timer_expired(&mut self, generation: u64) {
        match self.sleep_timer.expire(generation) {
            TimerExpiry::Release => {
                log::info!("Sleep timer expired, stopping playback");
                self.events.publish(PlayerEvent::SleepTimerChanged(false));
                self.release();
            }
            TimerExpiry::StopAtChapterEnd => {
                log::info!("Sleep timer expired, stopping at the end of the chapter");
            }
            TimerExpiry::Stale => log::debug!("Ignoring expiry of a cancelled sleep timer"),
        }
    }

    fn on_renderer_event(&mut self, event: RendererEvent) {
        if event.is_completion() {
            self.on_completion();
            return;
        }

        match event {
            RendererEvent::Error(message) => self.on_engine_error(message),
            RendererEvent::StateChanged {
                play_when_ready,
                state,
            } => log::trace!(
                "Renderer state {:?} (play_when_ready={})",
                state,
                play_when_ready
            ),
        }
    }

    fn on_completion(&mut self) {
        if !self.state.is_started() {
            log::debug!("Completion ignored in state {}", self.state);
            return;
        }

        if self.sleep_timer.take_pending_stop() {
            log::info!("Chapter finished, sleep timer stops playback");
            match self.book.next_chapter().map(|chapter| chapter.path.clone()) {
                Some(path) => {
                    if let Err(e) = self.stop_before(&path) {
                        log::error!("Failed to queue {}: {}", path, e);
                    }
                }
                None => self.stop_at_completion(),
            }
            self.events.publish(PlayerEvent::SleepTimerChanged(false));
            return;
        }

        if self.book.next_chapter().is_some() {
            if let Err(e) = self.next() {
                log::error!("Failed to advance to the next chapter: {}", e);
            }
        } else {
            log::info!("Finished '{}'", self.book.title);
            self.stop_at_completion();
        }
    }

    fn stop_at_completion(&mut self) {
        self.stop_updater();
        self.state = PlaybackState::PlaybackCompleted;
        self.events
            .publish(PlayerEvent::PlayStateChanged(PlaybackStatus::Stopped));
    }

    /// Halts and leaves the chapter at `path` prepared from its start
    fn stop_before(&mut self, path: &str) -> PlayerResult<()> {
        self.stop_updater();
        self.renderer.set_play_when_ready(false);
        self.book.set_position(Duration::ZERO, path)?;
        self.persist();
        self.prepare()?;
        self.events
            .publish(PlayerEvent::PlayStateChanged(PlaybackStatus::Stopped));
        Ok(())
    }

    fn on_engine_error(&mut self, message: String) {
        if self.state == PlaybackState::Dead {
            log::debug!("Renderer error after release: {}", message);
            return;
        }

        log::error!("Renderer error: {}", message);
        self.stop_updater();
        self.renderer.set_play_when_ready(false);
        self.state = PlaybackState::Error;
        self.events.publish(PlayerEvent::Error(message));
        self.events
            .publish(PlayerEvent::PlayStateChanged(PlaybackStatus::Stopped));
    }

    /// Seeks inside the current chapter and saves the new offset
    fn seek_current(&mut self, position: Duration) {
        self.renderer.seek_to(position.as_millis());
        self.book.set_offset(position);
        self.persist();
    }

    /// Renderer position when it knows one, otherwise the saved offset
    fn playback_position(&self) -> Duration {
        if !self.state.is_seekable() {
            return self.book.position();
        }
        self.renderer
            .current_position()
            .map(Duration::from_millis)
            .unwrap_or_else(|| self.book.position())
    }

    fn persist(&mut self) {
        match self.store.update(&self.book) {
            Ok(()) => self.events.publish(PlayerEvent::PositionChanged {
                chapter: self.book.current_path().to_string(),
                position: self.book.position(),
            }),
            Err(e) => log::warn!("Failed to save progress of '{}': {}", self.book.title, e),
        }
    }

    fn start_updater(&mut self) -> PlayerResult<()> {
        self.stop_updater();
        self.updater_generation = self.updater_generation.wrapping_add(1);

        let generation = self.updater_generation;
        let period = self.config.position_sync_interval();
        let this = self.this.clone();

        let task = self.scheduler()?.schedule_repeating(period, move || {
            if let Some(shared) = this.upgrade() {
                shared.lock().sync_position(generation);
            }
        });
        self.updater = Some(task);
        Ok(())
    }

    fn stop_updater(&mut self) {
        if let Some(mut task) = self.updater.take() {
            task.cancel();
        }
    }

    fn updater_active(&self) -> bool {
        self.updater.as_ref().is_some_and(TaskHandle::is_active)
    }

    /// One position-sync tick
    fn sync_position(&mut self, generation: u64) {
        if generation != self.updater_generation || !self.state.is_started() {
            return;
        }

        match self.renderer.current_position() {
            Some(ms) => {
                self.book.set_offset(Duration::from_millis(ms));
                self.persist();
            }
            None => log::trace!("Renderer position unknown, skipping sync"),
        }
    }
}

impl Drop for Core {
    fn drop(&mut self) {
        if self.state != PlaybackState::Dead {
            self.renderer.release();
        }
    }
}
