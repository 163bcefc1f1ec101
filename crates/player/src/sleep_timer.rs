//! Sleep timer bookkeeping

use crate::scheduler::TaskHandle;

/// What the controller should do when the sleep timer fires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TimerExpiry {
    /// Release playback now
    Release,
    /// Keep playing; stop when the current chapter completes
    StopAtChapterEnd,
    /// The firing task belongs to a timer that was cancelled or replaced
    Stale,
}

/// Sleep timer state owned by the controller
///
/// A timer is active from the moment it is armed until it is cancelled, it
/// releases playback, or (with stop-after-chapter set) the deferred stop at
/// the end of the chapter has been carried out.
#[derive(Debug, Default)]
pub(crate) struct SleepTimer {
    task: Option<TaskHandle>,
    stop_after_current_chapter: bool,
    stop_pending: bool,
    generation: u64,
}

impl SleepTimer {
    pub fn is_active(&self) -> bool {
        self.task.is_some() || self.stop_pending
    }

    /// Generation the next armed timer will carry
    pub fn next_generation(&self) -> u64 {
        self.generation.wrapping_add(1)
    }

    pub fn arm(&mut self, task: TaskHandle, generation: u64, stop_after_current_chapter: bool) {
        self.task = Some(task);
        self.generation = generation;
        self.stop_after_current_chapter = stop_after_current_chapter;
        self.stop_pending = false;
    }

    /// Cancels the timer, returning whether it was active
    pub fn cancel(&mut self) -> bool {
        let was_active = self.is_active();
        if let Some(mut task) = self.task.take() {
            task.cancel();
        }
        self.stop_after_current_chapter = false;
        self.stop_pending = false;
        was_active
    }

    /// Records that the timer task with `generation` fired
    pub fn expire(&mut self, generation: u64) -> TimerExpiry {
        if generation != self.generation || self.task.is_none() {
            return TimerExpiry::Stale;
        }

        // The handle belongs to the task running this call, which finishes
        // right after it returns.
        self.task = None;
        if self.stop_after_current_chapter {
            self.stop_pending = true;
            TimerExpiry::StopAtChapterEnd
        } else {
            TimerExpiry::Release
        }
    }

    /// Consumes a deferred stop, if one is waiting for the chapter to end
    pub fn take_pending_stop(&mut self) -> bool {
        let pending = self.stop_pending;
        if pending {
            self.stop_pending = false;
            self.stop_after_current_chapter = false;
        }
        pending
    }
}
