//! Background task scheduling
//!
//! A [`TaskScheduler`] owns a small multi-threaded tokio runtime. Tasks are
//! plain closures; a repeating task and a one-shot task never share a worker
//! slot, so a slow position sync cannot hold back a due sleep timer.

use std::io;
use std::time::Duration as StdDuration;
use tokio::runtime::{Builder, Handle, Runtime};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

const WORKER_THREADS: usize = 2;
const MIN_PERIOD: StdDuration = StdDuration::from_millis(1);

/// Handle to a scheduled task
///
/// Dropping the handle cancels the task.
#[derive(Debug)]
pub struct TaskHandle {
    join: JoinHandle<()>,
    cancelled: bool,
}

impl TaskHandle {
    fn new(join: JoinHandle<()>) -> Self {
        Self {
            join,
            cancelled: false,
        }
    }

    /// Cancels the task; a run already in progress completes its current body
    pub fn cancel(&mut self) {
        self.cancelled = true;
        self.join.abort();
    }

    pub fn is_active(&self) -> bool {
        !self.cancelled && !self.join.is_finished()
    }
}

impl Drop for TaskHandle {
    fn drop(&mut self) {
        self.join.abort();
    }
}

/// Worker pool for the position updater and the sleep timer
pub struct TaskScheduler {
    runtime: Option<Runtime>,
    handle: Handle,
}

impl TaskScheduler {
    pub fn new() -> io::Result<Self> {
        let runtime = Builder::new_multi_thread()
            .worker_threads(WORKER_THREADS)
            .thread_name("storystream-scheduler")
            .enable_time()
            .build()?;
        let handle = runtime.handle().clone();

        log::debug!("task scheduler started with {} workers", WORKER_THREADS);

        Ok(Self {
            runtime: Some(runtime),
            handle,
        })
    }

    /// Runs `task` immediately and then once every `period`
    ///
    /// Ticks that fall behind are delayed rather than bunched up.
    pub fn schedule_repeating<F>(&self, period: StdDuration, mut task: F) -> TaskHandle
    where
        F: FnMut() + Send + 'static,
    {
        let period = period.max(MIN_PERIOD);
        let join = self.handle.spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                task();
            }
        });
        TaskHandle::new(join)
    }

    /// Runs `task` once after `delay`
    pub fn schedule_once<F>(&self, delay: StdDuration, task: F) -> TaskHandle
    where
        F: FnOnce() + Send + 'static,
    {
        let join = self.handle.spawn(async move {
            tokio::time::sleep(delay).await;
            task();
        });
        TaskHandle::new(join)
    }

    /// Stops the workers without waiting for running tasks
    ///
    /// Safe to call from inside one of the scheduler's own tasks.
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        if let Some(runtime) = self.runtime.take() {
            runtime.shutdown_background();
            log::debug!("task scheduler shut down");
        }
    }
}

impl Drop for TaskScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}

impl std::fmt::Debug for TaskScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskScheduler")
            .field("running", &self.runtime.is_some())
            .finish()
    }
}
