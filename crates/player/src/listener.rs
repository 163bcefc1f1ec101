//! Routes renderer events into the controller
//!
//! The engine reports on its own thread. Events travel over a channel to a
//! dedicated listener thread, which hands each one to the controller through
//! the same lock that guards user commands.

use crate::renderer::RendererEvent;
use crossbeam_channel::{Receiver, RecvTimeoutError};
use std::io;
use std::sync::Weak;
use std::thread;
use std::time::Duration as StdDuration;

/// How often the listener checks whether its target still exists
pub(crate) const LISTENER_POLL: StdDuration = StdDuration::from_millis(250);

/// Spawns the listener thread
///
/// The thread holds only a weak reference to `target` and exits once the
/// target is gone or every sender has been dropped.
pub(crate) fn spawn<T, F>(
    target: Weak<T>,
    events: Receiver<RendererEvent>,
    poll: StdDuration,
    dispatch: F,
) -> io::Result<thread::JoinHandle<()>>
where
    T: Send + Sync + 'static,
    F: Fn(&T, RendererEvent) + Send + 'static,
{
    thread::Builder::new()
        .name("storystream-renderer-events".to_string())
        .spawn(move || {
            loop {
                match events.recv_timeout(poll) {
                    Ok(event) => match target.upgrade() {
                        Some(target) => dispatch(&target, event),
                        None => break,
                    },
                    Err(RecvTimeoutError::Timeout) => {
                        if target.strong_count() == 0 {
                            break;
                        }
                    }
                    Err(RecvTimeoutError::Disconnected) => break,
                }
            }
            log::trace!("renderer event listener exiting");
        })
}
