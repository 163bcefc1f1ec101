//! Notifications published to the application shell

use crate::state::PlaybackStatus;
use crossbeam_channel::{Receiver, Sender};
use storystream_core::Duration;

#[derive(Debug, Clone, PartialEq)]
pub enum PlayerEvent {
    PlayStateChanged(PlaybackStatus),
    /// Emitted after every persisted position change
    PositionChanged { chapter: String, position: Duration },
    SleepTimerChanged(bool),
    Error(String),
}

/// Fan-out of [`PlayerEvent`]s to any number of subscribers
///
/// Publishing never blocks. Subscribers whose receiver was dropped are
/// removed on the next publish.
#[derive(Debug, Default)]
pub struct EventHub {
    subscribers: Vec<Sender<PlayerEvent>>,
}

impl EventHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self) -> Receiver<PlayerEvent> {
        let (tx, rx) = crossbeam_channel::unbounded();
        self.subscribers.push(tx);
        rx
    }

    pub fn publish(&mut self, event: PlayerEvent) {
        log::debug!("publishing {:?}", event);
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}
