//! Fire-and-forget notifications from the selection core to its collaborators.
//!
//! Publishers never wait on subscribers and cannot observe whether anyone is
//! listening. Each subscriber gets its own queue and drains it on its own
//! schedule.

use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};

use tracing::{debug, warn};

use crate::tree::model::Level;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeEvent {
    /// A level's selection actually changed. Deeper levels are already cleared.
    SelectionChanged { level: Level, item_id: String },
    /// `level` and every deeper slot were cleared without a new selection.
    PathCleared { level: Level },
    /// The user asked to add a custom node below `level`.
    CustomNodeRequested { level: Level, prompt: String },
}

/// Broadcasts `TreeEvent`s to every live subscription.
#[derive(Debug, Default)]
pub struct EventBus {
    subscribers: Vec<Sender<TreeEvent>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self) -> Subscription {
        let (tx, rx) = mpsc::channel();
        self.subscribers.push(tx);
        Subscription { rx }
    }

    /// Deliver `event` to every subscriber. Dropped subscriptions are pruned.
    pub fn publish(&mut self, event: TreeEvent) {
        let before = self.subscribers.len();
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
        let dropped = before - self.subscribers.len();
        if dropped > 0 {
            warn!(dropped, "pruned closed event subscriptions");
        }
        debug!(?event, listeners = self.subscribers.len(), "published");
    }

    #[allow(dead_code)] // used by tests
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

/// The receiving end of one `EventBus` subscription.
#[derive(Debug)]
pub struct Subscription {
    rx: Receiver<TreeEvent>,
}

impl Subscription {
    /// Next queued event, or `None` when nothing is pending.
    pub fn try_next(&self) -> Option<TreeEvent> {
        match self.rx.try_recv() {
            Ok(event) => Some(event),
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }

    /// Everything queued so far, oldest first.
    pub fn drain(&self) -> Vec<TreeEvent> {
        self.rx.try_iter().collect()
    }
}
