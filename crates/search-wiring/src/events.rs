//! Per-manager event hub.
//!
//! Every document manager owns its own hub, so subscribers of one manager
//! never observe events of another.

use serde::Serialize;
use serde_json::Value;
use tokio::sync::broadcast;

/// Buffered events per subscriber before the slowest one starts lagging.
const EVENT_CAPACITY: usize = 64;

/// An event published by a document manager.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ManagerEvent {
    /// Event name.
    pub name: String,
    /// Event payload.
    pub payload: Value,
}

impl ManagerEvent {
    /// Creates an event.
    pub fn new(name: impl Into<String>, payload: Value) -> Self {
        Self {
            name: name.into(),
            payload,
        }
    }
}

/// Broadcast hub for [`ManagerEvent`]s.
#[derive(Debug)]
pub struct EventHub {
    sender: broadcast::Sender<ManagerEvent>,
}

impl EventHub {
    /// Creates a hub without subscribers.
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(EVENT_CAPACITY);
        Self { sender }
    }

    /// Subscribes to events dispatched after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<ManagerEvent> {
        self.sender.subscribe()
    }

    /// Dispatches an event and returns the number of subscribers reached.
    pub fn dispatch(&self, event: ManagerEvent) -> usize {
        self.sender.send(event).unwrap_or(0)
    }

    /// Returns the number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventHub {
    fn default() -> Self {
        Self::new()
    }
}
