//! Event sink adapters.

use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::domain::auth::errors::EventSinkError;
use crate::domain::auth::events::AuthEvent;
use crate::domain::auth::ports::EventSink;

/// In-process sink fanning lifecycle events out on a broadcast channel.
///
/// Delivery is fire-and-forget: an exchange with no subscribers is not a
/// failure, and a lagging subscriber drops its own backlog.
pub struct BroadcastEventSink {
    tx: broadcast::Sender<AuthEvent>,
}

impl BroadcastEventSink {
    /// Create a sink with the given channel capacity.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Subscribe to events emitted through this sink.
    pub fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.tx.subscribe()
    }
}

#[async_trait]
impl EventSink for BroadcastEventSink {
    async fn emit(&self, event: AuthEvent) -> Result<(), EventSinkError> {
        // send only errors when no receiver exists, which is fine here
        let _ = self.tx.send(event);
        Ok(())
    }
}

/// Sink that drops every event.
///
/// For wiring contexts with no interest in lifecycle notifications.
pub struct NullEventSink;

#[async_trait]
impl EventSink for NullEventSink {
    async fn emit(&self, _event: AuthEvent) -> Result<(), EventSinkError> {
        Ok(())
    }
}
