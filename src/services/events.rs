//! Domain events emitted by services after successful writes
//!
//! Emission is fire-and-forget: with no subscribers the event is dropped.
//! `main` attaches a logging listener so every event shows up at debug level.

use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, info, trace};

use crate::db::ReactionType;

/// Events emitted by services
#[derive(Debug, Clone, PartialEq)]
pub enum DomainEvent {
    UserRegistered { user_id: i64, username: String },
    UserDeleted { user_id: i64 },

    ReflectionCreated { id: i64, author_id: i64 },
    ReflectionUpdated { id: i64 },
    ReflectionDeleted { id: i64 },
    ReflectionTracked { id: i64, user_id: i64, date: String, tracked: bool },

    FriendRequestSent { requester_id: i64, recipient_id: i64 },
    FriendRequestAccepted { requester_id: i64, recipient_id: i64 },
    FriendRequestRejected { requester_id: i64, recipient_id: i64 },
    FriendshipRemoved { user_id: i64, friend_id: i64 },

    ReactionAdded { reflection_id: i64, user_id: i64, reaction_type: ReactionType },
    ReactionRemoved { reflection_id: i64, user_id: i64, reaction_type: ReactionType },
}

/// Broadcast bus for domain events
pub struct EventBus {
    sender: broadcast::Sender<DomainEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::with_capacity(1024)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn emit(&self, event: DomainEvent) {
        trace!(event = ?event, "Emitting domain event");
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DomainEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

fn log_event(event: &DomainEvent) {
    match event {
        DomainEvent::UserRegistered { user_id, username } => {
            info!(user_id, username = %username, "User registered");
        }
        DomainEvent::FriendRequestAccepted { requester_id, recipient_id } => {
            info!(requester_id, recipient_id, "Friend request accepted");
        }
        DomainEvent::ReflectionTracked { id, date, tracked, .. } => {
            debug!(reflection_id = id, date = %date, tracked, "Reflection tracking toggled");
        }
        _ => {
            debug!(event = ?event, "Domain event");
        }
    }
}

/// Spawn a task that logs every event on the bus
pub fn spawn_logging_listener(event_bus: Arc<EventBus>) -> tokio::task::JoinHandle<()> {
    let mut receiver = event_bus.subscribe();

    tokio::spawn(async move {
        loop {
            match receiver.recv().await {
                Ok(event) => log_event(&event),
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    debug!(skipped = n, "Event listener lagged, skipped events");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    debug!("Event bus closed, stopping listener");
                    break;
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::{timeout, Duration};

    #[tokio::test]
    async fn test_event_bus_emit_receive() {
        let bus = EventBus::new();
        let mut receiver = bus.subscribe();

        bus.emit(DomainEvent::FriendRequestSent {
            requester_id: 1,
            recipient_id: 2,
        });

        let event = timeout(Duration::from_millis(100), receiver.recv())
            .await
            .expect("timeout")
            .expect("receive error");

        assert_eq!(
            event,
            DomainEvent::FriendRequestSent {
                requester_id: 1,
                recipient_id: 2
            }
        );
    }

    #[test]
    fn test_event_bus_no_subscribers() {
        let bus = EventBus::new();
        assert_eq!(bus.subscriber_count(), 0);
        bus.emit(DomainEvent::ReflectionDeleted { id: 7 });
    }
}
