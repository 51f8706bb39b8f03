//! Lifecycle event publishing over a tokio broadcast channel.
//!
//! The engine publishes an event after each committed state transition;
//! custom function execution happens on the consumer side and is best-effort
//! by design. Publishing never fails the caller.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use hots_db::models::TriggerEvent;

/// A ticket lifecycle event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketEvent {
    pub event_id: Uuid,
    pub event_type: TriggerEvent,
    pub ticket_id: Uuid,
    pub service_id: Uuid,
    /// The user whose action caused the transition, if any.
    pub actor_id: Option<Uuid>,
    pub timestamp: DateTime<Utc>,
    pub data: serde_json::Value,
}

impl TicketEvent {
    /// Build an event for a ticket transition happening now.
    #[must_use]
    pub fn new(
        event_type: TriggerEvent,
        ticket_id: Uuid,
        service_id: Uuid,
        actor_id: Option<Uuid>,
        data: serde_json::Value,
    ) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            event_type,
            ticket_id,
            service_id,
            actor_id,
            timestamp: Utc::now(),
            data,
        }
    }
}

/// Publisher that sends lifecycle events to a broadcast channel.
#[derive(Clone)]
pub struct TicketEventPublisher {
    sender: tokio::sync::broadcast::Sender<TicketEvent>,
}

impl TicketEventPublisher {
    /// Create a publisher with the given channel capacity.
    pub fn new(capacity: usize) -> (Self, tokio::sync::broadcast::Receiver<TicketEvent>) {
        let (sender, receiver) = tokio::sync::broadcast::channel(capacity);
        (Self { sender }, receiver)
    }

    /// Publish an event to all subscribers. Fire-and-forget: send errors are
    /// logged, never propagated, so handler availability cannot affect
    /// ticket state.
    pub fn publish(&self, event: TicketEvent) {
        if let Err(e) = self.sender.send(event) {
            tracing::warn!(
                target: "custom_functions",
                error = %e,
                "No active subscribers to receive ticket event"
            );
        }
    }

    /// Get a new receiver for the broadcast channel.
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<TicketEvent> {
        self.sender.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_publish_reaches_subscriber() {
        let (publisher, mut receiver) = TicketEventPublisher::new(8);
        let ticket_id = Uuid::new_v4();

        publisher.publish(TicketEvent::new(
            TriggerEvent::OnCreated,
            ticket_id,
            Uuid::new_v4(),
            None,
            serde_json::json!({}),
        ));

        let event = receiver.recv().await.unwrap();
        assert_eq!(event.ticket_id, ticket_id);
        assert_eq!(event.event_type, TriggerEvent::OnCreated);
    }

    #[test]
    fn test_publish_without_subscribers_does_not_panic() {
        let (publisher, receiver) = TicketEventPublisher::new(8);
        drop(receiver);

        publisher.publish(TicketEvent::new(
            TriggerEvent::OnRejected,
            Uuid::new_v4(),
            Uuid::new_v4(),
            Some(Uuid::new_v4()),
            serde_json::json!({"remark": "no"}),
        ));
    }

    #[tokio::test]
    async fn test_late_subscriber_sees_new_events_only() {
        let (publisher, _initial) = TicketEventPublisher::new(8);

        publisher.publish(TicketEvent::new(
            TriggerEvent::OnCreated,
            Uuid::new_v4(),
            Uuid::new_v4(),
            None,
            serde_json::json!({}),
        ));

        let mut late = publisher.subscribe();
        let ticket_id = Uuid::new_v4();
        publisher.publish(TicketEvent::new(
            TriggerEvent::OnApproved,
            ticket_id,
            Uuid::new_v4(),
            None,
            serde_json::json!({}),
        ));

        let event = late.recv().await.unwrap();
        assert_eq!(event.ticket_id, ticket_id);
    }
}
