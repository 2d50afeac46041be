//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] is shared via `Arc<EventBus>`; the API publishes form
//! lifecycle events and the automation runner reports rule outcomes on it.

use chrono::{DateTime, Utc};
use formkit_core::types::DbId;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

pub const EVENT_FORM_PUBLISHED: &str = "form.published";
pub const EVENT_SUBMISSION_CREATED: &str = "submission.created";
pub const EVENT_LIFECYCLE_FAILED: &str = "submission.lifecycle_failed";
pub const EVENT_RULE_FIRED: &str = "automation.rule_fired";
pub const EVENT_ACTION_FAILED: &str = "automation.action_failed";
pub const EVENT_NOTIFICATION: &str = "notification.in_app";

// ---------------------------------------------------------------------------
// FormEvent
// ---------------------------------------------------------------------------

/// A domain event.
///
/// Built with [`FormEvent::new`] plus [`with_form`](FormEvent::with_form),
/// [`with_actor`](FormEvent::with_actor) and
/// [`with_payload`](FormEvent::with_payload).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormEvent {
    /// Dot-separated event name, e.g. `"submission.created"`.
    pub event_type: String,

    pub form_id: Option<DbId>,

    /// User that triggered the event; `None` for anonymous fillers and
    /// background work.
    pub actor_user_id: Option<DbId>,

    pub payload: serde_json::Value,

    pub timestamp: DateTime<Utc>,
}

impl FormEvent {
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            form_id: None,
            actor_user_id: None,
            payload: serde_json::Value::Object(Default::default()),
            timestamp: Utc::now(),
        }
    }

    pub fn with_form(mut self, form_id: DbId) -> Self {
        self.form_id = Some(form_id);
        self
    }

    pub fn with_actor(mut self, user_id: DbId) -> Self {
        self.actor_user_id = Some(user_id);
        self
    }

    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 1024;

/// In-process fan-out event bus.
///
/// ```rust
/// use formkit_events::bus::{EventBus, FormEvent};
///
/// let bus = EventBus::default();
/// let mut rx = bus.subscribe();
///
/// bus.publish(FormEvent::new("form.published").with_form(1));
/// ```
pub struct EventBus {
    sender: broadcast::Sender<FormEvent>,
}

impl EventBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full the oldest unread events are dropped and slow
    /// receivers observe `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish to all current subscribers. Dropped when nobody listens.
    pub fn publish(&self, event: FormEvent) {
        tracing::debug!(event_type = %event.event_type, form_id = ?event.form_id, "Event published");
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<FormEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn publish_and_receive() {
        let bus = EventBus::default();
        let mut rx = bus.subscribe();

        bus.publish(
            FormEvent::new(EVENT_SUBMISSION_CREATED)
                .with_form(42)
                .with_payload(serde_json::json!({"submission_id": 7})),
        );

        let received = rx.recv().await.expect("should receive the event");
        assert_eq!(received.event_type, "submission.created");
        assert_eq!(received.form_id, Some(42));
        assert!(received.actor_user_id.is_none());
        assert_eq!(received.payload["submission_id"], 7);
    }

    #[tokio::test]
    async fn every_subscriber_sees_each_event() {
        let bus = EventBus::default();
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 2);

        bus.publish(FormEvent::new(EVENT_FORM_PUBLISHED).with_actor(3));

        assert_eq!(rx1.recv().await.unwrap().event_type, "form.published");
        assert_eq!(rx2.recv().await.unwrap().actor_user_id, Some(3));
    }

    #[test]
    fn publish_without_subscribers_is_fine() {
        EventBus::default().publish(FormEvent::new("orphan.event"));
    }
}
