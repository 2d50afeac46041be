//! The automation [`Notifier`]: picks a delivery channel from the shape of
//! the recipient.

use std::sync::Arc;

use async_trait::async_trait;
use formkit_core::automation::{ActionError, Notification};
use formkit_core::store::Notifier;

use crate::bus::{EventBus, FormEvent, EVENT_NOTIFICATION};
use crate::delivery::email::EmailDelivery;
use crate::delivery::webhook::WebhookDelivery;

/// Delivery channel for one recipient.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Email,
    Webhook,
    InApp,
}

impl Channel {
    /// `http(s)://` URLs go to webhooks, addresses with an `@` to email and
    /// anything else is an in-app handle.
    pub fn for_recipient(recipient: &str) -> Self {
        let r = recipient.trim();
        let lower = r.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            Self::Webhook
        } else if r.contains('@') && !r.contains(char::is_whitespace) {
            Self::Email
        } else {
            Self::InApp
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Webhook => "webhook",
            Self::InApp => "in_app",
        }
    }
}

/// Routes notifications to email, webhook or the event bus.
pub struct ChannelNotifier {
    email: Option<EmailDelivery>,
    webhook: WebhookDelivery,
    bus: Arc<EventBus>,
}

impl ChannelNotifier {
    pub fn new(email: Option<EmailDelivery>, webhook: WebhookDelivery, bus: Arc<EventBus>) -> Self {
        Self { email, webhook, bus }
    }
}

#[async_trait]
impl Notifier for ChannelNotifier {
    async fn send(&self, notification: &Notification) -> Result<(), ActionError> {
        let channel = Channel::for_recipient(&notification.recipient);
        tracing::debug!(
            channel = channel.as_str(),
            rule_id = notification.rule_id,
            "Dispatching notification"
        );
        let delivery_failed = |reason: String| ActionError::Delivery {
            recipient: notification.recipient.clone(),
            reason,
        };
        match channel {
            Channel::Email => {
                let email = self.email.as_ref().ok_or_else(|| {
                    ActionError::Unavailable("email delivery is not configured".to_string())
                })?;
                email
                    .deliver(notification)
                    .await
                    .map_err(|e| delivery_failed(e.to_string()))
            }
            Channel::Webhook => self
                .webhook
                .deliver(notification)
                .await
                .map_err(|e| delivery_failed(e.to_string())),
            Channel::InApp => {
                self.bus.publish(
                    FormEvent::new(EVENT_NOTIFICATION)
                        .with_form(notification.form_id)
                        .with_payload(serde_json::json!({
                            "recipient": notification.recipient,
                            "subject": notification.subject,
                            "body": notification.body,
                            "rule_id": notification.rule_id,
                            "submission_id": notification.submission_id,
                        })),
                );
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn notification(recipient: &str) -> Notification {
        Notification {
            rule_id: 1,
            form_id: 2,
            submission_id: 3,
            recipient: recipient.to_string(),
            subject: "Automation: Escalate".to_string(),
            body: "Rule fired".to_string(),
        }
    }

    #[test]
    fn recipient_routing() {
        assert_eq!(Channel::for_recipient("ops@example.com"), Channel::Email);
        assert_eq!(Channel::for_recipient("https://hooks.example.com/x"), Channel::Webhook);
        assert_eq!(Channel::for_recipient("HTTP://hooks.example.com"), Channel::Webhook);
        assert_eq!(Channel::for_recipient("dispatch-team"), Channel::InApp);
        assert_eq!(Channel::for_recipient("not an @ddress"), Channel::InApp);
    }

    #[tokio::test]
    async fn in_app_publishes_on_bus() {
        let bus = Arc::new(EventBus::default());
        let mut rx = bus.subscribe();
        let notifier = ChannelNotifier::new(None, WebhookDelivery::new(), Arc::clone(&bus));

        notifier.send(&notification("dispatch-team")).await.unwrap();

        let event = rx.recv().await.unwrap();
        assert_eq!(event.event_type, EVENT_NOTIFICATION);
        assert_eq!(event.form_id, Some(2));
        assert_eq!(event.payload["recipient"], "dispatch-team");
    }

    #[tokio::test]
    async fn email_without_smtp_is_unavailable() {
        let bus = Arc::new(EventBus::default());
        let notifier = ChannelNotifier::new(None, WebhookDelivery::new(), bus);
        assert_matches!(
            notifier.send(&notification("ops@example.com")).await,
            Err(ActionError::Unavailable(_))
        );
    }
}
