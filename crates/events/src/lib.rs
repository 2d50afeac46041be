//! Formkit event bus and notification delivery.
//!
//! - [`EventBus`]: in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`FormEvent`]: the domain event envelope (`form.published`,
//!   `submission.created`, `automation.*`).
//! - [`delivery`]: external delivery channels (webhook, email).
//! - [`ChannelNotifier`]: the automation notifier, routing each recipient
//!   to email, webhook or an in-app bus event.

pub mod bus;
pub mod delivery;
pub mod notifier;

pub use bus::{EventBus, FormEvent};
pub use delivery::email::{EmailConfig, EmailDelivery};
pub use delivery::webhook::WebhookDelivery;
pub use notifier::{Channel, ChannelNotifier};
