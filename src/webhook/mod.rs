//! Webhook ingress — subscription handshake, signature check, event fan-out.

pub mod event;
pub mod routes;
pub mod signature;

pub use event::{EventKind, MessagingEvent, WebhookPayload};
pub use routes::{AppState, webhook_routes};
