//! Outbound message dispatch — per-recipient ordered queues with echo gating.

pub mod message;
pub mod queue;
pub mod sender;

pub use message::{MessagePayload, OutboundMessage, PostbackButton};
pub use queue::{Dispatcher, ECHO_TIMEOUT};
pub use sender::{GraphApiSender, SendReceipt, Sender};
