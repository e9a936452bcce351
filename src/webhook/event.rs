//! Inbound webhook payload types and event classification.

use serde::Deserialize;

/// Top-level callback body. Entries may be batched.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookPayload {
    pub object: String,
    #[serde(default)]
    pub entry: Vec<PageEntry>,
}

/// One page entry — a batch of messaging events.
#[derive(Debug, Clone, Deserialize)]
pub struct PageEntry {
    pub id: String,
    #[serde(default)]
    pub time: i64,
    #[serde(default)]
    pub messaging: Vec<MessagingEvent>,
}

/// A single messaging event: a message or a postback.
#[derive(Debug, Clone, Deserialize)]
pub struct MessagingEvent {
    pub sender: Principal,
    pub recipient: Principal,
    #[serde(default)]
    pub timestamp: i64,
    pub message: Option<EventMessage>,
    pub postback: Option<Postback>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Principal {
    pub id: String,
}

/// The message object carried by message events (including echoes).
#[derive(Debug, Clone, Deserialize)]
pub struct EventMessage {
    pub mid: Option<String>,
    #[serde(default)]
    pub is_echo: bool,
    pub app_id: Option<i64>,
    pub metadata: Option<String>,
    pub text: Option<String>,
    pub attachments: Option<Vec<serde_json::Value>>,
    pub quick_reply: Option<QuickReply>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QuickReply {
    pub payload: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Postback {
    pub payload: String,
}

/// What a messaging event is, for routing. Echo detection takes priority.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind<'a> {
    /// Delivery confirmation for a message we sent.
    Echo,
    /// Quick-reply tap. Logged only — the bot emits button postbacks.
    QuickReply(&'a str),
    /// Plain text from the user.
    Text(&'a str),
    /// Attachment(s) from the user.
    Attachment,
    /// Postback button click with its developer-defined payload.
    Postback(&'a str),
    /// Anything else. Logged and ignored.
    Unknown,
}

impl MessagingEvent {
    pub fn classify(&self) -> EventKind<'_> {
        if let Some(message) = &self.message {
            if message.is_echo {
                return EventKind::Echo;
            }
            if let Some(quick_reply) = &message.quick_reply {
                return EventKind::QuickReply(&quick_reply.payload);
            }
            if let Some(text) = &message.text {
                return EventKind::Text(text);
            }
            if message.attachments.is_some() {
                return EventKind::Attachment;
            }
            return EventKind::Unknown;
        }
        if let Some(postback) = &self.postback {
            return EventKind::Postback(&postback.payload);
        }
        EventKind::Unknown
    }
}
