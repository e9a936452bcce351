//! Outbound message types.

use serde_json::json;

/// A postback button on a structured message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostbackButton {
    pub title: String,
    pub payload: String,
}

impl PostbackButton {
    pub fn new(title: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            payload: payload.into(),
        }
    }
}

/// Payload of an outbound message — plain text or a button template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessagePayload {
    Text { text: String },
    ButtonTemplate {
        text: String,
        buttons: Vec<PostbackButton>,
    },
}

impl MessagePayload {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    /// Render the platform "message" object for the Send API.
    ///
    /// The metadata tag comes back on the delivery echo and distinguishes
    /// plain text from structured button messages.
    pub fn to_message_json(&self) -> serde_json::Value {
        match self {
            Self::Text { text } => json!({
                "text": text,
                "metadata": "text_message",
            }),
            Self::ButtonTemplate { text, buttons } => {
                let buttons: Vec<serde_json::Value> = buttons
                    .iter()
                    .map(|b| {
                        json!({
                            "type": "postback",
                            "title": b.title,
                            "payload": b.payload,
                        })
                    })
                    .collect();
                json!({
                    "attachment": {
                        "type": "template",
                        "payload": {
                            "template_type": "button",
                            "text": text,
                            "buttons": buttons,
                        }
                    },
                    "metadata": "postback_message",
                })
            }
        }
    }
}

/// An immutable outbound message, created by the flow engine and consumed
/// exactly once by the dispatch queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub recipient_id: String,
    pub payload: MessagePayload,
}

impl OutboundMessage {
    pub fn new(recipient_id: impl Into<String>, payload: MessagePayload) -> Self {
        Self {
            recipient_id: recipient_id.into(),
            payload,
        }
    }
}
