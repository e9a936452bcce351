//! Outbound send transport — the platform Send API.

use async_trait::async_trait;
use serde_json::json;
use tracing::warn;

use crate::dispatch::message::MessagePayload;
use crate::error::SendError;

/// Default Send API endpoint.
const SEND_API_URL: &str = "https://graph.facebook.com/v2.6/me/messages";

/// Result of a successful Send API call.
#[derive(Debug, Clone, Default)]
pub struct SendReceipt {
    /// Message id assigned by the platform, if it returned one.
    pub message_id: Option<String>,
}

/// Fallible outbound transport. Delivery confirmation arrives separately,
/// as an echo event on the webhook — a returned receipt only means the API
/// accepted the call.
#[async_trait]
pub trait Sender: Send + Sync {
    async fn send(
        &self,
        recipient_id: &str,
        payload: &MessagePayload,
    ) -> Result<SendReceipt, SendError>;
}

/// Sender backed by the Graph API.
pub struct GraphApiSender {
    page_access_token: String,
    api_url: String,
    client: reqwest::Client,
}

impl GraphApiSender {
    pub fn new(page_access_token: String) -> Self {
        Self {
            page_access_token,
            api_url: SEND_API_URL.to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Override the API endpoint (for tests).
    pub fn with_api_url(page_access_token: String, api_url: String) -> Self {
        Self {
            page_access_token,
            api_url,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl Sender for GraphApiSender {
    async fn send(
        &self,
        recipient_id: &str,
        payload: &MessagePayload,
    ) -> Result<SendReceipt, SendError> {
        let body = json!({
            "recipient": { "id": recipient_id },
            "message": payload.to_message_json(),
        });

        let resp = self
            .client
            .post(&self.api_url)
            .query(&[("access_token", self.page_access_token.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(|e| SendError::Request(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(SendError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let data: serde_json::Value = resp.json().await.unwrap_or_else(|e| {
            warn!("Send API returned unparseable body: {e}");
            serde_json::Value::Null
        });
        let message_id = data
            .get("message_id")
            .and_then(serde_json::Value::as_str)
            .map(String::from);

        Ok(SendReceipt { message_id })
    }
}
