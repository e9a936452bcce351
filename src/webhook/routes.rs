//! Axum routes for the webhook endpoint.

use std::collections::HashMap;
use std::sync::Arc;

use axum::Router;
use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use tracing::{debug, error, info, warn};

use crate::config::BotConfig;
use crate::dispatch::Dispatcher;
use crate::flow::FlowEngine;
use crate::webhook::event::{EventKind, MessagingEvent, WebhookPayload};
use crate::webhook::signature;

/// Shared state for the webhook routes.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<BotConfig>,
    pub flow: Arc<FlowEngine>,
    pub dispatcher: Arc<Dispatcher>,
}

/// Build the webhook router.
pub fn webhook_routes(state: AppState) -> Router {
    Router::new()
        .route("/webhook", get(verify_subscription).post(receive_events))
        .with_state(state)
}

/// GET /webhook — subscription handshake.
///
/// The platform sends `hub.mode=subscribe` with our verify token; we echo
/// `hub.challenge` back to confirm.
async fn verify_subscription(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> impl IntoResponse {
    let mode = params.get("hub.mode").map(String::as_str);
    let token = params.get("hub.verify_token").map(String::as_str);

    if mode == Some("subscribe") && token == Some(state.config.verify_token.as_str()) {
        info!("Validating webhook subscription");
        let challenge = params.get("hub.challenge").cloned().unwrap_or_default();
        (StatusCode::OK, challenge)
    } else {
        warn!("Webhook validation failed; verify tokens do not match");
        (StatusCode::FORBIDDEN, String::new())
    }
}

/// POST /webhook — the event stream.
///
/// The signature is checked against the raw bytes before any parsing.
/// Per-event handler failures are logged but never turn into a non-200:
/// the platform would redeliver the whole batch.
async fn receive_events(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> StatusCode {
    let header = headers
        .get("x-hub-signature")
        .and_then(|v| v.to_str().ok());
    if let Err(e) = signature::verify_signature(&state.config.app_secret, &body, header) {
        warn!("Rejected webhook request: {e}");
        return StatusCode::FORBIDDEN;
    }

    let payload: WebhookPayload = match serde_json::from_slice(&body) {
        Ok(payload) => payload,
        Err(e) => {
            warn!("Malformed webhook payload: {e}");
            return StatusCode::BAD_REQUEST;
        }
    };

    if payload.object != "page" {
        return StatusCode::NOT_FOUND;
    }

    for entry in &payload.entry {
        for event in &entry.messaging {
            handle_event(&state, event).await;
        }
    }

    StatusCode::OK
}

/// Route one classified event to the dispatcher or the flow engine.
async fn handle_event(state: &AppState, event: &MessagingEvent) {
    match event.classify() {
        EventKind::Echo => {
            // The echo's recipient is the user the message was delivered
            // to; only the dispatcher cares, the flow engine is not run.
            debug!(recipient = %event.recipient.id, "Received delivery echo");
            state.dispatcher.on_echo_received(&event.recipient.id).await;
        }
        EventKind::QuickReply(payload) => {
            // The bot only emits button postbacks; quick replies are logged
            // and take no flow action.
            info!(payload, "Quick reply received");
        }
        EventKind::Text(_) | EventKind::Attachment => {
            if let Err(e) = state.flow.handle_message(&event.sender.id).await {
                error!(sender = %event.sender.id, "Failed to handle message: {e}");
            }
        }
        EventKind::Postback(payload) => {
            info!(sender = %event.sender.id, payload, "Received postback");
            if let Err(e) = state.flow.handle_postback(&event.sender.id, payload).await {
                error!(sender = %event.sender.id, "Failed to handle postback: {e}");
            }
        }
        EventKind::Unknown => {
            warn!(sender = %event.sender.id, "Webhook received unknown messaging event");
        }
    }
}
