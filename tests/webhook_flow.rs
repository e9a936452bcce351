//! Integration tests for the webhook → flow → dispatch pipeline.
//!
//! Each test spins up an Axum server on a random port and drives it over
//! real HTTP with signed webhook bodies, with a recording sender standing
//! in for the Send API.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use tokio::net::TcpListener;
use tokio::time::timeout;

use ambient_bot::config::BotConfig;
use ambient_bot::dispatch::{Dispatcher, MessagePayload, OutboundMessage, SendReceipt, Sender};
use ambient_bot::error::SendError;
use ambient_bot::flow::FlowEngine;
use ambient_bot::store::{LibSqlStore, StateStore};
use ambient_bot::webhook::{AppState, webhook_routes};
use ambient_bot::webhook::signature;

/// Maximum time any test is allowed to run before we consider it hung.
const TEST_TIMEOUT: Duration = Duration::from_secs(5);

const APP_SECRET: &str = "integration-secret";
const VERIFY_TOKEN: &str = "integration-verify";
const SERVER_URL: &str = "https://bot.example.com";

/// Sender that records every dispatched message instead of calling out.
#[derive(Default)]
struct RecordingSender {
    sent: std::sync::Mutex<Vec<OutboundMessage>>,
}

impl RecordingSender {
    fn texts(&self) -> Vec<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .map(|m| match &m.payload {
                MessagePayload::Text { text } => text.clone(),
                MessagePayload::ButtonTemplate { text, .. } => text.clone(),
            })
            .collect()
    }
}

#[async_trait]
impl Sender for RecordingSender {
    async fn send(
        &self,
        recipient_id: &str,
        payload: &MessagePayload,
    ) -> Result<SendReceipt, SendError> {
        self.sent
            .lock()
            .unwrap()
            .push(OutboundMessage::new(recipient_id, payload.clone()));
        Ok(SendReceipt::default())
    }
}

struct TestServer {
    port: u16,
    sender: Arc<RecordingSender>,
    store: Arc<LibSqlStore>,
    client: reqwest::Client,
}

impl TestServer {
    async fn start() -> Self {
        let config = Arc::new(BotConfig {
            app_secret: APP_SECRET.into(),
            verify_token: VERIFY_TOKEN.into(),
            page_access_token: "unused".into(),
            server_url: SERVER_URL.into(),
            port: 0,
            db_path: ":memory:".into(),
            public_dir: "./public".into(),
        });
        let store = Arc::new(LibSqlStore::new_memory().await.unwrap());
        let sender = Arc::new(RecordingSender::default());
        let dispatcher = Dispatcher::new(sender.clone());
        let flow = Arc::new(FlowEngine::new(
            store.clone(),
            Arc::clone(&dispatcher),
            SERVER_URL.to_string(),
        ));
        let app = webhook_routes(AppState {
            config,
            flow,
            dispatcher,
        });

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        // Give the server a moment to start accepting connections.
        tokio::time::sleep(Duration::from_millis(50)).await;

        Self {
            port,
            sender,
            store,
            client: reqwest::Client::new(),
        }
    }

    /// POST a signed webhook body; returns the HTTP status.
    async fn post_events(&self, events: Vec<serde_json::Value>) -> u16 {
        let body = json!({
            "object": "page",
            "entry": [{"id": "page-1", "time": 1458692752478u64, "messaging": events}]
        })
        .to_string();

        let resp = self
            .client
            .post(format!("http://127.0.0.1:{}/webhook", self.port))
            .header("content-type", "application/json")
            .header("x-hub-signature", signature::sign(APP_SECRET, body.as_bytes()))
            .body(body)
            .send()
            .await
            .unwrap();
        let status = resp.status().as_u16();

        // Let the spawned dispatch tasks run before the caller asserts.
        tokio::time::sleep(Duration::from_millis(50)).await;
        status
    }

    async fn post_text(&self, user: &str, text: &str) -> u16 {
        self.post_events(vec![json!({
            "sender": {"id": user},
            "recipient": {"id": "page-1"},
            "timestamp": 1458692752478u64,
            "message": {"mid": "mid.incoming", "text": text}
        })])
        .await
    }

    async fn post_postback(&self, user: &str, payload: &str) -> u16 {
        self.post_events(vec![json!({
            "sender": {"id": user},
            "recipient": {"id": "page-1"},
            "timestamp": 1458692752478u64,
            "postback": {"payload": payload}
        })])
        .await
    }

    /// A delivery echo for the given user, as the platform reports it:
    /// the page is the sender, the user is the recipient.
    async fn post_echo(&self, user: &str) -> u16 {
        self.post_events(vec![json!({
            "sender": {"id": "page-1"},
            "recipient": {"id": user},
            "timestamp": 1458692752478u64,
            "message": {
                "is_echo": true,
                "app_id": 1517776481860111u64,
                "metadata": "text_message",
                "mid": "mid.echo"
            }
        })])
        .await
    }

    /// Feed echoes until the user's queue is drained.
    async fn drain(&self, user: &str) {
        for _ in 0..8 {
            self.post_echo(user).await;
        }
    }
}

#[tokio::test]
async fn handshake_round_trip() {
    timeout(TEST_TIMEOUT, async {
        let server = TestServer::start().await;

        let resp = server
            .client
            .get(format!(
                "http://127.0.0.1:{}/webhook?hub.mode=subscribe&hub.verify_token={}&hub.challenge=challenge-42",
                server.port, VERIFY_TOKEN
            ))
            .send()
            .await
            .unwrap();

        assert_eq!(resp.status().as_u16(), 200);
        assert_eq!(resp.text().await.unwrap(), "challenge-42");
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn unsigned_post_is_rejected() {
    timeout(TEST_TIMEOUT, async {
        let server = TestServer::start().await;

        let resp = server
            .client
            .post(format!("http://127.0.0.1:{}/webhook", server.port))
            .header("content-type", "application/json")
            .body(r#"{"object":"page","entry":[]}"#)
            .send()
            .await
            .unwrap();

        assert_eq!(resp.status().as_u16(), 403);
        assert!(server.sender.texts().is_empty());
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn full_conversation_flow() {
    timeout(TEST_TIMEOUT, async {
        let server = TestServer::start().await;
        let user = "user-77";

        // First contact: introduction goes out immediately, the mood
        // question waits in the queue for the echo.
        assert_eq!(server.post_text(user, "hi there").await, 200);
        assert_eq!(
            server.sender.texts(),
            vec!["Hi there, I can help you select an ambient sound thats right for you."]
        );

        server.post_echo(user).await;
        assert_eq!(
            server.sender.texts()[1],
            "Select the mood that you're trying to achieve right now"
        );

        // Answer the mood question.
        assert_eq!(server.post_postback(user, "mood-option-1").await, 200);
        server.drain(user).await;
        assert_eq!(
            server.sender.texts()[2],
            "Does being around people relax you?"
        );

        // Answer the location question; the computed audio link comes back.
        assert_eq!(server.post_postback(user, "location-option-2").await, 200);
        server.drain(user).await;

        let texts = server.sender.texts();
        assert_eq!(
            &texts[3..],
            &[
                "I'm sending you your ambient sounds now, please wait.".to_string(),
                format!("{SERVER_URL}/city_hum.mp3"),
                "Here is your ambient sound effect. Let me know if you want to pick a new ambient effect."
                    .to_string(),
            ]
        );

        // Answers are cleared, so the next visit restarts the questions
        // without the introduction.
        let record = server.store.get(user).await.unwrap();
        assert_eq!(record.target_mood, Some(-1));
        assert_eq!(record.target_location, Some(-1));

        server.post_text(user, "again please").await;
        server.drain(user).await;
        assert_eq!(
            server.sender.texts().last().unwrap(),
            "Select the mood that you're trying to achieve right now"
        );
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn messages_stay_ordered_without_echoes_until_drained() {
    timeout(TEST_TIMEOUT, async {
        let server = TestServer::start().await;
        let user = "user-88";

        // Two inbound texts back to back: four outbound messages total,
        // but only the first leaves until echoes arrive.
        server.post_text(user, "hello").await;
        server.post_text(user, "hello again").await;
        assert_eq!(server.sender.texts().len(), 1);

        server.drain(user).await;
        assert_eq!(
            server.sender.texts(),
            vec![
                "Hi there, I can help you select an ambient sound thats right for you.".to_string(),
                "Select the mood that you're trying to achieve right now".to_string(),
                "Hi there, I can help you select an ambient sound thats right for you.".to_string(),
                "Select the mood that you're trying to achieve right now".to_string(),
            ]
        );
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn users_queues_are_independent() {
    timeout(TEST_TIMEOUT, async {
        let server = TestServer::start().await;

        server.post_text("alice", "hi").await;
        server.post_text("bob", "hi").await;

        // Each user got their own introduction without waiting on the
        // other's echo.
        let sent = server.sender.sent.lock().unwrap().clone();
        let recipients: Vec<&str> = sent.iter().map(|m| m.recipient_id.as_str()).collect();
        assert_eq!(recipients, vec!["alice", "bob"]);
    })
    .await
    .expect("test timed out");
}
