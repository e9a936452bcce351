//! Per-recipient dispatch queue with echo-gated flow control.
//!
//! The Send API does not guarantee ordering of concurrent calls, so each
//! recipient gets a FIFO queue with at most one message in flight at a
//! time. A delivery echo reopens the gate; if no echo arrives within
//! `ECHO_TIMEOUT` the gate reopens anyway, trading strict ordering for
//! liveness.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, RwLock};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::dispatch::message::OutboundMessage;
use crate::dispatch::sender::Sender;

/// How long a sent message may go unacknowledged before the gate reopens.
pub const ECHO_TIMEOUT: Duration = Duration::from_secs(10);

/// Queue and gate state for one recipient.
#[derive(Default)]
struct RecipientState {
    queue: VecDeque<OutboundMessage>,
    /// When the in-flight message was handed to the sender. `None` ≡ idle.
    last_sent: Option<Instant>,
}

/// Gate is open when nothing is in flight or the in-flight message has
/// gone unacknowledged past the timeout.
fn gate_open(last_sent: Option<Instant>) -> bool {
    match last_sent {
        None => true,
        Some(sent_at) => sent_at.elapsed() >= ECHO_TIMEOUT,
    }
}

/// Owns every recipient queue. The outer map lock only creates or fetches
/// a recipient's slot; the per-recipient mutex serializes the gate
/// check-then-send sequence, so recipients never contend with each other.
pub struct Dispatcher {
    sender: Arc<dyn Sender>,
    recipients: RwLock<HashMap<String, Arc<Mutex<RecipientState>>>>,
}

impl Dispatcher {
    pub fn new(sender: Arc<dyn Sender>) -> Arc<Self> {
        Arc::new(Self {
            sender,
            recipients: RwLock::new(HashMap::new()),
        })
    }

    /// Append a message to its recipient's queue, then attempt the head if
    /// the gate is open.
    pub async fn enqueue(&self, message: OutboundMessage) {
        let slot = self.slot(&message.recipient_id).await;
        let mut state = slot.lock().await;

        state.queue.push_back(message);
        debug!(depth = state.queue.len(), "Message queued");

        self.try_send_head(&mut state);
    }

    /// Handle a delivery echo for a recipient: reopen the gate and attempt
    /// the next queued message.
    ///
    /// The gate clears unconditionally — an unsolicited echo also reopens a
    /// currently-valid in-flight slot. Known quirk, kept as-is.
    pub async fn on_echo_received(&self, recipient_id: &str) {
        let slot = self.slot(recipient_id).await;
        let mut state = slot.lock().await;

        state.last_sent = None;
        self.try_send_head(&mut state);
    }

    /// Number of messages still queued (not in flight) for a recipient.
    pub async fn queue_depth(&self, recipient_id: &str) -> usize {
        let slot = self.slot(recipient_id).await;
        let state = slot.lock().await;
        state.queue.len()
    }

    async fn slot(&self, recipient_id: &str) -> Arc<Mutex<RecipientState>> {
        if let Some(slot) = self.recipients.read().await.get(recipient_id) {
            return Arc::clone(slot);
        }
        let mut map = self.recipients.write().await;
        Arc::clone(map.entry(recipient_id.to_string()).or_default())
    }

    /// If the gate is open and the queue is non-empty, pop the head, mark
    /// it in flight, and hand it to the sender in a background task.
    ///
    /// Must be called with the recipient's mutex held so the gate
    /// check-then-act is atomic per recipient.
    fn try_send_head(&self, state: &mut RecipientState) {
        if !gate_open(state.last_sent) {
            return;
        }
        let Some(message) = state.queue.pop_front() else {
            return;
        };
        state.last_sent = Some(Instant::now());

        let sender = Arc::clone(&self.sender);
        tokio::spawn(async move {
            match sender.send(&message.recipient_id, &message.payload).await {
                Ok(receipt) => {
                    info!(
                        recipient = %message.recipient_id,
                        message_id = receipt.message_id.as_deref().unwrap_or("-"),
                        "Message sent"
                    );
                }
                Err(e) => {
                    // The queue does not advance on failure; the gate stays
                    // closed until an echo or the timeout.
                    warn!(recipient = %message.recipient_id, "Send failed: {e}");
                }
            }
        });
    }
}
