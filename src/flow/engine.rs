//! Flow engine — maps stored answers + events to outbound messages.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::dispatch::{Dispatcher, MessagePayload, OutboundMessage};
use crate::error::Error;
use crate::flow::messages::{
    CLOSING_TEXT, CLOSING_WAIT_TEXT, INTRODUCTION_TEXT, audio_link, location_selection,
    mood_selection,
};
use crate::flow::state::{Answer, PostbackPayload, UserFlowState};
use crate::store::StateStore;

/// Everything one turn produces: messages to enqueue (in order) and
/// whether the stored answers are cleared afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnPlan {
    pub messages: Vec<MessagePayload>,
    pub reset_after: bool,
}

/// Decide the output for the current state. Pure — the state machine is
/// inferred entirely from the stored answers.
pub fn plan_turn(state: &UserFlowState, server_url: &str) -> TurnPlan {
    match (state.mood, state.location) {
        // First contact: introduce, then ask the mood question.
        (Answer::Unset, _) => TurnPlan {
            messages: vec![MessagePayload::text(INTRODUCTION_TEXT), mood_selection()],
            reset_after: false,
        },
        // Returning user: straight to the mood question.
        (Answer::Cleared, _) => TurnPlan {
            messages: vec![mood_selection()],
            reset_after: false,
        },
        (Answer::Chosen(_), Answer::Unset | Answer::Cleared) => TurnPlan {
            messages: vec![location_selection()],
            reset_after: false,
        },
        (Answer::Chosen(mood), Answer::Chosen(location)) => TurnPlan {
            messages: vec![
                MessagePayload::text(CLOSING_WAIT_TEXT),
                audio_link(server_url, mood, location),
                MessagePayload::text(CLOSING_TEXT),
            ],
            reset_after: true,
        },
    }
}

/// Drives the conversation: reads state, persists postback answers,
/// enqueues the planned messages.
pub struct FlowEngine {
    store: Arc<dyn StateStore>,
    dispatcher: Arc<Dispatcher>,
    server_url: String,
}

impl FlowEngine {
    pub fn new(store: Arc<dyn StateStore>, dispatcher: Arc<Dispatcher>, server_url: String) -> Self {
        Self {
            store,
            dispatcher,
            server_url,
        }
    }

    /// Handle a text or attachment message: re-evaluate and re-prompt.
    /// Idempotent — never advances the flow.
    pub async fn handle_message(&self, sender_id: &str) -> Result<(), Error> {
        self.run_turn(sender_id).await
    }

    /// Handle a postback button click: persist the answer, then re-evaluate.
    ///
    /// A failed store write propagates and no further transition is
    /// attempted; the interaction is safe to retry because state is
    /// re-read on the next event.
    pub async fn handle_postback(&self, sender_id: &str, payload: &str) -> Result<(), Error> {
        match PostbackPayload::parse(payload) {
            Some(PostbackPayload::Mood(n)) => {
                self.store.set_mood(sender_id, i64::from(n)).await?;
            }
            Some(PostbackPayload::Location(n)) => {
                self.store.set_location(sender_id, i64::from(n)).await?;
            }
            None => {
                warn!(payload, "Unrecognized postback payload");
                return Ok(());
            }
        }
        self.run_turn(sender_id).await
    }

    /// One turn: read state, compute all messages, enqueue them in order,
    /// then perform the reset if the flow completed. The ordering is
    /// contract.
    async fn run_turn(&self, user_id: &str) -> Result<(), Error> {
        let record = self.store.get(user_id).await?;
        let state = UserFlowState::from(&record);
        let plan = plan_turn(&state, &self.server_url);

        debug!(
            user = user_id,
            messages = plan.messages.len(),
            complete = plan.reset_after,
            "Planned turn"
        );

        for payload in plan.messages {
            self.dispatcher
                .enqueue(OutboundMessage::new(user_id, payload))
                .await;
        }

        if plan.reset_after {
            self.store.reset(user_id).await?;
        }
        Ok(())
    }
}
