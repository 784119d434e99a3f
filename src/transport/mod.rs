//! Inbound events and outbound prompts exchanged with the chat front end.
//!
//! The chat wire format is an external concern: a transport adapter turns
//! chat updates into [`Event`]s and delivers [`Action`]s back to the user.

use crate::builder::engine::BuilderEngine;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::warn;

/// Chat-level user identity. Events for one user are processed in arrival
/// order; different users are independent.
pub type UserId = i64;

/// Slash commands understood by the bot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    Start,
    NewStrategy,
    Done,
    Cancel,
}

/// One inbound conversation event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Event {
    Command(Command),
    Choice { token: String },
    Text { text: String },
}

/// One button in a choice prompt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Choice {
    pub label: String,
    pub token: String,
}

impl Choice {
    /// Button whose label doubles as its callback token.
    pub fn plain(token: impl Into<String>) -> Self {
        let token = token.into();
        Self {
            label: token.clone(),
            token,
        }
    }
}

/// One outbound reply, addressed to the event's user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    SendText { text: String },
    SendChoicePrompt { text: String, choices: Vec<Choice> },
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("delivery to user {user_id} failed: {reason}")]
    Delivery { user_id: UserId, reason: String },
}

/// Outbound side of the chat transport, implemented by the external
/// adapter (chat API client, test recorder, ...).
#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn send_text(&self, user_id: UserId, text: &str) -> Result<(), TransportError>;

    async fn send_choice_prompt(
        &self,
        user_id: UserId,
        text: &str,
        choices: &[Choice],
    ) -> Result<(), TransportError>;
}

/// Routes inbound events into the engine and pushes replies back out.
///
/// Delivery is fire-and-forget: a failed send is logged and the already
/// committed state transition stands.
pub struct Dispatcher<T> {
    engine: Arc<BuilderEngine>,
    transport: T,
}

impl<T: ChatTransport> Dispatcher<T> {
    pub fn new(engine: Arc<BuilderEngine>, transport: T) -> Self {
        Self { engine, transport }
    }

    pub async fn dispatch(&self, user_id: UserId, event: Event) {
        for action in self.engine.handle_event(user_id, event).await {
            let sent = match &action {
                Action::SendText { text } => self.transport.send_text(user_id, text).await,
                Action::SendChoicePrompt { text, choices } => {
                    self.transport.send_choice_prompt(user_id, text, choices).await
                }
            };
            if let Err(error) = sent {
                warn!(user_id, error = %error, "outbound delivery failed");
            }
        }
    }
}
