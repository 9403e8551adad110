//! Conversation types for promptbench.
//!
//! Provides the chat-thread [`Message`] with its [`Role`], and the
//! [`Conversation`] unit the request formatter consumes: either a single
//! playground prompt or an ordered thread of messages.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::prompt::{NormalizedResponse, TokenUsage};
use crate::provider::ProviderKind;

/// The role of a message sender in the conversation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// A single message in a chat thread.
///
/// Assistant messages record which provider and model produced them along
/// with the usage and latency of that call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub role: Role,
    pub content: String,
    /// Unix epoch milliseconds.
    pub timestamp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<ProviderKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_usage: Option<TokenUsage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_time: Option<f64>,
}

impl Message {
    fn with_role(role: Role, text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role,
            content: text.into(),
            timestamp: Utc::now().timestamp_millis(),
            provider: None,
            model: None,
            token_usage: None,
            response_time: None,
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::with_role(Role::User, text)
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self::with_role(Role::Assistant, text)
    }

    /// Assistant message carrying a call's provider, model, usage and latency.
    pub fn from_response(response: &NormalizedResponse) -> Self {
        Self {
            provider: Some(response.provider),
            model: Some(response.model.clone()),
            token_usage: Some(response.token_usage),
            response_time: Some(response.response_time),
            ..Self::assistant(response.content.clone())
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::System => write!(f, "system"),
            Role::User => write!(f, "you"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

/// What gets sent to a provider.
#[derive(Debug, Clone, PartialEq)]
pub enum Conversation {
    /// Playground mode: one system/user prompt pair. An empty system
    /// prompt means "none".
    Playground {
        system_prompt: String,
        user_prompt: String,
    },
    /// Chat-thread mode: messages in stored order.
    Thread(Vec<Message>),
}

impl Conversation {
    pub fn playground(system_prompt: impl Into<String>, user_prompt: impl Into<String>) -> Self {
        Self::Playground {
            system_prompt: system_prompt.into(),
            user_prompt: user_prompt.into(),
        }
    }

    /// `(role, content)` turns in stored order, system turns included.
    pub fn turns(&self) -> Vec<(Role, &str)> {
        match self {
            Self::Playground {
                system_prompt,
                user_prompt,
            } => {
                let mut turns = Vec::with_capacity(2);
                if !system_prompt.trim().is_empty() {
                    turns.push((Role::System, system_prompt.as_str()));
                }
                turns.push((Role::User, user_prompt.as_str()));
                turns
            }
            Self::Thread(messages) => messages
                .iter()
                .map(|m| (m.role, m.content.as_str()))
                .collect(),
        }
    }

    pub fn message_count(&self) -> usize {
        self.turns().len()
    }
}
