//! Provider-specific request building.
//!
//! Turns a [`Conversation`] plus [`ModelConfig`] into the body and headers a
//! provider expects. Two dialects exist: the OpenAI-compatible chat
//! completions body used by every cloud provider, and Ollama's native
//! `/api/chat` body. Everything here is a pure transform.

use std::fmt;

use serde::Serialize;

use crate::message::{Conversation, Role};
use crate::prompt::{ModelConfig, ResponseFormat};
use crate::provider::{Endpoint, ProviderKind};

/// One message on the wire.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WireMessage {
    pub role: Role,
    pub content: String,
}

/// Output-token cap, under whichever field name the model expects.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum TokenLimit {
    #[serde(rename = "max_tokens")]
    MaxTokens(u32),
    #[serde(rename = "max_completion_tokens")]
    MaxCompletionTokens(u32),
}

/// `response_format` hint for OpenAI-compatible providers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ResponseFormatHint {
    #[serde(rename = "type")]
    pub kind: &'static str,
}

/// OpenAI-compatible chat completions body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatCompletionBody {
    pub model: String,
    pub temperature: f64,
    pub messages: Vec<WireMessage>,
    #[serde(flatten)]
    pub token_limit: TokenLimit,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_format: Option<ResponseFormatHint>,
}

/// Generation options in Ollama's dialect.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OllamaOptions {
    pub temperature: f64,
    pub num_predict: u32,
}

/// Ollama `/api/chat` body. Streaming is always off.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OllamaChatBody {
    pub model: String,
    pub messages: Vec<WireMessage>,
    pub stream: bool,
    pub options: OllamaOptions,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RequestBody {
    ChatCompletion(ChatCompletionBody),
    Ollama(OllamaChatBody),
}

/// A fully built request, ready for a [`Transport`](crate::transport::Transport).
#[derive(Clone, PartialEq)]
pub struct FormattedRequest {
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: RequestBody,
}

impl FormattedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

impl fmt::Debug for FormattedRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let headers: Vec<(&str, &str)> = self
            .headers
            .iter()
            .map(|(key, value)| {
                if key.eq_ignore_ascii_case("authorization") {
                    (key.as_str(), "<redacted>")
                } else {
                    (key.as_str(), value.as_str())
                }
            })
            .collect();
        f.debug_struct("FormattedRequest")
            .field("url", &self.url)
            .field("headers", &headers)
            .field("body", &self.body)
            .finish()
    }
}

/// OpenAI's newer model families reject `max_tokens` and want
/// `max_completion_tokens`. Applies to the `openai` provider only.
pub fn uses_completion_token_field(provider: ProviderKind, model: &str) -> bool {
    provider == ProviderKind::OpenAI && (model.contains("gpt-5") || model.contains("o1"))
}

/// Ordered wire messages: at most one system message first, then the
/// remaining turns in stored order.
///
/// A non-blank `system_prompt` (workspace level) wins over a system message
/// stored inside the conversation. Inline system messages are never
/// forwarded in place, so the system prompt appears exactly once.
pub fn ordered_messages(
    conversation: &Conversation,
    system_prompt: Option<&str>,
) -> Vec<WireMessage> {
    let turns = conversation.turns();
    let inline_system = turns
        .iter()
        .find(|(role, content)| *role == Role::System && !content.trim().is_empty())
        .map(|(_, content)| *content);
    let system = system_prompt
        .filter(|sp| !sp.trim().is_empty())
        .or(inline_system);

    let mut messages = Vec::with_capacity(turns.len() + 1);
    if let Some(content) = system {
        messages.push(WireMessage {
            role: Role::System,
            content: content.to_string(),
        });
    }
    messages.extend(
        turns
            .into_iter()
            .filter(|(role, _)| *role != Role::System)
            .map(|(role, content)| WireMessage {
                role,
                content: content.to_string(),
            }),
    );
    messages
}

/// Builds the provider-specific body.
pub fn build_body(
    conversation: &Conversation,
    system_prompt: Option<&str>,
    config: &ModelConfig,
    format: ResponseFormat,
) -> RequestBody {
    let messages = ordered_messages(conversation, system_prompt);

    if config.provider.is_local() {
        // No JSON-mode equivalent; the format hint is advisory here.
        return RequestBody::Ollama(OllamaChatBody {
            model: config.model.clone(),
            messages,
            stream: false,
            options: OllamaOptions {
                temperature: config.temperature,
                num_predict: config.max_tokens,
            },
        });
    }

    let token_limit = if uses_completion_token_field(config.provider, &config.model) {
        TokenLimit::MaxCompletionTokens(config.max_tokens)
    } else {
        TokenLimit::MaxTokens(config.max_tokens)
    };
    let response_format = match format {
        ResponseFormat::Json => Some(ResponseFormatHint { kind: "json_object" }),
        ResponseFormat::Markdown => None,
    };

    RequestBody::ChatCompletion(ChatCompletionBody {
        model: config.model.clone(),
        temperature: config.temperature,
        messages,
        token_limit,
        response_format,
    })
}

/// Builds the full request for `endpoint`. `credential` is only attached
/// when the endpoint's header rule calls for one.
pub fn format_request(
    endpoint: &Endpoint,
    conversation: &Conversation,
    system_prompt: Option<&str>,
    config: &ModelConfig,
    format: ResponseFormat,
    credential: Option<&str>,
) -> FormattedRequest {
    FormattedRequest {
        url: endpoint.url.clone(),
        headers: endpoint.header_rule.build(credential),
        body: build_body(conversation, system_prompt, config, format),
    }
}
