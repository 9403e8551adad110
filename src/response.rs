//! Provider response normalization.
//!
//! Reads a successful provider body and produces a [`NormalizedResponse`].
//! Provider and model are echoed from the request rather than taken from
//! the body, since not every API echoes them back.

use std::time::Duration;

use chrono::Utc;
use serde::Deserialize;
use serde_json::Value;

use crate::error::DispatchError;
use crate::prompt::{NormalizedResponse, ResponseFormat, TokenUsage};
use crate::provider::ProviderKind;

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    #[serde(default)]
    message: Option<ChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    #[serde(default)]
    prompt_tokens: Option<u64>,
    #[serde(default)]
    completion_tokens: Option<u64>,
    #[serde(default)]
    total_tokens: Option<u64>,
}

impl From<Usage> for TokenUsage {
    fn from(usage: Usage) -> Self {
        match (usage.prompt_tokens, usage.completion_tokens) {
            (None, None) => TokenUsage {
                total_tokens: usage.total_tokens.unwrap_or(0),
                ..TokenUsage::default()
            },
            (prompt, completion) => {
                TokenUsage::from_counts(prompt.unwrap_or(0), completion.unwrap_or(0))
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct OllamaChatResponse {
    #[serde(default)]
    message: Option<ChoiceMessage>,
    #[serde(default)]
    prompt_eval_count: Option<u64>,
    #[serde(default)]
    eval_count: Option<u64>,
}

fn malformed(provider: ProviderKind, reason: impl Into<String>) -> DispatchError {
    DispatchError::Provider {
        provider,
        status: None,
        message: reason.into(),
    }
}

/// Extracts content and usage from a success body.
///
/// For OpenAI-compatible providers a missing `choices[0].message` is a
/// broken provider contract and surfaces as [`DispatchError::Provider`].
/// A `null` content (e.g. a refusal) reads as an empty string. Absent usage
/// always yields explicit zeros.
pub fn normalize(
    raw: &Value,
    provider: ProviderKind,
    model: &str,
    elapsed: Duration,
    format: ResponseFormat,
) -> Result<NormalizedResponse, DispatchError> {
    let (content, token_usage) = if provider.is_local() {
        let body = OllamaChatResponse::deserialize(raw)
            .map_err(|e| malformed(provider, format!("unreadable response: {e}")))?;
        let content = body.message.and_then(|m| m.content).unwrap_or_default();
        let usage = TokenUsage::from_counts(
            body.prompt_eval_count.unwrap_or(0),
            body.eval_count.unwrap_or(0),
        );
        (content, usage)
    } else {
        let body = ChatCompletionResponse::deserialize(raw)
            .map_err(|e| malformed(provider, format!("unreadable response: {e}")))?;
        let message = body
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .ok_or_else(|| malformed(provider, "response has no choices[0].message"))?;
        let usage = body.usage.map(TokenUsage::from).unwrap_or_default();
        (message.content.unwrap_or_default(), usage)
    };

    Ok(NormalizedResponse {
        content,
        format,
        timestamp: Utc::now().timestamp_millis(),
        provider,
        model: model.to_string(),
        token_usage,
        response_time: elapsed.as_secs_f64(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const ELAPSED: Duration = Duration::from_millis(1500);

    fn openai(raw: Value) -> Result<NormalizedResponse, DispatchError> {
        normalize(&raw, ProviderKind::OpenAI, "gpt-4o", ELAPSED, ResponseFormat::Markdown)
    }

    #[test]
    fn maps_reported_usage() {
        let resp = openai(json!({
            "choices": [{"message": {"role": "assistant", "content": "hi"}}],
            "usage": {"prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15}
        }))
        .unwrap();
        assert_eq!(resp.token_usage, TokenUsage {
            prompt_tokens: 10,
            completion_tokens: 5,
            total_tokens: 15,
        });
        assert_eq!(resp.response_time, 1.5);
    }

    #[test]
    fn missing_usage_yields_zeros() {
        let resp = openai(json!({"choices": [{"message": {"content": "hi"}}]})).unwrap();
        assert_eq!(resp.token_usage, TokenUsage::default());
    }

    #[test]
    fn scenario_two_plus_two() {
        let resp = openai(json!({
            "choices": [{"message": {"content": "4"}}],
            "usage": {"prompt_tokens": 8, "completion_tokens": 1, "total_tokens": 9}
        }))
        .unwrap();
        assert_eq!(resp.content, "4");
        assert_eq!(resp.token_usage, TokenUsage::from_counts(8, 1));
        assert_eq!(resp.provider, ProviderKind::OpenAI);
        assert_eq!(resp.model, "gpt-4o");
    }

    #[test]
    fn echoes_requested_model_not_upstream_one() {
        let resp = openai(json!({
            "model": "gpt-4o-2024-08-06",
            "choices": [{"message": {"content": "x"}}]
        }))
        .unwrap();
        assert_eq!(resp.model, "gpt-4o");
    }

    #[test]
    fn total_only_usage_is_kept() {
        let resp = openai(json!({
            "choices": [{"message": {"content": "x"}}],
            "usage": {"total_tokens": 7}
        }))
        .unwrap();
        assert_eq!(resp.token_usage.total_tokens, 7);
        assert_eq!(resp.token_usage.prompt_tokens, 0);
    }

    #[test]
    fn normalizing_twice_differs_only_in_timestamp() {
        let raw = json!({
            "choices": [{"message": {"content": "same"}}],
            "usage": {"prompt_tokens": 3, "completion_tokens": 4, "total_tokens": 7}
        });
        let first = openai(raw.clone()).unwrap();
        let mut second = openai(raw).unwrap();
        second.timestamp = first.timestamp;
        assert_eq!(first, second);
    }

    #[test]
    fn missing_choices_is_a_provider_error() {
        let err = openai(json!({"object": "chat.completion"})).unwrap_err();
        assert!(matches!(err, DispatchError::Provider { status: None, .. }));
        let err = openai(json!({"choices": "nope"})).unwrap_err();
        assert!(matches!(err, DispatchError::Provider { .. }));
    }

    #[test]
    fn null_content_reads_as_empty() {
        let resp = openai(json!({"choices": [{"message": {"content": null}}]})).unwrap();
        assert_eq!(resp.content, "");
    }

    #[test]
    fn ollama_counts_become_usage() {
        let resp = normalize(
            &json!({
                "model": "llama3",
                "message": {"role": "assistant", "content": "hello"},
                "done": true,
                "prompt_eval_count": 26,
                "eval_count": 290
            }),
            ProviderKind::Ollama,
            "llama3",
            ELAPSED,
            ResponseFormat::Json,
        )
        .unwrap();
        assert_eq!(resp.content, "hello");
        assert_eq!(resp.format, ResponseFormat::Json);
        assert_eq!(resp.token_usage, TokenUsage::from_counts(26, 290));
    }

    #[test]
    fn ollama_without_message_or_counts_is_empty_and_zero() {
        let resp = normalize(
            &json!({"done": true}),
            ProviderKind::Ollama,
            "llama3",
            ELAPSED,
            ResponseFormat::Markdown,
        )
        .unwrap();
        assert_eq!(resp.content, "");
        assert_eq!(resp.token_usage, TokenUsage::default());
    }
}
