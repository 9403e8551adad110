//! Single-call orchestration.
//!
//! [`Dispatcher::send`] runs one provider call end to end: availability and
//! credential checks (before any I/O), request formatting, exactly one HTTP
//! POST, status handling, and normalization. Nothing is retried or cached;
//! retry policy belongs to the caller.

use std::sync::Arc;
use std::time::Instant;

use serde_json::Value;
use tracing::{debug, warn};

use crate::constants::{GENERIC_OLLAMA_ERROR, GENERIC_PROVIDER_ERROR};
use crate::error::DispatchError;
use crate::message::{Conversation, Message};
use crate::prompt::{ModelConfig, NormalizedResponse, PromptState, ResponseFormat};
use crate::provider::{Credentials, ProviderKind, ProviderRegistry};
use crate::request;
use crate::response;
use crate::transport::{HttpResponse, Transport, TransportError};

/// Sends normalized conversations to providers.
///
/// Holds the provider catalog, a read-only credential snapshot, and the
/// transport. Cheap to share by reference across concurrent calls.
pub struct Dispatcher {
    registry: ProviderRegistry,
    credentials: Arc<Credentials>,
    transport: Arc<dyn Transport>,
}

impl Dispatcher {
    pub fn new(
        registry: ProviderRegistry,
        credentials: Arc<Credentials>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            registry,
            credentials,
            transport,
        }
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Fails fast when `provider` cannot be attempted from here. Returns
    /// the credential to attach, if the provider needs one.
    pub fn preflight(&self, provider: ProviderKind) -> Result<Option<&str>, DispatchError> {
        if !self.registry.is_available(provider) {
            return Err(DispatchError::Unavailable { provider });
        }
        if !self.registry.requires_credential(provider) {
            return Ok(None);
        }
        self.credentials
            .get(provider)
            .map(Some)
            .ok_or(DispatchError::Configuration { provider })
    }

    /// Sends `conversation` with `config`. `system_prompt` is the
    /// workspace-level prompt; it takes precedence over a system message
    /// stored in the conversation.
    pub async fn send(
        &self,
        conversation: &Conversation,
        config: &ModelConfig,
        system_prompt: Option<&str>,
        format: ResponseFormat,
    ) -> Result<NormalizedResponse, DispatchError> {
        let provider = config.provider;
        let credential = self.preflight(provider)?;

        let started = Instant::now();
        let endpoint = self.registry.endpoint(provider);
        let request = request::format_request(
            &endpoint,
            conversation,
            system_prompt,
            config,
            format,
            credential,
        );

        debug!(
            provider = %provider,
            model = %config.model,
            messages = conversation.message_count(),
            "dispatching request"
        );

        let reply = self
            .transport
            .post_json(&request)
            .await
            .map_err(|err| transport_failure(provider, err))?;

        if !reply.is_success() {
            let err = upstream_failure(provider, &reply);
            warn!(provider = %provider, status = reply.status, "provider returned an error");
            return Err(err);
        }

        let raw: Value = serde_json::from_str(&reply.body).map_err(|e| DispatchError::Provider {
            provider,
            status: Some(reply.status),
            message: format!("response was not valid JSON: {e}"),
        })?;
        let elapsed = started.elapsed();
        let normalized = response::normalize(&raw, provider, &config.model, elapsed, format)?;

        debug!(
            provider = %provider,
            model = %config.model,
            status = reply.status,
            elapsed_ms = elapsed.as_millis() as u64,
            total_tokens = normalized.token_usage.total_tokens,
            "request completed"
        );
        Ok(normalized)
    }

    /// Playground send: the prompt pair, settings and format all come from
    /// `prompt`.
    pub async fn send_prompt(
        &self,
        prompt: &PromptState,
    ) -> Result<NormalizedResponse, DispatchError> {
        let conversation = Conversation::playground(
            prompt.system_prompt.clone(),
            prompt.user_prompt.clone(),
        );
        self.send(&conversation, &prompt.model_config, None, prompt.response_format)
            .await
    }

    /// Chat-thread send. Chat answers are always rendered as markdown.
    pub async fn send_chat(
        &self,
        messages: &[Message],
        config: &ModelConfig,
        system_prompt: Option<&str>,
    ) -> Result<NormalizedResponse, DispatchError> {
        let conversation = Conversation::Thread(messages.to_vec());
        self.send(&conversation, config, system_prompt, ResponseFormat::Markdown)
            .await
    }

    /// Models a provider offers right now.
    ///
    /// Ollama is asked via `GET /api/tags`; if it is not local or not
    /// reachable the list is empty rather than a guessed fallback.
    /// OpenRouter includes the user's custom ids.
    pub async fn discover_models(&self, provider: ProviderKind) -> Vec<String> {
        match provider {
            ProviderKind::Ollama => self.ollama_models().await,
            ProviderKind::OpenRouter => self.registry.openrouter_models(),
            other => self
                .registry
                .available_models(other)
                .iter()
                .map(|m| m.to_string())
                .collect(),
        }
    }

    async fn ollama_models(&self) -> Vec<String> {
        if !self.registry.is_available(ProviderKind::Ollama) {
            return Vec::new();
        }
        let url = self.registry.ollama_tags_url();
        let reply = match self.transport.get(&url).await {
            Ok(reply) if reply.is_success() => reply,
            Ok(reply) => {
                warn!(status = reply.status, "could not list Ollama models");
                return Vec::new();
            }
            Err(err) => {
                warn!(error = %err, "could not reach Ollama");
                return Vec::new();
            }
        };
        serde_json::from_str::<Value>(&reply.body)
            .map(|tags| parse_ollama_tags(&tags))
            .unwrap_or_else(|err| {
                warn!(error = %err, "Ollama returned an unreadable model list");
                Vec::new()
            })
    }
}

/// Model names from an Ollama `/api/tags` body.
fn parse_ollama_tags(tags: &Value) -> Vec<String> {
    tags["models"]
        .as_array()
        .map(|models| {
            models
                .iter()
                .filter_map(|m| m["name"].as_str().map(String::from))
                .collect()
        })
        .unwrap_or_default()
}

fn transport_failure(provider: ProviderKind, err: TransportError) -> DispatchError {
    warn!(provider = %provider, error = %err, "request failed before a response arrived");
    match err {
        TransportError::Network(message) => DispatchError::Network { provider, message },
        TransportError::Other(message) => DispatchError::Unknown { provider, message },
    }
}

/// Maps a non-2xx reply to [`DispatchError::Provider`], preferring the
/// upstream's own message when the body parses.
fn upstream_failure(provider: ProviderKind, reply: &HttpResponse) -> DispatchError {
    let parsed = serde_json::from_str::<Value>(&reply.body)
        .ok()
        .and_then(|body| upstream_message(&body));
    let message = parsed.unwrap_or_else(|| {
        if provider.is_local() {
            GENERIC_OLLAMA_ERROR.to_string()
        } else {
            GENERIC_PROVIDER_ERROR.to_string()
        }
    });
    DispatchError::Provider {
        provider,
        status: Some(reply.status),
        message,
    }
}

/// `{"error": {"message": ..}}` (OpenAI style), `{"error": ".."}` (Ollama
/// style), or a top-level `{"message": ..}`.
fn upstream_message(body: &Value) -> Option<String> {
    let text = body["error"]["message"]
        .as_str()
        .or_else(|| body["error"].as_str())
        .or_else(|| body["message"].as_str())?;
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}
