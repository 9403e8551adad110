//! Side-by-side comparison of one prompt across several models.
//!
//! A [`ComparisonSlot`] is one (provider, model) column with its own
//! lifecycle. [`ComparisonOrchestrator::run`] fans the same conversation out
//! to every eligible slot concurrently and settles each slot on its own:
//! one failing provider never touches another slot's state.

use futures::stream::{FuturesUnordered, StreamExt};
use serde::Serialize;
use tracing::debug;

use crate::dispatch::Dispatcher;
use crate::error::DispatchError;
use crate::message::Conversation;
use crate::prompt::{ModelConfig, NormalizedResponse, ResponseFormat};
use crate::provider::ProviderKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SlotStatus {
    Unset,
    Ready,
    Loading,
    Success,
    Error,
}

/// One column of a comparison.
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonSlot {
    pub provider: Option<ProviderKind>,
    pub model: Option<String>,
    pub status: SlotStatus,
    pub response: Option<NormalizedResponse>,
    pub error: Option<String>,
}

impl Default for ComparisonSlot {
    fn default() -> Self {
        Self {
            provider: None,
            model: None,
            status: SlotStatus::Unset,
            response: None,
            error: None,
        }
    }
}

impl ComparisonSlot {
    /// A slot with provider and model already chosen.
    pub fn new(provider: ProviderKind, model: impl Into<String>) -> Self {
        let mut slot = Self::default();
        slot.assign(Some(provider), Some(model.into()));
        slot
    }

    /// Edits the slot's target. Any previous result is discarded; the slot
    /// is `Ready` once both halves are set, `Unset` otherwise.
    pub fn assign(&mut self, provider: Option<ProviderKind>, model: Option<String>) {
        self.provider = provider;
        self.model = model.filter(|m| !m.trim().is_empty());
        self.response = None;
        self.error = None;
        self.status = if self.target().is_some() {
            SlotStatus::Ready
        } else {
            SlotStatus::Unset
        };
    }

    pub fn target(&self) -> Option<(ProviderKind, &str)> {
        match (self.provider, self.model.as_deref()) {
            (Some(provider), Some(model)) if !model.trim().is_empty() => Some((provider, model)),
            _ => None,
        }
    }

    fn mark_loading(&mut self) {
        self.status = SlotStatus::Loading;
        self.response = None;
        self.error = None;
    }

    fn settle(&mut self, outcome: Result<NormalizedResponse, DispatchError>) {
        match outcome {
            Ok(response) => {
                self.status = SlotStatus::Success;
                self.response = Some(response);
                self.error = None;
            }
            Err(err) => {
                self.status = SlotStatus::Error;
                self.response = None;
                self.error = Some(err.to_string());
            }
        }
    }
}

/// Progress notifications emitted while a comparison runs. Always keyed by
/// slot index; completions arrive in no particular order.
#[derive(Debug)]
pub enum SlotUpdate<'a> {
    /// Every listed slot has just been marked `Loading`, before any request
    /// was issued.
    Started { indices: &'a [usize] },
    /// One slot reached `Success` or `Error`.
    Settled { index: usize, slot: &'a ComparisonSlot },
}

/// Runs a comparison through a shared [`Dispatcher`].
pub struct ComparisonOrchestrator<'a> {
    dispatcher: &'a Dispatcher,
    template: ModelConfig,
}

impl<'a> ComparisonOrchestrator<'a> {
    /// `template` supplies temperature and token limit for every slot;
    /// provider and model come from each slot.
    pub fn new(dispatcher: &'a Dispatcher, template: ModelConfig) -> Self {
        Self {
            dispatcher,
            template,
        }
    }

    /// Dispatches `conversation` to every slot with both provider and model
    /// set, and waits until all of them have settled.
    ///
    /// Slots without a target are left untouched; with none eligible this
    /// is a no-op.
    pub async fn run(
        &self,
        conversation: &Conversation,
        system_prompt: Option<&str>,
        format: ResponseFormat,
        slots: &mut [ComparisonSlot],
        mut on_update: impl FnMut(SlotUpdate<'_>),
    ) {
        let eligible: Vec<(usize, ModelConfig)> = slots
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| {
                slot.target().map(|(provider, model)| {
                    let config = ModelConfig {
                        provider,
                        model: model.to_string(),
                        temperature: self.template.temperature,
                        max_tokens: self.template.max_tokens,
                    };
                    (index, config)
                })
            })
            .collect();
        if eligible.is_empty() {
            return;
        }

        let indices: Vec<usize> = eligible.iter().map(|(index, _)| *index).collect();
        for &index in &indices {
            slots[index].mark_loading();
        }
        on_update(SlotUpdate::Started { indices: &indices });

        let dispatcher = self.dispatcher;
        let mut pending: FuturesUnordered<_> = eligible
            .into_iter()
            .map(|(index, config)| async move {
                let outcome = dispatcher
                    .send(conversation, &config, system_prompt, format)
                    .await;
                (index, outcome)
            })
            .collect();

        while let Some((index, outcome)) = pending.next().await {
            debug!(slot = index, ok = outcome.is_ok(), "comparison slot settled");
            slots[index].settle(outcome);
            on_update(SlotUpdate::Settled {
                index,
                slot: &slots[index],
            });
        }
    }
}
