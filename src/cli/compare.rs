//! `promptbench compare`: one prompt, several models, side by side.

use std::str::FromStr;

use anyhow::Result;
use colored::Colorize;

use crate::compare::{ComparisonOrchestrator, ComparisonSlot, SlotUpdate};
use crate::dispatch::Dispatcher;
use crate::message::Conversation;
use crate::output;
use crate::prompt::PromptState;
use crate::provider::ProviderKind;

/// Parses a `--target provider/model` value. The model keeps any further
/// slashes, so `openrouter/meta-llama/llama-3-8b` targets OpenRouter.
pub(crate) fn parse_target(target: &str) -> Result<(ProviderKind, String)> {
    let Some((prov, model)) = target.trim().split_once('/') else {
        anyhow::bail!("Invalid target '{}': expected <provider>/<model>", target);
    };
    let provider = ProviderKind::from_str(prov)?;
    let model = model.trim();
    anyhow::ensure!(!model.is_empty(), "Invalid target '{}': model is empty", target);
    Ok((provider, model.to_string()))
}

/// One slot per provider that can be called from here, on its first
/// catalog model. Used when no `--target` is given.
pub(crate) fn default_slots(dispatcher: &Dispatcher) -> Vec<ComparisonSlot> {
    ProviderKind::ALL
        .into_iter()
        .filter(|kind| dispatcher.preflight(*kind).is_ok())
        .filter_map(|kind| {
            dispatcher
                .registry()
                .first_model(kind)
                .map(|model| ComparisonSlot::new(kind, model))
        })
        .collect()
}

pub(crate) async fn run_compare(
    dispatcher: &Dispatcher,
    state: &PromptState,
    targets: &[String],
) -> Result<()> {
    let mut slots = if targets.is_empty() {
        default_slots(dispatcher)
    } else {
        targets
            .iter()
            .map(|t| parse_target(t).map(|(provider, model)| ComparisonSlot::new(provider, model)))
            .collect::<Result<Vec<_>>>()?
    };
    anyhow::ensure!(
        !slots.is_empty(),
        "No models to compare. Pass --target <provider>/<model> or configure an API key."
    );

    let conversation = Conversation::playground(
        state.system_prompt.clone(),
        state.user_prompt.clone(),
    );
    let orchestrator = ComparisonOrchestrator::new(dispatcher, state.model_config.clone());
    orchestrator
        .run(
            &conversation,
            None,
            state.response_format,
            &mut slots,
            |update| match update {
                SlotUpdate::Started { indices } => {
                    println!(
                        "{} {} models...",
                        "comparing".bold().cyan(),
                        indices.len()
                    );
                    println!();
                }
                SlotUpdate::Settled { index, slot } => output::print_slot(index, slot),
            },
        )
        .await;

    println!("{}", "summary:".bold());
    for line in output::comparison_summary(&slots) {
        println!("  {line}");
    }
    Ok(())
}
