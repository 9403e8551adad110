//! Model listing and discovery.
//!
//! Displays available models grouped by provider, including the dynamically
//! queried Ollama models. Isolates display concerns from the provider core.

use anyhow::Result;

use super::kind::ProviderKind;
use crate::dispatch::Dispatcher;

/// List models for one provider, or all of them, grouped by provider.
/// `current` is marked as the default when it shows up.
pub async fn list_models(
    dispatcher: &Dispatcher,
    filter: Option<ProviderKind>,
    current: Option<&str>,
) -> Result<()> {
    println!("Available models:");

    let providers: Vec<ProviderKind> = match filter {
        Some(kind) => vec![kind],
        None => ProviderKind::ALL.to_vec(),
    };

    for kind in providers {
        println!(
            "\n  {} ({kind}){}:",
            kind.display_name(),
            provider_note(dispatcher, kind)
        );
        let models = dispatcher.discover_models(kind).await;
        if models.is_empty() {
            if kind.is_local() {
                if dispatcher.registry().is_available(kind) {
                    println!("    (ollama not running or no models -- run `ollama pull llama3`)");
                } else {
                    println!("    (local inference is not reachable from this host)");
                }
            } else {
                println!("    (no models)");
            }
            continue;
        }
        for model in &models {
            let marker = if Some(model.as_str()) == current {
                " (default)"
            } else {
                ""
            };
            println!("    {model}{marker}");
        }
    }

    Ok(())
}

fn provider_note(dispatcher: &Dispatcher, kind: ProviderKind) -> String {
    if !dispatcher.registry().is_available(kind) {
        " [unavailable]".to_string()
    } else if dispatcher.registry().requires_credential(kind) && !dispatcher.credentials().has(kind)
    {
        format!(" [no key: set {}]", kind.env_key())
    } else {
        String::new()
    }
}
