//! Terminal rendering for promptbench.
//!
//! Responses are shown according to their [`ResponseFormat`]: markdown gets
//! a markdown-lite pass (bold, inline code, fenced blocks, headings), JSON is
//! pretty-printed when it parses and shown verbatim when it does not. Every
//! response ends with a dimmed footer carrying usage and latency.

use colored::Colorize;

use crate::compare::{ComparisonSlot, SlotStatus};
use crate::error::DispatchError;
use crate::message::{Message, Role};
use crate::prompt::{NormalizedResponse, ResponseFormat};

/// Format a thread message for terminal display with role label and colors.
pub fn format_message(msg: &Message) -> String {
    let label = match msg.role {
        Role::User => format!("{}", "you:".green().bold()),
        Role::Assistant => {
            let who = msg.model.as_deref().unwrap_or("assistant");
            format!("{}", format!("{who}:").cyan().bold())
        }
        Role::System => format!("{}", "system:".dimmed()),
    };
    let body = match msg.role {
        Role::User => msg.content.clone(),
        Role::Assistant => render_markdown_lite(&msg.content),
        Role::System => msg.content.dimmed().to_string(),
    };
    format!("{}\n{}", label, body)
}

/// Body text for a response in its requested format.
pub fn render_content(content: &str, format: ResponseFormat) -> String {
    match format {
        ResponseFormat::Markdown => render_markdown_lite(content),
        ResponseFormat::Json => pretty_json(content),
    }
}

/// Pretty-prints `content` if it is valid JSON, otherwise returns it as is.
pub fn pretty_json(content: &str) -> String {
    serde_json::from_str::<serde_json::Value>(content.trim())
        .ok()
        .and_then(|value| serde_json::to_string_pretty(&value).ok())
        .unwrap_or_else(|| content.to_string())
}

/// `[42 tokens (12 in, 30 out) | 1.23s | openai/gpt-4o]`
pub fn response_footer(response: &NormalizedResponse) -> String {
    let usage = &response.token_usage;
    format!(
        "[{} tokens ({} in, {} out) | {:.2}s | {}/{}]",
        usage.total_tokens,
        usage.prompt_tokens,
        usage.completion_tokens,
        response.response_time,
        response.provider,
        response.model,
    )
}

pub fn print_response(response: &NormalizedResponse) {
    println!("{}", render_content(&response.content, response.format));
    println!();
    println!("{}", response_footer(response).dimmed());
}

pub fn print_error(err: &DispatchError) {
    eprintln!("{} {}", "error:".red().bold(), err);
    if let Some(hint) = err.hint() {
        eprintln!("{} {}", "hint:".yellow(), hint);
    }
}

fn slot_label(index: usize, slot: &ComparisonSlot) -> String {
    match slot.target() {
        Some((provider, model)) => format!("#{} {provider}/{model}", index + 1),
        None => format!("#{} (unset)", index + 1),
    }
}

/// Prints one settled comparison slot.
pub fn print_slot(index: usize, slot: &ComparisonSlot) {
    let label = slot_label(index, slot);
    match (&slot.status, &slot.response, &slot.error) {
        (SlotStatus::Success, Some(response), _) => {
            println!("{}", format!("── {label} ").cyan().bold());
            print_response(response);
        }
        (SlotStatus::Error, _, Some(error)) => {
            println!("{}", format!("── {label} ").red().bold());
            println!("{} {}", "error:".red(), error);
        }
        _ => println!("{}", format!("── {label} [{:?}]", slot.status).dimmed()),
    }
    println!();
}

/// One line per slot after a comparison completes.
pub fn comparison_summary(slots: &[ComparisonSlot]) -> Vec<String> {
    slots
        .iter()
        .enumerate()
        .map(|(index, slot)| {
            let label = slot_label(index, slot);
            match (&slot.status, &slot.response) {
                (SlotStatus::Success, Some(r)) => format!(
                    "{label}: ok, {} tokens, {:.2}s",
                    r.token_usage.total_tokens, r.response_time
                ),
                (SlotStatus::Error, _) => format!("{label}: failed"),
                (status, _) => format!("{label}: {}", format!("{status:?}").to_lowercase()),
            }
        })
        .collect()
}

/// Minimal markdown renderer for terminal output.
/// Not a full parser. Handles the patterns most common in LLM output:
/// headings, bold, inline code and fenced code blocks.
pub fn render_markdown_lite(text: &str) -> String {
    let mut output = String::new();
    let mut in_code_block = false;

    for line in text.lines() {
        if let Some(fence) = line.trim_start().strip_prefix("```") {
            in_code_block = !in_code_block;
            let lang = fence.trim();
            if in_code_block && !lang.is_empty() {
                output.push_str(&format!("  {}\n", lang.dimmed()));
            } else if !in_code_block {
                output.push('\n');
            }
            continue;
        }

        if in_code_block {
            output.push_str(&format!("  {}\n", line.dimmed()));
            continue;
        }

        let heading = line.trim_start_matches('#');
        if heading.len() < line.len() && heading.starts_with(' ') {
            output.push_str(&heading.trim().bold().underline().to_string());
        } else {
            output.push_str(&render_inline(line));
        }
        output.push('\n');
    }

    if output.ends_with('\n') {
        output.pop();
    }
    output
}

/// Handle **bold** and `inline code` within a single line.
fn render_inline(line: &str) -> String {
    let mut result = String::new();
    let mut rest = line;

    while !rest.is_empty() {
        if let Some(after) = rest.strip_prefix("**") {
            if let Some(end) = after.find("**") {
                result.push_str(&after[..end].bold().to_string());
                rest = &after[end + 2..];
                continue;
            }
        }
        if let Some(after) = rest.strip_prefix('`') {
            if let Some(end) = after.find('`') {
                result.push_str(&after[..end].dimmed().to_string());
                rest = &after[end + 1..];
                continue;
            }
        }
        let mut chars = rest.chars();
        if let Some(c) = chars.next() {
            result.push(c);
        }
        rest = chars.as_str();
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::TokenUsage;
    use crate::provider::ProviderKind;

    fn plain() {
        colored::control::set_override(false);
    }

    fn response(content: &str, format: ResponseFormat) -> NormalizedResponse {
        NormalizedResponse {
            content: content.into(),
            format,
            timestamp: 0,
            provider: ProviderKind::OpenAI,
            model: "gpt-4o".into(),
            token_usage: TokenUsage::from_counts(12, 30),
            response_time: 1.234,
        }
    }

    #[test]
    fn json_is_pretty_printed() {
        assert_eq!(pretty_json("{\"a\":1}"), "{\n  \"a\": 1\n}");
    }

    #[test]
    fn invalid_json_falls_back_to_raw_text() {
        assert_eq!(pretty_json("not { json"), "not { json");
        assert_eq!(
            render_content("still not json", ResponseFormat::Json),
            "still not json"
        );
    }

    #[test]
    fn markdown_strips_markers() {
        plain();
        let rendered =
            render_markdown_lite("# Title\nsome **bold** and `code`\n```rust\nlet x = 1;\n```");
        assert!(rendered.contains("Title"));
        assert!(!rendered.contains('#'));
        assert!(rendered.contains("some bold and code"));
        assert!(rendered.contains("  rust"));
        assert!(rendered.contains("  let x = 1;"));
        assert!(!rendered.contains("```"));
    }

    #[test]
    fn unclosed_markers_are_kept() {
        plain();
        assert_eq!(render_markdown_lite("a ** b ` c"), "a ** b ` c");
        assert_eq!(render_markdown_lite("héllo **wörld**"), "héllo wörld");
    }

    #[test]
    fn footer_reports_usage_and_time() {
        let footer = response_footer(&response("x", ResponseFormat::Markdown));
        assert_eq!(footer, "[42 tokens (12 in, 30 out) | 1.23s | openai/gpt-4o]");
    }

    #[test]
    fn summary_has_one_line_per_slot() {
        let mut ok = ComparisonSlot::new(ProviderKind::OpenAI, "gpt-4o");
        ok.status = SlotStatus::Success;
        ok.response = Some(response("x", ResponseFormat::Markdown));
        let mut failed = ComparisonSlot::new(ProviderKind::Grok, "grok-3");
        failed.status = SlotStatus::Error;
        failed.error = Some("boom".into());
        let unset = ComparisonSlot::default();

        let lines = comparison_summary(&[ok, failed, unset]);
        assert_eq!(lines[0], "#1 openai/gpt-4o: ok, 42 tokens, 1.23s");
        assert_eq!(lines[1], "#2 grok/grok-3: failed");
        assert_eq!(lines[2], "#3 (unset): unset");
    }

    #[test]
    fn assistant_messages_are_labelled_with_model() {
        plain();
        let mut msg = Message::assistant("**hi**");
        msg.model = Some("sonar".into());
        assert_eq!(format_message(&msg), "sonar:\nhi");
    }
}
