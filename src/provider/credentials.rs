//! Per-provider API keys.
//!
//! [`Credentials`] is an immutable snapshot handed to the
//! [`Dispatcher`](crate::dispatch::Dispatcher). It is built once by the
//! config layer and only read afterwards.

use std::collections::HashMap;
use std::fmt;

use super::kind::ProviderKind;

/// Read-only set of provider secrets.
#[derive(Clone, Default)]
pub struct Credentials {
    keys: HashMap<ProviderKind, String>,
}

impl Credentials {
    /// Returns the key for `provider`, treating blank keys as absent.
    pub fn get(&self, provider: ProviderKind) -> Option<&str> {
        self.keys
            .get(&provider)
            .map(|key| key.trim())
            .filter(|key| !key.is_empty())
    }

    pub fn has(&self, provider: ProviderKind) -> bool {
        self.get(provider).is_some()
    }
}

impl FromIterator<(ProviderKind, String)> for Credentials {
    fn from_iter<I: IntoIterator<Item = (ProviderKind, String)>>(iter: I) -> Self {
        Self {
            keys: iter.into_iter().collect(),
        }
    }
}

// Keys never reach logs or panic messages.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut configured: Vec<&str> = self
            .keys
            .keys()
            .filter(|kind| self.has(**kind))
            .map(|kind| kind.as_str())
            .collect();
        configured.sort_unstable();
        f.debug_struct("Credentials")
            .field("configured", &configured)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_keys_count_as_missing() {
        let creds: Credentials = [
            (ProviderKind::OpenAI, "sk-live".to_string()),
            (ProviderKind::Grok, "   ".to_string()),
        ]
        .into_iter()
        .collect();
        assert_eq!(creds.get(ProviderKind::OpenAI), Some("sk-live"));
        assert!(!creds.has(ProviderKind::Grok));
        assert!(!creds.has(ProviderKind::Qwen));
    }

    #[test]
    fn debug_output_redacts_secrets() {
        let creds: Credentials = [(ProviderKind::OpenAI, "sk-secret".to_string())]
            .into_iter()
            .collect();
        let rendered = format!("{creds:?}");
        assert!(rendered.contains("openai"));
        assert!(!rendered.contains("sk-secret"));
    }
}
