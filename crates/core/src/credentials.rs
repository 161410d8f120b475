//! Credentials resolution capability.
//!
//! API keys are an explicit capability passed into the dispatcher rather
//! than ambient `std::env` reads scattered through provider code. The
//! production implementation reads the process environment; tests substitute
//! a map.

use crate::agent::Provider;

/// Resolves the API key for a provider at call time.
pub trait CredentialsProvider: Send + Sync {
    /// The key for `provider`, or `None` if unconfigured. Absence is a
    /// fatal configuration error for the request — the dispatcher raises
    /// it before any HTTP call.
    fn api_key(&self, provider: Provider) -> Option<String>;
}

/// A fixed credential set, for tests and embedded use.
#[derive(Debug, Default, Clone)]
pub struct StaticCredentials {
    openai: Option<String>,
    anthropic: Option<String>,
}

impl StaticCredentials {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_key(mut self, provider: Provider, key: impl Into<String>) -> Self {
        match provider {
            Provider::OpenAi => self.openai = Some(key.into()),
            Provider::Anthropic => self.anthropic = Some(key.into()),
        }
        self
    }
}

impl CredentialsProvider for StaticCredentials {
    fn api_key(&self, provider: Provider) -> Option<String> {
        match provider {
            Provider::OpenAi => self.openai.clone(),
            Provider::Anthropic => self.anthropic.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_credentials_resolve_per_provider() {
        let creds = StaticCredentials::new().with_key(Provider::OpenAi, "sk-test");
        assert_eq!(creds.api_key(Provider::OpenAi).as_deref(), Some("sk-test"));
        assert!(creds.api_key(Provider::Anthropic).is_none());
    }
}
