//! Process-environment credentials source.

use notus_core::{CredentialsProvider, Provider};

/// Resolves API keys from the process environment at call time:
/// `OPENAI_API_KEY` and `ANTHROPIC_API_KEY`.
#[derive(Debug, Default, Clone)]
pub struct EnvCredentials;

impl EnvCredentials {
    pub fn new() -> Self {
        Self
    }
}

impl CredentialsProvider for EnvCredentials {
    fn api_key(&self, provider: Provider) -> Option<String> {
        std::env::var(provider.env_var())
            .ok()
            .filter(|key| !key.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_the_provider_env_var() {
        // Set/clear env is process-global; use a throwaway var path by
        // checking the mapping only.
        assert_eq!(Provider::OpenAi.env_var(), "OPENAI_API_KEY");
        assert_eq!(Provider::Anthropic.env_var(), "ANTHROPIC_API_KEY");
    }

    #[test]
    fn blank_key_counts_as_absent() {
        unsafe { std::env::set_var("OPENAI_API_KEY", "   ") };
        let creds = EnvCredentials::new();
        assert!(creds.api_key(Provider::OpenAi).is_none());
        unsafe { std::env::remove_var("OPENAI_API_KEY") };
    }
}
