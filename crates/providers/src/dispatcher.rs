//! Provider selection and the single outbound model call.
//!
//! The dispatcher owns one strategy client per provider and the credentials
//! capability. Key resolution happens here, per request, so a missing key
//! fails before any HTTP traffic — distinctly from a provider HTTP failure.

use crate::anthropic::AnthropicClient;
use crate::openai::OpenAiClient;
use notus_core::error::DispatchError;
use notus_core::{
    AgentConfig, ChatClient, CompletionRequest, CredentialsProvider, DispatchResult, Provider,
    TurnPair,
};
use std::sync::Arc;
use tracing::debug;

/// Routes a resolved agent config to the matching provider client.
#[derive(Clone)]
pub struct Dispatcher {
    credentials: Arc<dyn CredentialsProvider>,
    openai: Arc<dyn ChatClient>,
    anthropic: Arc<dyn ChatClient>,
}

impl Dispatcher {
    /// Create a dispatcher with the stock clients and default endpoints.
    pub fn new(credentials: Arc<dyn CredentialsProvider>) -> Self {
        Self {
            credentials,
            openai: Arc::new(OpenAiClient::new()),
            anthropic: Arc::new(AnthropicClient::new()),
        }
    }

    /// Create a dispatcher with endpoints and timeout from configuration.
    pub fn from_config(
        credentials: Arc<dyn CredentialsProvider>,
        endpoints: &notus_config::ProviderEndpoints,
    ) -> Self {
        let timeout = endpoints.request_timeout_secs;
        Self {
            credentials,
            openai: Arc::new(
                OpenAiClient::with_timeout(timeout).with_base_url(&endpoints.openai_base_url),
            ),
            anthropic: Arc::new(
                AnthropicClient::with_timeout(timeout)
                    .with_base_url(&endpoints.anthropic_base_url),
            ),
        }
    }

    /// Replace the client for its own provider. Used by tests and proxies.
    pub fn with_client(mut self, client: Arc<dyn ChatClient>) -> Self {
        match client.provider() {
            Provider::OpenAi => self.openai = client,
            Provider::Anthropic => self.anthropic = client,
        }
        self
    }

    fn client_for(&self, provider: Provider) -> &Arc<dyn ChatClient> {
        match provider {
            Provider::OpenAi => &self.openai,
            Provider::Anthropic => &self.anthropic,
        }
    }

    /// Issue the single completion call for this pipeline invocation.
    ///
    /// Single attempt, no retry, no backoff: a transient provider failure
    /// surfaces immediately to the caller.
    pub async fn dispatch(
        &self,
        config: &AgentConfig,
        system_prompt: &str,
        user_message: &str,
        history: &[TurnPair],
    ) -> Result<DispatchResult, DispatchError> {
        let provider = config.provider;
        let api_key =
            self.credentials
                .api_key(provider)
                .ok_or_else(|| DispatchError::MissingApiKey {
                    provider: provider.as_str().into(),
                    env_var: provider.env_var().into(),
                })?;

        let request = CompletionRequest {
            model: config.model.clone(),
            system_prompt: system_prompt.to_string(),
            history: history.to_vec(),
            user_message: user_message.to_string(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        };

        debug!(provider = %provider, model = %config.model, "Dispatching completion");
        self.client_for(provider).complete(&api_key, &request).await
    }
}
