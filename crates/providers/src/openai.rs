//! OpenAI-style chat-completions client.
//!
//! Speaks the `/chat/completions` wire shape: the system prompt is the first
//! entry of a flat message list, history pairs follow interleaved, and the
//! current user message closes the list. Extracts
//! `choices[0].message.content`.

use async_trait::async_trait;
use notus_core::error::DispatchError;
use notus_core::{ChatClient, CompletionRequest, DispatchResult, Provider, Usage};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// An OpenAI-compatible chat-completions client.
pub struct OpenAiClient {
    base_url: String,
    client: reqwest::Client,
}

impl OpenAiClient {
    pub fn new() -> Self {
        Self::with_timeout(DEFAULT_TIMEOUT_SECS)
    }

    /// Create with an explicit request timeout. The model call is the only
    /// long-wall-clock operation in a pipeline invocation; this bound is the
    /// sole cancellation mechanism once the call is issued.
    pub fn with_timeout(timeout_secs: u64) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: DEFAULT_BASE_URL.into(),
            client,
        }
    }

    /// Create with a custom base URL (e.g., for proxies or tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Flatten a completion request into the OpenAI message list:
    /// `[system, ...history (user, assistant), user]`.
    fn to_api_messages(request: &CompletionRequest) -> Vec<ApiMessage> {
        let mut messages = Vec::with_capacity(2 + request.history.len() * 2);
        messages.push(ApiMessage {
            role: "system".into(),
            content: request.system_prompt.clone(),
        });
        for pair in &request.history {
            messages.push(ApiMessage {
                role: "user".into(),
                content: pair.user.clone(),
            });
            messages.push(ApiMessage {
                role: "assistant".into(),
                content: pair.assistant.clone(),
            });
        }
        messages.push(ApiMessage {
            role: "user".into(),
            content: request.user_message.clone(),
        });
        messages
    }
}

impl Default for OpenAiClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChatClient for OpenAiClient {
    fn provider(&self) -> Provider {
        Provider::OpenAi
    }

    async fn complete(
        &self,
        api_key: &str,
        request: &CompletionRequest,
    ) -> Result<DispatchResult, DispatchError> {
        let url = format!("{}/chat/completions", self.base_url);

        let body = serde_json::json!({
            "model": request.model,
            "messages": Self::to_api_messages(request),
            "temperature": request.temperature,
            "max_tokens": request.max_tokens,
        });

        debug!(provider = "openai", model = %request.model, "Sending completion request");

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {api_key}"))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| DispatchError::Network(e.to_string()))?;

        let status = response.status().as_u16();
        if status != 200 {
            let error_body = response.text().await.unwrap_or_default();
            warn!(status, body = %error_body, "OpenAI API error");
            return Err(DispatchError::Provider {
                status,
                body: error_body,
            });
        }

        let api_resp: ApiResponse = response
            .json()
            .await
            .map_err(|e| DispatchError::MalformedResponse(format!("OpenAI response: {e}")))?;

        let choice = api_resp.choices.into_iter().next().ok_or_else(|| {
            DispatchError::MalformedResponse("no choices in OpenAI response".into())
        })?;

        let usage = api_resp.usage.map(|u| Usage {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
            total_tokens: u.total_tokens,
        });

        Ok(DispatchResult {
            text: choice.message.content.unwrap_or_default(),
            model: api_resp.model,
            usage,
        })
    }
}

// --- OpenAI API types (internal) ---

#[derive(Debug, Serialize, Deserialize)]
struct ApiMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    model: String,
    choices: Vec<ApiChoice>,
    usage: Option<ApiUsage>,
}

#[derive(Debug, Deserialize)]
struct ApiChoice {
    message: ApiChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ApiChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}
