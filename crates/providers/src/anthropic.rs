//! Anthropic Messages API client.
//!
//! Differences from the OpenAI shape, encoded here and nowhere else:
//! - `x-api-key` header authentication (not Bearer)
//! - `anthropic-version` header
//! - System prompt as a top-level field, not a message
//! - Reply text arrives as content blocks; we extract the first text block

use async_trait::async_trait;
use notus_core::error::DispatchError;
use notus_core::{ChatClient, CompletionRequest, DispatchResult, Provider, Usage};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

const ANTHROPIC_VERSION: &str = "2023-06-01";
const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Anthropic native Messages API client.
pub struct AnthropicClient {
    base_url: String,
    client: reqwest::Client,
}

impl AnthropicClient {
    pub fn new() -> Self {
        Self::with_timeout(DEFAULT_TIMEOUT_SECS)
    }

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

    /// History pairs plus the final user turn; the system prompt stays out
    /// of this list — it rides the top-level `system` field.
    fn to_api_messages(request: &CompletionRequest) -> Vec<ApiMessage> {
        let mut messages = Vec::with_capacity(1 + request.history.len() * 2);
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

impl Default for AnthropicClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChatClient for AnthropicClient {
    fn provider(&self) -> Provider {
        Provider::Anthropic
    }

    async fn complete(
        &self,
        api_key: &str,
        request: &CompletionRequest,
    ) -> Result<DispatchResult, DispatchError> {
        let url = format!("{}/v1/messages", self.base_url);

        let mut body = serde_json::json!({
            "model": request.model,
            "messages": Self::to_api_messages(request),
            "max_tokens": request.max_tokens,
            "temperature": request.temperature,
        });
        if !request.system_prompt.is_empty() {
            body["system"] = serde_json::json!(request.system_prompt);
        }

        debug!(provider = "anthropic", model = %request.model, "Sending completion request");

        let response = self
            .client
            .post(&url)
            .header("x-api-key", api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| DispatchError::Network(e.to_string()))?;

        let status = response.status().as_u16();
        if status != 200 {
            let error_body = response.text().await.unwrap_or_default();
            warn!(status, body = %error_body, "Anthropic API error");
            return Err(DispatchError::Provider {
                status,
                body: error_body,
            });
        }

        let api_resp: ApiResponse = response
            .json()
            .await
            .map_err(|e| DispatchError::MalformedResponse(format!("Anthropic response: {e}")))?;

        let text = api_resp
            .content
            .iter()
            .find_map(|block| match block {
                ContentBlock::Text { text } => Some(text.clone()),
            })
            .ok_or_else(|| {
                DispatchError::MalformedResponse("no text block in Anthropic response".into())
            })?;

        let usage = Some(Usage {
            prompt_tokens: api_resp.usage.input_tokens,
            completion_tokens: api_resp.usage.output_tokens,
            total_tokens: api_resp.usage.input_tokens + api_resp.usage.output_tokens,
        });

        Ok(DispatchResult {
            text,
            model: api_resp.model,
            usage,
        })
    }
}

// --- Anthropic API types (internal) ---

#[derive(Debug, Serialize, Deserialize)]
struct ApiMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    model: String,
    content: Vec<ContentBlock>,
    usage: ApiUsage,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum ContentBlock {
    #[serde(rename = "text")]
    Text { text: String },
}

#[derive(Debug, Deserialize)]
struct ApiUsage {
    input_tokens: u32,
    output_tokens: u32,
}
