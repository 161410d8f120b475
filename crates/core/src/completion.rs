//! ChatClient trait — the abstraction over LLM completion APIs.
//!
//! Each provider (OpenAI-style chat completions, Anthropic-style messages)
//! implements this trait as a strategy object. The dispatcher selects a
//! client by the resolved `AgentConfig`'s provider; wire-shape differences
//! between vendors stay behind this boundary.

use crate::agent::Provider;
use crate::conversation::TurnPair;
use crate::error::DispatchError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// One fully-assembled completion request, provider-agnostic.
///
/// The system prompt and the history are deliberately separate: the OpenAI
/// path folds the system prompt into the message list, the Anthropic path
/// sends it as a top-level field. Neither representation is canonical.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// Provider-side model identifier.
    pub model: String,

    /// The assembled system prompt (template + knowledge section).
    pub system_prompt: String,

    /// Prior (user, assistant) pairs, oldest first.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub history: Vec<TurnPair>,

    /// The current user message.
    pub user_message: String,

    /// Sampling temperature.
    pub temperature: f32,

    /// Maximum output tokens.
    pub max_tokens: u32,
}

/// Token usage reported by the provider, when available.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// The normalized result of one completion call.
///
/// Ephemeral — lives only within a pipeline invocation and is folded into a
/// `ConversationTurn` rather than persisted on its own.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchResult {
    /// The assistant's reply text.
    pub text: String,

    /// Which model actually responded (may differ from requested).
    pub model: String,

    /// Token usage, if the provider reported it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
}

/// A provider-shaped completion client.
///
/// Implementations receive the API key per call: key resolution happens in
/// the dispatcher so that a missing key fails before any HTTP traffic.
#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Which provider this client speaks for.
    fn provider(&self) -> Provider;

    /// Send one completion request. Single attempt — no retry, no backoff.
    async fn complete(
        &self,
        api_key: &str,
        request: &CompletionRequest,
    ) -> std::result::Result<DispatchResult, DispatchError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_history_skips_serialization() {
        let req = CompletionRequest {
            model: "gpt-4o".into(),
            system_prompt: "You are helpful.".into(),
            history: Vec::new(),
            user_message: "hi".into(),
            temperature: 0.7,
            max_tokens: 2000,
        };
        let json = serde_json::to_string(&req).unwrap();
        assert!(!json.contains("history"));
    }

    #[test]
    fn result_roundtrip() {
        let result = DispatchResult {
            text: "Here is a draft.".into(),
            model: "gpt-4o".into(),
            usage: Some(Usage {
                prompt_tokens: 120,
                completion_tokens: 80,
                total_tokens: 200,
            }),
        };
        let json = serde_json::to_string(&result).unwrap();
        let parsed: DispatchResult = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.text, "Here is a draft.");
        assert_eq!(parsed.usage.unwrap().total_tokens, 200);
    }
}
