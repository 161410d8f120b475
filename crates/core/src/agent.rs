//! Agent configuration domain types.
//!
//! An *agent* is a named role (e.g. `content_strategist`) mapped to a model
//! configuration: which provider to call, which model id, the base prompt
//! template, and sampling parameters. Configurations come from two sources —
//! compiled-in defaults and tenant overrides stored as JSON text — resolved
//! by the registry in `notus-agents`.

use crate::error::StoreError;
use crate::tenant::WorkspaceId;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A named agent role.
///
/// Roles are open-ended strings on the wire; unrecognized names resolve to
/// the fallback role rather than failing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AgentRole(pub String);

impl AgentRole {
    pub fn from(s: &str) -> Self {
        Self(s.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AgentRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An external LLM vendor, selected per agent configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    OpenAi,
    Anthropic,
}

impl Provider {
    /// The canonical lowercase name used on the wire and in logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::OpenAi => "openai",
            Provider::Anthropic => "anthropic",
        }
    }

    /// The environment variable holding this provider's API key.
    pub fn env_var(&self) -> &'static str {
        match self {
            Provider::OpenAi => "OPENAI_API_KEY",
            Provider::Anthropic => "ANTHROPIC_API_KEY",
        }
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A resolved agent configuration.
///
/// Tenant overrides are stored as JSON text in this exact shape; an override
/// supersedes the compiled default wholesale — fields are never merged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentConfig {
    /// The role this configuration answers for.
    pub role: AgentRole,

    /// Which vendor handles completion requests.
    pub provider: Provider,

    /// Provider-side model identifier (e.g. "gpt-4o", "claude-sonnet-4-20250514").
    pub model: String,

    /// Base system prompt. The assembler appends the knowledge section to it.
    pub prompt_template: String,

    /// Sampling temperature in [0, 1].
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Maximum output tokens per completion.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_tokens() -> u32 {
    2000
}

/// Read/write access to tenant agent-config overrides.
///
/// The store hands back raw JSON text; leniently parsing it (and falling
/// back to the compiled default on malformed content) is the registry's job.
#[async_trait]
pub trait ConfigStore: Send + Sync {
    /// Load the override for `(workspace, role)`, if one was ever saved.
    async fn load_override(
        &self,
        workspace: &WorkspaceId,
        role: &AgentRole,
    ) -> std::result::Result<Option<String>, StoreError>;

    /// Create or replace the override for `(workspace, role)`.
    async fn save_override(
        &self,
        workspace: &WorkspaceId,
        role: &AgentRole,
        config_json: &str,
    ) -> std::result::Result<(), StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Provider::OpenAi).unwrap(), "\"openai\"");
        assert_eq!(
            serde_json::to_string(&Provider::Anthropic).unwrap(),
            "\"anthropic\""
        );
    }

    #[test]
    fn provider_env_vars() {
        assert_eq!(Provider::OpenAi.env_var(), "OPENAI_API_KEY");
        assert_eq!(Provider::Anthropic.env_var(), "ANTHROPIC_API_KEY");
    }

    #[test]
    fn config_roundtrips_through_json() {
        let config = AgentConfig {
            role: AgentRole::from("copywriter"),
            provider: Provider::Anthropic,
            model: "claude-sonnet-4-20250514".into(),
            prompt_template: "You write crisp social copy.".into(),
            temperature: 0.4,
            max_tokens: 1500,
        };
        let json = serde_json::to_string(&config).unwrap();
        let parsed: AgentConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn sampling_fields_default_when_absent() {
        let parsed: AgentConfig = serde_json::from_str(
            r#"{
                "role": "copywriter",
                "provider": "openai",
                "model": "gpt-4o",
                "prompt_template": "You write crisp social copy."
            }"#,
        )
        .unwrap();
        assert!((parsed.temperature - 0.7).abs() < f32::EPSILON);
        assert_eq!(parsed.max_tokens, 2000);
    }
}
