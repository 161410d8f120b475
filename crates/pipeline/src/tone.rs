//! Tone analysis — single-shot voice profiling over prior posts.
//!
//! Submits a batch of published posts under the `tone_analyst` role and
//! demands a strict JSON object back. A model that answers with prose, a
//! fenced block, or broken JSON degrades to the fixed fallback profile —
//! the request itself never fails on parsing.

use notus_agents::AgentRegistry;
use notus_core::{AgentRole, Error, WorkspaceId};
use notus_providers::Dispatcher;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

const ANALYST_ROLE: &str = "tone_analyst";

/// A described brand voice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToneProfile {
    pub tone_description: String,
    pub key_characteristics: Vec<String>,
    pub writing_style: String,
    pub content_patterns: Vec<String>,
    pub personality_traits: Vec<String>,
    pub content_themes: Vec<String>,
}

impl ToneProfile {
    /// The profile substituted when the model's answer fails to parse.
    pub fn fallback() -> Self {
        Self {
            tone_description: "Professional and approachable".into(),
            key_characteristics: vec![
                "clear".into(),
                "direct".into(),
                "audience-focused".into(),
            ],
            writing_style: "Conversational with concrete examples".into(),
            content_patterns: vec!["short paragraphs".into(), "practical takeaways".into()],
            personality_traits: vec!["helpful".into(), "credible".into()],
            content_themes: vec!["industry insights".into(), "lessons learned".into()],
        }
    }
}

/// The tone analyzer pipeline.
pub struct ToneAnalyzer {
    registry: AgentRegistry,
    dispatcher: Dispatcher,
}

impl ToneAnalyzer {
    pub fn new(registry: AgentRegistry, dispatcher: Dispatcher) -> Self {
        Self {
            registry,
            dispatcher,
        }
    }

    /// Profile the voice of a batch of posts.
    ///
    /// Dispatch failures (missing key, provider error) propagate; parse
    /// failures do not.
    pub async fn analyze(
        &self,
        workspace: &WorkspaceId,
        posts: &[String],
    ) -> Result<ToneProfile, Error> {
        let role = AgentRole::from(ANALYST_ROLE);
        let config = self.registry.resolve(&role, workspace).await?;

        let instructions = build_instructions(posts);
        let result = self
            .dispatcher
            .dispatch(&config, &config.prompt_template, &instructions, &[])
            .await?;

        let profile = match parse_profile(&result.text) {
            Some(profile) => profile,
            None => {
                warn!(
                    workspace = %workspace,
                    "Tone analysis response was not valid JSON, using fallback profile"
                );
                ToneProfile::fallback()
            }
        };

        info!(workspace = %workspace, posts = posts.len(), "Tone analysis completed");
        Ok(profile)
    }
}

fn build_instructions(posts: &[String]) -> String {
    let mut prompt = String::from(
        "Analyze the voice of the posts below. Respond with exactly one JSON object \
         with these keys and no other text:\n\
         {\n\
           \"tone_description\": string,\n\
           \"key_characteristics\": [string],\n\
           \"writing_style\": string,\n\
           \"content_patterns\": [string],\n\
           \"personality_traits\": [string],\n\
           \"content_themes\": [string]\n\
         }\n\nPOSTS:",
    );
    for (i, post) in posts.iter().enumerate() {
        prompt.push_str(&format!("\n{}. {}", i + 1, post));
    }
    prompt
}

/// Strict-ish parse: direct JSON first, then the outermost braced span —
/// which also handles a ```json fenced block.
fn parse_profile(text: &str) -> Option<ToneProfile> {
    if let Ok(profile) = serde_json::from_str(text) {
        return Some(profile);
    }
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end <= start {
        return None;
    }
    serde_json::from_str(&text[start..=end]).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::ScriptedClient;
    use notus_core::credentials::StaticCredentials;
    use notus_core::Provider;
    use notus_store::InMemoryStore;
    use std::sync::Arc;

    const PROFILE_JSON: &str = r#"{
        "tone_description": "Dry and analytical",
        "key_characteristics": ["precise"],
        "writing_style": "Long-form argument",
        "content_patterns": ["data first"],
        "personality_traits": ["skeptical"],
        "content_themes": ["pricing"]
    }"#;

    fn analyzer(reply: &str) -> (ToneAnalyzer, Arc<ScriptedClient>) {
        let store = Arc::new(InMemoryStore::new());
        // The tone_analyst default rides Anthropic.
        let client = Arc::new(ScriptedClient::new(Provider::Anthropic, reply));
        let creds = StaticCredentials::new().with_key(Provider::Anthropic, "sk-a");
        let dispatcher = Dispatcher::new(Arc::new(creds)).with_client(client.clone());
        (
            ToneAnalyzer::new(AgentRegistry::new(store), dispatcher),
            client,
        )
    }

    fn posts() -> Vec<String> {
        vec!["Margins tell the truth.".into(), "Price for the buyer you want.".into()]
    }

    #[tokio::test]
    async fn parses_clean_json_response() {
        let (analyzer, client) = analyzer(PROFILE_JSON);
        let profile = analyzer
            .analyze(&WorkspaceId::from("ws_1"), &posts())
            .await
            .unwrap();
        assert_eq!(profile.tone_description, "Dry and analytical");
        assert_eq!(client.call_count(), 1);
    }

    #[tokio::test]
    async fn parses_fenced_json_response() {
        let fenced = format!("```json\n{PROFILE_JSON}\n```");
        let (analyzer, _) = analyzer(&fenced);
        let profile = analyzer
            .analyze(&WorkspaceId::from("ws_1"), &posts())
            .await
            .unwrap();
        assert_eq!(profile.writing_style, "Long-form argument");
    }

    #[tokio::test]
    async fn non_json_response_yields_fallback() {
        let (analyzer, _) = analyzer("I'd describe this voice as warm and witty!");
        let profile = analyzer
            .analyze(&WorkspaceId::from("ws_1"), &posts())
            .await
            .unwrap();
        assert_eq!(profile, ToneProfile::fallback());
    }

    #[tokio::test]
    async fn fallback_has_every_key_populated() {
        let profile = ToneProfile::fallback();
        let json = serde_json::to_value(&profile).unwrap();
        for key in [
            "tone_description",
            "key_characteristics",
            "writing_style",
            "content_patterns",
            "personality_traits",
            "content_themes",
        ] {
            assert!(json.get(key).is_some(), "missing {key}");
        }
        assert!(!profile.key_characteristics.is_empty());
    }

    #[tokio::test]
    async fn instructions_number_the_posts() {
        let instructions = build_instructions(&posts());
        assert!(instructions.contains("1. Margins tell the truth."));
        assert!(instructions.contains("2. Price for the buyer you want."));
        assert!(instructions.contains("\"content_themes\""));
    }

    #[test]
    fn parse_rejects_wrong_shape() {
        assert!(parse_profile(r#"{"unrelated": true}"#).is_none());
        assert!(parse_profile("no braces at all").is_none());
    }
}
