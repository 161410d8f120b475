//! Structured long-form post generation.
//!
//! Single-shot: resolve the agent config (default role `copywriter`), build
//! a multi-step drafting prompt from the transcript and any prior example
//! posts, make one dispatch call, return the draft. No retrieval, no
//! history, no persistence.

use notus_agents::AgentRegistry;
use notus_core::{AgentRole, Error, WorkspaceId};
use notus_providers::Dispatcher;
use serde::{Deserialize, Serialize};
use tracing::info;

const DEFAULT_ROLE: &str = "copywriter";

/// Target platform for a generated post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Linkedin,
    Twitter,
    Instagram,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Linkedin => "linkedin",
            Platform::Twitter => "twitter",
            Platform::Instagram => "instagram",
        }
    }

    /// Platform-specific drafting constraints injected into step 3.
    fn guidance(&self) -> &'static str {
        match self {
            Platform::Linkedin => {
                "Write 150-300 words. Short paragraphs of one or two sentences. \
                 Open with a line that works before the fold. No hashtags in the body; \
                 up to three at the very end."
            }
            Platform::Twitter => {
                "Write a single post under 280 characters, or a thread of at most \
                 five numbered posts if the idea needs it. No hashtags."
            }
            Platform::Instagram => {
                "Write a caption of 100-150 words with a strong first line. \
                 End with a question to the audience and up to five hashtags."
            }
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One generation request.
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    pub workspace_id: WorkspaceId,
    pub platform: Platform,
    pub transcript: String,
    /// Role resolved through the registry; `None` means `copywriter`.
    pub agent_role: Option<AgentRole>,
    /// Prior posts whose voice the draft should match.
    pub examples: Vec<String>,
}

/// The structured long-form generator.
pub struct PostGenerator {
    registry: AgentRegistry,
    dispatcher: Dispatcher,
}

impl PostGenerator {
    pub fn new(registry: AgentRegistry, dispatcher: Dispatcher) -> Self {
        Self {
            registry,
            dispatcher,
        }
    }

    /// Draft one platform-specific post from a transcript.
    pub async fn generate(&self, request: &GenerateRequest) -> Result<String, Error> {
        let role = request
            .agent_role
            .clone()
            .unwrap_or_else(|| AgentRole::from(DEFAULT_ROLE));
        let config = self.registry.resolve(&role, &request.workspace_id).await?;

        let instructions = build_instructions(request);
        let result = self
            .dispatcher
            .dispatch(&config, &config.prompt_template, &instructions, &[])
            .await?;

        info!(
            workspace = %request.workspace_id,
            platform = %request.platform,
            model = %result.model,
            "Generated post draft"
        );
        Ok(result.text)
    }
}

/// The multi-step drafting prompt. The steps walk the model from raw
/// transcript to a finished platform-shaped post in one response.
fn build_instructions(request: &GenerateRequest) -> String {
    let mut prompt = format!(
        "Draft one {} post from the source material below. Work through these steps \
         and return only the finished post:\n\n\
         Step 1 - Pull out the single strongest insight in the transcript.\n\
         Step 2 - Write a hook for that insight: one line that earns the next line.\n\
         Step 3 - Write the body. {}\n\
         Step 4 - Close with one clear call to action that fits the platform.",
        request.platform,
        request.platform.guidance()
    );

    prompt.push_str("\n\nTRANSCRIPT:\n");
    prompt.push_str(&request.transcript);

    if !request.examples.is_empty() {
        prompt.push_str("\n\nPRIOR POSTS (match their voice):");
        for (i, example) in request.examples.iter().enumerate() {
            prompt.push_str(&format!("\n{}. {}", i + 1, example));
        }
    }

    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::ScriptedClient;
    use notus_core::credentials::StaticCredentials;
    use notus_core::Provider;
    use notus_store::InMemoryStore;
    use std::sync::Arc;

    fn generator(openai: Arc<ScriptedClient>) -> PostGenerator {
        let store = Arc::new(InMemoryStore::new());
        let creds = StaticCredentials::new().with_key(Provider::OpenAi, "sk-o");
        PostGenerator::new(
            AgentRegistry::new(store),
            Dispatcher::new(Arc::new(creds)).with_client(openai),
        )
    }

    fn request(platform: Platform) -> GenerateRequest {
        GenerateRequest {
            workspace_id: WorkspaceId::from("ws_1"),
            platform,
            transcript: "We cut onboarding time in half by removing three form fields.".into(),
            agent_role: None,
            examples: vec!["Shipping beats planning.".into()],
        }
    }

    #[tokio::test]
    async fn generates_single_shot_with_copywriter_default() {
        let openai = Arc::new(ScriptedClient::new(Provider::OpenAi, "Here is your post."));
        let generator = generator(openai.clone());

        let post = generator.generate(&request(Platform::Linkedin)).await.unwrap();

        assert_eq!(post, "Here is your post.");
        assert_eq!(openai.call_count(), 1);

        let calls = openai.calls();
        // System prompt is the copywriter template; the instructions ride
        // the user message with no history.
        let default = notus_agents::default_for(&AgentRole::from("copywriter"));
        assert_eq!(calls[0].system_prompt, default.prompt_template);
        assert!(calls[0].history.is_empty());
    }

    #[tokio::test]
    async fn instructions_carry_transcript_and_examples() {
        let req = request(Platform::Twitter);
        let instructions = build_instructions(&req);

        assert!(instructions.contains("Draft one twitter post"));
        assert!(instructions.contains("280 characters"));
        assert!(instructions.contains("TRANSCRIPT:"));
        assert!(instructions.contains("removing three form fields"));
        assert!(instructions.contains("PRIOR POSTS"));
        assert!(instructions.contains("1. Shipping beats planning."));
    }

    #[tokio::test]
    async fn no_examples_section_when_none_given() {
        let mut req = request(Platform::Instagram);
        req.examples.clear();
        let instructions = build_instructions(&req);
        assert!(!instructions.contains("PRIOR POSTS"));
    }

    #[test]
    fn platform_parses_from_lowercase() {
        let p: Platform = serde_json::from_str("\"linkedin\"").unwrap();
        assert_eq!(p, Platform::Linkedin);
    }
}
