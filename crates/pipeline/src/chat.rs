//! The chat pipeline — one invocation per user message.
//!
//! Control flow per turn: resolve the agent config and fetch knowledge
//! (independent reads), load history, assemble the system prompt, make the
//! single model call, persist the completed turn. All I/O is sequential
//! within the invocation; the model call is the only long-wall-clock step.
//!
//! There is no transactional linkage between the history read and the final
//! append: concurrent turns on one conversation (two browser tabs) can
//! interleave. The log is optimistic-append by design.

use crate::assembler;
use notus_agents::AgentRegistry;
use notus_core::{
    AgentRole, ConversationId, ConversationTurn, Error, KnowledgeStore, TurnStore, Usage, UserId,
    WorkspaceId,
};
use notus_providers::Dispatcher;
use std::sync::Arc;
use tracing::{debug, info};

const DEFAULT_HISTORY_TURNS: usize = 10;

/// One inbound chat turn.
#[derive(Debug, Clone)]
pub struct ChatTurnRequest {
    pub workspace_id: WorkspaceId,
    pub user_id: UserId,
    pub conversation_id: ConversationId,
    pub agent_role: AgentRole,
    pub message: String,
}

/// The completed turn as returned to the caller.
#[derive(Debug, Clone)]
pub struct ChatOutcome {
    pub response: String,
    pub agent_role: AgentRole,
    pub knowledge_used: bool,
    pub usage: Option<Usage>,
}

/// The knowledge-grounded chat pipeline.
pub struct ChatPipeline {
    registry: AgentRegistry,
    knowledge: Arc<dyn KnowledgeStore>,
    turns: Arc<dyn TurnStore>,
    dispatcher: Dispatcher,
    history_turns: usize,
}

impl ChatPipeline {
    pub fn new(
        registry: AgentRegistry,
        knowledge: Arc<dyn KnowledgeStore>,
        turns: Arc<dyn TurnStore>,
        dispatcher: Dispatcher,
    ) -> Self {
        Self {
            registry,
            knowledge,
            turns,
            dispatcher,
            history_turns: DEFAULT_HISTORY_TURNS,
        }
    }

    /// Override the replayed-history window.
    pub fn with_history_turns(mut self, turns: usize) -> Self {
        self.history_turns = turns;
        self
    }

    /// Run one turn end to end.
    pub async fn run(&self, request: &ChatTurnRequest) -> Result<ChatOutcome, Error> {
        let config = self
            .registry
            .resolve(&request.agent_role, &request.workspace_id)
            .await?;

        let knowledge = self.knowledge.fetch_knowledge(&request.workspace_id).await?;
        let knowledge_used = !knowledge.is_empty();

        let history = self
            .turns
            .load_history(&request.conversation_id, self.history_turns)
            .await?;

        let system_prompt = assembler::build_prompt(&config, &knowledge);
        debug!(
            workspace = %request.workspace_id,
            role = %config.role,
            knowledge = knowledge.len(),
            history = history.len(),
            "Assembled chat turn"
        );

        let result = self
            .dispatcher
            .dispatch(&config, &system_prompt, &request.message, &history)
            .await?;

        let turn = ConversationTurn::new(
            request.conversation_id.clone(),
            request.workspace_id.clone(),
            request.user_id.clone(),
            config.role.as_str(),
            request.message.clone(),
            result.text.clone(),
        );
        self.turns.append_turn(&turn).await?;

        info!(
            conversation = %request.conversation_id,
            provider = %config.provider,
            model = %result.model,
            "Chat turn completed"
        );

        Ok(ChatOutcome {
            response: result.text,
            agent_role: request.agent_role.clone(),
            knowledge_used,
            usage: result.usage,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::ScriptedClient;
    use notus_core::credentials::StaticCredentials;
    use notus_core::{AgentConfig, Provider};
    use notus_store::InMemoryStore;

    fn pipeline_with(
        store: Arc<InMemoryStore>,
        openai: Arc<ScriptedClient>,
        anthropic: Arc<ScriptedClient>,
    ) -> ChatPipeline {
        let creds = StaticCredentials::new()
            .with_key(Provider::OpenAi, "sk-o")
            .with_key(Provider::Anthropic, "sk-a");
        let dispatcher = Dispatcher::new(Arc::new(creds))
            .with_client(openai)
            .with_client(anthropic);
        ChatPipeline::new(
            AgentRegistry::new(store.clone()),
            store.clone(),
            store,
            dispatcher,
        )
    }

    fn request(role: &str, message: &str) -> ChatTurnRequest {
        ChatTurnRequest {
            workspace_id: WorkspaceId::from("ws_1"),
            user_id: UserId::from("user_1"),
            conversation_id: ConversationId::from("conv_1"),
            agent_role: AgentRole::from(role),
            message: message.into(),
        }
    }

    #[tokio::test]
    async fn default_strategist_empty_workspace_goes_to_openai() {
        let store = Arc::new(InMemoryStore::new());
        let openai = Arc::new(ScriptedClient::new(Provider::OpenAi, "Post about wins."));
        let anthropic = Arc::new(ScriptedClient::new(Provider::Anthropic, "unused"));
        let pipeline = pipeline_with(store.clone(), openai.clone(), anthropic.clone());

        let outcome = pipeline
            .run(&request("content_strategist", "What should I post about?"))
            .await
            .unwrap();

        assert_eq!(outcome.response, "Post about wins.");
        assert!(!outcome.knowledge_used);
        assert_eq!(anthropic.call_count(), 0);
        assert_eq!(openai.call_count(), 1);

        // No knowledge, no history: the system prompt is exactly the
        // compiled default template.
        let default = notus_agents::default_for(&AgentRole::from("content_strategist"));
        let calls = openai.calls();
        assert_eq!(calls[0].system_prompt, default.prompt_template);
        assert!(calls[0].history.is_empty());
    }

    #[tokio::test]
    async fn anthropic_override_routes_to_anthropic() {
        let store = Arc::new(InMemoryStore::new());
        let openai = Arc::new(ScriptedClient::new(Provider::OpenAi, "unused"));
        let anthropic = Arc::new(ScriptedClient::new(Provider::Anthropic, "From Claude."));
        let pipeline = pipeline_with(store.clone(), openai.clone(), anthropic.clone());

        let ws = WorkspaceId::from("ws_1");
        let role = AgentRole::from("copywriter");
        let custom = AgentConfig {
            role: role.clone(),
            provider: Provider::Anthropic,
            model: "claude-sonnet-4-20250514".into(),
            prompt_template: "You are Acme's copywriter.".into(),
            temperature: 0.5,
            max_tokens: 1000,
        };
        notus_core::ConfigStore::save_override(
            store.as_ref(),
            &ws,
            &role,
            &serde_json::to_string(&custom).unwrap(),
        )
        .await
        .unwrap();

        let outcome = pipeline.run(&request("copywriter", "Draft a hook")).await.unwrap();

        assert_eq!(outcome.response, "From Claude.");
        assert_eq!(openai.call_count(), 0);
        assert_eq!(anthropic.call_count(), 1);
        assert_eq!(anthropic.calls()[0].model, "claude-sonnet-4-20250514");
    }

    #[tokio::test]
    async fn knowledge_lands_in_system_prompt() {
        let store = Arc::new(InMemoryStore::new());
        let ws = WorkspaceId::from("ws_1");
        store
            .add_content_source(&ws, "Q1 Strategy", "Focus on thought leadership")
            .await;
        store
            .add_brand_profile(
                &ws,
                notus_core::KnowledgeRecord::brand_profile("Acme").with_description("B2B SaaS"),
            )
            .await;

        let openai = Arc::new(ScriptedClient::new(Provider::OpenAi, "Grounded reply."));
        let anthropic = Arc::new(ScriptedClient::new(Provider::Anthropic, "unused"));
        let pipeline = pipeline_with(store.clone(), openai.clone(), anthropic);

        let outcome = pipeline
            .run(&request("content_strategist", "What should I post about?"))
            .await
            .unwrap();

        assert!(outcome.knowledge_used);
        let prompt = &openai.calls()[0].system_prompt;
        assert!(prompt.contains("KNOWLEDGE BASE:"));
        assert!(prompt.contains("Q1 Strategy: Focus on thought leadership"));
        assert!(prompt.contains("Brand: Acme - B2B SaaS"));
    }

    #[tokio::test]
    async fn turn_is_persisted_and_replayed() {
        let store = Arc::new(InMemoryStore::new());
        let openai = Arc::new(ScriptedClient::new(Provider::OpenAi, "First reply."));
        let anthropic = Arc::new(ScriptedClient::new(Provider::Anthropic, "unused"));
        let pipeline = pipeline_with(store.clone(), openai.clone(), anthropic);

        pipeline
            .run(&request("content_strategist", "First question"))
            .await
            .unwrap();
        pipeline
            .run(&request("content_strategist", "Second question"))
            .await
            .unwrap();

        // The second call saw the first turn as history.
        let calls = openai.calls();
        assert!(calls[0].history.is_empty());
        assert_eq!(calls[1].history.len(), 1);
        assert_eq!(calls[1].history[0].user, "First question");
        assert_eq!(calls[1].history[0].assistant, "First reply.");
    }

    #[tokio::test]
    async fn missing_key_aborts_before_persistence() {
        let store = Arc::new(InMemoryStore::new());
        let openai = Arc::new(ScriptedClient::new(Provider::OpenAi, "unused"));
        let dispatcher =
            Dispatcher::new(Arc::new(StaticCredentials::new())).with_client(openai.clone());
        let pipeline = ChatPipeline::new(
            AgentRegistry::new(store.clone()),
            store.clone(),
            store.clone(),
            dispatcher,
        );

        let err = pipeline
            .run(&request("content_strategist", "hello"))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            Error::Dispatch(notus_core::DispatchError::MissingApiKey { .. })
        ));
        assert_eq!(openai.call_count(), 0);
        let history = notus_core::TurnStore::load_history(
            store.as_ref(),
            &ConversationId::from("conv_1"),
            10,
        )
        .await
        .unwrap();
        assert!(history.is_empty());
    }
}
