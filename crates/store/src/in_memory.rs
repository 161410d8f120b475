//! In-memory store — useful for testing and ephemeral sessions.

use async_trait::async_trait;
use notus_core::error::StoreError;
use notus_core::{
    AgentRole, ConfigStore, ConversationId, ConversationTurn, KnowledgeRecord, KnowledgeStore,
    TurnPair, TurnStore, WorkspaceId,
};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

const DEFAULT_KNOWLEDGE_CAP: usize = 5;

#[derive(Default)]
struct Inner {
    overrides: HashMap<(String, String), String>,
    content_sources: Vec<(String, KnowledgeRecord)>,
    context_entries: Vec<(String, KnowledgeRecord)>,
    brand_profiles: Vec<(String, KnowledgeRecord)>,
    turns: Vec<ConversationTurn>,
}

/// An in-memory store holding every tenant table in vecs and maps.
/// Implements all three store contracts; pipeline tests build on it.
pub struct InMemoryStore {
    inner: Arc<RwLock<Inner>>,
    knowledge_cap: usize,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(Inner::default())),
            knowledge_cap: DEFAULT_KNOWLEDGE_CAP,
        }
    }

    pub fn with_knowledge_cap(mut self, cap: usize) -> Self {
        self.knowledge_cap = cap;
        self
    }

    pub async fn add_content_source(&self, workspace: &WorkspaceId, title: &str, content: &str) {
        self.inner.write().await.content_sources.push((
            workspace.0.clone(),
            KnowledgeRecord::content_source(title, content),
        ));
    }

    pub async fn add_context_entry(
        &self,
        workspace: &WorkspaceId,
        title: Option<String>,
        content: &str,
    ) {
        self.inner
            .write()
            .await
            .context_entries
            .push((workspace.0.clone(), KnowledgeRecord::context_entry(title, content)));
    }

    pub async fn add_brand_profile(&self, workspace: &WorkspaceId, record: KnowledgeRecord) {
        self.inner
            .write()
            .await
            .brand_profiles
            .push((workspace.0.clone(), record));
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ConfigStore for InMemoryStore {
    async fn load_override(
        &self,
        workspace: &WorkspaceId,
        role: &AgentRole,
    ) -> Result<Option<String>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .overrides
            .get(&(workspace.0.clone(), role.as_str().to_string()))
            .cloned())
    }

    async fn save_override(
        &self,
        workspace: &WorkspaceId,
        role: &AgentRole,
        config_json: &str,
    ) -> Result<(), StoreError> {
        self.inner.write().await.overrides.insert(
            (workspace.0.clone(), role.as_str().to_string()),
            config_json.to_string(),
        );
        Ok(())
    }
}

#[async_trait]
impl KnowledgeStore for InMemoryStore {
    async fn fetch_knowledge(
        &self,
        workspace: &WorkspaceId,
    ) -> Result<Vec<KnowledgeRecord>, StoreError> {
        let inner = self.inner.read().await;
        let mut records = Vec::new();
        for table in [
            &inner.content_sources,
            &inner.context_entries,
            &inner.brand_profiles,
        ] {
            records.extend(
                table
                    .iter()
                    .filter(|(ws, _)| *ws == workspace.0)
                    .take(self.knowledge_cap)
                    .map(|(_, record)| record.clone()),
            );
        }
        Ok(records)
    }
}

#[async_trait]
impl TurnStore for InMemoryStore {
    async fn append_turn(&self, turn: &ConversationTurn) -> Result<(), StoreError> {
        self.inner.write().await.turns.push(turn.clone());
        Ok(())
    }

    async fn load_history(
        &self,
        conversation: &ConversationId,
        limit: usize,
    ) -> Result<Vec<TurnPair>, StoreError> {
        let inner = self.inner.read().await;
        let mut matching: Vec<&ConversationTurn> = inner
            .turns
            .iter()
            .filter(|t| t.conversation_id == *conversation)
            .collect();
        matching.sort_by_key(|t| t.created_at);

        let skip = matching.len().saturating_sub(limit);
        Ok(matching.into_iter().skip(skip).map(TurnPair::from).collect())
    }
}
