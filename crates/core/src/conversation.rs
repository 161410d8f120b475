//! Conversation turns and their persistence contract.
//!
//! A *turn* is one completed (user message, assistant reply) round-trip.
//! Turns form an optimistic-append log keyed by conversation id: each turn
//! is an independent insert, there is no per-conversation locking, and
//! concurrent turns (two browser tabs) may interleave. That race is an
//! accepted property of the design, not a defect to lock away.

use crate::error::StoreError;
use crate::tenant::{UserId, WorkspaceId};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConversationId(pub String);

impl ConversationId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl Default for ConversationId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ConversationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One persisted round-trip. Never updated or deleted by the core.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub id: String,
    pub conversation_id: ConversationId,
    pub workspace_id: WorkspaceId,
    pub user_id: UserId,
    pub agent_role: String,
    pub user_message: String,
    pub assistant_message: String,
    pub created_at: DateTime<Utc>,
}

impl ConversationTurn {
    /// Build a turn for the just-completed round-trip, stamped now.
    pub fn new(
        conversation_id: ConversationId,
        workspace_id: WorkspaceId,
        user_id: UserId,
        agent_role: impl Into<String>,
        user_message: impl Into<String>,
        assistant_message: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            conversation_id,
            workspace_id,
            user_id,
            agent_role: agent_role.into(),
            user_message: user_message.into(),
            assistant_message: assistant_message.into(),
            created_at: Utc::now(),
        }
    }
}

/// A (user, assistant) pair as replayed into provider history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnPair {
    pub user: String,
    pub assistant: String,
}

impl From<&ConversationTurn> for TurnPair {
    fn from(turn: &ConversationTurn) -> Self {
        Self {
            user: turn.user_message.clone(),
            assistant: turn.assistant_message.clone(),
        }
    }
}

/// Persistence contract for the conversation log.
#[async_trait]
pub trait TurnStore: Send + Sync {
    /// Append one completed turn. Plain insert — no read-modify-write.
    async fn append_turn(&self, turn: &ConversationTurn) -> std::result::Result<(), StoreError>;

    /// Load the most recent `limit` turns of a conversation, returned in
    /// ascending creation order. Unknown conversation ids yield an empty
    /// vec, never an error — a new conversation starts with no history.
    async fn load_history(
        &self,
        conversation: &ConversationId,
        limit: usize,
    ) -> std::result::Result<Vec<TurnPair>, StoreError>;
}
