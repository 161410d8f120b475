//! SQLite backend for the tenant tables.
//!
//! A single database file holds five tables:
//! - `agent_overrides`    — tenant agent configs, JSON text keyed by (workspace, role)
//! - `content_sources`    — knowledge: ingested source material
//! - `context_entries`    — knowledge: free-form context notes
//! - `brand_profiles`     — knowledge: brand descriptors
//! - `conversation_turns` — the optimistic-append conversation log
//!
//! Every query on a tenant table filters by workspace id. That filter is the
//! only tenant isolation boundary in the system.

use async_trait::async_trait;
use chrono::Utc;
use notus_core::error::StoreError;
use notus_core::{
    AgentRole, ConfigStore, ConversationId, ConversationTurn, KnowledgeRecord, KnowledgeStore,
    TurnPair, TurnStore, WorkspaceId,
};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Row, SqlitePool};
use std::str::FromStr;
use tracing::{debug, info};
use uuid::Uuid;

const DEFAULT_KNOWLEDGE_CAP: usize = 5;

/// A production SQLite store for all tenant tables.
pub struct SqliteStore {
    pool: SqlitePool,
    /// Rows fetched per knowledge table per invocation.
    knowledge_cap: usize,
}

impl SqliteStore {
    /// Create a new SQLite store from a file path.
    ///
    /// The database and all tables/indexes are created automatically.
    /// Pass `":memory:"` for an in-process ephemeral database (useful for tests).
    pub async fn new(path: &str) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(path)
            .map_err(|e| StoreError::Storage(format!("Invalid SQLite path: {e}")))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .pragma("foreign_keys", "ON");

        // An in-memory database is per-connection; a pool of one keeps the
        // schema visible across calls.
        let max_connections = if path.contains(":memory:") { 1 } else { 4 };
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await
            .map_err(|e| StoreError::Storage(format!("Failed to open SQLite: {e}")))?;

        let store = Self {
            pool,
            knowledge_cap: DEFAULT_KNOWLEDGE_CAP,
        };
        store.run_migrations().await?;
        info!("SQLite store initialized at {path}");
        Ok(store)
    }

    /// Override the per-table knowledge fetch cap.
    pub fn with_knowledge_cap(mut self, cap: usize) -> Self {
        self.knowledge_cap = cap;
        self
    }

    /// Run schema migrations — creates all tenant tables and indexes.
    async fn run_migrations(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS agent_overrides (
                workspace_id TEXT NOT NULL,
                role         TEXT NOT NULL,
                config       TEXT NOT NULL,
                updated_at   TEXT NOT NULL,
                PRIMARY KEY (workspace_id, role)
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::MigrationFailed(format!("agent_overrides table: {e}")))?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS content_sources (
                id           TEXT PRIMARY KEY,
                workspace_id TEXT NOT NULL,
                title        TEXT NOT NULL,
                content      TEXT NOT NULL,
                created_at   TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::MigrationFailed(format!("content_sources table: {e}")))?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS context_entries (
                id           TEXT PRIMARY KEY,
                workspace_id TEXT NOT NULL,
                title        TEXT,
                content      TEXT NOT NULL,
                created_at   TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::MigrationFailed(format!("context_entries table: {e}")))?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS brand_profiles (
                id            TEXT PRIMARY KEY,
                workspace_id  TEXT NOT NULL,
                name          TEXT NOT NULL,
                description   TEXT,
                tone_of_voice TEXT,
                bio           TEXT,
                expertise     TEXT NOT NULL DEFAULT '[]',
                created_at    TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::MigrationFailed(format!("brand_profiles table: {e}")))?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS conversation_turns (
                id                TEXT PRIMARY KEY,
                conversation_id   TEXT NOT NULL,
                workspace_id      TEXT NOT NULL,
                user_id           TEXT NOT NULL,
                agent_role        TEXT NOT NULL,
                user_message      TEXT NOT NULL,
                assistant_message TEXT NOT NULL,
                created_at        TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::MigrationFailed(format!("conversation_turns table: {e}")))?;

        for (name, sql) in [
            (
                "content_sources workspace index",
                "CREATE INDEX IF NOT EXISTS idx_content_sources_ws ON content_sources(workspace_id)",
            ),
            (
                "context_entries workspace index",
                "CREATE INDEX IF NOT EXISTS idx_context_entries_ws ON context_entries(workspace_id)",
            ),
            (
                "brand_profiles workspace index",
                "CREATE INDEX IF NOT EXISTS idx_brand_profiles_ws ON brand_profiles(workspace_id)",
            ),
            (
                "conversation_turns ordering index",
                "CREATE INDEX IF NOT EXISTS idx_turns_conv_created ON conversation_turns(conversation_id, created_at)",
            ),
        ] {
            sqlx::query(sql)
                .execute(&self.pool)
                .await
                .map_err(|e| StoreError::MigrationFailed(format!("{name}: {e}")))?;
        }

        debug!("SQLite migrations complete");
        Ok(())
    }

    // ── Knowledge writes ──────────────────────────────────────────────────
    //
    // The core pipeline treats knowledge as read-only; these writers exist
    // for the ingestion side of the application and for tests.

    pub async fn add_content_source(
        &self,
        workspace: &WorkspaceId,
        title: &str,
        content: &str,
    ) -> Result<String, StoreError> {
        let id = Uuid::new_v4().to_string();
        sqlx::query(
            "INSERT INTO content_sources (id, workspace_id, title, content, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(&id)
        .bind(&workspace.0)
        .bind(title)
        .bind(content)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Storage(format!("content_sources INSERT: {e}")))?;
        Ok(id)
    }

    pub async fn add_context_entry(
        &self,
        workspace: &WorkspaceId,
        title: Option<&str>,
        content: &str,
    ) -> Result<String, StoreError> {
        let id = Uuid::new_v4().to_string();
        sqlx::query(
            "INSERT INTO context_entries (id, workspace_id, title, content, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(&id)
        .bind(&workspace.0)
        .bind(title)
        .bind(content)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Storage(format!("context_entries INSERT: {e}")))?;
        Ok(id)
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn add_brand_profile(
        &self,
        workspace: &WorkspaceId,
        name: &str,
        description: Option<&str>,
        tone_of_voice: Option<&str>,
        bio: Option<&str>,
        expertise: &[String],
    ) -> Result<String, StoreError> {
        let id = Uuid::new_v4().to_string();
        let expertise_json = serde_json::to_string(expertise)
            .map_err(|e| StoreError::Storage(format!("expertise serialization: {e}")))?;
        sqlx::query(
            "INSERT INTO brand_profiles
             (id, workspace_id, name, description, tone_of_voice, bio, expertise, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        )
        .bind(&id)
        .bind(&workspace.0)
        .bind(name)
        .bind(description)
        .bind(tone_of_voice)
        .bind(bio)
        .bind(&expertise_json)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Storage(format!("brand_profiles INSERT: {e}")))?;
        Ok(id)
    }

    // ── Row mapping ───────────────────────────────────────────────────────

    fn row_to_content_source(row: &sqlx::sqlite::SqliteRow) -> Result<KnowledgeRecord, StoreError> {
        let title: String = row
            .try_get("title")
            .map_err(|e| StoreError::QueryFailed(format!("title column: {e}")))?;
        let content: String = row
            .try_get("content")
            .map_err(|e| StoreError::QueryFailed(format!("content column: {e}")))?;
        Ok(KnowledgeRecord::content_source(title, content))
    }

    fn row_to_context_entry(row: &sqlx::sqlite::SqliteRow) -> Result<KnowledgeRecord, StoreError> {
        let title: Option<String> = row
            .try_get("title")
            .map_err(|e| StoreError::QueryFailed(format!("title column: {e}")))?;
        let content: String = row
            .try_get("content")
            .map_err(|e| StoreError::QueryFailed(format!("content column: {e}")))?;
        Ok(KnowledgeRecord::context_entry(title, content))
    }

    fn row_to_brand_profile(row: &sqlx::sqlite::SqliteRow) -> Result<KnowledgeRecord, StoreError> {
        let name: String = row
            .try_get("name")
            .map_err(|e| StoreError::QueryFailed(format!("name column: {e}")))?;
        let description: Option<String> = row
            .try_get("description")
            .map_err(|e| StoreError::QueryFailed(format!("description column: {e}")))?;
        let tone_of_voice: Option<String> = row
            .try_get("tone_of_voice")
            .map_err(|e| StoreError::QueryFailed(format!("tone_of_voice column: {e}")))?;
        let bio: Option<String> = row
            .try_get("bio")
            .map_err(|e| StoreError::QueryFailed(format!("bio column: {e}")))?;
        let expertise_json: String = row
            .try_get("expertise")
            .map_err(|e| StoreError::QueryFailed(format!("expertise column: {e}")))?;
        let expertise: Vec<String> = serde_json::from_str(&expertise_json).unwrap_or_default();

        let mut record = KnowledgeRecord::brand_profile(name).with_expertise(expertise);
        if let Some(d) = description {
            record = record.with_description(d);
        }
        if let Some(t) = tone_of_voice {
            record = record.with_tone_of_voice(t);
        }
        if let Some(b) = bio {
            record = record.with_bio(b);
        }
        Ok(record)
    }
}

#[async_trait]
impl ConfigStore for SqliteStore {
    async fn load_override(
        &self,
        workspace: &WorkspaceId,
        role: &AgentRole,
    ) -> Result<Option<String>, StoreError> {
        let row = sqlx::query(
            "SELECT config FROM agent_overrides WHERE workspace_id = ?1 AND role = ?2",
        )
        .bind(&workspace.0)
        .bind(role.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::QueryFailed(format!("agent_overrides SELECT: {e}")))?;

        row.map(|r| {
            r.try_get::<String, _>("config")
                .map_err(|e| StoreError::QueryFailed(format!("config column: {e}")))
        })
        .transpose()
    }

    async fn save_override(
        &self,
        workspace: &WorkspaceId,
        role: &AgentRole,
        config_json: &str,
    ) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO agent_overrides (workspace_id, role, config, updated_at)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(workspace_id, role) DO UPDATE SET
                config = excluded.config,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&workspace.0)
        .bind(role.as_str())
        .bind(config_json)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Storage(format!("agent_overrides UPSERT: {e}")))?;

        debug!(workspace = %workspace, role = %role, "Saved agent override");
        Ok(())
    }
}

#[async_trait]
impl KnowledgeStore for SqliteStore {
    async fn fetch_knowledge(
        &self,
        workspace: &WorkspaceId,
    ) -> Result<Vec<KnowledgeRecord>, StoreError> {
        let cap = self.knowledge_cap as i64;
        let mut records = Vec::new();

        let rows = sqlx::query(
            "SELECT title, content FROM content_sources
             WHERE workspace_id = ?1 ORDER BY created_at LIMIT ?2",
        )
        .bind(&workspace.0)
        .bind(cap)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::QueryFailed(format!("content_sources SELECT: {e}")))?;
        for row in &rows {
            records.push(Self::row_to_content_source(row)?);
        }

        let rows = sqlx::query(
            "SELECT title, content FROM context_entries
             WHERE workspace_id = ?1 ORDER BY created_at LIMIT ?2",
        )
        .bind(&workspace.0)
        .bind(cap)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::QueryFailed(format!("context_entries SELECT: {e}")))?;
        for row in &rows {
            records.push(Self::row_to_context_entry(row)?);
        }

        let rows = sqlx::query(
            "SELECT name, description, tone_of_voice, bio, expertise FROM brand_profiles
             WHERE workspace_id = ?1 ORDER BY created_at LIMIT ?2",
        )
        .bind(&workspace.0)
        .bind(cap)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::QueryFailed(format!("brand_profiles SELECT: {e}")))?;
        for row in &rows {
            records.push(Self::row_to_brand_profile(row)?);
        }

        debug!(workspace = %workspace, count = records.len(), "Fetched knowledge");
        Ok(records)
    }
}

#[async_trait]
impl TurnStore for SqliteStore {
    async fn append_turn(&self, turn: &ConversationTurn) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO conversation_turns
             (id, conversation_id, workspace_id, user_id, agent_role,
              user_message, assistant_message, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        )
        .bind(&turn.id)
        .bind(&turn.conversation_id.0)
        .bind(&turn.workspace_id.0)
        .bind(&turn.user_id.0)
        .bind(&turn.agent_role)
        .bind(&turn.user_message)
        .bind(&turn.assistant_message)
        .bind(turn.created_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Storage(format!("conversation_turns INSERT: {e}")))?;

        debug!(conversation = %turn.conversation_id, "Appended turn");
        Ok(())
    }

    async fn load_history(
        &self,
        conversation: &ConversationId,
        limit: usize,
    ) -> Result<Vec<TurnPair>, StoreError> {
        // Most recent `limit` rows, then re-sorted ascending for replay.
        let rows = sqlx::query(
            "SELECT user_message, assistant_message FROM conversation_turns
             WHERE conversation_id = ?1 ORDER BY created_at DESC LIMIT ?2",
        )
        .bind(&conversation.0)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::QueryFailed(format!("conversation_turns SELECT: {e}")))?;

        let mut pairs: Vec<TurnPair> = rows
            .iter()
            .map(|row| {
                Ok(TurnPair {
                    user: row
                        .try_get("user_message")
                        .map_err(|e| StoreError::QueryFailed(format!("user_message: {e}")))?,
                    assistant: row
                        .try_get("assistant_message")
                        .map_err(|e| StoreError::QueryFailed(format!("assistant_message: {e}")))?,
                })
            })
            .collect::<Result<_, StoreError>>()?;
        pairs.reverse();
        Ok(pairs)
    }
}
