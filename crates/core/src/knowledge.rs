//! Knowledge records — the tenant content injected into prompts.
//!
//! Three heterogeneous tables (content sources, free-form context entries,
//! brand profiles) contribute records with incompatible schemas. Rather than
//! forcing one shape, a record carries every field as optional plus a kind
//! tag; the prompt assembler renders whichever fields are present and falls
//! back to a raw dump for shapes it doesn't recognize.

use crate::error::StoreError;
use crate::tenant::WorkspaceId;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Which tenant table a record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KnowledgeKind {
    ContentSource,
    ContextEntry,
    BrandProfile,
}

/// A normalized view over one row of any knowledge table.
///
/// Invariant: a record belongs to exactly one workspace, and retrieval never
/// crosses workspace boundaries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeRecord {
    /// Source table.
    pub kind: KnowledgeKind,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tone_of_voice: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub expertise: Vec<String>,
}

impl KnowledgeRecord {
    /// A content source row: `{title, content}`.
    pub fn content_source(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            kind: KnowledgeKind::ContentSource,
            title: Some(title.into()),
            content: Some(content.into()),
            name: None,
            description: None,
            tone_of_voice: None,
            bio: None,
            expertise: Vec::new(),
        }
    }

    /// A free-form context entry: `{title?, content}`.
    pub fn context_entry(title: Option<String>, content: impl Into<String>) -> Self {
        Self {
            kind: KnowledgeKind::ContextEntry,
            title,
            content: Some(content.into()),
            name: None,
            description: None,
            tone_of_voice: None,
            bio: None,
            expertise: Vec::new(),
        }
    }

    /// A brand profile row. Descriptor fields are all optional.
    pub fn brand_profile(name: impl Into<String>) -> Self {
        Self {
            kind: KnowledgeKind::BrandProfile,
            title: None,
            content: None,
            name: Some(name.into()),
            description: None,
            tone_of_voice: None,
            bio: None,
            expertise: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_tone_of_voice(mut self, tone: impl Into<String>) -> Self {
        self.tone_of_voice = Some(tone.into());
        self
    }

    pub fn with_bio(mut self, bio: impl Into<String>) -> Self {
        self.bio = Some(bio.into());
        self
    }

    pub fn with_expertise(mut self, expertise: Vec<String>) -> Self {
        self.expertise = expertise;
        self
    }
}

/// Bounded, workspace-scoped knowledge retrieval.
///
/// The fetch is unconditional — the user's message is not used to filter or
/// rank. Per-table caps keep the downstream prompt small.
#[async_trait]
pub trait KnowledgeStore: Send + Sync {
    /// Fetch up to the per-table cap from each knowledge table, scoped
    /// strictly to `workspace`. An empty workspace yields an empty vec.
    async fn fetch_knowledge(
        &self,
        workspace: &WorkspaceId,
    ) -> std::result::Result<Vec<KnowledgeRecord>, StoreError>;
}
