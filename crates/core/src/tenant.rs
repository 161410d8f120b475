//! Tenant-scoping identifiers.
//!
//! Every knowledge record and conversation turn is partitioned by workspace.
//! The ids are opaque strings issued by the hosting data store; newtypes keep
//! them from being swapped for one another at call sites.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The tenant-scoping unit. All knowledge and conversation data belongs to
/// exactly one workspace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorkspaceId(pub String);

impl WorkspaceId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl Default for WorkspaceId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for WorkspaceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The acting user within a workspace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub String);

impl UserId {
    pub fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn workspace_ids_are_distinct() {
        assert_ne!(WorkspaceId::new(), WorkspaceId::new());
    }

    #[test]
    fn serializes_as_plain_string() {
        let ws = WorkspaceId::from("ws_123");
        assert_eq!(serde_json::to_string(&ws).unwrap(), "\"ws_123\"");
    }
}
