//! Agent config resolution: tenant override first, compiled default second.

use crate::defaults;
use notus_core::error::StoreError;
use notus_core::{AgentConfig, AgentRole, ConfigStore, WorkspaceId};
use std::sync::Arc;
use tracing::{debug, warn};

/// Resolves a role name to the configuration the pipeline should run with.
///
/// Read-only on the resolution path; the companion save goes straight
/// through the underlying `ConfigStore`.
#[derive(Clone)]
pub struct AgentRegistry {
    config_store: Arc<dyn ConfigStore>,
}

impl AgentRegistry {
    pub fn new(config_store: Arc<dyn ConfigStore>) -> Self {
        Self { config_store }
    }

    /// Resolve `(role, workspace)` to an `AgentConfig`.
    ///
    /// A present, well-formed override wins. A malformed override is logged
    /// and treated as absent — the chat turn must not fail because a tenant
    /// saved bad JSON. Unknown roles resolve to the fallback default.
    pub async fn resolve(
        &self,
        role: &AgentRole,
        workspace: &WorkspaceId,
    ) -> Result<AgentConfig, StoreError> {
        if let Some(json) = self.config_store.load_override(workspace, role).await? {
            match serde_json::from_str::<AgentConfig>(&json) {
                Ok(config) => {
                    debug!(workspace = %workspace, role = %role, "Using tenant agent override");
                    return Ok(config);
                }
                Err(e) => {
                    warn!(
                        workspace = %workspace,
                        role = %role,
                        error = %e,
                        "Malformed agent override, falling back to default"
                    );
                }
            }
        }

        Ok(defaults::default_for(role))
    }

    /// Create or replace the override for `(workspace, role)`.
    pub async fn save_override(
        &self,
        workspace: &WorkspaceId,
        role: &AgentRole,
        config: &AgentConfig,
    ) -> Result<(), StoreError> {
        let json = serde_json::to_string(config)
            .map_err(|e| StoreError::Storage(format!("override serialization: {e}")))?;
        self.config_store.save_override(workspace, role, &json).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notus_core::Provider;
    use notus_store::InMemoryStore;

    fn registry_with_store() -> (AgentRegistry, Arc<InMemoryStore>) {
        let store = Arc::new(InMemoryStore::new());
        (AgentRegistry::new(store.clone()), store)
    }

    #[tokio::test]
    async fn no_override_yields_compiled_default() {
        let (registry, _) = registry_with_store();
        let config = registry
            .resolve(
                &AgentRole::from("content_strategist"),
                &WorkspaceId::from("ws_1"),
            )
            .await
            .unwrap();
        assert_eq!(config.role.as_str(), "content_strategist");
        assert_eq!(config.provider, Provider::OpenAi);
    }

    #[tokio::test]
    async fn well_formed_override_wins() {
        let (registry, store) = registry_with_store();
        let ws = WorkspaceId::from("ws_1");
        let role = AgentRole::from("copywriter");

        let custom = AgentConfig {
            role: role.clone(),
            provider: Provider::Anthropic,
            model: "claude-sonnet-4-20250514".into(),
            prompt_template: "You are Acme's in-house copywriter.".into(),
            temperature: 0.5,
            max_tokens: 1000,
        };
        store
            .save_override(&ws, &role, &serde_json::to_string(&custom).unwrap())
            .await
            .unwrap();

        let resolved = registry.resolve(&role, &ws).await.unwrap();
        assert_eq!(resolved, custom);
    }

    #[tokio::test]
    async fn malformed_override_falls_back_silently() {
        let (registry, store) = registry_with_store();
        let ws = WorkspaceId::from("ws_1");
        let role = AgentRole::from("copywriter");

        store
            .save_override(&ws, &role, "{not valid json")
            .await
            .unwrap();

        let resolved = registry.resolve(&role, &ws).await.unwrap();
        assert_eq!(resolved.role.as_str(), "copywriter");
        assert_eq!(resolved.provider, Provider::OpenAi);
    }

    #[tokio::test]
    async fn unknown_role_resolves_to_client_consultant() {
        let (registry, _) = registry_with_store();
        let resolved = registry
            .resolve(&AgentRole::from("chief_vibes_officer"), &WorkspaceId::from("ws_1"))
            .await
            .unwrap();
        assert_eq!(resolved.role.as_str(), defaults::FALLBACK_ROLE);
    }

    #[tokio::test]
    async fn override_scoped_to_workspace() {
        let (registry, store) = registry_with_store();
        let role = AgentRole::from("copywriter");
        let w1 = WorkspaceId::from("ws_1");
        let w2 = WorkspaceId::from("ws_2");

        let custom = AgentConfig {
            role: role.clone(),
            provider: Provider::Anthropic,
            model: "claude-sonnet-4-20250514".into(),
            prompt_template: "w1 only".into(),
            temperature: 0.5,
            max_tokens: 1000,
        };
        store
            .save_override(&w1, &role, &serde_json::to_string(&custom).unwrap())
            .await
            .unwrap();

        assert_eq!(registry.resolve(&role, &w1).await.unwrap().provider, Provider::Anthropic);
        assert_eq!(registry.resolve(&role, &w2).await.unwrap().provider, Provider::OpenAi);
    }

    #[tokio::test]
    async fn save_override_roundtrips_through_registry() {
        let (registry, _) = registry_with_store();
        let ws = WorkspaceId::from("ws_1");
        let role = AgentRole::from("content_strategist");

        let custom = AgentConfig {
            role: role.clone(),
            provider: Provider::Anthropic,
            model: "claude-sonnet-4-20250514".into(),
            prompt_template: "Custom strategist".into(),
            temperature: 0.2,
            max_tokens: 800,
        };
        registry.save_override(&ws, &role, &custom).await.unwrap();

        let resolved = registry.resolve(&role, &ws).await.unwrap();
        assert_eq!(resolved, custom);
    }
}
