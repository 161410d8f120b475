//! Shared test helpers for pipeline tests.

use async_trait::async_trait;
use notus_core::error::DispatchError;
use notus_core::{ChatClient, CompletionRequest, DispatchResult, Provider, Usage};
use std::sync::Mutex;

/// A mock client that records every request and replies with a fixed text.
pub struct ScriptedClient {
    provider: Provider,
    reply: String,
    calls: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedClient {
    pub fn new(provider: Provider, reply: &str) -> Self {
        Self {
            provider,
            reply: reply.into(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn calls(&self) -> Vec<CompletionRequest> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatClient for ScriptedClient {
    fn provider(&self) -> Provider {
        self.provider
    }

    async fn complete(
        &self,
        _api_key: &str,
        request: &CompletionRequest,
    ) -> Result<DispatchResult, DispatchError> {
        self.calls.lock().unwrap().push(request.clone());
        Ok(DispatchResult {
            text: self.reply.clone(),
            model: request.model.clone(),
            usage: Some(Usage {
                prompt_tokens: 25,
                completion_tokens: 10,
                total_tokens: 35,
            }),
        })
    }
}
