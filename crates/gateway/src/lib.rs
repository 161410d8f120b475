//! HTTP API gateway for notus.
//!
//! One synchronous endpoint per pipeline, each taking and returning JSON:
//!
//! - `POST /v1/chat`     — one knowledge-grounded chat turn
//! - `POST /v1/generate` — single-shot post drafting from a transcript
//! - `POST /v1/tone`     — single-shot voice profiling
//! - `PUT  /v1/workspaces/{workspace_id}/agents/{role}` — save an agent override
//! - `GET  /health`      — liveness
//!
//! Built on Axum. Configuration and provider failures surface as non-2xx
//! `{ "error": ... }` bodies; everything recoverable is absorbed upstream in
//! the pipelines.

use axum::{
    Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post, put},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::{error, info};

use notus_agents::AgentRegistry;
use notus_core::{
    AgentConfig, AgentRole, ConversationId, DispatchError, Error, UserId, WorkspaceId,
};
use notus_pipeline::{
    ChatPipeline, ChatTurnRequest, GenerateRequest, Platform, PostGenerator, ToneAnalyzer,
};
use notus_providers::{Dispatcher, EnvCredentials};
use notus_store::SqliteStore;

// ── State ─────────────────────────────────────────────────────────────────

/// Shared application state for the gateway.
pub struct GatewayState {
    pub chat: ChatPipeline,
    pub generator: PostGenerator,
    pub tone: ToneAnalyzer,
    pub registry: AgentRegistry,
}

pub type SharedState = Arc<GatewayState>;

// ── Router ────────────────────────────────────────────────────────────────

/// Build the Axum router with all gateway routes.
pub fn build_router(state: SharedState, config: &notus_config::GatewayConfig) -> Router {
    let mut cors = CorsLayer::new();
    if !config.allowed_origins.is_empty() {
        let origins: Vec<axum::http::HeaderValue> = config
            .allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        cors = cors
            .allow_origin(origins)
            .allow_methods([
                axum::http::Method::GET,
                axum::http::Method::POST,
                axum::http::Method::PUT,
            ])
            .allow_headers([axum::http::header::CONTENT_TYPE]);
    }

    Router::new()
        .route("/health", get(health_handler))
        .route("/v1/chat", post(chat_handler))
        .route("/v1/generate", post(generate_handler))
        .route("/v1/tone", post(tone_handler))
        .route(
            "/v1/workspaces/{workspace_id}/agents/{role}",
            put(save_agent_handler),
        )
        .layer(cors)
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(state)
}

/// Open the store, wire the pipelines, and serve until shutdown.
pub async fn start(config: notus_config::AppConfig) -> anyhow::Result<()> {
    let store = Arc::new(
        SqliteStore::new(&config.database.path)
            .await?
            .with_knowledge_cap(config.limits.knowledge_per_table),
    );
    let credentials = Arc::new(EnvCredentials::new());
    let dispatcher = Dispatcher::from_config(credentials, &config.providers);
    let registry = AgentRegistry::new(store.clone());

    let state = Arc::new(GatewayState {
        chat: ChatPipeline::new(
            registry.clone(),
            store.clone(),
            store.clone(),
            dispatcher.clone(),
        )
        .with_history_turns(config.limits.history_turns),
        generator: PostGenerator::new(registry.clone(), dispatcher.clone()),
        tone: ToneAnalyzer::new(registry.clone(), dispatcher),
        registry,
    });

    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("notus gateway listening on {addr}");

    axum::serve(listener, build_router(state, &config.gateway)).await?;
    Ok(())
}

// ── Request / Response types ──────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChatRequestDto {
    message: String,
    agent_type: String,
    workspace_id: String,
    user_id: String,
    conversation_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ChatResponseDto {
    response: String,
    agent_type: String,
    knowledge_used: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequestDto {
    workspace_id: String,
    platform: Platform,
    transcript: String,
    #[serde(default)]
    agent_type: Option<String>,
    #[serde(default)]
    examples: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponseDto {
    post: String,
    platform: Platform,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ToneRequestDto {
    workspace_id: String,
    posts: Vec<String>,
}

#[derive(Debug, Serialize)]
struct ErrorDto {
    error: String,
}

// ── Error mapping ─────────────────────────────────────────────────────────

/// Pipeline errors as HTTP responses: configuration failures are ours (500),
/// provider failures are upstream's (502), storage failures are ours (500).
struct ApiError(Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            Error::Dispatch(DispatchError::Provider { .. })
            | Error::Dispatch(DispatchError::Network(_)) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        error!(status = %status, error = %self.0, "Request failed");
        (
            status,
            Json(ErrorDto {
                error: self.0.to_string(),
            }),
        )
            .into_response()
    }
}

// ── Handlers ──────────────────────────────────────────────────────────────

async fn health_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn chat_handler(
    State(state): State<SharedState>,
    Json(body): Json<ChatRequestDto>,
) -> Result<Json<ChatResponseDto>, ApiError> {
    let request = ChatTurnRequest {
        workspace_id: WorkspaceId::from(&body.workspace_id),
        user_id: UserId::from(&body.user_id),
        conversation_id: ConversationId::from(&body.conversation_id),
        agent_role: AgentRole::from(&body.agent_type),
        message: body.message,
    };

    let outcome = state.chat.run(&request).await?;
    Ok(Json(ChatResponseDto {
        response: outcome.response,
        agent_type: outcome.agent_role.as_str().to_string(),
        knowledge_used: outcome.knowledge_used,
    }))
}

async fn generate_handler(
    State(state): State<SharedState>,
    Json(body): Json<GenerateRequestDto>,
) -> Result<Json<GenerateResponseDto>, ApiError> {
    let request = GenerateRequest {
        workspace_id: WorkspaceId::from(&body.workspace_id),
        platform: body.platform,
        transcript: body.transcript,
        agent_role: body.agent_type.as_deref().map(AgentRole::from),
        examples: body.examples,
    };

    let post = state.generator.generate(&request).await?;
    Ok(Json(GenerateResponseDto {
        post,
        platform: body.platform,
    }))
}

async fn tone_handler(
    State(state): State<SharedState>,
    Json(body): Json<ToneRequestDto>,
) -> Result<Json<notus_pipeline::ToneProfile>, ApiError> {
    let profile = state
        .tone
        .analyze(&WorkspaceId::from(&body.workspace_id), &body.posts)
        .await?;
    Ok(Json(profile))
}

async fn save_agent_handler(
    State(state): State<SharedState>,
    Path((workspace_id, role)): Path<(String, String)>,
    Json(config): Json<AgentConfig>,
) -> Result<StatusCode, ApiError> {
    state
        .registry
        .save_override(
            &WorkspaceId::from(&workspace_id),
            &AgentRole::from(&role),
            &config,
        )
        .await
        .map_err(Error::from)?;
    Ok(StatusCode::NO_CONTENT)
}
