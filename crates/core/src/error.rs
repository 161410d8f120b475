//! Error types for the notus domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error variant.

use thiserror::Error;

/// The top-level error type for all notus operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Dispatch errors ---
    #[error("Dispatch error: {0}")]
    Dispatch(#[from] DispatchError),

    // --- Store errors ---
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // --- Generic ---
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

/// Errors raised by the model dispatcher.
///
/// A missing API key is a configuration failure detected before any HTTP
/// traffic; everything else maps to the single outbound provider call.
#[derive(Debug, Clone, Error)]
pub enum DispatchError {
    #[error("no API key configured for provider '{provider}' (set {env_var})")]
    MissingApiKey { provider: String, env_var: String },

    #[error("provider request failed: {body} (status: {status})")]
    Provider { status: u16, body: String },

    #[error("network error: {0}")]
    Network(String),

    #[error("malformed provider response: {0}")]
    MalformedResponse(String),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage error: {0}")]
    Storage(String),

    #[error("query failed: {0}")]
    QueryFailed(String),

    #[error("migration failed: {0}")]
    MigrationFailed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dispatch_error_displays_correctly() {
        let err = Error::Dispatch(DispatchError::Provider {
            status: 429,
            body: "Too many requests".into(),
        });
        assert!(err.to_string().contains("429"));
        assert!(err.to_string().contains("Too many requests"));
    }

    #[test]
    fn missing_key_names_env_var() {
        let err = DispatchError::MissingApiKey {
            provider: "openai".into(),
            env_var: "OPENAI_API_KEY".into(),
        };
        assert!(err.to_string().contains("OPENAI_API_KEY"));
    }

    #[test]
    fn store_error_displays_correctly() {
        let err = Error::Store(StoreError::QueryFailed("no such table".into()));
        assert!(err.to_string().contains("no such table"));
    }
}
