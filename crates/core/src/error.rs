//! Error types for the Frontdesk domain.
//!
//! One `thiserror` enum per bounded context; callers handle the context
//! they talk to directly, there is no catch-all wrapper.

use thiserror::Error;

/// Errors from the durable store.
///
/// `NotFound` and `Conflict` are part of the CRUD contract and map to
/// 404/409 at the HTTP boundary; `Storage` covers everything the backend
/// itself failed at.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Item not found")]
    NotFound,

    #[error("Item already exists")]
    Conflict,

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Invalid response from provider: {0}")]
    InvalidResponse(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),
}

/// Errors from tool execution.
///
/// Inside the orchestration loop these are never propagated: the registry
/// converts them into structured error values fed back to the model.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("{0} is required")]
    Validation(String),

    #[error("not found")]
    NotFound,

    #[error("already exists: {0}")]
    Conflict(String),

    #[error("nothing to update")]
    NoOp,

    #[error("tool execution failed: {0}")]
    ExecutionFailed(String),
}

impl From<StoreError> for ToolError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound => ToolError::NotFound,
            StoreError::Conflict => ToolError::Conflict("item".into()),
            StoreError::Storage(msg) | StoreError::Serialization(msg) => {
                ToolError::ExecutionFailed(msg)
            }
        }
    }
}
