//! Error types for the WebPilot domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error variant.
//!
//! Two failure modes are deliberately *not* errors: a model response that
//! cannot be resolved into a tool selection, and a selection naming a tool
//! that is not registered. Both are soft — the reasoning loop logs them and
//! continues with the next step, so a noisy model cannot abort a
//! long-running task. Anything raised inside a tool callback or by the
//! inference endpoint propagates to the caller of `run`.

use thiserror::Error;

/// The top-level error type for all WebPilot operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Provider errors ---
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    // --- Tool errors ---
    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    // --- Browser errors ---
    #[error("Browser error: {0}")]
    Browser(#[from] BrowserError),

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

#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Tool execution failed: {tool_name} — {reason}")]
    ExecutionFailed { tool_name: String, reason: String },

    #[error("Invalid tool arguments: {0}")]
    InvalidArguments(String),

    #[error("User prompt failed: {0}")]
    PromptFailed(String),
}

#[derive(Debug, Error)]
pub enum BrowserError {
    #[error("No browser session is open")]
    SessionNotStarted,

    #[error("Browser command failed: {action} — {reason}")]
    CommandFailed { action: String, reason: String },

    #[error("Snapshot capture failed: {0}")]
    SnapshotFailed(String),
}
