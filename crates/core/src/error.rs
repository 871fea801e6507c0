//! Error types for the Wrapwright domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error variant. Only [`AgentError`]
//! ends a session; every other kind is turned into conversation data
//! that the model gets to see on its next turn.

use thiserror::Error;

/// The top-level error type, returned by the command handlers.
#[derive(Debug, Error)]
pub enum Error {
    // --- Provider errors ---
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    // --- Registry errors ---
    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    // --- Dispatch errors ---
    #[error("Dispatch error: {0}")]
    Dispatch(#[from] DispatchError),

    // --- Operator errors ---
    #[error("Operator error: {0}")]
    Operator(#[from] OperatorError),

    // --- Agent loop errors ---
    #[error("Agent error: {0}")]
    Agent(#[from] AgentError),

    // --- Configuration errors ---
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
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

    #[error("Network error: {0}")]
    Network(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

#[derive(Debug, Clone, Error)]
pub enum RegistryError {
    #[error("Wrap library unavailable at {url}: {reason}")]
    Unavailable { url: String, reason: String },

    #[error("Failed to fetch schema for wrap '{name}': {reason}")]
    SchemaFetchFailed { name: String, reason: String },

    #[error("Unknown wrap: {0}")]
    UnknownCapability(String),

    #[error("Invalid locator: {0}")]
    InvalidLocator(String),
}

#[derive(Debug, Clone, Error)]
pub enum DispatchError {
    #[error("Unknown function: {0}")]
    UnknownFunction(String),

    #[error("Invalid arguments for {function}: {reason}")]
    InvalidArguments { function: String, reason: String },
}

#[derive(Debug, Clone, Error)]
pub enum OperatorError {
    #[error("Operator input closed")]
    InputClosed,

    #[error("Operator I/O failed: {0}")]
    Io(String),
}

/// Failures that end the agent loop.
#[derive(Debug, Clone, Error)]
pub enum AgentError {
    #[error(
        "Context overflow: persistent history needs {persistent_tokens} tokens but only {budget} are available"
    )]
    ContextOverflow {
        persistent_tokens: usize,
        budget: usize,
    },

    #[error("Malformed completion: {0}")]
    MalformedCompletion(String),

    #[error("Reasoning service failed: {0}")]
    Provider(#[from] ProviderError),

    #[error("Operator unavailable: {0}")]
    Operator(#[from] OperatorError),
}
