//! Error types for the Wayfinder domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error variant, and each failure class
//! maps to a recovery the engine applies instead of aborting the turn.

use thiserror::Error;

/// The top-level error type for all Wayfinder operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Generation errors ---
    #[error("Generator error: {0}")]
    Generator(#[from] GeneratorError),

    // --- Classification errors ---
    #[error("Classifier error: {0}")]
    Classifier(#[from] ClassifierError),

    // --- Store errors ---
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    // --- External data errors ---
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

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
pub enum GeneratorError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError {
        status_code: u16,
        message: String,
    },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Model returned no text")]
    EmptyResponse,

    #[error("Generator not configured: {0}")]
    NotConfigured(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),
}

/// Failures of the primary classifier. All of them are recoverable: the
/// caller drops to the pattern classifier's verdict.
#[derive(Debug, Clone, Error)]
pub enum ClassifierError {
    #[error("Generation failed: {0}")]
    Generation(#[from] GeneratorError),

    #[error("No JSON object in classifier output")]
    MissingJson,

    #[error("Malformed verdict: {0}")]
    Malformed(String),

    #[error("Classification timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },
}

/// Failures while fetching external data. The affected payload kind is
/// omitted for the turn; the turn itself proceeds.
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError {
        status_code: u16,
        message: String,
    },

    #[error("Location not found: {0}")]
    LocationNotFound(String),

    #[error("No location available to fetch for")]
    NoLocation,

    #[error("Malformed response: {0}")]
    Malformed(String),

    #[error("Fetch timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Fetcher not configured: {0}")]
    NotConfigured(String),
}

#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization failed: {0}")]
    Serialization(String),
}
