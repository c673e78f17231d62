use thiserror::Error;

// ── Error codes ─────────────────────────────────────────────────────
//
// Stable, machine-readable identifiers. Presentation code matches on
// these, never on the human-readable message string.

pub mod error_code {
    pub const NOT_FOUND: &str = "NOT_FOUND";
    pub const API_ERROR: &str = "API_ERROR";
    pub const CHANNEL_ERROR: &str = "CHANNEL_ERROR";
    pub const VALIDATION_FAILED: &str = "VALIDATION_FAILED";
    pub const INTERNAL: &str = "INTERNAL";
}

// ── ClientError ─────────────────────────────────────────────────────

/// Unified client error surfaced to presentation code.
///
/// Each variant maps to a stable error code (see [`error_code`]). The
/// `Display` output is the message shown to the user.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// Target entity is not in local state.
    #[error("{0}")]
    NotFound(String),

    /// REST call failed (network, non-2xx, malformed body).
    #[error("{0}")]
    Api(String),

    /// Live channel failure.
    #[error("{0}")]
    Channel(String),

    /// Caller supplied incomplete input.
    #[error("{0}")]
    Validation(String),

    /// Unexpected internal error.
    #[error("{0}")]
    Internal(String),
}

impl ClientError {
    /// Stable, machine-readable error code.
    pub fn error_code(&self) -> &'static str {
        match self {
            ClientError::NotFound(_) => error_code::NOT_FOUND,
            ClientError::Api(_) => error_code::API_ERROR,
            ClientError::Channel(_) => error_code::CHANNEL_ERROR,
            ClientError::Validation(_) => error_code::VALIDATION_FAILED,
            ClientError::Internal(_) => error_code::INTERNAL,
        }
    }
}
