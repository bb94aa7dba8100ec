// ── Core error types ──
//
// Errors surfaced by the schema/form layer. Form edits fail with typed
// path errors rather than panicking; validation failures are carried as
// a `ValidationErrors` set. The `From<edgeform_api::Error>` impl
// translates transport-layer errors for callers that use the client directly.

use thiserror::Error;

use crate::validate::ValidationErrors;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Schema lookup ────────────────────────────────────────────────
    #[error("Unknown resource type: {name}")]
    UnknownResource { name: String },

    // ── Form edits ───────────────────────────────────────────────────
    #[error("Invalid field path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },

    #[error("Unknown field: {path}")]
    UnknownField { path: String },

    #[error("Index {index} out of range for {path} (length {len})")]
    IndexOutOfRange {
        path: String,
        index: usize,
        len: usize,
    },

    #[error("Field is read-only: {path}")]
    ReadOnlyField { path: String },

    #[error("Field {path} expects {expected}")]
    TypeMismatch { path: String, expected: String },

    #[error("Edit session is closed")]
    SessionClosed,

    // ── Submit ───────────────────────────────────────────────────────
    #[error("Validation failed with {} violation(s)", .0.len())]
    Validation(ValidationErrors),

    #[error("Serialization error: {message}")]
    Serialization { message: String },

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Controller rejected the request ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Cannot reach controller: {reason}")]
    Unreachable { reason: String },
}

impl From<ValidationErrors> for CoreError {
    fn from(errors: ValidationErrors) -> Self {
        CoreError::Validation(errors)
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        CoreError::Serialization {
            message: err.to_string(),
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<edgeform_api::Error> for CoreError {
    fn from(err: edgeform_api::Error) -> Self {
        match err {
            edgeform_api::Error::Authentication { message } => {
                CoreError::AuthenticationFailed { message }
            }
            edgeform_api::Error::Api { status, body } => CoreError::Api {
                status,
                message: body,
            },
            edgeform_api::Error::Deserialization { message, .. } => {
                CoreError::Serialization { message }
            }
            other @ (edgeform_api::Error::Transport(_)
            | edgeform_api::Error::InvalidUrl(_)
            | edgeform_api::Error::Tls(_)) => CoreError::Unreachable {
                reason: other.to_string(),
            },
        }
    }
}
