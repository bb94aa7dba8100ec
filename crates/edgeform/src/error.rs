//! CLI error types with miette diagnostics.
//!
//! Maps core, config and transport failures into user-facing errors with
//! actionable help text and stable exit codes.

use miette::Diagnostic;
use thiserror::Error;

use edgeform_config::ConfigError;
use edgeform_core::{CoreError, ErrorPayload};

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const PERMISSION: i32 = 5;
    pub const CONFLICT: i32 = 6;
    pub const CONNECTION: i32 = 7;
    pub const INVALID: i32 = 9;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not reach controller at {url}")]
    #[diagnostic(
        code(edgeform::connection_failed),
        help(
            "Check that the controller is running and accessible.\n\
             {reason}\n\
             Self-signed certificate? Try --insecure (-k) or set ca_cert in your profile."
        )
    )]
    ConnectionFailed { url: String, reason: String },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(edgeform::auth_failed),
        help("Run: edgeform login --profile {profile}")
    )]
    AuthFailed { profile: String, message: String },

    #[error("Access denied: {message}")]
    #[diagnostic(code(edgeform::forbidden))]
    Forbidden { message: String },

    // ── Resources ────────────────────────────────────────────────────
    #[error("{resource} '{path}' not found")]
    #[diagnostic(code(edgeform::not_found))]
    NotFound { resource: String, path: String },

    #[error("Conflict: {message}")]
    #[diagnostic(code(edgeform::conflict))]
    Conflict { message: String },

    // ── API ──────────────────────────────────────────────────────────
    #[error("Controller rejected the request ({status}): {message}")]
    #[diagnostic(code(edgeform::api_error))]
    ApiError { status: u16, message: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("{resource} is invalid ({count} violation(s))")]
    #[diagnostic(
        code(edgeform::invalid),
        help("Fix the fields listed above and try again.")
    )]
    Invalid { resource: String, count: usize },

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(edgeform::validation))]
    Validation { field: String, reason: String },

    #[error("Cannot edit {path}: {reason}")]
    #[diagnostic(
        code(edgeform::edit),
        help("Run: edgeform schema show {resource} to see the editable fields")
    )]
    Edit {
        resource: String,
        path: String,
        reason: String,
    },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(edgeform::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: edgeform config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No controller configured")]
    #[diagnostic(
        code(edgeform::no_config),
        help(
            "Create a profile with: edgeform config init --url <URL>\n\
             Or pass --controller / set EDGEFORM_CONTROLLER.\n\
             Expected config at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error(transparent)]
    #[diagnostic(code(edgeform::config))]
    Config(ConfigError),

    // ── IO / Serialization ────────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON payload: {0}")]
    #[diagnostic(code(edgeform::json), help("Check the JSON file contents and try again."))]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    #[diagnostic(code(edgeform::internal))]
    Internal(String),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::AuthFailed { .. } => exit_code::AUTH,
            Self::Forbidden { .. } => exit_code::PERMISSION,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Conflict { .. } => exit_code::CONFLICT,
            Self::Invalid { .. } => exit_code::INVALID,
            Self::Validation { .. } | Self::Edit { .. } => exit_code::USAGE,
            Self::Config(ConfigError::NoCredentials { .. }) => exit_code::AUTH,
            _ => exit_code::GENERAL,
        }
    }

    /// Translate a failed request against `path` into a CLI error.
    pub fn from_payload(payload: ErrorPayload, url: &str, profile: &str, path: &str) -> Self {
        match payload {
            ErrorPayload::Unreachable { reason } => Self::ConnectionFailed {
                url: url.into(),
                reason,
            },
            ErrorPayload::Server { status, .. } => {
                let message = payload.user_message().to_owned();
                match status {
                    401 => Self::AuthFailed {
                        profile: profile.into(),
                        message,
                    },
                    403 => Self::Forbidden { message },
                    404 => Self::NotFound {
                        resource: "Resource".into(),
                        path: path.into(),
                    },
                    409 => Self::Conflict { message },
                    _ => Self::ApiError { status, message },
                }
            }
        }
    }
}

// ── ConfigError → CliError mapping ──────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            other => Self::Config(other),
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::UnknownResource { name } => Self::Validation {
                field: "resource".into(),
                reason: format!(
                    "unknown resource type '{name}' (run: edgeform schema list)"
                ),
            },
            CoreError::InvalidPath { path, reason } => Self::Validation {
                field: path,
                reason,
            },
            CoreError::Serialization { message } => Self::Validation {
                field: "input".into(),
                reason: message,
            },
            CoreError::AuthenticationFailed { message } => Self::AuthFailed {
                profile: "current".into(),
                message,
            },
            CoreError::Api { status, message } => Self::ApiError { status, message },
            CoreError::Unreachable { reason } => Self::ConnectionFailed {
                url: "(controller)".into(),
                reason,
            },
            CoreError::Validation(errors) => Self::Invalid {
                resource: "Model".into(),
                count: errors.len(),
            },
            other @ (CoreError::UnknownField { .. }
            | CoreError::IndexOutOfRange { .. }
            | CoreError::ReadOnlyField { .. }
            | CoreError::TypeMismatch { .. }
            | CoreError::SessionClosed) => Self::Internal(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_statuses_map_to_exit_codes() {
        let cases = [
            (401, exit_code::AUTH),
            (403, exit_code::PERMISSION),
            (404, exit_code::NOT_FOUND),
            (409, exit_code::CONFLICT),
            (500, exit_code::GENERAL),
        ];
        for (status, code) in cases {
            let err = CliError::from_payload(
                ErrorPayload::Server {
                    status,
                    body: String::new(),
                },
                "https://edge.local",
                "default",
                "/apps/a1",
            );
            assert_eq!(err.exit_code(), code, "status {status}");
        }
    }

    #[test]
    fn empty_server_body_uses_fallback_message() {
        let err = CliError::from_payload(
            ErrorPayload::Server {
                status: 500,
                body: "  ".into(),
            },
            "https://edge.local",
            "default",
            "/apps",
        );
        assert!(
            err.to_string()
                .contains("Request failed. Please try again later.")
        );
    }

    #[test]
    fn unreachable_is_connection_error() {
        let err = CliError::from_payload(
            ErrorPayload::Unreachable {
                reason: "connection refused".into(),
            },
            "https://edge.local",
            "default",
            "/apps",
        );
        assert_eq!(err.exit_code(), exit_code::CONNECTION);
    }
}
