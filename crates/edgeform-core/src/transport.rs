// ── Collaborator seams ──
//
// The core never performs I/O itself. Persistence goes through a
// `Transport`, user-facing feedback through a `Notifier`. The
// `ControllerClient` from `edgeform-api` is the production `Transport`.

use std::future::Future;

use edgeform_api::ControllerClient;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::form::FormModel;

/// Shown when the server supplied no message of its own.
pub const FALLBACK_MESSAGE: &str = "Request failed. Please try again later.";

/// Why a transport request failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ErrorPayload {
    /// The server answered with an error status.
    #[error("controller returned {status}: {body}")]
    Server { status: u16, body: String },

    /// No usable answer: network failure, TLS, or an unreadable body.
    #[error("request failed: {reason}")]
    Unreachable { reason: String },
}

impl ErrorPayload {
    /// The text to show the user: the server's message when it sent one.
    pub fn user_message(&self) -> &str {
        match self {
            Self::Server { body, .. } if !body.trim().is_empty() => body,
            Self::Server { .. } | Self::Unreachable { .. } => FALLBACK_MESSAGE,
        }
    }
}

impl From<edgeform_api::Error> for ErrorPayload {
    fn from(err: edgeform_api::Error) -> Self {
        match err {
            edgeform_api::Error::Api { status, body } => Self::Server { status, body },
            edgeform_api::Error::Authentication { message } => Self::Server {
                status: 401,
                body: message,
            },
            other => Self::Unreachable {
                reason: other.to_string(),
            },
        }
    }
}

// ── Transport ───────────────────────────────────────────────────────

/// Resource persistence.
pub trait Transport: Send + Sync {
    fn fetch_resource(
        &self,
        path: &str,
    ) -> impl Future<Output = Result<FormModel, ErrorPayload>> + Send;

    fn create_resource(
        &self,
        path: &str,
        model: &FormModel,
    ) -> impl Future<Output = Result<FormModel, ErrorPayload>> + Send;

    fn update_resource(
        &self,
        path: &str,
        model: &FormModel,
    ) -> impl Future<Output = Result<FormModel, ErrorPayload>> + Send;
}

impl Transport for ControllerClient {
    async fn fetch_resource(&self, path: &str) -> Result<FormModel, ErrorPayload> {
        let value = self.get_json(path).await?;
        match value {
            Value::Object(_) => FormModel::from_json(&value).map_err(|e| ErrorPayload::Unreachable {
                reason: e.to_string(),
            }),
            other => Err(ErrorPayload::Unreachable {
                reason: format!("expected a JSON object from {path}, got {other}"),
            }),
        }
    }

    async fn create_resource(&self, path: &str, model: &FormModel) -> Result<FormModel, ErrorPayload> {
        let saved = self.post_json(path, &model.to_json()).await?;
        Ok(echo_or_saved(model, &saved))
    }

    async fn update_resource(&self, path: &str, model: &FormModel) -> Result<FormModel, ErrorPayload> {
        let saved = self.patch_json(path, &model.to_json()).await?;
        Ok(echo_or_saved(model, &saved))
    }
}

/// The controller may answer a write with the stored object or with nothing.
fn echo_or_saved(sent: &FormModel, saved: &Value) -> FormModel {
    match saved {
        Value::Object(_) => FormModel::from_json(saved).unwrap_or_else(|_| sent.clone()),
        _ => {
            debug!("write returned no object; keeping submitted model");
            sent.clone()
        }
    }
}

// ── Notifier ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Error,
}

/// Fire-and-forget user feedback.
pub trait Notifier: Send + Sync {
    fn notify(&self, message: &str, severity: Severity);
}

/// Routes notifications into the tracing pipeline.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, message: &str, severity: Severity) {
        match severity {
            Severity::Success => info!("{message}"),
            Severity::Error => warn!("{message}"),
        }
    }
}
