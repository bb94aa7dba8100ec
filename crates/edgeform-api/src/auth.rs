// Session token handling
//
// The controller issues a JWT from `POST /auth`; every later request
// carries it as a bearer token. The token lives in an explicit `Session`
// value handed to the client, never in ambient global state.

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::client::ControllerClient;
use crate::error::Error;

const LOGIN_PATH: &str = "/auth";

/// Client-side session state: the bearer token, if any.
///
/// Lifetime is the owning process; `clear_token` is the explicit logout.
#[derive(Debug, Clone, Default)]
pub struct Session {
    token: Option<SecretString>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: SecretString) -> Self {
        Self { token: Some(token) }
    }

    pub fn token(&self) -> Option<&SecretString> {
        self.token.as_ref()
    }

    pub fn set_token(&mut self, token: SecretString) {
        self.token = Some(token);
    }

    pub fn clear_token(&mut self) {
        self.token = None;
    }

    pub fn is_authenticated(&self) -> bool {
        is_authenticated(self.token.as_ref())
    }
}

/// Whether a token value represents an authenticated session.
///
/// A missing or empty token is unauthenticated; nothing else is inspected.
pub fn is_authenticated(token: Option<&SecretString>) -> bool {
    token.is_some_and(|t| !t.expose_secret().is_empty())
}

#[derive(Deserialize)]
struct LoginResponse {
    token: Option<String>,
}

impl ControllerClient {
    /// Authenticate with the controller and store the issued token.
    ///
    /// Returns the token so the caller can persist it (keyring, config).
    pub async fn login(&self, username: &str, password: &SecretString) -> Result<SecretString, Error> {
        let url = self.url(LOGIN_PATH)?;
        debug!("logging in at {}", url);

        let body = json!({
            "username": username,
            "password": password.expose_secret(),
        });

        let resp = self
            .http()
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(Error::Transport)?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Authentication {
                message: format!("login failed (HTTP {status}): {body}"),
            });
        }

        let body = resp.text().await.map_err(Error::Transport)?;
        let parsed: LoginResponse =
            serde_json::from_str(&body).map_err(|e| Error::Deserialization {
                message: e.to_string(),
                body: body.clone(),
            })?;

        let token = parsed
            .token
            .filter(|t| !t.is_empty())
            .map(SecretString::from)
            .ok_or_else(|| Error::Authentication {
                message: "login response did not contain a token".into(),
            })?;

        self.set_token(token.clone());
        debug!("login successful");
        Ok(token)
    }

    /// Drop the session token. The controller keeps no server-side session.
    pub fn logout(&self) {
        self.clear_token();
        debug!("session token cleared");
    }
}
