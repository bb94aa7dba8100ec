// Controller REST client
//
// Wraps `reqwest::Client` with base-URL path joining, bearer-token
// injection from the `Session`, and uniform response decoding. Payloads
// stay as `serde_json::Value`; typing happens in `edgeform-core`.

use std::sync::RwLock;

use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use tracing::{debug, trace};
use url::Url;

use crate::auth::Session;
use crate::error::Error;
use crate::transport::TransportConfig;

/// Raw HTTP client for the controller's REST API.
///
/// All methods return the decoded JSON body. An empty body decodes to
/// `Value::Null` (the controller answers some PATCH requests with nothing).
pub struct ControllerClient {
    http: reqwest::Client,
    base_url: Url,
    session: RwLock<Session>,
}

impl ControllerClient {
    /// Create a new client from a `TransportConfig`.
    ///
    /// `base_url` is the controller API root (e.g. `https://controller:8080`).
    pub fn new(base_url: Url, session: Session, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self::with_client(http, base_url, session))
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url, session: Session) -> Self {
        Self {
            http,
            base_url,
            session: RwLock::new(session),
        }
    }

    /// The underlying HTTP client (for auth flows that need direct access).
    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// The controller base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── Session management ──────────────────────────────────────────

    /// A copy of the current session state.
    pub fn session(&self) -> Session {
        self.session.read().expect("session lock poisoned").clone()
    }

    pub fn set_token(&self, token: SecretString) {
        self.session
            .write()
            .expect("session lock poisoned")
            .set_token(token);
    }

    pub fn clear_token(&self) {
        self.session
            .write()
            .expect("session lock poisoned")
            .clear_token();
    }

    pub fn is_authenticated(&self) -> bool {
        self.session
            .read()
            .expect("session lock poisoned")
            .is_authenticated()
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// Build a full URL for an API path: `{base}{path}`.
    ///
    /// Any path prefix on the base URL is preserved.
    pub(crate) fn url(&self, path: &str) -> Result<Url, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let path = path.trim_start_matches('/');
        Ok(Url::parse(&format!("{base}/{path}"))?)
    }

    // ── Requests ─────────────────────────────────────────────────────

    /// `GET {path}` and decode the JSON body.
    pub async fn get_json(&self, path: &str) -> Result<Value, Error> {
        let url = self.url(path)?;
        debug!("GET {}", url);
        self.send(self.http.get(url)).await
    }

    /// `POST {path}` with a JSON body.
    pub async fn post_json(&self, path: &str, body: &Value) -> Result<Value, Error> {
        let url = self.url(path)?;
        debug!("POST {}", url);
        self.send(self.http.post(url).json(body)).await
    }

    /// `PATCH {path}` with a JSON body.
    pub async fn patch_json(&self, path: &str, body: &Value) -> Result<Value, Error> {
        let url = self.url(path)?;
        debug!("PATCH {}", url);
        self.send(self.http.patch(url).json(body)).await
    }

    /// Apply the bearer token, send, and decode.
    async fn send(&self, builder: reqwest::RequestBuilder) -> Result<Value, Error> {
        let builder = match self.bearer() {
            Some(token) => builder.bearer_auth(token.expose_secret()),
            None => builder,
        };

        let resp = builder.send().await.map_err(Error::Transport)?;
        Self::decode(resp).await
    }

    fn bearer(&self) -> Option<SecretString> {
        self.session
            .read()
            .expect("session lock poisoned")
            .token()
            .cloned()
    }

    async fn decode(resp: reqwest::Response) -> Result<Value, Error> {
        let status = resp.status();

        if status == reqwest::StatusCode::UNAUTHORIZED {
            let body = resp.text().await.unwrap_or_default();
            let message = match body.trim() {
                "" => "session expired or invalid token".to_owned(),
                text => text.to_owned(),
            };
            return Err(Error::Authentication { message });
        }

        let body = resp.text().await.map_err(Error::Transport)?;

        if !status.is_success() {
            return Err(Error::Api {
                status: status.as_u16(),
                body: body.trim().to_owned(),
            });
        }

        if body.trim().is_empty() {
            trace!("empty response body");
            return Ok(Value::Null);
        }

        serde_json::from_str(&body).map_err(|e| {
            let preview: String = body.chars().take(200).collect();
            Error::Deserialization {
                message: format!("{e} (body preview: {preview:?})"),
                body: body.clone(),
            }
        })
    }
}
