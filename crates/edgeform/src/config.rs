//! CLI configuration: a thin wrapper around `edgeform_config` shared types.
//!
//! Adds CLI-specific resolution that respects `GlobalOpts` flag overrides
//! (--controller, --token, --insecure, --timeout).

use std::time::Duration;

use secrecy::SecretString;
use tracing::debug;
use url::Url;

use edgeform_api::{ControllerClient, Session, TlsMode, TransportConfig};

use crate::cli::GlobalOpts;
use crate::error::CliError;

pub use edgeform_config::{
    Config, Profile, config_path, load_config_or_default, save_config,
};

/// Profile settings after flag overrides.
pub struct Resolved {
    pub profile: Profile,
    pub name: String,
    pub url: Url,
    pub transport: TransportConfig,
}

/// Everything a command needs to talk to one controller.
pub struct Connection {
    pub client: ControllerClient,
    pub profile: String,
    pub url: Url,
}

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    config.profile_name(global.profile.as_deref())
}

/// Resolve controller URL, TLS, timeout and token for the active profile.
///
/// Flags win over the profile. A missing token is not an error here: the
/// controller answers 401 and the command reports it with a login hint.
pub fn resolve(global: &GlobalOpts, config: &Config) -> Result<Resolved, CliError> {
    let name = active_profile_name(global, config);

    let profile = match config.profiles.get(&name) {
        Some(profile) => profile.clone(),
        None if global.controller.is_some() => Profile::default(),
        None if global.profile.is_some() => {
            let mut names: Vec<_> = config.profiles.keys().cloned().collect();
            names.sort();
            return Err(CliError::ProfileNotFound {
                name,
                available: if names.is_empty() {
                    "(none)".into()
                } else {
                    names.join(", ")
                },
            });
        }
        None => {
            return Err(CliError::NoConfig {
                path: config_path().display().to_string(),
            });
        }
    };

    let url_str = global.controller.as_deref().unwrap_or(&profile.controller);
    if url_str.trim().is_empty() {
        return Err(CliError::NoConfig {
            path: config_path().display().to_string(),
        });
    }
    let url: Url = url_str.parse().map_err(|_| CliError::Validation {
        field: "controller".into(),
        reason: format!("invalid URL: {url_str}"),
    })?;

    let mut transport = edgeform_config::profile_to_transport_config(&profile, &config.defaults);
    if global.insecure {
        transport.tls = TlsMode::DangerAcceptInvalid;
    }
    if let Some(seconds) = global.timeout {
        transport.timeout = Duration::from_secs(seconds);
    }

    Ok(Resolved {
        profile,
        name,
        url,
        transport,
    })
}

/// Build an API client for the active profile.
pub fn connect(global: &GlobalOpts) -> Result<Connection, CliError> {
    let config = load_config_or_default();
    let Resolved {
        profile,
        name,
        url,
        transport,
    } = resolve(global, &config)?;

    let session = match global.token.as_deref() {
        Some(token) => Session::with_token(SecretString::from(token.to_owned())),
        None => match edgeform_config::resolve_token(&profile, &name) {
            Ok(token) => Session::with_token(token),
            Err(e) => {
                debug!(profile = %name, "no stored token: {e}");
                Session::new()
            }
        },
    };

    let client = ControllerClient::new(url.clone(), session, &transport).map_err(|e| {
        CliError::ConnectionFailed {
            url: url.to_string(),
            reason: e.to_string(),
        }
    })?;

    Ok(Connection {
        client,
        profile: name,
        url,
    })
}
