//! Login / logout handlers.
//!
//! The controller issues a bearer token on `POST /auth`; it is kept in the
//! system keyring under the active profile and picked up by later commands.

use dialoguer::{Input, Password};
use secrecy::{ExposeSecret, SecretString};
use tracing::{info, warn};

use crate::cli::{GlobalOpts, LoginArgs};
use crate::config::{self, load_config_or_default};
use crate::error::CliError;
use crate::output;

/// Map a dialoguer / interactive I/O failure into CliError.
pub fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

pub async fn login(args: LoginArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let cfg = load_config_or_default();
    let profile_name = config::active_profile_name(global, &cfg);
    let conn = config::connect(global)?;

    let username = match args
        .username
        .or_else(|| cfg.profiles.get(&profile_name).and_then(|p| p.username.clone()))
    {
        Some(username) => username,
        None => Input::new()
            .with_prompt("Username")
            .interact_text()
            .map_err(prompt_err)?,
    };

    let password = match args.password {
        Some(password) => SecretString::from(password),
        None => SecretString::from(
            Password::new()
                .with_prompt("Password")
                .interact()
                .map_err(prompt_err)?,
        ),
    };

    if username.is_empty() || password.expose_secret().is_empty() {
        return Err(CliError::Validation {
            field: "credentials".into(),
            reason: "username and password cannot be empty".into(),
        });
    }

    let token = conn.client.login(&username, &password).await.map_err(|e| {
        CliError::from_payload(e.into(), conn.url.as_str(), &conn.profile, "/auth")
    })?;

    if let Err(e) = edgeform_config::store_token(&conn.profile, token.expose_secret()) {
        warn!(profile = %conn.profile, "could not store token: {e}");
        return Err(CliError::Config(e));
    }
    info!(profile = %conn.profile, user = %username, "logged in");

    if !global.quiet {
        eprintln!(
            "{}",
            output::status_line(
                true,
                &format!("Logged in to {} as {username}", conn.url),
                output::should_color(global.color),
            )
        );
    }
    Ok(())
}

pub fn logout(global: &GlobalOpts) -> Result<(), CliError> {
    let cfg = load_config_or_default();
    let profile_name = config::active_profile_name(global, &cfg);
    edgeform_config::delete_token(&profile_name)?;

    if !global.quiet {
        eprintln!(
            "{}",
            output::status_line(
                true,
                &format!("Removed stored token for profile '{profile_name}'"),
                output::should_color(global.color),
            )
        );
    }
    Ok(())
}
