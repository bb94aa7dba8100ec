//! App command handlers.
//!
//! `apps create` maps its flags onto the form engine: each scalar flag is a
//! field edit, and every `--port` / `--feature` after the first appends a
//! list entry before filling it in.

use edgeform_core::{EditSession, FieldPath, ResourceType};

use crate::cli::{AppCreateArgs, AppsArgs, AppsCommand, GlobalOpts};
use crate::config;
use crate::error::CliError;

use super::util;

const RESOURCE: ResourceType = ResourceType::App;

/// Apply the named create flags, then the `--port` / `--feature` entries.
fn apply_flags(session: &EditSession<'_>, args: &AppCreateArgs) -> Result<(), CliError> {
    let scalars = [
        ("name", &args.name),
        ("type", &args.app_type),
        ("version", &args.app_version),
        ("vendor", &args.vendor),
        ("description", &args.description),
        ("cores", &args.cores),
        ("memory", &args.memory),
        ("source", &args.source),
    ];
    for (field, value) in scalars {
        if let Some(value) = value {
            util::assign(session, RESOURCE, &FieldPath::root().field(field), value)?;
        }
    }

    let ports = FieldPath::root().field("ports");
    for (i, raw) in args.ports.iter().enumerate() {
        let (port, protocol) = match raw.split_once('/') {
            Some((port, protocol)) => (port, Some(protocol)),
            None => (raw.as_str(), None),
        };
        set_entry(session, &ports, i, "port", port)?;
        if let Some(protocol) = protocol {
            set_entry(session, &ports, i, "protocol", &protocol.to_ascii_lowercase())?;
        }
    }

    let features = FieldPath::root().field("epafeatures");
    for (i, raw) in args.features.iter().enumerate() {
        let (key, value) = raw.split_once('=').ok_or_else(|| CliError::Validation {
            field: "feature".into(),
            reason: format!("expected KEY=VALUE, got '{raw}'"),
        })?;
        set_entry(session, &features, i, "key", key)?;
        set_entry(session, &features, i, "value", value)?;
    }

    Ok(())
}

fn set_entry(
    session: &EditSession<'_>,
    list: &FieldPath,
    index: usize,
    field: &str,
    raw: &str,
) -> Result<(), CliError> {
    util::assign(session, RESOURCE, &list.index(index).field(field), raw)
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(args: AppsArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        AppsCommand::Create(create) => {
            let session = util::create_session(RESOURCE, &create.edit)?;
            apply_flags(&session, &create)?;
            util::apply_assignments(&session, RESOURCE, &create.edit.set)?;

            if create.edit.dry_run {
                return util::preview(&session, RESOURCE, global);
            }
            let conn = config::connect(global)?;
            util::submit(&session, &conn, RESOURCE, global).await
        }

        AppsCommand::Show { id } => {
            let conn = config::connect(global)?;
            util::show(&conn, &resource_path(&id)?, global).await
        }

        AppsCommand::Update { id, edit } => {
            let conn = config::connect(global)?;
            let session = util::update_session(&conn, RESOURCE, &resource_path(&id)?, &edit).await?;
            if edit.dry_run {
                return util::preview(&session, RESOURCE, global);
            }
            util::submit(&session, &conn, RESOURCE, global).await
        }
    }
}

fn resource_path(id: &str) -> Result<String, CliError> {
    RESOURCE
        .resource_path(id)
        .ok_or_else(|| CliError::Internal(format!("{RESOURCE} has no endpoint")))
}
