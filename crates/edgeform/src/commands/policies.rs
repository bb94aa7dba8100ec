//! Traffic policy command handlers.

use edgeform_core::ResourceType;

use crate::cli::{GlobalOpts, PoliciesArgs, PoliciesCommand};
use crate::config;
use crate::error::CliError;

use super::util;

const RESOURCE: ResourceType = ResourceType::TrafficPolicy;

pub async fn handle(args: PoliciesArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        PoliciesCommand::Create { edit } => {
            if edit.from_file.is_none() && edit.set.is_empty() {
                return Err(CliError::Validation {
                    field: "policy".into(),
                    reason: "nothing to create: pass --from-file and/or --set".into(),
                });
            }
            let session = util::create_session(RESOURCE, &edit)?;
            util::apply_assignments(&session, RESOURCE, &edit.set)?;

            if edit.dry_run {
                return util::preview(&session, RESOURCE, global);
            }
            let conn = config::connect(global)?;
            util::submit(&session, &conn, RESOURCE, global).await
        }

        PoliciesCommand::Show { id } => {
            let conn = config::connect(global)?;
            util::show(&conn, &resource_path(&id)?, global).await
        }

        PoliciesCommand::Update { id, edit } => {
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
