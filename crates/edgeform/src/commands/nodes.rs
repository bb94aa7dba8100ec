//! Node command handlers.

use tabled::Tabled;

use edgeform_core::model::{Node, Nodes, interface_policy_path};
use edgeform_core::{FormEngine, FormModel, ResourceType, Transport, schema};

use crate::cli::{GlobalOpts, NodesArgs, NodesCommand};
use crate::config::{self, Connection};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct NodeRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Location")]
    location: String,
    #[tabled(rename = "Serial")]
    serial: String,
}

impl From<&Node> for NodeRow {
    fn from(n: &Node) -> Self {
        Self {
            id: n.id.clone().unwrap_or_default(),
            name: n.name.clone(),
            location: n.location.clone(),
            serial: n.serial.clone(),
        }
    }
}

/// The node collection, whether the controller wraps it in `{nodes}` or not.
async fn fetch_nodes(conn: &Connection) -> Result<Nodes, CliError> {
    let path = ResourceType::Nodes.collection_path().unwrap_or("/nodes");
    let raw = conn
        .client
        .get_json(path)
        .await
        .map_err(|e| CliError::from_payload(e.into(), conn.url.as_str(), &conn.profile, path))?;
    let wrapped = if raw.is_array() {
        serde_json::json!({ "nodes": raw })
    } else {
        raw
    };
    let model: FormModel = FormEngine::new(schema(ResourceType::Nodes)).from_resource(&wrapped)?;
    Ok(Nodes::try_from(&model)?)
}

fn resource_path(id: &str) -> Result<String, CliError> {
    ResourceType::Node
        .resource_path(id)
        .ok_or_else(|| CliError::Internal("nodes have no endpoint".into()))
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(args: NodesArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        NodesCommand::List => {
            let conn = config::connect(global)?;
            let nodes = fetch_nodes(&conn).await?;
            let out = output::render_list(
                global.output,
                &nodes.nodes,
                |n| NodeRow::from(n),
                |n| n.id.clone().unwrap_or_else(|| n.name.clone()),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        NodesCommand::Show { id } => {
            let conn = config::connect(global)?;
            util::show(&conn, &resource_path(&id)?, global).await
        }

        NodesCommand::Update { id, edit } => {
            let conn = config::connect(global)?;
            let session =
                util::update_session(&conn, ResourceType::Node, &resource_path(&id)?, &edit).await?;
            if edit.dry_run {
                return util::preview(&session, ResourceType::Node, global);
            }
            util::submit(&session, &conn, ResourceType::Node, global).await
        }

        NodesCommand::Policy { node, interface } => {
            let conn = config::connect(global)?;
            let path = interface_policy_path(&node, &interface);
            let policy = conn
                .client
                .fetch_resource(&path)
                .await
                .map_err(|p| CliError::from_payload(p, conn.url.as_str(), &conn.profile, &path))?;
            let policy = FormEngine::new(schema(ResourceType::NodeInterfacePolicy))
                .from_resource(&policy.to_json())?;
            output::print_output(&output::render_model(global.output, &policy), global.quiet);
            Ok(())
        }
    }
}
