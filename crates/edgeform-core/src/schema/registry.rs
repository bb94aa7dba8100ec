// Static catalog of resource schemas, built once on first use.

use std::sync::LazyLock;

use super::fragments::{epa_feature_entry, node, port_entry, traffic_rule};
use super::{FieldDescriptor, ResourceType, Schema};

struct Registry {
    node: Schema,
    nodes: Schema,
    node_interface_policy: Schema,
    app: Schema,
    traffic_policy: Schema,
}

static REGISTRY: LazyLock<Registry> = LazyLock::new(|| Registry {
    node: node(),
    nodes: Schema::new("Nodes").field(
        "nodes",
        FieldDescriptor::list("Nodes", FieldDescriptor::composite("Node", node())),
    ),
    node_interface_policy: Schema::new("Node Interface Policy")
        .field("id", FieldDescriptor::string("ID").read_only()),
    app: app(),
    traffic_policy: traffic_policy(),
});

/// The schema for `resource`.
pub fn schema(resource: ResourceType) -> &'static Schema {
    let registry = &*REGISTRY;
    match resource {
        ResourceType::Node => &registry.node,
        ResourceType::Nodes => &registry.nodes,
        ResourceType::NodeInterfacePolicy => &registry.node_interface_policy,
        ResourceType::App => &registry.app,
        ResourceType::TrafficPolicy => &registry.traffic_policy,
    }
}

fn app() -> Schema {
    Schema::new("App")
        .field("id", FieldDescriptor::string("ID").read_only())
        .required("name", FieldDescriptor::string("Name"))
        .required("type", FieldDescriptor::one_of("Type", &["container", "vm"]))
        .required("version", FieldDescriptor::string("Version"))
        .required("vendor", FieldDescriptor::string("Vendor"))
        .field("description", FieldDescriptor::string("Description"))
        .required("cores", FieldDescriptor::number("Cores").range(1, 8))
        .required("memory", FieldDescriptor::number("Memory (MB)").range(1, 16_384))
        .required("source", FieldDescriptor::string("Source"))
        .field(
            "ports",
            FieldDescriptor::dynamic_list("Ports", FieldDescriptor::composite("Port", port_entry())),
        )
        .field(
            "epafeatures",
            FieldDescriptor::dynamic_list(
                "EPA Features",
                FieldDescriptor::composite("EPA Feature", epa_feature_entry()),
            ),
        )
}

fn traffic_policy() -> Schema {
    Schema::new("Traffic Policy")
        .field("id", FieldDescriptor::string("ID").read_only())
        .required("name", FieldDescriptor::string("Name"))
        .required(
            "traffic_rules",
            FieldDescriptor::list(
                "Traffic Rules",
                FieldDescriptor::composite("Traffic Rule", traffic_rule()),
            ),
        )
}
