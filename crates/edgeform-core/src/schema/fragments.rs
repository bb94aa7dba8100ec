// ── Shared schema fragments ──
//
// Named builders for the shapes reused across resources. Source and
// destination selectors both come from `traffic_selector`, so the three
// filter fragments are identical wherever they appear.

use std::sync::LazyLock;

use super::{FieldDescriptor, Pattern, Schema};

const OCTET: &str = "([0-9]|[1-9][0-9]|1[0-9]{2}|2[0-4][0-9]|25[0-5])";

pub const PROTOCOLS: &[&str] = &["all", "tcp", "udp", "icmp", "sctp"];
pub const PORT_PROTOCOLS: &[&str] = &["tcp", "udp", "sctp"];
pub const ACTIONS: &[&str] = &["accept", "reject", "drop"];

pub const PORT_MAX: i64 = 65_535;
pub const MASK_MAX: i64 = 128;

static IPV4: LazyLock<Pattern> = LazyLock::new(|| {
    Pattern::new(
        &format!(r"^({OCTET}\.){{3}}{OCTET}$"),
        "Please, enter a valid IP address.",
    )
    .expect("built-in IPv4 pattern compiles")
});

static MAC: LazyLock<Pattern> = LazyLock::new(|| {
    Pattern::new(
        "^([a-fA-F0-9]{2}[-:]){5}([a-fA-F0-9]{2})$",
        "Please, enter a valid MAC address.",
    )
    .expect("built-in MAC pattern compiles")
});

static IMSI: LazyLock<Pattern> = LazyLock::new(|| {
    Pattern::new("^([0-9]{14,15})$", "Please, enter a valid IMSI.")
        .expect("built-in IMSI pattern compiles")
});

pub fn ipv4_pattern() -> Pattern {
    IPV4.clone()
}

pub fn mac_pattern() -> Pattern {
    MAC.clone()
}

pub fn imsi_pattern() -> Pattern {
    IMSI.clone()
}

fn ip_address() -> FieldDescriptor {
    FieldDescriptor::string("IP Address").pattern(ipv4_pattern())
}

fn mac_address() -> FieldDescriptor {
    FieldDescriptor::string("MAC Address").pattern(mac_pattern())
}

fn port(title: &str) -> FieldDescriptor {
    FieldDescriptor::number(title).range(0, PORT_MAX)
}

fn mask() -> FieldDescriptor {
    FieldDescriptor::number("Mask").range(0, MASK_MAX)
}

// ── Traffic filters ─────────────────────────────────────────────────

pub fn mac_filter() -> Schema {
    Schema::new("MAC Filter").field(
        "mac_addresses",
        FieldDescriptor::list("MAC Addresses", mac_address()),
    )
}

pub fn ip_filter() -> Schema {
    Schema::new("IP Filter")
        .field("address", ip_address())
        .field("mask", mask())
        .field("begin_port", port("Begin Port"))
        .field("end_port", port("End Port"))
        .field("protocol", FieldDescriptor::one_of("Protocol", PROTOCOLS))
        .ordered("begin_port", "end_port")
}

pub fn gtp_filter() -> Schema {
    Schema::new("GTP Filter")
        .field(
            "address",
            FieldDescriptor::string("Address").pattern(ipv4_pattern()),
        )
        .field("mask", mask())
        .field(
            "imsis",
            FieldDescriptor::list(
                "IMSIs",
                FieldDescriptor::string("IMSI").pattern(imsi_pattern()),
            ),
        )
}

/// Packet selector used for both rule source and destination.
///
/// The filters are optional and may be combined.
pub fn traffic_selector(title: &str) -> Schema {
    Schema::new(title)
        .field("description", FieldDescriptor::string("Description"))
        .field("mac_filter", FieldDescriptor::composite("MAC Filter", mac_filter()))
        .field("ip_filter", FieldDescriptor::composite("IP Filter", ip_filter()))
        .field("gtp_filter", FieldDescriptor::composite("GTP Filter", gtp_filter()))
}

// ── Traffic target ──────────────────────────────────────────────────

pub fn mac_modifier() -> Schema {
    Schema::new("MAC Modifier").field("mac_address", mac_address())
}

pub fn ip_modifier() -> Schema {
    Schema::new("IP Modifier")
        .field("address", ip_address())
        .field("port", FieldDescriptor::number("Port").range(1, PORT_MAX))
}

pub fn traffic_target() -> Schema {
    Schema::new("Target")
        .field("description", FieldDescriptor::string("Description"))
        .field(
            "action",
            FieldDescriptor::one_of("Action", ACTIONS).default_value("accept"),
        )
        .field(
            "mac_modifier",
            FieldDescriptor::composite("MAC Modifier", mac_modifier()),
        )
        .field(
            "ip_modifier",
            FieldDescriptor::composite("IP Modifier", ip_modifier()),
        )
}

pub fn traffic_rule() -> Schema {
    Schema::new("Traffic Rule")
        .field("description", FieldDescriptor::string("Description"))
        .required(
            "priority",
            FieldDescriptor::number("Priority").range(1, PORT_MAX),
        )
        .field(
            "source",
            FieldDescriptor::composite("Source", traffic_selector("Source")),
        )
        .field(
            "destination",
            FieldDescriptor::composite("Destination", traffic_selector("Destination")),
        )
        .field("target", FieldDescriptor::composite("Target", traffic_target()))
}

// ── App list entries ────────────────────────────────────────────────

pub fn port_entry() -> Schema {
    Schema::new("Port")
        .field("port", port("Port"))
        .field("protocol", FieldDescriptor::one_of("Protocol", PORT_PROTOCOLS))
}

pub fn epa_feature_entry() -> Schema {
    Schema::new("EPA Feature")
        .field("key", FieldDescriptor::string("Key"))
        .field("value", FieldDescriptor::string("Value"))
}

// ── Node ────────────────────────────────────────────────────────────

pub fn node() -> Schema {
    Schema::new("Node")
        .field("id", FieldDescriptor::string("ID").read_only())
        .required("name", FieldDescriptor::string("Name"))
        .required("location", FieldDescriptor::string("Location"))
        .required("serial", FieldDescriptor::string("Serial"))
}
