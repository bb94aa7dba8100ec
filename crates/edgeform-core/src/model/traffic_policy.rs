// ── Traffic policy wire types ──

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrafficPolicy {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub traffic_rules: Vec<TrafficRule>,
}

/// One prioritized match-and-act entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrafficRule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub priority: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<TrafficSelector>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<TrafficSelector>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<TrafficTarget>,
}

/// Source or destination match. Filters combine; any may be absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrafficSelector {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mac_filter: Option<MacFilter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip_filter: Option<IpFilter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gtp_filter: Option<GtpFilter>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MacFilter {
    #[serde(default)]
    pub mac_addresses: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Protocol {
    #[default]
    All,
    Tcp,
    Udp,
    Icmp,
    Sctp,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IpFilter {
    pub address: String,
    pub mask: u8,
    pub begin_port: u16,
    pub end_port: u16,
    pub protocol: Protocol,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GtpFilter {
    pub address: String,
    pub mask: u8,
    pub imsis: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Action {
    #[default]
    Accept,
    Reject,
    Drop,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrafficTarget {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub action: Action,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mac_modifier: Option<MacModifier>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip_modifier: Option<IpModifier>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MacModifier {
    pub mac_address: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IpModifier {
    pub address: String,
    pub port: u16,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::error::CoreError;
    use crate::form::{FieldPath, FormEngine, FormModel};
    use crate::schema::{ResourceType, schema};
    use crate::validate::validate;

    fn path(s: &str) -> FieldPath {
        s.parse().unwrap()
    }

    #[test]
    fn default_policy_validates_and_serializes_to_wire_shape() {
        let schema = schema(ResourceType::TrafficPolicy);
        let engine = FormEngine::new(schema);

        let model = engine.new_model();
        let model = engine.set_scalar_field(&model, &path("name"), "default").unwrap();
        let model = engine.append_list_entry(&model, &path("traffic_rules")).unwrap();
        let model = engine
            .set_list_entry_field(&model, &path("traffic_rules"), 0, "priority", "10")
            .unwrap();
        let model = engine
            .set_scalar_field(&model, &path("traffic_rules[0].target.action"), "accept")
            .unwrap();

        assert_eq!(validate(schema, &model), Ok(()));

        let policy = TrafficPolicy::try_from(&model).unwrap();
        assert_eq!(
            serde_json::to_value(&policy).unwrap(),
            json!({
                "name": "default",
                "traffic_rules": [{ "priority": 10, "target": { "action": "accept" } }]
            })
        );
    }

    #[test]
    fn populated_filters_keep_full_shape() {
        let model = FormModel::from_json(&json!({
            "id": "tp-1",
            "name": "steer",
            "traffic_rules": [{
                "priority": 100,
                "source": { "ip_filter": { "address": "10.0.0.0", "mask": 8, "protocol": "tcp" } },
                "destination": { "gtp_filter": { "address": "10.1.0.0", "imsis": ["001011234567890"] } },
                "target": { "action": "drop", "ip_modifier": { "address": "10.9.9.9", "port": 80 } }
            }]
        }))
        .unwrap();

        let policy = TrafficPolicy::try_from(&model).unwrap();
        assert_eq!(
            serde_json::to_value(&policy).unwrap(),
            json!({
                "id": "tp-1",
                "name": "steer",
                "traffic_rules": [{
                    "priority": 100,
                    "source": { "ip_filter": {
                        "address": "10.0.0.0", "mask": 8, "begin_port": 0, "end_port": 0, "protocol": "tcp"
                    } },
                    "destination": { "gtp_filter": {
                        "address": "10.1.0.0", "mask": 0, "imsis": ["001011234567890"]
                    } },
                    "target": { "action": "drop", "ip_modifier": { "address": "10.9.9.9", "port": 80 } }
                }]
            })
        );
    }

    #[test]
    fn out_of_type_range_is_a_serialization_error() {
        let model = FormModel::from_json(&json!({
            "name": "p",
            "traffic_rules": [{ "priority": 70000 }]
        }))
        .unwrap();

        let err = TrafficPolicy::try_from(&model).unwrap_err();
        assert!(matches!(err, CoreError::Serialization { .. }));
    }

    #[test]
    fn enums_parse_from_cli_text() {
        assert_eq!("sctp".parse::<Protocol>().unwrap(), Protocol::Sctp);
        assert_eq!(Action::default().to_string(), "accept");
    }
}
