// ── Submit-time validation ──
//
// Checks a completed model against its schema and collects every
// violation in one pass, so all errors can be shown at once. Optional
// parts that were never filled in (empty values, empty composites) are
// skipped rather than defaulted.

use std::fmt;

use serde::Serialize;
use strum::Display;

use crate::form::{FieldPath, FormModel, FormValue, Numeric};
use crate::schema::{FieldDescriptor, FieldKind, RecordCheck, Scalar, ScalarKind, Schema};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ViolationKind {
    Required,
    NotANumber,
    OutOfRange,
    Pattern,
    NotAllowed,
    WrongType,
}

/// One failed constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub path: FieldPath,
    pub kind: ViolationKind,
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// A non-empty set of violations, in schema order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(Vec<Violation>);

impl ValidationErrors {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Violation> {
        self.0.iter()
    }

    /// Violations reported for exactly `path`.
    pub fn at<'a>(&'a self, path: &'a FieldPath) -> impl Iterator<Item = &'a Violation> + 'a {
        self.0.iter().filter(move |v| &v.path == path)
    }

    pub fn into_vec(self) -> Vec<Violation> {
        self.0
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, violation) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{violation}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

impl<'a> IntoIterator for &'a ValidationErrors {
    type Item = &'a Violation;
    type IntoIter = std::slice::Iter<'a, Violation>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Check `model` against `schema`.
///
/// Fields in the model that the schema does not declare are ignored.
pub fn validate(schema: &Schema, model: &FormModel) -> Result<(), ValidationErrors> {
    let mut violations = Vec::new();
    check_record(schema, model, &FieldPath::root(), &mut violations);
    if violations.is_empty() {
        Ok(())
    } else {
        Err(ValidationErrors(violations))
    }
}

fn check_record(schema: &Schema, record: &FormModel, prefix: &FieldPath, out: &mut Vec<Violation>) {
    for (name, descriptor) in &schema.fields {
        if descriptor.read_only {
            continue;
        }
        let path = prefix.field(name.as_str());
        let value = record.get(name);

        if value.is_none_or(FormValue::is_empty) {
            if schema.is_required(name) {
                out.push(Violation {
                    message: format!("{} is required", descriptor.title),
                    kind: ViolationKind::Required,
                    path,
                });
                continue;
            }
            // Malformed numbers still surface on optional fields.
            if !matches!(value, Some(FormValue::Number(Numeric::NotANumber))) {
                continue;
            }
        }

        if let Some(value) = value {
            check_value(descriptor, value, &path, out);
        }
    }

    for check in &schema.checks {
        check_fields(schema, check, record, prefix, out);
    }
}

/// Constraints spanning two fields of one record. Skipped unless both
/// sides hold numbers.
fn check_fields(
    schema: &Schema,
    check: &RecordCheck,
    record: &FormModel,
    prefix: &FieldPath,
    out: &mut Vec<Violation>,
) {
    match check {
        RecordCheck::NotAbove { lower, upper } => {
            let (Some(low), Some(high)) = (
                record.get(lower).and_then(as_number),
                record.get(upper).and_then(as_number),
            ) else {
                return;
            };
            if low > high {
                out.push(Violation {
                    path: prefix.field(lower.as_str()),
                    kind: ViolationKind::OutOfRange,
                    message: format!(
                        "{} must be <= {}",
                        title_of(schema, lower),
                        title_of(schema, upper)
                    ),
                });
            }
        }
    }
}

fn title_of<'a>(schema: &'a Schema, name: &'a str) -> &'a str {
    schema.get(name).map_or(name, |d| d.title.as_str())
}

fn as_number(value: &FormValue) -> Option<i64> {
    match value {
        FormValue::Number(n) => n.as_i64(),
        FormValue::Text(raw) => Numeric::coerce(raw).as_i64(),
        _ => None,
    }
}

fn check_value(descriptor: &FieldDescriptor, value: &FormValue, path: &FieldPath, out: &mut Vec<Violation>) {
    match (&descriptor.kind, value) {
        (FieldKind::Scalar(scalar), value) => check_scalar(descriptor, scalar, value, path, out),
        (FieldKind::Composite { schema }, FormValue::Record(record)) => {
            if !value.is_empty() {
                check_record(schema, record, path, out);
            }
        }
        (FieldKind::List { item, .. }, FormValue::List(items)) => {
            for (index, entry) in items.iter().enumerate() {
                let entry_path = path.index(index);
                match (&item.kind, entry) {
                    // Blank scalar entries are never filled in, not invalid.
                    (FieldKind::Scalar(_), entry) if entry.is_empty() && !is_nan(entry) => {}
                    // A record entry exists at its index even when blank.
                    (FieldKind::Composite { schema }, FormValue::Record(record)) => {
                        check_record(schema, record, &entry_path, out);
                    }
                    _ => check_value(item, entry, &entry_path, out),
                }
            }
        }
        (FieldKind::Composite { .. }, _) => out.push(wrong_type(descriptor, path, "an object")),
        (FieldKind::List { .. }, _) => out.push(wrong_type(descriptor, path, "a list")),
    }
}

fn check_scalar(
    descriptor: &FieldDescriptor,
    scalar: &Scalar,
    value: &FormValue,
    path: &FieldPath,
    out: &mut Vec<Violation>,
) {
    let title = &descriptor.title;
    let constraints = &scalar.constraints;

    if matches!(value, FormValue::Record(_) | FormValue::List(_)) {
        out.push(wrong_type(descriptor, path, "a single value"));
        return;
    }

    if scalar.kind == ScalarKind::Number {
        let number = match value {
            FormValue::Number(n) => *n,
            FormValue::Text(raw) => Numeric::coerce(raw),
            _ => Numeric::NotANumber,
        };
        let Numeric::Int(n) = number else {
            out.push(Violation {
                path: path.clone(),
                kind: ViolationKind::NotANumber,
                message: format!("{title} must be a number"),
            });
            return;
        };
        let below = constraints.minimum.is_some_and(|min| n < min);
        let above = constraints.maximum.is_some_and(|max| n > max);
        if below || above {
            out.push(Violation {
                path: path.clone(),
                kind: ViolationKind::OutOfRange,
                message: range_message(title, constraints.minimum, constraints.maximum),
            });
        }
        return;
    }

    let Some(text) = value.as_text() else {
        return;
    };

    if let Some(pattern) = &constraints.pattern {
        if !pattern.is_match(&text) {
            out.push(Violation {
                path: path.clone(),
                kind: ViolationKind::Pattern,
                message: pattern.message().to_owned(),
            });
        }
    }

    if !constraints.allowed.is_empty() && !constraints.allowed.iter().any(|a| *a == text) {
        out.push(Violation {
            path: path.clone(),
            kind: ViolationKind::NotAllowed,
            message: format!("{title} must be one of [{}]", constraints.allowed.join(", ")),
        });
    }
}

fn range_message(title: &str, minimum: Option<i64>, maximum: Option<i64>) -> String {
    match (minimum, maximum) {
        (Some(min), Some(max)) => format!("{title} must be in [{min}..{max}]"),
        (Some(min), None) => format!("{title} must be at least {min}"),
        (None, Some(max)) => format!("{title} must be at most {max}"),
        (None, None) => format!("{title} is out of range"),
    }
}

fn wrong_type(descriptor: &FieldDescriptor, path: &FieldPath, expected: &str) -> Violation {
    Violation {
        path: path.clone(),
        kind: ViolationKind::WrongType,
        message: format!("{} must be {expected}", descriptor.title),
    }
}

fn is_nan(value: &FormValue) -> bool {
    matches!(value, FormValue::Number(Numeric::NotANumber))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::form::FormEngine;
    use crate::schema::{ResourceType, schema};

    fn path(s: &str) -> FieldPath {
        s.parse().unwrap()
    }

    fn policy(json: serde_json::Value) -> FormModel {
        FormModel::from_json(&json).unwrap()
    }

    fn violations(resource: ResourceType, model: &FormModel) -> Vec<Violation> {
        validate(schema(resource), model).map_or_else(ValidationErrors::into_vec, |()| vec![])
    }

    #[test]
    fn minimal_policy_is_valid() {
        let model = policy(json!({
            "name": "default",
            "traffic_rules": [{ "priority": 10, "target": { "action": "accept" } }]
        }));
        assert_eq!(validate(schema(ResourceType::TrafficPolicy), &model), Ok(()));
    }

    #[test]
    fn fully_populated_policy_is_valid() {
        let model = policy(json!({
            "name": "gtp-steering",
            "traffic_rules": [{
                "description": "steer subscriber",
                "priority": 65535,
                "source": {
                    "description": "ue",
                    "mac_filter": { "mac_addresses": ["aa:bb:cc:dd:ee:ff", "AA-BB-CC-DD-EE-00"] },
                    "ip_filter": {
                        "address": "10.0.0.0", "mask": 8,
                        "begin_port": 0, "end_port": 65535, "protocol": "all"
                    },
                    "gtp_filter": { "address": "192.168.1.1", "mask": 128, "imsis": ["001011234567890"] }
                },
                "destination": { "ip_filter": { "address": "8.8.8.8", "protocol": "udp" } },
                "target": {
                    "action": "drop",
                    "mac_modifier": { "mac_address": "00:11:22:33:44:55" },
                    "ip_modifier": { "address": "10.1.1.1", "port": 8080 }
                }
            }]
        }));
        assert_eq!(violations(ResourceType::TrafficPolicy, &model), vec![]);
    }

    #[test]
    fn bad_ip_reports_the_declared_message() {
        let model = policy(json!({
            "name": "default",
            "traffic_rules": [
                { "priority": 1 },
                { "priority": 2 },
                { "priority": 3, "source": { "ip_filter": { "address": "999.1.1.1" } } }
            ]
        }));

        let found = violations(ResourceType::TrafficPolicy, &model);
        assert_eq!(
            found,
            vec![Violation {
                path: path("traffic_rules[2].source.ip_filter.address"),
                kind: ViolationKind::Pattern,
                message: "Please, enter a valid IP address.".into(),
            }]
        );
    }

    #[test]
    fn one_violation_per_empty_required_field() {
        let engine = FormEngine::new(schema(ResourceType::App));
        let mut model = engine.new_model();
        model.insert("cores", FormValue::from(2));
        model.insert("memory", FormValue::Number(Numeric::NotANumber));

        let found = violations(ResourceType::App, &model);
        let paths: Vec<_> = found.iter().map(|v| v.path.to_string()).collect();
        assert_eq!(paths, ["name", "type", "version", "vendor", "memory", "source"]);
        assert!(found.iter().all(|v| v.kind == ViolationKind::Required));
    }

    #[test]
    fn blank_app_reports_untouched_numbers_as_required() {
        let model = FormEngine::new(schema(ResourceType::App)).new_model();
        let errors = validate(schema(ResourceType::App), &model).unwrap_err();
        for (field, message) in [("cores", "Cores is required"), ("memory", "Memory (MB) is required")] {
            let field_path = path(field);
            let found: Vec<_> = errors.at(&field_path).collect();
            assert_eq!(found.len(), 1);
            assert_eq!(found[0].kind, ViolationKind::Required);
            assert_eq!(found[0].message, message);
        }
    }

    #[test]
    fn appended_rule_without_priority_is_required_not_out_of_range() {
        let engine = FormEngine::new(schema(ResourceType::TrafficPolicy));
        let model = engine.set_scalar_field(&engine.new_model(), &path("name"), "p").unwrap();
        let model = engine.append_list_entry(&model, &path("traffic_rules")).unwrap();

        let found = violations(ResourceType::TrafficPolicy, &model);
        assert_eq!(
            found,
            vec![Violation {
                path: path("traffic_rules[0].priority"),
                kind: ViolationKind::Required,
                message: "Priority is required".into(),
            }]
        );
    }

    #[test]
    fn begin_port_above_end_port_is_reported() {
        let model = policy(json!({
            "name": "p",
            "traffic_rules": [{
                "priority": 5,
                "source": { "ip_filter": { "address": "10.0.0.1", "begin_port": 9000, "end_port": 80 } },
                "destination": { "ip_filter": { "address": "10.0.0.2", "begin_port": 80, "end_port": 80 } }
            }]
        }));

        let found = violations(ResourceType::TrafficPolicy, &model);
        assert_eq!(
            found,
            vec![Violation {
                path: path("traffic_rules[0].source.ip_filter.begin_port"),
                kind: ViolationKind::OutOfRange,
                message: "Begin Port must be <= End Port".into(),
            }]
        );
    }

    #[test]
    fn port_order_is_not_checked_when_one_side_is_missing() {
        let model = policy(json!({
            "name": "p",
            "traffic_rules": [{
                "priority": 5,
                "source": { "ip_filter": { "address": "10.0.0.1", "begin_port": 9000 } }
            }]
        }));
        assert_eq!(violations(ResourceType::TrafficPolicy, &model), vec![]);
    }

    #[test]
    fn modifier_port_zero_is_out_of_range() {
        let model = policy(json!({
            "name": "p",
            "traffic_rules": [{
                "priority": 5,
                "target": { "action": "accept", "ip_modifier": { "address": "10.1.1.1", "port": 0 } }
            }]
        }));

        let found = violations(ResourceType::TrafficPolicy, &model);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].path, path("traffic_rules[0].target.ip_modifier.port"));
        assert_eq!(found[0].message, "Port must be in [1..65535]");
    }

    #[test]
    fn range_enum_and_nan_messages() {
        let model = policy(json!({
            "name": "p",
            "traffic_rules": [{
                "priority": 0,
                "source": { "ip_filter": { "address": "10.0.0.1", "mask": 129, "protocol": "gre" } },
                "target": { "action": "forward", "ip_modifier": { "port": "eighty" } }
            }]
        }));

        let found: Vec<_> = violations(ResourceType::TrafficPolicy, &model)
            .into_iter()
            .map(|v| (v.path.to_string(), v.kind, v.message))
            .collect();
        assert_eq!(
            found,
            vec![
                (
                    "traffic_rules[0].priority".into(),
                    ViolationKind::OutOfRange,
                    "Priority must be in [1..65535]".into()
                ),
                (
                    "traffic_rules[0].source.ip_filter.mask".into(),
                    ViolationKind::OutOfRange,
                    "Mask must be in [0..128]".into()
                ),
                (
                    "traffic_rules[0].source.ip_filter.protocol".into(),
                    ViolationKind::NotAllowed,
                    "Protocol must be one of [all, tcp, udp, icmp, sctp]".into()
                ),
                (
                    "traffic_rules[0].target.action".into(),
                    ViolationKind::NotAllowed,
                    "Action must be one of [accept, reject, drop]".into()
                ),
                (
                    "traffic_rules[0].target.ip_modifier.port".into(),
                    ViolationKind::NotANumber,
                    "Port must be a number".into()
                ),
            ]
        );
    }

    #[test]
    fn absent_filters_are_skipped() {
        let model = policy(json!({
            "name": "p",
            "traffic_rules": [{
                "priority": 5,
                "source": { "mac_filter": { "mac_addresses": [] }, "ip_filter": { "address": "" } },
                "destination": {}
            }]
        }));
        assert_eq!(violations(ResourceType::TrafficPolicy, &model), vec![]);
    }

    #[test]
    fn list_entries_get_indexed_paths() {
        let model = policy(json!({
            "name": "p",
            "traffic_rules": [{
                "priority": 5,
                "source": { "gtp_filter": { "imsis": ["001011234567890", "12345"] } }
            }]
        }));
        let found = violations(ResourceType::TrafficPolicy, &model);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].path, path("traffic_rules[0].source.gtp_filter.imsis[1]"));
        assert_eq!(found[0].message, "Please, enter a valid IMSI.");
    }

    #[test]
    fn empty_rule_list_counts_as_missing() {
        let model = policy(json!({ "name": "p", "traffic_rules": [] }));
        let found = violations(ResourceType::TrafficPolicy, &model);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].kind, ViolationKind::Required);
        assert_eq!(found[0].message, "Traffic Rules is required");
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let model = policy(json!({
            "name": "n1", "location": "rack 4", "serial": "SN-1", "uptime": "3d"
        }));
        assert_eq!(validate(schema(ResourceType::Node), &model), Ok(()));
    }

    #[test]
    fn composite_with_wrong_shape_is_reported() {
        let model = policy(json!({
            "name": "p",
            "traffic_rules": [{ "priority": 5, "target": "accept" }]
        }));
        let found = violations(ResourceType::TrafficPolicy, &model);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].kind, ViolationKind::WrongType);
    }

    #[test]
    fn report_lists_every_violation_in_schema_order() {
        let model = policy(json!({
            "name": "",
            "traffic_rules": [{
                "priority": 0,
                "source": { "ip_filter": { "address": "999.1.1.1" } },
                "destination": { "mac_filter": { "mac_addresses": ["00:11:22:33:44"] } }
            }]
        }));
        let errors = validate(schema(ResourceType::TrafficPolicy), &model).unwrap_err();
        insta::assert_snapshot!(errors.to_string(), @r"
        name: Name is required
        traffic_rules[0].priority: Priority must be in [1..65535]
        traffic_rules[0].source.ip_filter.address: Please, enter a valid IP address.
        traffic_rules[0].destination.mac_filter.mac_addresses[0]: Please, enter a valid MAC address.
        ");
    }

    #[test]
    fn display_lists_path_and_message() {
        let model = policy(json!({ "traffic_rules": [{ "priority": 1 }] }));
        let errors = validate(schema(ResourceType::TrafficPolicy), &model).unwrap_err();
        assert_eq!(errors.to_string(), "name: Name is required");
    }
}
