// ── Form model ──
//
// The in-progress value being edited: an ordered map of field names to
// scalars, nested records, or lists. Values compare by equality so edit
// operations can be tested (and undone) by plain snapshot comparison.

mod engine;
mod path;

use std::borrow::Cow;

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::error::CoreError;

pub use engine::FormEngine;
pub use path::{FieldPath, Segment};

// ── Numeric ─────────────────────────────────────────────────────────

/// An integer form value, or the sentinel left behind by malformed input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Numeric {
    Int(i64),
    NotANumber,
}

impl Numeric {
    /// Coerce raw user input: trim, parse as a decimal, truncate toward zero.
    ///
    /// Never fails; unparsable or non-finite input becomes `NotANumber`.
    /// Coercing the text of an integer yields that integer again.
    pub fn coerce(raw: &str) -> Self {
        let raw = raw.trim();
        if let Ok(n) = raw.parse::<i64>() {
            return Self::Int(n);
        }
        raw.parse::<f64>().map_or(Self::NotANumber, Self::from_f64)
    }

    #[allow(clippy::cast_possible_truncation, clippy::as_conversions)]
    pub fn from_f64(value: f64) -> Self {
        // i64::MAX is not exactly representable; stay strictly below 2^63.
        const LIMIT: f64 = 9_223_372_036_854_775_808.0;
        if !value.is_finite() {
            return Self::NotANumber;
        }
        let truncated = value.trunc();
        if truncated >= LIMIT || truncated < -LIMIT {
            return Self::NotANumber;
        }
        Self::Int(truncated as i64)
    }

    pub fn as_i64(self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(n),
            Self::NotANumber => None,
        }
    }

    pub fn is_nan(self) -> bool {
        matches!(self, Self::NotANumber)
    }
}

impl Serialize for Numeric {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Int(n) => serializer.serialize_i64(*n),
            Self::NotANumber => serializer.serialize_none(),
        }
    }
}

// ── FormValue ───────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FormValue {
    Text(String),
    Number(Numeric),
    Bool(bool),
    Record(FormModel),
    List(Vec<FormValue>),
}

impl FormValue {
    /// Whether this value counts as absent for a required field.
    ///
    /// Empty text, the not-a-number sentinel, an empty list, and a record
    /// whose every value is empty all count.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(s) => s.is_empty(),
            Self::Number(n) => n.is_nan(),
            Self::Bool(_) => false,
            Self::Record(record) => record.values().all(FormValue::is_empty),
            Self::List(items) => items.is_empty(),
        }
    }

    /// Scalar rendering used for pattern and enum checks.
    pub fn as_text(&self) -> Option<Cow<'_, str>> {
        match self {
            Self::Text(s) => Some(Cow::Borrowed(s)),
            Self::Number(Numeric::Int(n)) => Some(Cow::Owned(n.to_string())),
            Self::Bool(b) => Some(Cow::Owned(b.to_string())),
            Self::Number(Numeric::NotANumber) | Self::Record(_) | Self::List(_) => None,
        }
    }

    pub fn as_record(&self) -> Option<&FormModel> {
        match self {
            Self::Record(record) => Some(record),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[FormValue]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn from_json(value: &Value) -> Option<Self> {
        Some(match value {
            Value::Null => return None,
            Value::Bool(b) => Self::Bool(*b),
            Value::Number(n) => Self::Number(match n.as_i64() {
                Some(i) => Numeric::Int(i),
                None => n.as_f64().map_or(Numeric::NotANumber, Numeric::from_f64),
            }),
            Value::String(s) => Self::Text(s.clone()),
            Value::Array(items) => Self::List(items.iter().filter_map(Self::from_json).collect()),
            Value::Object(map) => Self::Record(FormModel::from_map(map)),
        })
    }

    pub fn to_json(&self) -> Value {
        match self {
            Self::Text(s) => Value::String(s.clone()),
            Self::Number(Numeric::Int(n)) => Value::from(*n),
            Self::Number(Numeric::NotANumber) => Value::Null,
            Self::Bool(b) => Value::Bool(*b),
            Self::Record(record) => record.to_json(),
            Self::List(items) => Value::Array(items.iter().map(FormValue::to_json).collect()),
        }
    }

    fn pruned(&self) -> Option<Self> {
        match self {
            Self::Record(record) => {
                let record = record.pruned();
                (!record.is_empty()).then_some(Self::Record(record))
            }
            Self::List(items) => Some(Self::List(
                items.iter().map(FormValue::pruned_entry).collect(),
            )),
            other => (!other.is_empty()).then(|| other.clone()),
        }
    }

    /// List entries keep their position even when blank; only their
    /// insides are pruned.
    fn pruned_entry(&self) -> Self {
        match self {
            Self::Record(record) => Self::Record(record.pruned()),
            Self::List(items) => Self::List(items.iter().map(FormValue::pruned_entry).collect()),
            other => other.clone(),
        }
    }
}

impl From<&str> for FormValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_owned())
    }
}

impl From<i64> for FormValue {
    fn from(n: i64) -> Self {
        Self::Number(Numeric::Int(n))
    }
}

// ── FormModel ───────────────────────────────────────────────────────

/// A record under edit, mirroring a schema's shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FormModel(IndexMap<String, FormValue>);

impl FormModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a model from a fetched JSON object.
    ///
    /// `null` members are dropped and fractional numbers truncated.
    pub fn from_json(value: &Value) -> Result<Self, CoreError> {
        match value {
            Value::Object(map) => Ok(Self::from_map(map)),
            other => Err(CoreError::Serialization {
                message: format!("expected a JSON object, got {}", json_kind(other)),
            }),
        }
    }

    fn from_map(map: &Map<String, Value>) -> Self {
        Self(
            map.iter()
                .filter_map(|(k, v)| FormValue::from_json(v).map(|v| (k.clone(), v)))
                .collect(),
        )
    }

    /// JSON rendering; the not-a-number sentinel becomes `null`.
    pub fn to_json(&self) -> Value {
        Value::Object(
            self.0
                .iter()
                .map(|(k, v)| (k.clone(), v.to_json()))
                .collect(),
        )
    }

    /// A copy without empty scalars or empty records. Lists and their
    /// entries are kept positionally.
    ///
    /// This is the shape sent over the wire: optional parts the user never
    /// filled in are omitted rather than sent blank.
    pub fn pruned(&self) -> Self {
        Self(
            self.0
                .iter()
                .filter_map(|(k, v)| v.pruned().map(|v| (k.clone(), v)))
                .collect(),
        )
    }

    pub fn get(&self, name: &str) -> Option<&FormValue> {
        self.0.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut FormValue> {
        self.0.get_mut(name)
    }

    pub fn insert(&mut self, name: impl Into<String>, value: FormValue) -> Option<FormValue> {
        self.0.insert(name.into(), value)
    }

    pub fn remove(&mut self, name: &str) -> Option<FormValue> {
        self.0.shift_remove(name)
    }

    pub(crate) fn entry(&mut self, name: String) -> indexmap::map::Entry<'_, String, FormValue> {
        self.0.entry(name)
    }

    /// Read the value at a nested path, if present.
    pub fn get_path(&self, path: &FieldPath) -> Option<&FormValue> {
        let mut segments = path.segments().iter();
        let mut current = match segments.next()? {
            Segment::Field(name) => self.get(name)?,
            Segment::Index(_) => return None,
        };
        for segment in segments {
            current = match (segment, current) {
                (Segment::Field(name), FormValue::Record(record)) => record.get(name)?,
                (Segment::Index(i), FormValue::List(items)) => items.get(*i)?,
                _ => return None,
            };
        }
        Some(current)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FormValue)> {
        self.0.iter()
    }

    pub fn values(&self) -> impl Iterator<Item = &FormValue> {
        self.0.values()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, FormValue)> for FormModel {
    fn from_iter<I: IntoIterator<Item = (String, FormValue)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'de> Deserialize<'de> for FormModel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Self::from_json(&value).map_err(serde::de::Error::custom)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn coerce_truncates_toward_zero() {
        assert_eq!(Numeric::coerce("42"), Numeric::Int(42));
        assert_eq!(Numeric::coerce(" 7.9 "), Numeric::Int(7));
        assert_eq!(Numeric::coerce("-3.7"), Numeric::Int(-3));
        assert_eq!(Numeric::coerce("1e3"), Numeric::Int(1000));
    }

    #[test]
    fn coerce_malformed_is_nan() {
        assert_eq!(Numeric::coerce(""), Numeric::NotANumber);
        assert_eq!(Numeric::coerce("eighty"), Numeric::NotANumber);
        assert_eq!(Numeric::coerce("inf"), Numeric::NotANumber);
        assert_eq!(Numeric::coerce("NaN"), Numeric::NotANumber);
        assert_eq!(Numeric::coerce("1e300"), Numeric::NotANumber);
    }

    #[test]
    fn coerce_is_idempotent_on_integers() {
        for n in [0_i64, 1, -1, 80, 65_535, i64::MAX, i64::MIN] {
            let once = Numeric::coerce(&n.to_string());
            assert_eq!(once, Numeric::Int(n));
            let twice = Numeric::coerce(&once.as_i64().unwrap().to_string());
            assert_eq!(twice, once);
        }
    }

    #[test]
    fn emptiness() {
        assert!(FormValue::from("").is_empty());
        assert!(!FormValue::from("x").is_empty());
        assert!(FormValue::Number(Numeric::NotANumber).is_empty());
        assert!(!FormValue::from(0).is_empty());
        assert!(FormValue::List(vec![]).is_empty());

        let mut blank = FormModel::new();
        blank.insert("address", FormValue::from(""));
        assert!(FormValue::Record(blank.clone()).is_empty());
        blank.insert("mask", FormValue::from(24));
        assert!(!FormValue::Record(blank).is_empty());
    }

    #[test]
    fn json_conversion_keeps_order_and_drops_null() {
        let json = json!({
            "name": "web",
            "id": null,
            "cores": 2.5,
            "ports": [{ "port": 80, "protocol": "tcp" }],
        });

        let model = FormModel::from_json(&json).unwrap();
        let keys: Vec<_> = model.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, ["name", "cores", "ports"]);
        assert_eq!(model.get("cores"), Some(&FormValue::from(2)));
        assert_eq!(
            model.to_json(),
            json!({ "name": "web", "cores": 2, "ports": [{ "port": 80, "protocol": "tcp" }] })
        );
    }

    #[test]
    fn nan_serializes_as_null() {
        let mut model = FormModel::new();
        model.insert("cores", FormValue::Number(Numeric::NotANumber));
        assert_eq!(model.to_json(), json!({ "cores": null }));
        assert_eq!(serde_json::to_value(&model).unwrap(), json!({ "cores": null }));
    }

    #[test]
    fn from_json_rejects_non_objects() {
        let err = FormModel::from_json(&json!([1, 2])).unwrap_err();
        assert!(matches!(err, CoreError::Serialization { .. }));
    }

    #[test]
    fn pruned_drops_blank_parts_but_keeps_lists() {
        let model = FormModel::from_json(&json!({
            "name": "default",
            "description": "",
            "traffic_rules": [{
                "description": "",
                "priority": 10,
                "source": { "description": "", "ip_filter": { "address": "" } },
                "target": { "description": "", "action": "accept" }
            }],
            "tags": []
        }))
        .unwrap();

        assert_eq!(
            model.pruned().to_json(),
            json!({
                "name": "default",
                "traffic_rules": [{ "priority": 10, "target": { "action": "accept" } }],
                "tags": []
            })
        );
    }

    #[test]
    fn pruned_keeps_blank_list_entries_in_place() {
        let model = FormModel::from_json(&json!({
            "epafeatures": [
                { "key": "", "value": "" },
                { "key": "k", "value": "" }
            ]
        }))
        .unwrap();

        assert_eq!(
            model.pruned().to_json(),
            json!({ "epafeatures": [{}, { "key": "k" }] })
        );
    }

    #[test]
    fn get_path_walks_records_and_lists() {
        let model = FormModel::from_json(&json!({
            "traffic_rules": [{}, { "source": { "ip_filter": { "address": "10.0.0.1" } } }]
        }))
        .unwrap();

        let path: FieldPath = "traffic_rules[1].source.ip_filter.address".parse().unwrap();
        assert_eq!(model.get_path(&path), Some(&FormValue::from("10.0.0.1")));

        let missing: FieldPath = "traffic_rules[5].source".parse().unwrap();
        assert_eq!(model.get_path(&missing), None);
    }
}
