// ── Declarative resource schemas ──
//
// A `Schema` describes one resource type: ordered fields, each with a
// `FieldDescriptor` (scalar, composite, or list), plus the set of fields
// that must be non-empty at submit time. Schemas are immutable once built.

pub mod fragments;
mod registry;

use std::fmt;

use indexmap::{IndexMap, IndexSet};
use regex::Regex;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use strum::{Display, EnumIter, EnumString};

use crate::error::CoreError;
use crate::form::{FormModel, FormValue, Numeric};

pub use registry::schema;

// ── ResourceType ────────────────────────────────────────────────────

/// Every resource type the registry knows about.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, EnumString, EnumIter,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum ResourceType {
    Node,
    Nodes,
    NodeInterfacePolicy,
    App,
    TrafficPolicy,
}

impl ResourceType {
    /// Parse a resource name, accepting kebab-case or snake_case.
    pub fn from_name(name: &str) -> Result<Self, CoreError> {
        name.trim()
            .to_ascii_lowercase()
            .replace('_', "-")
            .parse()
            .map_err(|_| CoreError::UnknownResource {
                name: name.to_owned(),
            })
    }

    /// REST collection path, where the resource has one.
    ///
    /// Interface policies are addressed per node interface; see
    /// [`crate::model::interface_policy_path`].
    pub fn collection_path(self) -> Option<&'static str> {
        match self {
            Self::Node | Self::Nodes => Some("/nodes"),
            Self::App => Some("/apps"),
            Self::TrafficPolicy => Some("/traffic_policies"),
            Self::NodeInterfacePolicy => None,
        }
    }

    /// Path of a single resource: `{collection}/{id}`.
    pub fn resource_path(self, id: &str) -> Option<String> {
        self.collection_path().map(|c| format!("{c}/{id}"))
    }
}

// ── Schema ──────────────────────────────────────────────────────────

/// Shape, field types and constraints of one resource type.
///
/// Required fields are declared together with their descriptor
/// ([`Schema::required`]), so every required name is always a declared field.
#[derive(Debug, Clone, Serialize)]
pub struct Schema {
    pub title: String,
    pub fields: IndexMap<String, FieldDescriptor>,
    #[serde(skip_serializing_if = "IndexSet::is_empty")]
    pub required: IndexSet<String>,
    /// Rules that relate two fields of the same record.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub checks: Vec<RecordCheck>,
}

impl Schema {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            fields: IndexMap::new(),
            required: IndexSet::new(),
            checks: Vec::new(),
        }
    }

    /// Add an optional field.
    pub fn field(mut self, name: impl Into<String>, descriptor: FieldDescriptor) -> Self {
        self.fields.insert(name.into(), descriptor);
        self
    }

    /// Add a field that must be non-empty at submit time.
    pub fn required(mut self, name: impl Into<String>, descriptor: FieldDescriptor) -> Self {
        let name = name.into();
        self.required.insert(name.clone());
        self.fields.insert(name, descriptor);
        self
    }

    /// Require `lower <= upper` whenever both fields hold numbers.
    pub fn ordered(mut self, lower: impl Into<String>, upper: impl Into<String>) -> Self {
        self.checks.push(RecordCheck::NotAbove {
            lower: lower.into(),
            upper: upper.into(),
        });
        self
    }

    pub fn get(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.get(name)
    }

    pub fn is_required(&self, name: &str) -> bool {
        self.required.contains(name)
    }

    /// Levels of nested records below this schema.
    ///
    /// A list adds no level of its own; a list of records counts once.
    pub fn depth(&self) -> usize {
        self.fields
            .values()
            .map(FieldDescriptor::depth)
            .max()
            .unwrap_or(0)
    }

    /// A blank record for this shape.
    ///
    /// Text fields are empty (or their enum default), lists start empty
    /// (dynamic lists get one template entry). Numbers, composites and
    /// read-only fields are left out, so an untouched number is absent.
    pub fn blank_record(&self) -> FormModel {
        self.record_with(FieldDescriptor::blank_value)
    }

    /// The entry seeded into a dynamic list: like [`Schema::blank_record`],
    /// but numbers start at zero.
    pub fn template_record(&self) -> FormModel {
        self.record_with(FieldDescriptor::template_value)
    }

    fn record_with(&self, value_of: impl Fn(&FieldDescriptor) -> Option<FormValue>) -> FormModel {
        self.fields
            .iter()
            .filter(|(_, descriptor)| !descriptor.read_only)
            .filter_map(|(name, descriptor)| value_of(descriptor).map(|v| (name.clone(), v)))
            .collect()
    }
}

/// A rule over two fields of one record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "check", rename_all = "snake_case")]
pub enum RecordCheck {
    /// `lower` must not be greater than `upper`.
    NotAbove { lower: String, upper: String },
}

// ── FieldDescriptor ─────────────────────────────────────────────────

/// Type and constraint metadata for one field.
#[derive(Debug, Clone, Serialize)]
pub struct FieldDescriptor {
    pub title: String,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub read_only: bool,
    #[serde(flatten)]
    pub kind: FieldKind,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldKind {
    Scalar(Scalar),
    Composite {
        schema: Box<Schema>,
    },
    List {
        item: Box<FieldDescriptor>,
        /// Seeded with one blank entry and never shrunk.
        #[serde(skip_serializing_if = "std::ops::Not::not")]
        dynamic: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ScalarKind {
    String,
    Number,
    Enum,
}

#[derive(Debug, Clone, Serialize)]
pub struct Scalar {
    pub kind: ScalarKind,
    #[serde(flatten)]
    pub constraints: Constraints,
}

/// Constraints checked at submit time. All are optional.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Constraints {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum: Option<i64>,
    #[serde(flatten)]
    pub pattern: Option<Pattern>,
    #[serde(rename = "enum", skip_serializing_if = "Vec::is_empty")]
    pub allowed: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
}

impl FieldDescriptor {
    fn scalar(title: impl Into<String>, kind: ScalarKind) -> Self {
        Self {
            title: title.into(),
            read_only: false,
            kind: FieldKind::Scalar(Scalar {
                kind,
                constraints: Constraints::default(),
            }),
        }
    }

    pub fn string(title: impl Into<String>) -> Self {
        Self::scalar(title, ScalarKind::String)
    }

    pub fn number(title: impl Into<String>) -> Self {
        Self::scalar(title, ScalarKind::Number)
    }

    /// An enumerated string field.
    pub fn one_of(title: impl Into<String>, values: &[&str]) -> Self {
        let mut descriptor = Self::scalar(title, ScalarKind::Enum);
        if let FieldKind::Scalar(scalar) = &mut descriptor.kind {
            scalar.constraints.allowed = values.iter().map(|v| (*v).to_owned()).collect();
        }
        descriptor
    }

    pub fn composite(title: impl Into<String>, schema: Schema) -> Self {
        Self {
            title: title.into(),
            read_only: false,
            kind: FieldKind::Composite {
                schema: Box::new(schema),
            },
        }
    }

    pub fn list(title: impl Into<String>, item: FieldDescriptor) -> Self {
        Self {
            title: title.into(),
            read_only: false,
            kind: FieldKind::List {
                item: Box::new(item),
                dynamic: false,
            },
        }
    }

    /// A list that always holds at least one entry, grown only by append.
    pub fn dynamic_list(title: impl Into<String>, item: FieldDescriptor) -> Self {
        let mut descriptor = Self::list(title, item);
        if let FieldKind::List { dynamic, .. } = &mut descriptor.kind {
            *dynamic = true;
        }
        descriptor
    }

    // ── Modifiers (scalars only; no-ops elsewhere) ─────────────────

    /// Inclusive numeric range.
    pub fn range(mut self, minimum: i64, maximum: i64) -> Self {
        if let FieldKind::Scalar(scalar) = &mut self.kind {
            scalar.constraints.minimum = Some(minimum);
            scalar.constraints.maximum = Some(maximum);
        }
        self
    }

    pub fn pattern(mut self, pattern: Pattern) -> Self {
        if let FieldKind::Scalar(scalar) = &mut self.kind {
            scalar.constraints.pattern = Some(pattern);
        }
        self
    }

    pub fn default_value(mut self, value: impl Into<String>) -> Self {
        if let FieldKind::Scalar(scalar) = &mut self.kind {
            scalar.constraints.default = Some(value.into());
        }
        self
    }

    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    // ── Accessors ──────────────────────────────────────────────────

    pub fn as_scalar(&self) -> Option<&Scalar> {
        match &self.kind {
            FieldKind::Scalar(scalar) => Some(scalar),
            _ => None,
        }
    }

    pub fn nested(&self) -> Option<&Schema> {
        match &self.kind {
            FieldKind::Composite { schema } => Some(schema),
            _ => None,
        }
    }

    pub fn item(&self) -> Option<&FieldDescriptor> {
        match &self.kind {
            FieldKind::List { item, .. } => Some(item),
            _ => None,
        }
    }

    pub fn is_dynamic_list(&self) -> bool {
        matches!(self.kind, FieldKind::List { dynamic: true, .. })
    }

    fn depth(&self) -> usize {
        match &self.kind {
            FieldKind::Scalar(_) => 0,
            FieldKind::Composite { schema } => 1 + schema.depth(),
            FieldKind::List { item, .. } => item.depth(),
        }
    }

    /// The value a fresh form holds for this field, if any.
    ///
    /// Numbers have none: a number the user never entered is absent.
    pub fn blank_value(&self) -> Option<FormValue> {
        match &self.kind {
            FieldKind::Scalar(scalar) => match scalar.kind {
                ScalarKind::Number => None,
                ScalarKind::String | ScalarKind::Enum => Some(FormValue::Text(
                    scalar.constraints.default.clone().unwrap_or_default(),
                )),
            },
            FieldKind::Composite { .. } => None,
            FieldKind::List { item, dynamic } => {
                let entries = if *dynamic {
                    item.template_entry().into_iter().collect()
                } else {
                    Vec::new()
                };
                Some(FormValue::List(entries))
            }
        }
    }

    /// Like `blank_value`, but numbers start at zero.
    fn template_value(&self) -> Option<FormValue> {
        match &self.kind {
            FieldKind::Scalar(scalar) if scalar.kind == ScalarKind::Number => {
                Some(FormValue::Number(Numeric::Int(0)))
            }
            _ => self.blank_value(),
        }
    }

    /// A blank list entry conforming to this (item) descriptor.
    ///
    /// Record entries leave their numbers out; a bare number entry is zero.
    pub fn blank_entry(&self) -> Option<FormValue> {
        match &self.kind {
            FieldKind::Composite { schema } => Some(FormValue::Record(schema.blank_record())),
            _ => self.template_value(),
        }
    }

    /// The entry a dynamic list is seeded and grown with.
    pub fn template_entry(&self) -> Option<FormValue> {
        match &self.kind {
            FieldKind::Composite { schema } => Some(FormValue::Record(schema.template_record())),
            _ => self.template_value(),
        }
    }

    /// The entry appended to this (list) descriptor.
    pub fn next_entry(&self) -> Option<FormValue> {
        match &self.kind {
            FieldKind::List { item, dynamic: true } => item.template_entry(),
            FieldKind::List { item, dynamic: false } => item.blank_entry(),
            _ => None,
        }
    }
}

// ── Pattern ─────────────────────────────────────────────────────────

/// A compiled regular expression plus the message shown when it fails.
#[derive(Debug, Clone)]
pub struct Pattern {
    regex: Regex,
    message: String,
}

impl Pattern {
    pub fn new(pattern: &str, message: impl Into<String>) -> Result<Self, regex::Error> {
        Ok(Self {
            regex: Regex::new(pattern)?,
            message: message.into(),
        })
    }

    pub fn is_match(&self, value: &str) -> bool {
        self.regex.is_match(value)
    }

    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Serialize for Pattern {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("Pattern", 2)?;
        s.serialize_field("pattern", self.regex.as_str())?;
        s.serialize_field("validation_message", &self.message)?;
        s.end()
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.regex.as_str())
    }
}
