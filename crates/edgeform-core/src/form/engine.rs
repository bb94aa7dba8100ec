// ── Dynamic form state engine ──
//
// Schema-bound edit operations over a `FormModel`. Every operation takes
// the current model and returns a new one; the input is never touched, so
// a failed edit leaves the caller's model exactly as it was.
//
// Edits are permissive: values are coerced to the field's kind and stored
// without constraint checks. Constraints are enforced by `validate` at
// submit time.

use serde_json::Value;
use tracing::trace;

use super::{FieldPath, FormModel, FormValue, Numeric, Segment};
use crate::error::CoreError;
use crate::schema::{FieldDescriptor, FieldKind, Schema, ScalarKind};

/// Edit operations for models of one schema.
#[derive(Debug, Clone, Copy)]
pub struct FormEngine<'s> {
    schema: &'s Schema,
}

impl<'s> FormEngine<'s> {
    pub fn new(schema: &'s Schema) -> Self {
        Self { schema }
    }

    pub fn schema(&self) -> &'s Schema {
        self.schema
    }

    // ── Model construction ───────────────────────────────────────────

    /// A model for the create flow: text blank, enum defaults applied,
    /// numbers absent, dynamic lists seeded with one template entry.
    pub fn new_model(&self) -> FormModel {
        self.schema.blank_record()
    }

    /// A model for the edit flow, built from a fetched resource.
    ///
    /// Numeric fields delivered as strings are coerced, and dynamic lists
    /// that are missing or empty are seeded so they hold at least one entry.
    pub fn from_resource(&self, resource: &Value) -> Result<FormModel, CoreError> {
        let mut model = FormModel::from_json(resource)?;
        normalize(self.schema, &mut model);
        Ok(model)
    }

    // ── Edit operations ──────────────────────────────────────────────

    /// Coerce `raw` per the field's declared kind and store it at `path`.
    ///
    /// Number fields are truncated to integers (malformed input becomes
    /// the not-a-number sentinel); string and enum fields pass through.
    pub fn set_scalar_field(
        &self,
        model: &FormModel,
        path: &FieldPath,
        raw: &str,
    ) -> Result<FormModel, CoreError> {
        let descriptors = self.resolve(path)?;
        let Some(scalar) = leaf(&descriptors).and_then(FieldDescriptor::as_scalar) else {
            return Err(CoreError::TypeMismatch {
                path: path.to_string(),
                expected: "a record or list operation, not a scalar value".into(),
            });
        };

        let value = match scalar.kind {
            ScalarKind::Number => FormValue::Number(Numeric::coerce(raw)),
            ScalarKind::String | ScalarKind::Enum => FormValue::Text(raw.to_owned()),
        };

        let mut next = model.clone();
        *slot_mut(&mut next, path, &descriptors)? = value;
        trace!(%path, "set scalar field");
        Ok(next)
    }

    /// Append the schema's blank item to the list at `list`.
    ///
    /// Dynamic lists grow by their template entry (numbers at zero); other
    /// lists by a blank record whose numbers are still absent.
    pub fn append_list_entry(
        &self,
        model: &FormModel,
        list: &FieldPath,
    ) -> Result<FormModel, CoreError> {
        let template = self
            .list_descriptor(list)?
            .next_entry()
            .ok_or_else(|| not_a_list(list))?;
        self.append_list_entry_with(model, list, template)
    }

    /// Append `template` to the list at `list`.
    ///
    /// Existing entries keep their indices; the new entry is the last one.
    pub fn append_list_entry_with(
        &self,
        model: &FormModel,
        list: &FieldPath,
        template: FormValue,
    ) -> Result<FormModel, CoreError> {
        let descriptors = self.resolve(list)?;
        let item = leaf(&descriptors)
            .and_then(FieldDescriptor::item)
            .ok_or_else(|| not_a_list(list))?;
        if !shape_matches(item, &template) {
            return Err(CoreError::TypeMismatch {
                path: list.index(0).to_string(),
                expected: format!("an entry shaped like {}", item.title),
            });
        }

        let mut next = model.clone();
        match slot_mut(&mut next, list, &descriptors)? {
            FormValue::List(items) => {
                items.push(template);
                trace!(%list, len = items.len(), "appended list entry");
            }
            _ => return Err(not_a_list(list)),
        }
        Ok(next)
    }

    /// Set `field` of the entry at `index` in the list at `list`.
    ///
    /// The index must already exist; lists only grow through append.
    pub fn set_list_entry_field(
        &self,
        model: &FormModel,
        list: &FieldPath,
        index: usize,
        field: &str,
        raw: &str,
    ) -> Result<FormModel, CoreError> {
        self.set_scalar_field(model, &list.index(index).field(field), raw)
    }

    /// Replace each named list with a single blank entry.
    pub fn reset_lists(
        &self,
        model: &FormModel,
        lists: &[FieldPath],
    ) -> Result<FormModel, CoreError> {
        let mut next = model.clone();
        for list in lists {
            let descriptors = self.resolve(list)?;
            let seed = leaf(&descriptors)
                .filter(|d| d.item().is_some())
                .ok_or_else(|| not_a_list(list))?
                .next_entry()
                .into_iter()
                .collect();
            *slot_mut(&mut next, list, &descriptors)? = FormValue::List(seed);
        }
        Ok(next)
    }

    /// Paths of every top-level dynamic list in the schema.
    pub fn dynamic_lists(&self) -> Vec<FieldPath> {
        self.schema
            .fields
            .iter()
            .filter(|(_, d)| d.is_dynamic_list())
            .map(|(name, _)| FieldPath::root().field(name.as_str()))
            .collect()
    }

    // ── Resolution ───────────────────────────────────────────────────

    /// The descriptor for each segment of `path`.
    ///
    /// Field segments resolve to the field's descriptor, index segments to
    /// the list's item descriptor. Read-only fields cannot be edited.
    fn resolve(&self, path: &FieldPath) -> Result<Vec<&'s FieldDescriptor>, CoreError> {
        let mut resolved: Vec<&'s FieldDescriptor> = Vec::with_capacity(path.segments().len());

        for (pos, segment) in path.segments().iter().enumerate() {
            let walked = || path.prefix(pos + 1).to_string();
            let next = match (segment, resolved.last().copied()) {
                (Segment::Field(name), None) => self.schema.get(name),
                (Segment::Field(name), Some(parent)) => match parent.nested() {
                    Some(nested) => nested.get(name),
                    None => {
                        return Err(CoreError::TypeMismatch {
                            path: path.prefix(pos).to_string(),
                            expected: if parent.item().is_some() {
                                "a list index before the field name".into()
                            } else {
                                "a record".into()
                            },
                        });
                    }
                },
                (Segment::Index(_), Some(parent)) => match parent.item() {
                    Some(item) => Some(item),
                    None => return Err(not_a_list(&path.prefix(pos))),
                },
                (Segment::Index(_), None) => {
                    return Err(CoreError::InvalidPath {
                        path: path.to_string(),
                        reason: "path must start with a field name".into(),
                    });
                }
            };

            let descriptor = next.ok_or_else(|| CoreError::UnknownField { path: walked() })?;
            if descriptor.read_only {
                return Err(CoreError::ReadOnlyField { path: walked() });
            }
            resolved.push(descriptor);
        }

        if resolved.is_empty() {
            return Err(CoreError::InvalidPath {
                path: String::new(),
                reason: "path is empty".into(),
            });
        }
        Ok(resolved)
    }

    fn list_descriptor(&self, list: &FieldPath) -> Result<&'s FieldDescriptor, CoreError> {
        let descriptors = self.resolve(list)?;
        leaf(&descriptors)
            .filter(|d| d.item().is_some())
            .ok_or_else(|| not_a_list(list))
    }
}

fn leaf<'s>(descriptors: &[&'s FieldDescriptor]) -> Option<&'s FieldDescriptor> {
    descriptors.last().copied()
}

fn not_a_list(path: &FieldPath) -> CoreError {
    CoreError::TypeMismatch {
        path: path.to_string(),
        expected: "a list".into(),
    }
}

/// Walk `model` along `path`, creating missing fields as blank values.
///
/// Missing composites are created from their schema's blank record, so
/// enum defaults apply. List indices are never created.
fn slot_mut<'m>(
    model: &'m mut FormModel,
    path: &FieldPath,
    descriptors: &[&FieldDescriptor],
) -> Result<&'m mut FormValue, CoreError> {
    let mut steps = path.segments().iter().zip(descriptors).enumerate();

    let Some((_, (Segment::Field(name), descriptor))) = steps.next() else {
        return Err(CoreError::InvalidPath {
            path: path.to_string(),
            reason: "path must start with a field name".into(),
        });
    };
    let mut current = model
        .entry(name.clone())
        .or_insert_with(|| placeholder(descriptor));

    for (pos, (segment, descriptor)) in steps {
        current = match (segment, current) {
            (Segment::Field(name), FormValue::Record(record)) => record
                .entry(name.clone())
                .or_insert_with(|| placeholder(descriptor)),
            (Segment::Index(index), FormValue::List(items)) => {
                let len = items.len();
                match items.get_mut(*index) {
                    Some(item) => item,
                    None => {
                        return Err(CoreError::IndexOutOfRange {
                            path: path.prefix(pos).to_string(),
                            index: *index,
                            len,
                        });
                    }
                }
            }
            (Segment::Field(_), _) => {
                return Err(CoreError::TypeMismatch {
                    path: path.prefix(pos).to_string(),
                    expected: "a record".into(),
                });
            }
            (Segment::Index(_), _) => return Err(not_a_list(&path.prefix(pos))),
        };
    }

    Ok(current)
}

fn placeholder(descriptor: &FieldDescriptor) -> FormValue {
    descriptor
        .blank_entry()
        .unwrap_or_else(|| FormValue::Text(String::new()))
}

fn shape_matches(item: &FieldDescriptor, value: &FormValue) -> bool {
    match (&item.kind, value) {
        (FieldKind::Composite { .. }, FormValue::Record(_))
        | (FieldKind::List { .. }, FormValue::List(_)) => true,
        (FieldKind::Scalar(_), v) => !matches!(v, FormValue::Record(_) | FormValue::List(_)),
        _ => false,
    }
}

/// Coerce string-typed numbers and seed dynamic lists, recursively.
fn normalize(schema: &Schema, record: &mut FormModel) {
    for (name, descriptor) in &schema.fields {
        if descriptor.is_dynamic_list()
            && record.get(name).is_none_or(|v| v.as_list().is_some_and(<[_]>::is_empty))
        {
            if let Some(seed) = descriptor.blank_value() {
                record.insert(name.clone(), seed);
            }
        }
        if let Some(value) = record.get_mut(name) {
            normalize_value(descriptor, value);
        }
    }
}

fn normalize_value(descriptor: &FieldDescriptor, value: &mut FormValue) {
    match (&descriptor.kind, value) {
        (FieldKind::Scalar(scalar), value) if scalar.kind == ScalarKind::Number => {
            if let FormValue::Text(raw) = value {
                *value = FormValue::Number(Numeric::coerce(raw));
            }
        }
        (FieldKind::Composite { schema }, FormValue::Record(nested)) => normalize(schema, nested),
        (FieldKind::List { item, .. }, FormValue::List(items)) => {
            for entry in items {
                normalize_value(item, entry);
            }
        }
        _ => {}
    }
}
