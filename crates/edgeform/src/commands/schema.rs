//! Schema command handlers.

use serde::Serialize;
use strum::IntoEnumIterator;
use tabled::Tabled;

use edgeform_core::schema::{FieldKind, RecordCheck, Scalar};
use edgeform_core::{FieldDescriptor, ResourceType, Schema, schema};

use crate::cli::{GlobalOpts, SchemaArgs, SchemaCommand};
use crate::error::CliError;
use crate::output;

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Serialize)]
struct Summary {
    resource: ResourceType,
    title: &'static str,
    fields: usize,
    required: Vec<&'static str>,
    endpoint: Option<&'static str>,
}

#[derive(Tabled)]
struct SummaryRow {
    #[tabled(rename = "Type")]
    resource: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Fields")]
    fields: usize,
    #[tabled(rename = "Required")]
    required: String,
    #[tabled(rename = "Endpoint")]
    endpoint: String,
}

impl From<&Summary> for SummaryRow {
    fn from(s: &Summary) -> Self {
        Self {
            resource: s.resource.to_string(),
            title: s.title.into(),
            fields: s.fields,
            required: s.required.join(", "),
            endpoint: s.endpoint.unwrap_or("per node interface").into(),
        }
    }
}

#[derive(Tabled)]
struct FieldRow {
    #[tabled(rename = "Field")]
    path: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Kind")]
    kind: String,
    #[tabled(rename = "Req")]
    required: &'static str,
    #[tabled(rename = "Constraints")]
    constraints: String,
}

fn summarize(resource: ResourceType) -> Summary {
    let schema = schema(resource);
    Summary {
        resource,
        title: &schema.title,
        fields: schema.fields.len(),
        required: schema.required.iter().map(String::as_str).collect(),
        endpoint: resource.collection_path(),
    }
}

/// One row per field, depth-first, list items addressed as `[]`.
fn field_rows(schema: &Schema, base: &str, rows: &mut Vec<FieldRow>) {
    for (name, descriptor) in &schema.fields {
        let path = if base.is_empty() {
            name.clone()
        } else {
            format!("{base}.{name}")
        };
        let required = if schema.is_required(name) { "yes" } else { "" };
        let at = rows.len();
        push_field(&path, descriptor, required, rows);
        for check in &schema.checks {
            let RecordCheck::NotAbove { lower, upper } = check;
            if lower == name {
                let row = &mut rows[at];
                if !row.constraints.is_empty() {
                    row.constraints.push_str("; ");
                }
                row.constraints.push_str(&format!("<= {upper}"));
            }
        }
    }
}

fn push_field(
    path: &str,
    descriptor: &FieldDescriptor,
    required: &'static str,
    rows: &mut Vec<FieldRow>,
) {
    let mut row = FieldRow {
        path: path.to_owned(),
        title: descriptor.title.clone(),
        kind: String::new(),
        required,
        constraints: if descriptor.read_only {
            "read-only".into()
        } else {
            String::new()
        },
    };

    match &descriptor.kind {
        FieldKind::Scalar(scalar) => {
            row.kind = scalar.kind.to_string();
            if row.constraints.is_empty() {
                row.constraints = describe(scalar);
            }
            rows.push(row);
        }
        FieldKind::Composite { schema } => {
            row.kind = "record".into();
            rows.push(row);
            field_rows(schema, path, rows);
        }
        FieldKind::List { item, dynamic } => {
            row.kind = if *dynamic { "list (dynamic)" } else { "list" }.into();
            rows.push(row);
            let item_path = format!("{path}[]");
            match item.nested() {
                Some(nested) => field_rows(nested, &item_path, rows),
                None => push_field(&item_path, item, "", rows),
            }
        }
    }
}

fn describe(scalar: &Scalar) -> String {
    let c = &scalar.constraints;
    let mut parts = Vec::new();
    match (c.minimum, c.maximum) {
        (Some(min), Some(max)) => parts.push(format!("{min}..{max}")),
        (Some(min), None) => parts.push(format!(">= {min}")),
        (None, Some(max)) => parts.push(format!("<= {max}")),
        (None, None) => {}
    }
    if !c.allowed.is_empty() {
        parts.push(c.allowed.join("|"));
    }
    if let Some(pattern) = &c.pattern {
        parts.push(format!("pattern: {}", pattern.message()));
    }
    if let Some(default) = &c.default {
        parts.push(format!("default {default}"));
    }
    parts.join("; ")
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: SchemaArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        SchemaCommand::List => {
            let all: Vec<Summary> = ResourceType::iter().map(summarize).collect();
            let out = output::render_list(
                global.output,
                &all,
                |s| SummaryRow::from(s),
                |s| s.resource.to_string(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        SchemaCommand::Show { resource } => {
            let resource = ResourceType::from_name(&resource)?;
            let schema = schema(resource);
            let out = output::render_single(
                global.output,
                schema,
                |s| {
                    let mut rows = Vec::new();
                    field_rows(s, "", &mut rows);
                    format!("{}\n{}", s.title, output::render_table(&rows))
                },
                |s| s.fields.keys().cloned().collect::<Vec<_>>().join("\n"),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
