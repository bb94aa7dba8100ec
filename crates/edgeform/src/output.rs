//! Output formatting: table, JSON, YAML, plain.
//!
//! Renders data in the format selected by `--output`. Table uses `tabled`,
//! structured formats use serde, plain emits one value per line.

use std::borrow::Cow;
use std::io::{self, IsTerminal, Write};

use owo_colors::OwoColorize;
use serde::Serialize;
use tabled::{Table, Tabled, settings::Style};

use edgeform_core::{FieldPath, FormModel, FormValue, ValidationErrors, Violation};

use crate::cli::{ColorMode, OutputFormat};

// ── Color helpers ────────────────────────────────────────────────────

/// Determine whether color output should be enabled.
pub fn should_color(mode: ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stderr().is_terminal() && std::env::var("NO_COLOR").is_err(),
    }
}

/// A status line for stderr: `✓ message` or `✗ message`.
pub fn status_line(ok: bool, message: &str, color: bool) -> String {
    match (ok, color) {
        (true, true) => format!("{} {message}", "✓".green()),
        (false, true) => format!("{} {message}", "✗".red()),
        (true, false) => format!("✓ {message}"),
        (false, false) => format!("✗ {message}"),
    }
}

// ── Render dispatchers ───────────────────────────────────────────────

/// Render a list of serde-serializable + tabled items in the chosen format.
///
/// - `table`: uses the `Tabled` derive to build a pretty table
/// - `json` / `json-compact`: serializes the original data via serde
/// - `yaml`: serializes via serde_yaml
/// - `plain`: calls `id_fn` on each item to emit one identifier per line
pub fn render_list<T, R>(
    format: OutputFormat,
    data: &[T],
    to_row: impl Fn(&T) -> R,
    id_fn: impl Fn(&T) -> String,
) -> String
where
    T: Serialize,
    R: Tabled,
{
    match format {
        OutputFormat::Table => {
            let rows: Vec<R> = data.iter().map(to_row).collect();
            render_table(&rows)
        }
        OutputFormat::Json => render_json(data, false),
        OutputFormat::JsonCompact => render_json(data, true),
        OutputFormat::Yaml => render_yaml(data),
        OutputFormat::Plain => data.iter().map(&id_fn).collect::<Vec<_>>().join("\n"),
    }
}

/// Render a single serde-serializable item in the chosen format.
///
/// Table rendering uses `detail_fn`, since single-item views are laid out
/// as field/value rows rather than one row per item.
pub fn render_single<T>(
    format: OutputFormat,
    data: &T,
    detail_fn: impl Fn(&T) -> String,
    id_fn: impl Fn(&T) -> String,
) -> String
where
    T: Serialize + ?Sized,
{
    match format {
        OutputFormat::Table => detail_fn(data),
        OutputFormat::Json => render_json(data, false),
        OutputFormat::JsonCompact => render_json(data, true),
        OutputFormat::Yaml => render_yaml(data),
        OutputFormat::Plain => id_fn(data),
    }
}

/// Print the rendered output to stdout, respecting quiet mode.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

// ── Form models ──────────────────────────────────────────────────────

#[derive(Tabled)]
pub struct FieldRow {
    #[tabled(rename = "Field")]
    pub field: String,
    #[tabled(rename = "Value")]
    pub value: String,
}

/// Flatten a model into one row per scalar, addressed by field path.
pub fn model_rows(model: &FormModel) -> Vec<FieldRow> {
    let mut rows = Vec::new();
    collect_rows(&FieldPath::root(), model, &mut rows);
    rows
}

fn collect_rows(base: &FieldPath, model: &FormModel, rows: &mut Vec<FieldRow>) {
    for (name, value) in model.iter() {
        collect_value(&base.field(name.as_str()), value, rows);
    }
}

fn collect_value(path: &FieldPath, value: &FormValue, rows: &mut Vec<FieldRow>) {
    match value {
        FormValue::Record(record) => collect_rows(path, record, rows),
        FormValue::List(items) => {
            for (i, item) in items.iter().enumerate() {
                collect_value(&path.index(i), item, rows);
            }
        }
        scalar => rows.push(FieldRow {
            field: path.to_string(),
            value: scalar.as_text().map(Cow::into_owned).unwrap_or_default(),
        }),
    }
}

/// Detail view of a model: a two-column field/value table.
pub fn render_model(format: OutputFormat, model: &FormModel) -> String {
    render_single(
        format,
        model,
        |m| render_table(&model_rows(m)),
        |m| {
            m.get("id")
                .and_then(FormValue::as_text)
                .map(Cow::into_owned)
                .unwrap_or_default()
        },
    )
}

// ── Violations ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct ViolationRow {
    #[tabled(rename = "Field")]
    field: String,
    #[tabled(rename = "Problem")]
    message: String,
}

/// Every violation as `path` / message, in the chosen format.
pub fn render_violations(format: OutputFormat, errors: &ValidationErrors) -> String {
    let violations: Vec<&Violation> = errors.iter().collect();
    render_list(
        format,
        &violations,
        |v| ViolationRow {
            field: v.path.to_string(),
            message: v.message.clone(),
        },
        ToString::to_string,
    )
}

// ── Format-specific renderers ────────────────────────────────────────

pub fn render_table<R: Tabled>(rows: &[R]) -> String {
    Table::new(rows).with(Style::rounded()).to_string()
}

fn render_json<T: Serialize + ?Sized>(data: &T, compact: bool) -> String {
    let rendered = if compact {
        serde_json::to_string(data)
    } else {
        serde_json::to_string_pretty(data)
    };
    rendered.unwrap_or_else(|e| format!("serialization failed: {e}"))
}

/// YAML output.
pub fn render_yaml<T: Serialize + ?Sized>(data: &T) -> String {
    serde_yaml::to_string(data).unwrap_or_else(|e| format!("serialization failed: {e}"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn policy() -> FormModel {
        FormModel::from_json(&json!({
            "name": "edge-default",
            "traffic_rules": [
                { "priority": 10, "target": { "action": "drop" } }
            ]
        }))
        .unwrap()
    }

    #[test]
    fn model_rows_are_addressed_by_path() {
        let rows = model_rows(&policy());
        let fields: Vec<_> = rows.iter().map(|r| r.field.as_str()).collect();
        assert_eq!(
            fields,
            [
                "name",
                "traffic_rules[0].priority",
                "traffic_rules[0].target.action"
            ]
        );
        assert_eq!(rows[1].value, "10");
    }

    #[test]
    fn json_model_output_is_the_wire_shape() {
        let out = render_model(OutputFormat::JsonCompact, &policy());
        let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed["traffic_rules"][0]["target"]["action"], "drop");
    }

    #[test]
    fn status_line_without_color_is_plain() {
        assert_eq!(status_line(true, "done", false), "✓ done");
        assert_eq!(status_line(false, "nope", false), "✗ nope");
    }
}
