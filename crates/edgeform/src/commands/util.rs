//! Shared helpers for command handlers.

use std::io::IsTerminal;
use std::path::Path;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use serde_json::Value;
use tracing::debug;

use edgeform_core::{
    CoreError, EditSession, FieldPath, Notifier, ResourceType, Severity, SubmitOutcome, Target,
    ValidationErrors, schema, validate,
};

use crate::cli::{EditArgs, GlobalOpts};
use crate::config::Connection;
use crate::error::CliError;
use crate::output;

// ── Input ───────────────────────────────────────────────────────────

/// Read and parse a JSON file for `--from-file` flags.
pub fn read_json_file(path: &Path) -> Result<Value, CliError> {
    let contents = std::fs::read_to_string(path)?;
    serde_json::from_str(&contents).map_err(|e| CliError::Validation {
        field: "from-file".into(),
        reason: format!("invalid JSON in {}: {e}", path.display()),
    })
}

/// Split `path=value` into a parsed field path and the raw value.
pub fn parse_assignment(raw: &str) -> Result<(FieldPath, &str), CliError> {
    let (path, value) = raw.split_once('=').ok_or_else(|| CliError::Validation {
        field: "set".into(),
        reason: format!("expected PATH=VALUE, got '{raw}'"),
    })?;
    Ok((path.trim().parse()?, value))
}

/// Translate an engine rejection into an error that names the resource.
pub fn edit_error(resource: ResourceType, err: CoreError) -> CliError {
    match &err {
        CoreError::UnknownField { path }
        | CoreError::ReadOnlyField { path }
        | CoreError::TypeMismatch { path, .. }
        | CoreError::IndexOutOfRange { path, .. } => CliError::Edit {
            resource: resource.to_string(),
            path: path.clone(),
            reason: err.to_string(),
        },
        _ => err.into(),
    }
}

// ── Edits ───────────────────────────────────────────────────────────

/// Store `raw` at `path`.
///
/// When `path` names the list index one past the end, a blank entry is
/// appended first, so `rules[0]`, `rules[1]`, ... can be filled in order.
pub fn assign(
    session: &EditSession<'_>,
    resource: ResourceType,
    path: &FieldPath,
    raw: &str,
) -> Result<(), CliError> {
    match session.edit(|engine, model| engine.set_scalar_field(model, path, raw)) {
        Ok(()) => Ok(()),
        Err(CoreError::IndexOutOfRange {
            path: list,
            index,
            len,
        }) if index == len => {
            let list: FieldPath = list.parse()?;
            debug!(%list, index, "appending list entry for assignment");
            session
                .edit(|engine, model| engine.append_list_entry(model, &list))
                .map_err(|e| edit_error(resource, e))?;
            assign(session, resource, path, raw)
        }
        Err(err) => Err(edit_error(resource, err)),
    }
}

/// Apply every `--set PATH=VALUE` in order.
pub fn apply_assignments(
    session: &EditSession<'_>,
    resource: ResourceType,
    assignments: &[String],
) -> Result<(), CliError> {
    for raw in assignments {
        let (path, value) = parse_assignment(raw)?;
        assign(session, resource, &path, value)?;
    }
    Ok(())
}

// ── Sessions ────────────────────────────────────────────────────────

/// Open a create session, seeded from `--from-file` when given.
pub fn create_session(
    resource: ResourceType,
    edit: &EditArgs,
) -> Result<EditSession<'static>, CliError> {
    let schema = schema(resource);
    let path = resource
        .collection_path()
        .ok_or_else(|| CliError::Internal(format!("{resource} has no collection endpoint")))?;

    let session = match edit.from_file.as_deref() {
        Some(file) => {
            let json = read_json_file(file)?;
            let model = edgeform_core::FormEngine::new(schema).from_resource(&json)?;
            EditSession::with_model(schema, Target::Create { path: path.into() }, model)
        }
        None => EditSession::create(schema, path),
    };
    Ok(session)
}

/// Fetch the resource at `path` and open an update session on it.
///
/// `--from-file` replaces the fetched model before `--set` edits apply.
pub async fn update_session(
    conn: &Connection,
    resource: ResourceType,
    path: &str,
    edit: &EditArgs,
) -> Result<EditSession<'static>, CliError> {
    let session = EditSession::load(schema(resource), path, &conn.client)
        .await
        .map_err(|payload| CliError::from_payload(payload, conn.url.as_str(), &conn.profile, path))?;

    if let Some(file) = edit.from_file.as_deref() {
        let json = read_json_file(file)?;
        session.edit(|engine, _| engine.from_resource(&json))?;
    }
    apply_assignments(&session, resource, &edit.set)?;
    Ok(session)
}

// ── Submit ──────────────────────────────────────────────────────────

/// Prints success lines to stderr; failures surface as the command's error.
pub struct CliNotifier {
    quiet: bool,
    color: bool,
}

impl CliNotifier {
    pub fn new(global: &GlobalOpts) -> Self {
        Self {
            quiet: global.quiet,
            color: output::should_color(global.color),
        }
    }
}

impl Notifier for CliNotifier {
    fn notify(&self, message: &str, severity: Severity) {
        match severity {
            Severity::Success if !self.quiet => {
                eprintln!("{}", output::status_line(true, message, self.color));
            }
            Severity::Success => {}
            Severity::Error => debug!("{message}"),
        }
    }
}

fn spinner(global: &GlobalOpts, message: &'static str) -> Option<ProgressBar> {
    if global.quiet || !std::io::stderr().is_terminal() {
        return None;
    }
    let bar = ProgressBar::new_spinner().with_message(message);
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
        bar.set_style(style);
    }
    bar.enable_steady_tick(Duration::from_millis(80));
    Some(bar)
}

/// Print every violation, then fail with a count.
pub fn report_invalid(
    resource: ResourceType,
    errors: &ValidationErrors,
    global: &GlobalOpts,
) -> CliError {
    output::print_output(&output::render_violations(global.output, errors), false);
    CliError::Invalid {
        resource: schema(resource).title.clone(),
        count: errors.len(),
    }
}

/// Validate the session's model and print it instead of sending it.
pub fn preview(
    session: &EditSession<'_>,
    resource: ResourceType,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let model = session.model();
    validate(session.engine().schema(), &model)
        .map_err(|errors| report_invalid(resource, &errors, global))?;
    output::print_output(&output::render_model(global.output, &model.pruned()), global.quiet);
    Ok(())
}

/// Validate and send the session's model, then print what the controller stored.
pub async fn submit(
    session: &EditSession<'_>,
    conn: &Connection,
    resource: ResourceType,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let notifier = CliNotifier::new(global);
    let bar = spinner(global, "Submitting...");
    let outcome = session.submit(&conn.client, &notifier).await;
    if let Some(bar) = bar {
        bar.finish_and_clear();
    }

    match outcome {
        SubmitOutcome::Submitted(saved) => {
            output::print_output(&output::render_model(global.output, &saved), global.quiet);
            Ok(())
        }
        SubmitOutcome::Invalid(errors) => Err(report_invalid(resource, &errors, global)),
        SubmitOutcome::Failed(payload) => Err(CliError::from_payload(
            payload,
            conn.url.as_str(),
            &conn.profile,
            session.target().path(),
        )),
        SubmitOutcome::AlreadySubmitting | SubmitOutcome::Closed => {
            Err(CliError::Internal("submit did not run".into()))
        }
    }
}

/// Fetch one resource and print it.
pub async fn show(conn: &Connection, path: &str, global: &GlobalOpts) -> Result<(), CliError> {
    use edgeform_core::Transport;

    let model = conn
        .client
        .fetch_resource(path)
        .await
        .map_err(|payload| CliError::from_payload(payload, conn.url.as_str(), &conn.profile, path))?;
    output::print_output(&output::render_model(global.output, &model), global.quiet);
    Ok(())
}
