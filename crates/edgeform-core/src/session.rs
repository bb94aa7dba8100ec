// ── Edit sessions ──
//
// An `EditSession` owns one in-progress model for one editing surface
// (a create dialog, an edit view). It applies engine operations, tracks
// the single in-flight submit, and ignores responses that arrive after
// the surface was closed.

use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::error::CoreError;
use crate::form::{FormEngine, FormModel};
use crate::schema::Schema;
use crate::transport::{ErrorPayload, Notifier, Severity, Transport};
use crate::validate::{ValidationErrors, validate};

/// Where a submit goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// `POST` to a collection path.
    Create { path: String },
    /// `PATCH` a resource path.
    Update { path: String },
}

impl Target {
    pub fn path(&self) -> &str {
        match self {
            Self::Create { path } | Self::Update { path } => path,
        }
    }
}

/// Result of [`EditSession::submit`].
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Persisted; carries the model as stored by the controller.
    Submitted(FormModel),
    /// Blocked by validation; nothing was sent.
    Invalid(ValidationErrors),
    /// Another submit of this session is still in flight; nothing was sent.
    AlreadySubmitting,
    /// The transport failed. The model is unchanged and can be resubmitted.
    Failed(ErrorPayload),
    /// The session was closed, before sending or while waiting.
    Closed,
}

/// One editing surface's model, submit state and lifetime.
pub struct EditSession<'s> {
    engine: FormEngine<'s>,
    target: Target,
    model: watch::Sender<FormModel>,
    submitting: AtomicBool,
    closed: CancellationToken,
}

impl<'s> EditSession<'s> {
    /// A session for creating a new resource, starting from a blank model.
    pub fn create(schema: &'s Schema, path: impl Into<String>) -> Self {
        let engine = FormEngine::new(schema);
        let model = engine.new_model();
        Self::with_model(schema, Target::Create { path: path.into() }, model)
    }

    /// A session for editing an existing resource.
    pub fn update(schema: &'s Schema, path: impl Into<String>, model: FormModel) -> Self {
        Self::with_model(schema, Target::Update { path: path.into() }, model)
    }

    /// Fetch the resource at `path` and open an update session on it.
    pub async fn load<T: Transport>(
        schema: &'s Schema,
        path: impl Into<String>,
        transport: &T,
    ) -> Result<Self, ErrorPayload> {
        let path = path.into();
        let fetched = transport.fetch_resource(&path).await?;
        let model = FormEngine::new(schema)
            .from_resource(&fetched.to_json())
            .map_err(|e| ErrorPayload::Unreachable {
                reason: e.to_string(),
            })?;
        Ok(Self::update(schema, path, model))
    }

    /// A session over an existing model, e.g. one read from a file.
    pub fn with_model(schema: &'s Schema, target: Target, model: FormModel) -> Self {
        let (model, _) = watch::channel(model);
        Self {
            engine: FormEngine::new(schema),
            target,
            model,
            submitting: AtomicBool::new(false),
            closed: CancellationToken::new(),
        }
    }

    pub fn target(&self) -> &Target {
        &self.target
    }

    pub fn engine(&self) -> FormEngine<'s> {
        self.engine
    }

    /// A snapshot of the current model.
    pub fn model(&self) -> FormModel {
        self.model.borrow().clone()
    }

    /// Receive the model after every successful edit.
    pub fn subscribe(&self) -> watch::Receiver<FormModel> {
        self.model.subscribe()
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting.load(Ordering::Acquire)
    }

    pub fn is_closed(&self) -> bool {
        self.closed.is_cancelled()
    }

    /// Apply one engine operation to the current model.
    ///
    /// On error the model is left as it was.
    pub fn edit<F>(&self, op: F) -> Result<(), CoreError>
    where
        F: FnOnce(&FormEngine<'s>, &FormModel) -> Result<FormModel, CoreError>,
    {
        if self.is_closed() {
            return Err(CoreError::SessionClosed);
        }
        let next = op(&self.engine, &self.model.borrow())?;
        self.model.send_replace(next);
        Ok(())
    }

    /// Reopen a create surface: dynamic lists go back to one blank entry.
    pub fn reopen(&self) -> Result<(), CoreError> {
        let lists = self.engine.dynamic_lists();
        self.edit(|engine, model| engine.reset_lists(model, &lists))
    }

    /// Close the surface. A submit still in flight completes silently.
    pub fn close(&self) {
        debug!(path = self.target.path(), "edit session closed");
        self.closed.cancel();
    }

    /// Validate and hand the model to `transport`.
    ///
    /// At most one submit runs at a time; a second call while one is in
    /// flight returns [`SubmitOutcome::AlreadySubmitting`] without sending.
    /// Success and transport failures are reported through `notifier`
    /// unless the session was closed in the meantime.
    pub async fn submit<T, N>(&self, transport: &T, notifier: &N) -> SubmitOutcome
    where
        T: Transport,
        N: Notifier,
    {
        if self.is_closed() {
            return SubmitOutcome::Closed;
        }
        if self
            .submitting
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!(path = self.target.path(), "submit already in flight");
            return SubmitOutcome::AlreadySubmitting;
        }
        let _guard = SubmitGuard(&self.submitting);

        let model = self.model();
        if let Err(errors) = validate(self.engine.schema(), &model) {
            debug!(violations = errors.len(), "submit blocked by validation");
            return SubmitOutcome::Invalid(errors);
        }

        let body = model.pruned();
        let result = match &self.target {
            Target::Create { path } => transport.create_resource(path, &body).await,
            Target::Update { path } => transport.update_resource(path, &body).await,
        };

        if self.is_closed() {
            debug!(path = self.target.path(), "dropping response for closed session");
            return SubmitOutcome::Closed;
        }

        let title = self.engine.schema().title.to_lowercase();
        match result {
            Ok(saved) => {
                let message = match self.target {
                    Target::Create { .. } => format!("Successfully added {title}."),
                    Target::Update { .. } => format!("Successfully updated {title}."),
                };
                info!(path = self.target.path(), "{message}");
                notifier.notify(&message, Severity::Success);
                SubmitOutcome::Submitted(saved)
            }
            Err(payload) => {
                notifier.notify(payload.user_message(), Severity::Error);
                SubmitOutcome::Failed(payload)
            }
        }
    }
}

/// Clears the in-flight flag however the submit ends (including drop).
struct SubmitGuard<'a>(&'a AtomicBool);

impl Drop for SubmitGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}
