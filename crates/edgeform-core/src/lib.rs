//! Schema-driven configuration models for an edge network controller.
//!
//! This crate holds everything between the raw REST client
//! (`edgeform-api`) and the CLI:
//!
//! - **Schema Registry** ([`schema`]): immutable declarative schemas for
//!   each [`ResourceType`] (nodes, apps, traffic policies), composed from
//!   shared fragments such as the MAC/IP/GTP packet filters.
//!
//! - **Form state** ([`form`]): the [`FormModel`] under edit and the
//!   [`FormEngine`], whose operations (`set_scalar_field`,
//!   `append_list_entry`, `set_list_entry_field`, `reset_lists`) each
//!   return a new model. Edits are permissive; malformed numbers are kept
//!   as a sentinel rather than rejected.
//!
//! - **Validation** ([`validate()`]): submit-time constraint checks that
//!   collect every violation with its full field path.
//!
//! - **Sessions** ([`EditSession`]): one editing surface's model, with a
//!   single in-flight submit through a [`Transport`] and feedback through
//!   a [`Notifier`].
//!
//! - **Wire models** ([`model`]): typed serde structs for the controller's
//!   JSON shapes.

pub mod error;
pub mod form;
pub mod model;
pub mod schema;
pub mod session;
pub mod transport;
pub mod validate;

// ── Primary re-exports ──────────────────────────────────────────────
pub use error::CoreError;
pub use form::{FieldPath, FormEngine, FormModel, FormValue, Numeric};
pub use schema::{FieldDescriptor, FieldKind, ResourceType, Schema, schema};
pub use session::{EditSession, SubmitOutcome, Target};
pub use transport::{ErrorPayload, Notifier, Severity, TracingNotifier, Transport};
pub use validate::{ValidationErrors, Violation, ViolationKind, validate};
