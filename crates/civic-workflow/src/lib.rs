//! civic-workflow: envíos del panel administrativo
//!
//! Une el modelo de `civic_domain` con el motor de `flow`: cada tipo de
//! envío (instituciones, especialistas, publicaciones, grupos de apoyo)
//! se valida localmente y se convierte en un árbol de filas que el motor
//! crea respetando padre → hijos. Incluye la reconciliación de listas ya
//! persistidas, el CRUD de catálogos y los listados paginados.

pub mod catalog;
pub mod config;
pub mod edits;
pub mod engine;
pub mod errors;
pub mod flows;
pub mod listing;
pub mod outcome;
pub mod reconcile;
pub mod submission_kind;

pub use catalog::{Catalog, GeoOptions};
pub use config::{Rollback, SubmissionConfig};
pub use edits::EntityRef;
pub use engine::SubmissionEngine;
pub use errors::{Result, WorkflowError};
pub use flows::SubmissionFlow;
pub use listing::{Listing, ListingPage};
pub use outcome::{FailureStage, Notification, NotificationLevel, SubmissionOutcome};
pub use reconcile::{Confirm, EditableItem, EditableList, OfferingEdit, RemoveOutcome};
pub use submission_kind::SubmissionKind;
