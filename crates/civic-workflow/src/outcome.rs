// outcome.rs
//
// Resultado tipado de un envío. La capa de presentación decide cómo
// mostrarlo; `notification()` da el texto que usaba el panel.
use crate::errors::WorkflowError;
use crate::submission_kind::SubmissionKind;
use civic_domain::{DomainError, ValidationReport};
use flow::RowId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotificationLevel {
    Success,
    Failure,
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub level: NotificationLevel,
    pub title: String,
    pub message: String,
}

impl Notification {
    pub fn success(title: &str, message: impl Into<String>) -> Self {
        Self { level: NotificationLevel::Success,
               title: title.to_string(),
               message: message.into() }
    }

    pub fn failure(title: &str, message: impl Into<String>) -> Self {
        Self { level: NotificationLevel::Failure,
               title: title.to_string(),
               message: message.into() }
    }

    pub fn info(title: &str, message: impl Into<String>) -> Self {
        Self { level: NotificationLevel::Info,
               title: title.to_string(),
               message: message.into() }
    }
}

/// Dónde se detuvo un envío fallido.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureStage {
    /// Rechazado localmente; no hubo llamadas remotas.
    Validation,
    /// Alguna llamada remota falló.
    Remote,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmissionOutcome {
    Succeeded {
        kind: SubmissionKind,
        submission_id: Uuid,
        root_id: RowId,
        /// Filas creadas, incluida la raíz.
        created: usize,
    },
    Failed {
        kind: SubmissionKind,
        stage: FailureStage,
        error: WorkflowError,
        /// Raíz ya creada cuando el fallo llega después (escritura parcial).
        root_id: Option<RowId>,
        rolled_back: bool,
    },
}

impl SubmissionOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded { .. })
    }

    pub fn kind(&self) -> SubmissionKind {
        match self {
            Self::Succeeded { kind, .. } | Self::Failed { kind, .. } => *kind,
        }
    }

    pub fn root_id(&self) -> Option<&RowId> {
        match self {
            Self::Succeeded { root_id, .. } => Some(root_id),
            Self::Failed { root_id, .. } => root_id.as_ref(),
        }
    }

    pub fn error(&self) -> Option<&WorkflowError> {
        match self {
            Self::Succeeded { .. } => None,
            Self::Failed { error, .. } => Some(error),
        }
    }

    /// Errores de campo cuando el fallo fue de validación.
    pub fn validation_report(&self) -> Option<&ValidationReport> {
        match self {
            Self::Failed { error: WorkflowError::Domain(DomainError::Invalid(report)),
                           .. } => Some(report),
            _ => None,
        }
    }

    pub fn notification(&self) -> Notification {
        match self {
            Self::Succeeded { kind, created, .. } => {
                Notification::success("Submission Success",
                                      format!("The {} was saved ({} records).", kind.label(), created))
            }
            Self::Failed { kind,
                           stage: FailureStage::Validation,
                           error,
                           .. } => {
                let count = match error {
                    WorkflowError::Domain(DomainError::Invalid(report)) => report.errors().len(),
                    _ => 1,
                };
                Notification::failure("Submission Failed",
                                      format!("The {} form has {} invalid field(s).", kind.label(), count))
            }
            Self::Failed { kind,
                           stage: FailureStage::Remote,
                           error,
                           .. } => Notification::failure(kind.failure_title(),
                                                         format!("There was an error submitting the {}. Please try \
                                                                  again. ({})",
                                                                 kind.label(),
                                                                 error)),
        }
    }
}
