// errors.rs
use crate::validation::ValidationReport;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
  #[error("Error de validación: {0}")]
  ValidationError(String),
  #[error("Formulario inválido: {0}")]
  Invalid(ValidationReport),
  #[error("Valor desconocido para {kind}: '{value}'")]
  UnknownValue { kind: &'static str, value: String },
  #[error("Error de serialización: {0}")]
  SerializationError(String),
}

impl From<serde_json::Error> for DomainError {
  fn from(e: serde_json::Error) -> Self {
    Self::SerializationError(e.to_string())
  }
}

impl From<ValidationReport> for DomainError {
  fn from(report: ValidationReport) -> Self {
    Self::Invalid(report)
  }
}

pub type Result<T> = std::result::Result<T, DomainError>;
