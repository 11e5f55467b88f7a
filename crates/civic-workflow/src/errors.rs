use thiserror::Error;

// Errores comunes de los envíos.
//
// Centraliza los errores de la capa de almacén (`FlowError`), del dominio
// (`DomainError`, incluida la validación de formularios) y de la
// configuración del cliente REST.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum WorkflowError {
  /// Errores del almacén remoto o del motor de envío.
  #[error("Error de flujo: {0}")]
  Flow(#[from] flow::FlowError),

  /// Errores del dominio: formularios inválidos, valores desconocidos.
  #[error("Error de dominio: {0}")]
  Domain(#[from] civic_domain::DomainError),

  /// Configuración del cliente REST incompleta o inválida.
  #[error("Error de configuración: {0}")]
  Config(#[from] civic_persistence::ConfigError),

  /// Validaciones propias del workflow (índices fuera de rango, ediciones
  /// incoherentes).
  #[error("Error de validacion: {0}")]
  Validation(String),

  #[error("Otro error: {0}")]
  Other(String),
}

impl From<serde_json::Error> for WorkflowError {
  fn from(e: serde_json::Error) -> Self {
    Self::Flow(flow::FlowError::from(e))
  }
}

pub type Result<T> = std::result::Result<T, WorkflowError>;
