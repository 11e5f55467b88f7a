// Archivo: errors.rs
// Propósito: definir los errores del contrato de almacenamiento y el alias
// Result<T> usado por las APIs del crate.
use thiserror::Error;

/// Errores comunes al hablar con el almacén remoto de tablas.
///
/// - `Remote`: el almacén respondió con un estado no exitoso.
/// - `Transport`: la llamada no llegó a completarse (red, timeout, TLS).
/// - `MissingIdentifier`: un insert exitoso no devolvió el id generado.
/// - `Other`: cualquier otro error.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FlowError {
  /// Rechazo del almacén remoto (constraint, permisos, payload inválido).
  #[error("Rechazo remoto (HTTP {status}): {message}")]
  Remote { status: u16, message: String },
  /// Fallo de transporte antes de obtener una respuesta.
  #[error("Error de transporte: {0}")]
  Transport(String),
  /// El insert se aceptó pero la respuesta no trae el id generado.
  #[error("La tabla {table} no devolvió el identificador {key_column}")]
  MissingIdentifier { table: String, key_column: String },
  /// Error al (de)serializar filas.
  #[error("Error de serialización: {0}")]
  Serialization(String),
  /// Otro tipo de error.
  #[error("Otro: {0}")]
  Other(String),
}

impl From<serde_json::Error> for FlowError {
  fn from(e: serde_json::Error) -> Self {
    Self::Serialization(e.to_string())
  }
}

/// Alias de resultado usado por las APIs del crate.
pub type Result<T> = std::result::Result<T, FlowError>;
