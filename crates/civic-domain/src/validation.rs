// validation.rs
//
// Validación local de formularios. Se ejecuta antes de cualquier llamada
// remota y devuelve todos los campos con error, no sólo el primero.
use crate::errors::DomainError;
use chrono::NaiveTime;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

static COORDINATE: Lazy<Result<Regex, DomainError>> = Lazy::new(|| compile(r"^-?\d+(\.\d+)?$"));
static EMAIL: Lazy<Result<Regex, DomainError>> = Lazy::new(|| compile(r"^\S+@\S+$"));

fn compile(pattern: &str) -> Result<Regex, DomainError> {
    Regex::new(pattern).map_err(|e| DomainError::ValidationError(format!("Patrón inválido {}: {}", pattern, e)))
}

fn is_match(re: &Lazy<Result<Regex, DomainError>>, value: &str) -> bool {
    match re.as_ref() {
        Ok(re) => re.is_match(value),
        Err(_) => false,
    }
}

pub const WEEKDAYS: [&str; 7] = ["Monday", "Tuesday", "Wednesday", "Thursday", "Friday", "Saturday", "Sunday"];

/// Error de un campo concreto. `field` es una ruta con puntos, p. ej.
/// `contacts.1.value`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Conjunto de errores de un formulario.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    errors: Vec<FieldError>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(FieldError { field: field.into(),
                                      message: message.into() });
    }

    /// Registra `message` si `ok` es falso.
    pub fn check(&mut self, ok: bool, field: impl Into<String>, message: &str) {
        if !ok {
            self.push(field, message);
        }
    }

    /// Requiere texto no vacío (tras recortar espacios).
    pub fn require(&mut self, value: &str, field: impl Into<String>, message: &str) {
        self.check(!value.trim().is_empty(), field, message);
    }

    /// Añade los errores de otro informe con el prefijo `prefix`.
    pub fn merge(&mut self, prefix: &str, other: ValidationReport) {
        for e in other.errors {
            self.push(format!("{}.{}", prefix, e.field), e.message);
        }
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn has_error(&self, field: &str) -> bool {
        self.errors.iter().any(|e| e.field == field)
    }

    pub fn into_result(self) -> Result<(), DomainError> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(DomainError::Invalid(self))
        }
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.errors.iter().map(|e| format!("{}: {}", e.field, e.message)).collect();
        write!(f, "{}", parts.join("; "))
    }
}

/// Formulario validable localmente.
pub trait Validate {
    fn validate(&self) -> ValidationReport;

    fn ensure_valid(&self) -> Result<(), DomainError> {
        self.validate().into_result()
    }
}

pub fn is_coordinate(value: &str) -> bool {
    is_match(&COORDINATE, value.trim())
}

pub fn is_email(value: &str) -> bool {
    is_match(&EMAIL, value)
}

pub fn is_mobile(value: &str) -> bool {
    value.len() == 11 && value.chars().all(|c| c.is_ascii_digit())
}

pub fn is_landline(value: &str) -> bool {
    (7..=9).contains(&value.len()) && value.chars().all(|c| c.is_ascii_digit())
}

pub fn is_weekday(value: &str) -> bool {
    WEEKDAYS.contains(&value)
}

/// Hora `HH:MM` o `HH:MM:SS`.
pub fn is_time(value: &str) -> bool {
    NaiveTime::parse_from_str(value, "%H:%M").is_ok() || NaiveTime::parse_from_str(value, "%H:%M:%S").is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coordinates_accept_signed_decimals_only() {
        assert!(is_coordinate("10.3157"));
        assert!(is_coordinate("-123"));
        assert!(!is_coordinate("10."));
        assert!(!is_coordinate("1,5"));
        assert!(!is_coordinate(""));
    }

    #[test]
    fn phone_lengths() {
        assert!(is_mobile("09123456789"));
        assert!(!is_mobile("0912345678"));
        assert!(!is_mobile("0912345678a"));
        assert!(is_landline("2345678"));
        assert!(is_landline("032234567"));
        assert!(!is_landline("123456"));
        assert!(!is_landline("1234567890"));
    }

    #[test]
    fn email_and_time() {
        assert!(is_email("hello@domain.com"));
        assert!(!is_email("hello domain.com"));
        assert!(is_time("08:00"));
        assert!(is_time("17:30:00"));
        assert!(!is_time("8am"));
    }

    #[test]
    fn report_collects_and_prefixes() {
        let mut inner = ValidationReport::new();
        inner.require(" ", "value", "requerido");
        let mut outer = ValidationReport::new();
        outer.merge("contacts.1", inner);
        assert!(outer.has_error("contacts.1.value"));
        assert!(matches!(outer.into_result(), Err(DomainError::Invalid(_))));
    }
}
