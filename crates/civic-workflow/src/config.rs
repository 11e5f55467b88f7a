use crate::errors::{Result, WorkflowError};
use flow::engine::{Compensation, FlowEngineConfig};
use serde::{Deserialize, Serialize};

pub const COMPENSATION_VAR: &str = "CIVIC_COMPENSATION";
pub const PAGE_SIZE_VAR: &str = "CIVIC_PAGE_SIZE";

/// Opciones de los envíos.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionConfig {
    /// Qué hacer con la raíz ya creada si un hijo falla.
    pub rollback: Rollback,
    /// Tamaño de página de los listados.
    pub page_size: u64,
}

/// Espejo serializable de `flow::engine::Compensation`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rollback {
    #[default]
    None,
    DeleteRoot,
}

impl Default for SubmissionConfig {
    fn default() -> Self {
        SubmissionConfig { rollback: Rollback::None,
                           page_size: 9 }
    }
}

impl SubmissionConfig {
    /// Lee `CIVIC_COMPENSATION` (`none` | `delete_root`) y `CIVIC_PAGE_SIZE`.
    /// Las variables ausentes toman el valor por defecto.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
        where F: Fn(&str) -> Option<String>
    {
        let mut cfg = Self::default();
        if let Some(raw) = lookup(COMPENSATION_VAR) {
            cfg.rollback = match raw.trim().to_lowercase().as_str() {
                "" | "none" => Rollback::None,
                "delete_root" | "delete-root" => Rollback::DeleteRoot,
                other => return Err(WorkflowError::Validation(format!("{} inválido: {}", COMPENSATION_VAR, other))),
            };
        }
        if let Some(raw) = lookup(PAGE_SIZE_VAR) {
            cfg.page_size = raw.trim()
                               .parse::<u64>()
                               .ok()
                               .filter(|n| *n > 0)
                               .ok_or_else(|| WorkflowError::Validation(format!("{} inválido: {}", PAGE_SIZE_VAR, raw)))?;
        }
        Ok(cfg)
    }

    pub fn engine_config(&self) -> FlowEngineConfig {
        FlowEngineConfig { compensation: match self.rollback {
                               Rollback::None => Compensation::None,
                               Rollback::DeleteRoot => Compensation::DeleteRoot,
                           } }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_keep_partial_writes() {
        let cfg = SubmissionConfig::from_lookup(|_| None).expect("config");
        assert_eq!(cfg, SubmissionConfig::default());
        assert_eq!(cfg.engine_config().compensation, Compensation::None);
    }

    #[test]
    fn reads_rollback_and_page_size() {
        let cfg = SubmissionConfig::from_lookup(|n| match n {
                      COMPENSATION_VAR => Some("delete_root".into()),
                      PAGE_SIZE_VAR => Some("20".into()),
                      _ => None,
                  }).expect("config");
        assert_eq!(cfg.engine_config().compensation, Compensation::DeleteRoot);
        assert_eq!(cfg.page_size, 20);
        assert!(SubmissionConfig::from_lookup(|n| (n == PAGE_SIZE_VAR).then(|| "0".to_string())).is_err());
    }
}
