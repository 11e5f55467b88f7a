// config.rs
//
// Configuración del cliente REST desde variables de entorno (se admite
// `.env`). Cada variable tiene un nombre propio y, como respaldo, el
// nombre que usaba el panel web.
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const BASE_URL_VARS: [&str; 2] = ["CIVIC_API_BASE_URL", "VITE_REACT_APP_API_BASE_URL"];
pub const API_KEY_VARS: [&str; 2] = ["CIVIC_API_KEY", "VITE_API_KEY"];
pub const AUTH_VARS: [&str; 2] = ["CIVIC_API_AUTH", "VITE_API_AUTH_KEY"];
pub const TIMEOUT_VAR: &str = "CIVIC_API_TIMEOUT_SECS";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Variable de entorno no definida: {}", .0.join(" / "))]
    Missing(Vec<&'static str>),
    #[error("Valor inválido en {var}: {reason}")]
    Invalid { var: &'static str, reason: String },
    #[error("No se pudo construir el cliente HTTP: {0}")]
    Client(String),
}

/// Datos de conexión a la API REST.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestConfig {
    pub base_url: String,
    /// Valor de la cabecera `apikey`.
    pub api_key: String,
    /// Valor literal de la cabecera `Authorization`.
    pub auth_token: String,
    pub timeout_secs: u64,
}

// Las credenciales no se imprimen.
impl std::fmt::Debug for RestConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestConfig")
         .field("base_url", &self.base_url)
         .field("api_key", &"***")
         .field("auth_token", &"***")
         .field("timeout_secs", &self.timeout_secs)
         .finish()
    }
}

impl RestConfig {
    pub fn new(base_url: &str, api_key: &str, auth_token: &str) -> Self {
        Self { base_url: base_url.trim_end_matches('/').to_string(),
               api_key: api_key.to_string(),
               auth_token: auth_token.to_string(),
               timeout_secs: DEFAULT_TIMEOUT_SECS }
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Lee la configuración del entorno del proceso (cargando `.env` si
    /// existe).
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Igual que `from_env` pero con una función de búsqueda arbitraria.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
        where F: Fn(&str) -> Option<String>
    {
        let first = |names: &[&'static str]| -> Result<String, ConfigError> {
            names.iter()
                 .filter_map(|n| lookup(*n))
                 .map(|v| v.trim().to_string())
                 .find(|v| !v.is_empty())
                 .ok_or_else(|| ConfigError::Missing(names.to_vec()))
        };
        let base_url = first(&BASE_URL_VARS)?;
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ConfigError::Invalid { var: BASE_URL_VARS[0],
                                              reason: format!("se esperaba una URL http(s), se obtuvo '{}'", base_url) });
        }
        let api_key = first(&API_KEY_VARS)?;
        let auth_token = first(&AUTH_VARS)?;
        let timeout_secs = match lookup(TIMEOUT_VAR) {
            Some(raw) => raw.trim().parse::<u64>().map_err(|e| ConfigError::Invalid { var: TIMEOUT_VAR,
                                                                                        reason: e.to_string() })?,
            None => DEFAULT_TIMEOUT_SECS,
        };
        Ok(Self::new(&base_url, &api_key, &auth_token).with_timeout(timeout_secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn falls_back_to_dashboard_variable_names() {
        let vars = env(&[("VITE_REACT_APP_API_BASE_URL", "https://db.example.org/rest/v1/"),
                         ("VITE_API_KEY", "anon"),
                         ("CIVIC_API_AUTH", "Bearer t0k3n")]);
        let cfg = RestConfig::from_lookup(|n| vars.get(n).cloned()).expect("config");
        assert_eq!(cfg.base_url, "https://db.example.org/rest/v1");
        assert_eq!(cfg.api_key, "anon");
        assert_eq!(cfg.auth_token, "Bearer t0k3n");
        assert_eq!(cfg.timeout_secs, DEFAULT_TIMEOUT_SECS);
    }

    #[test]
    fn missing_and_invalid_values() {
        let vars = env(&[("CIVIC_API_BASE_URL", "https://x"), ("CIVIC_API_KEY", " ")]);
        let err = RestConfig::from_lookup(|n| vars.get(n).cloned()).expect_err("sin api key");
        assert_eq!(err, ConfigError::Missing(API_KEY_VARS.to_vec()));

        let vars = env(&[("CIVIC_API_BASE_URL", "https://x"),
                         ("CIVIC_API_KEY", "k"),
                         ("CIVIC_API_AUTH", "a"),
                         ("CIVIC_API_TIMEOUT_SECS", "soon")]);
        assert!(matches!(RestConfig::from_lookup(|n| vars.get(n).cloned()),
                         Err(ConfigError::Invalid { var: TIMEOUT_VAR, .. })));
    }

    #[test]
    fn debug_hides_credentials() {
        let cfg = RestConfig::new("https://x", "secret-key", "Bearer secret");
        let shown = format!("{:?}", cfg);
        assert!(!shown.contains("secret"));
    }
}
