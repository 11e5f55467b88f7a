// rest_store.rs
//
// `TableStore` sobre una API PostgREST. Cada operación es una única
// petición HTTP; no hay transacciones entre peticiones.
use crate::config::{ConfigError, RestConfig};
use crate::range::parse_content_range;
use async_trait::async_trait;
use flow::{Filter, FlowError, PageResult, Prefer, Result, Row, SelectQuery, StoreOp, TableStore};
use reqwest::header::{AUTHORIZATION, CONTENT_RANGE, RANGE};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde_json::Value as JsonValue;
use std::time::Duration;

const PREFER: &str = "Prefer";
const MAX_ERROR_BODY: usize = 300;

/// Cliente PostgREST.
pub struct PostgrestStore {
    client: Client,
    config: RestConfig,
}

impl PostgrestStore {
    pub fn new(config: RestConfig) -> std::result::Result<Self, ConfigError> {
        let client = Client::builder().timeout(Duration::from_secs(config.timeout_secs))
                                      .user_agent(concat!("civic-admin/", env!("CARGO_PKG_VERSION")))
                                      .build()
                                      .map_err(|e| ConfigError::Client(e.to_string()))?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &RestConfig {
        &self.config
    }

    fn url(&self, table: &str) -> String {
        format!("{}/{}", self.config.base_url, table)
    }

    /// Petición con las cabeceras fijas de autenticación.
    fn request(&self, method: Method, table: &str) -> RequestBuilder {
        self.client
            .request(method, self.url(table))
            .header("apikey", self.config.api_key.as_str())
            .header(AUTHORIZATION, self.config.auth_token.as_str())
    }

    async fn send(&self, op: StoreOp, table: &str, request: RequestBuilder) -> Result<Response> {
        log::debug!("{} {}", op, table);
        let response = request.send().await.map_err(|e| {
                                               log::error!("{} {}: fallo de transporte: {}", op, table, e);
                                               FlowError::Transport(e.to_string())
                                           })?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        let message = remote_message(&body);
        log::error!("{} {} rechazado ({}): {}", op, table, status.as_u16(), message);
        Err(FlowError::Remote { status: status.as_u16(),
                                message })
    }

    /// Rechaza filtros vacíos en escrituras: sin filtro PostgREST afectaría
    /// a toda la tabla.
    fn require_filter(op: StoreOp, table: &str, filter: &Filter) -> Result<()> {
        if filter.is_empty() {
            return Err(FlowError::Other(format!("{} sobre {} sin filtro", op, table)));
        }
        Ok(())
    }
}

/// Mensaje legible de un cuerpo de error: el campo `message` de PostgREST
/// si el cuerpo es JSON, si no el texto recortado.
fn remote_message(body: &str) -> String {
    if let Ok(JsonValue::Object(obj)) = serde_json::from_str::<JsonValue>(body) {
        let parts: Vec<&str> = ["message", "details", "hint"].iter()
                                                             .filter_map(|k| obj.get(*k).and_then(JsonValue::as_str))
                                                             .collect();
        if !parts.is_empty() {
            return parts.join(" - ");
        }
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "sin detalle".to_string();
    }
    trimmed.chars().take(MAX_ERROR_BODY).collect()
}

/// Filas de una respuesta. Un cuerpo vacío (return=minimal) son cero filas.
async fn decode_rows(response: Response) -> Result<Vec<Row>> {
    let text = response.text().await.map_err(|e| FlowError::Transport(e.to_string()))?;
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }
    match serde_json::from_str::<JsonValue>(&text)? {
        JsonValue::Array(items) => items.into_iter()
                                        .map(|v| match v {
                                            JsonValue::Object(row) => Ok(row),
                                            other => Err(FlowError::Serialization(format!("se esperaba una fila, llegó {}", other))),
                                        })
                                        .collect(),
        JsonValue::Object(row) => Ok(vec![row]),
        other => Err(FlowError::Serialization(format!("respuesta inesperada: {}", other))),
    }
}

#[async_trait]
impl TableStore for PostgrestStore {
    async fn select(&self, table: &str, query: &SelectQuery) -> Result<PageResult> {
        let mut request = self.request(Method::GET, table)
                              .query(&[("select", query.select.as_str())])
                              .query(&query.filter.to_query_pairs());
        if let Some(page) = query.page {
            request = request.header(RANGE, page.range_header());
        }
        if query.count_exact {
            request = request.header(PREFER, "count=exact");
        }
        let response = self.send(StoreOp::Select, table, request).await?;
        let total = response.headers()
                            .get(CONTENT_RANGE)
                            .and_then(|v| v.to_str().ok())
                            .and_then(parse_content_range)
                            .and_then(|r| r.total);
        let rows = decode_rows(response).await?;
        log::debug!("select {}: {} filas (total {:?})", table, rows.len(), total);
        Ok(PageResult { rows, total })
    }

    async fn insert(&self, table: &str, row: Row, prefer: Prefer) -> Result<Vec<Row>> {
        let request = self.request(Method::POST, table).header(PREFER, prefer.header_value()).json(&row);
        let response = self.send(StoreOp::Insert, table, request).await?;
        decode_rows(response).await
    }

    async fn update(&self, table: &str, filter: &Filter, patch: Row) -> Result<Vec<Row>> {
        Self::require_filter(StoreOp::Update, table, filter)?;
        let request = self.request(Method::PATCH, table)
                          .query(&filter.to_query_pairs())
                          .header(PREFER, Prefer::ReturnRepresentation.header_value())
                          .json(&patch);
        let response = self.send(StoreOp::Update, table, request).await?;
        decode_rows(response).await
    }

    async fn delete(&self, table: &str, filter: &Filter) -> Result<()> {
        Self::require_filter(StoreOp::Delete, table, filter)?;
        let request = self.request(Method::DELETE, table).query(&filter.to_query_pairs());
        self.send(StoreOp::Delete, table, request).await?;
        Ok(())
    }
}

/// Construye un `PostgrestStore` con la configuración del entorno.
pub fn new_from_env() -> std::result::Result<PostgrestStore, ConfigError> {
    let config = RestConfig::from_env()?;
    log::info!("API REST en {}", config.base_url);
    PostgrestStore::new(config)
}
