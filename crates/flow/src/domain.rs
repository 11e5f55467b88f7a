// Archivo: domain.rs
// Propósito: tipos de valor compartidos por el contrato `TableStore`:
// filas, identificadores generados, filtros de igualdad y paginación.
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;

/// Una fila tal como viaja por la API: objeto JSON columna -> valor.
pub type Row = serde_json::Map<String, JsonValue>;

/// Identificador generado por el almacén (entero o texto según la tabla).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RowId(JsonValue);

impl RowId {
    /// Extrae un id de un valor JSON. Sólo acepta escalares no vacíos.
    pub fn from_value(value: &JsonValue) -> Option<Self> {
        match value {
            JsonValue::Number(_) => Some(Self(value.clone())),
            JsonValue::String(s) if !s.trim().is_empty() => Some(Self(value.clone())),
            _ => None,
        }
    }

    /// Busca `key_column` en la fila y lo convierte en `RowId`.
    pub fn from_row(row: &Row, key_column: &str) -> Option<Self> {
        row.get(key_column).and_then(Self::from_value)
    }

    /// Valor JSON listo para insertarse como clave foránea.
    pub fn to_json(&self) -> JsonValue {
        self.0.clone()
    }

    pub fn as_i64(&self) -> Option<i64> {
        self.0.as_i64()
    }
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            JsonValue::String(s) => write!(f, "{}", s),
            other => write!(f, "{}", other),
        }
    }
}

impl From<i64> for RowId {
    fn from(v: i64) -> Self {
        Self(JsonValue::from(v))
    }
}

impl From<&str> for RowId {
    fn from(v: &str) -> Self {
        Self(JsonValue::from(v))
    }
}

impl From<String> for RowId {
    fn from(v: String) -> Self {
        Self(JsonValue::from(v))
    }
}

/// Representación textual de un escalar tal como aparece en un filtro
/// `eq.`; `None` para null, arrays y objetos.
pub fn scalar_text(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::String(s) => Some(s.clone()),
        JsonValue::Number(n) => Some(n.to_string()),
        JsonValue::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Conjunto de predicados de igualdad (`columna=eq.valor`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filter {
    predicates: Vec<(String, String)>,
}

impl Filter {
    /// Filtro con un único predicado de igualdad.
    pub fn eq(column: &str, value: impl fmt::Display) -> Self {
        Self::default().and_eq(column, value)
    }

    pub fn and_eq(mut self, column: &str, value: impl fmt::Display) -> Self {
        self.predicates.push((column.to_string(), value.to_string()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    pub fn predicates(&self) -> &[(String, String)] {
        &self.predicates
    }

    /// Pares de query string en formato PostgREST.
    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        self.predicates
            .iter()
            .map(|(c, v)| (c.clone(), format!("eq.{}", v)))
            .collect()
    }

    /// Evalúa el filtro contra una fila local.
    pub fn matches(&self, row: &Row) -> bool {
        self.predicates.iter().all(|(c, v)| {
                                  row.get(c)
                                     .and_then(scalar_text)
                                     .map(|s| &s == v)
                                     .unwrap_or(false)
                              })
    }
}

/// Página solicitada (1-based) y su tamaño.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PageRequest {
    pub page: u64,
    pub page_size: u64,
}

impl PageRequest {
    /// Normaliza `page` y `page_size` a un mínimo de 1.
    pub fn new(page: u64, page_size: u64) -> Self {
        Self { page: page.max(1),
               page_size: page_size.max(1) }
    }

    /// Rango inclusivo de filas `(from, to)` que cubre la página.
    pub fn range(&self) -> (u64, u64) {
        let size = self.page_size.max(1);
        let from = self.page.saturating_sub(1).saturating_mul(size);
        (from, from.saturating_add(size - 1))
    }

    /// Valor de la cabecera `Range` (`from-to`).
    pub fn range_header(&self) -> String {
        let (from, to) = self.range();
        format!("{}-{}", from, to)
    }
}

/// Parámetros de una lectura.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectQuery {
    /// Expresión `select=` (columnas y relaciones embebidas).
    pub select: String,
    pub filter: Filter,
    pub page: Option<PageRequest>,
    /// Pide el total de filas (`Prefer: count=exact`).
    pub count_exact: bool,
}

impl Default for SelectQuery {
    fn default() -> Self {
        Self { select: "*".into(),
               filter: Filter::default(),
               page: None,
               count_exact: false }
    }
}

impl SelectQuery {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn columns(mut self, select: &str) -> Self {
        self.select = select.to_string();
        self
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filter = filter;
        self
    }

    /// Pagina la lectura y pide el conteo exacto.
    pub fn page(mut self, page: PageRequest) -> Self {
        self.page = Some(page);
        self.count_exact = true;
        self
    }

    pub fn count_exact(mut self) -> Self {
        self.count_exact = true;
        self
    }

    /// Clave estable para cachear el resultado de esta lectura.
    pub fn cache_key(&self) -> String {
        let filters: Vec<String> = self.filter
                                       .to_query_pairs()
                                       .into_iter()
                                       .map(|(c, v)| format!("{}={}", c, v))
                                       .collect();
        let page = self.page.map(|p| p.range_header()).unwrap_or_else(|| "-".into());
        format!("{}|{}|{}|{}", self.select, filters.join("&"), page, self.count_exact)
    }
}

/// Resultado de una lectura: filas y total (si se pidió `count=exact`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageResult {
    pub rows: Vec<Row>,
    pub total: Option<u64>,
}

/// Preferencia de retorno para escrituras.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Prefer {
    /// Devolver la fila creada (necesario cuando se requiere el id).
    ReturnRepresentation,
    /// No devolver cuerpo.
    ReturnMinimal,
}

impl Prefer {
    pub fn header_value(&self) -> &'static str {
        match self {
            Prefer::ReturnRepresentation => "return=representation",
            Prefer::ReturnMinimal => "return=minimal",
        }
    }
}

/// Operación de almacén; se usa en logs y en el registro de llamadas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StoreOp {
    Select,
    Insert,
    Update,
    Delete,
}

impl fmt::Display for StoreOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StoreOp::Select => "select",
            StoreOp::Insert => "insert",
            StoreOp::Update => "update",
            StoreOp::Delete => "delete",
        };
        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn page_two_of_nine_covers_rows_nine_to_seventeen() {
        let p = PageRequest::new(2, 9);
        assert_eq!(p.range(), (9, 17));
        assert_eq!(p.range_header(), "9-17");
    }

    #[test]
    fn page_zero_is_treated_as_first_page() {
        assert_eq!(PageRequest::new(0, 10).range_header(), "0-9");
    }

    #[test]
    fn huge_page_numbers_saturate() {
        let (from, to) = PageRequest::new(u64::MAX, 9).range();
        assert_eq!(from, u64::MAX);
        assert_eq!(to, u64::MAX);
        assert_eq!(PageRequest::new(u64::MAX / 4, 9).range().1, u64::MAX);
    }

    #[test]
    fn row_id_rejects_null_and_blank() {
        assert!(RowId::from_value(&json!(null)).is_none());
        assert!(RowId::from_value(&json!("  ")).is_none());
        assert_eq!(RowId::from_value(&json!(7)).unwrap().to_string(), "7");
        assert_eq!(RowId::from_value(&json!("PH-01")).unwrap().to_string(), "PH-01");
    }

    #[test]
    fn filter_matches_numbers_and_strings() {
        let row = json!({"service_id": 4, "code": "A1"}).as_object().cloned().unwrap();
        assert!(Filter::eq("service_id", 4).matches(&row));
        assert!(Filter::eq("code", "A1").and_eq("service_id", RowId::from(4i64)).matches(&row));
        assert!(!Filter::eq("service_id", 5).matches(&row));
        assert_eq!(Filter::eq("service_id", 4).to_query_pairs(), vec![("service_id".to_string(), "eq.4".to_string())]);
    }
}
