// Archivo: stubs.rs
// Propósito: implementación en memoria de `TableStore` para pruebas y
// demos.
//
// Además de guardar filas, registra cada llamada (inicio y fin) para que
// las pruebas puedan verificar orden y solapamiento, y permite inyectar
// fallos, latencia y respuestas sin id. No es durable.
use crate::domain::{Filter, PageResult, Prefer, Row, SelectQuery, StoreOp};
use crate::errors::{FlowError, Result};
use crate::repository::TableStore;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde_json::Value as JsonValue;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

/// Fase de una llamada registrada.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Begin,
    End,
}

/// Entrada del registro de llamadas.
#[derive(Debug, Clone)]
pub struct StoreEvent {
    /// Orden global (monótono) del evento.
    pub seq: u64,
    pub phase: Phase,
    pub op: StoreOp,
    pub table: String,
    /// Payload enviado (insert/update) o fila devuelta en el fin de un insert.
    pub row: Option<Row>,
    /// Sólo significativo en `Phase::End`.
    pub ok: bool,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
struct FailureRule {
    table: String,
    op: StoreOp,
    /// `None`: falla siempre; `Some(n)`: sólo la n-ésima llamada (1-based).
    nth: Option<usize>,
}

#[derive(Debug, Clone)]
struct Cascade {
    parent_table: String,
    child_table: String,
    child_column: String,
}

#[derive(Debug, Default)]
struct Table {
    key_column: String,
    next_id: i64,
    rows: IndexMap<u64, Row>,
    next_slot: u64,
}

/// Almacén de tablas en memoria con registro de llamadas.
pub struct InMemoryTableStore {
    tables: Mutex<HashMap<String, Table>>,
    keys: Mutex<HashMap<String, String>>,
    events: Mutex<Vec<StoreEvent>>,
    failures: Mutex<Vec<FailureRule>>,
    counters: Mutex<HashMap<(String, StoreOp), usize>>,
    omit_ids: Mutex<HashSet<String>>,
    cascades: Mutex<Vec<Cascade>>,
    latency: Mutex<Duration>,
    table_latency: Mutex<HashMap<String, Duration>>,
    seq: AtomicU64,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl Default for InMemoryTableStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryTableStore {
    /// Crea un almacén vacío. Las tablas sin clave configurada usan `id`.
    pub fn new() -> Self {
        Self { tables: Mutex::new(HashMap::new()),
               keys: Mutex::new(HashMap::new()),
               events: Mutex::new(Vec::new()),
               failures: Mutex::new(Vec::new()),
               counters: Mutex::new(HashMap::new()),
               omit_ids: Mutex::new(HashSet::new()),
               cascades: Mutex::new(Vec::new()),
               latency: Mutex::new(Duration::ZERO),
               table_latency: Mutex::new(HashMap::new()),
               seq: AtomicU64::new(0),
               in_flight: AtomicUsize::new(0),
               max_in_flight: AtomicUsize::new(0) }
    }

    /// Registra la columna de id generado de `table`.
    pub fn with_key(self, table: &str, key_column: &str) -> Self {
        self.guard(&self.keys).insert(table.to_string(), key_column.to_string());
        self
    }

    pub fn with_keys<'a>(self, keys: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        keys.into_iter().fold(self, |s, (t, k)| s.with_key(t, k))
    }

    /// Latencia artificial entre el inicio y el fin de cada llamada.
    pub fn with_latency(self, latency: Duration) -> Self {
        *self.guard(&self.latency) = latency;
        self
    }

    /// Latencia propia de `table`; sustituye a la general.
    pub fn with_table_latency(self, table: &str, latency: Duration) -> Self {
        self.guard(&self.table_latency).insert(table.to_string(), latency);
        self
    }

    /// Al borrar filas de `parent_table`, borra las filas de `child_table`
    /// cuyo `child_column` apunte a ellas.
    pub fn with_cascade(self, parent_table: &str, child_table: &str, child_column: &str) -> Self {
        self.guard(&self.cascades).push(Cascade { parent_table: parent_table.to_string(),
                                                  child_table: child_table.to_string(),
                                                  child_column: child_column.to_string() });
        self
    }

    /// Toda llamada `op` sobre `table` falla.
    pub fn fail_on(&self, table: &str, op: StoreOp) {
        self.guard(&self.failures).push(FailureRule { table: table.to_string(), op, nth: None });
    }

    /// Sólo la n-ésima llamada (1-based) `op` sobre `table` falla.
    pub fn fail_nth(&self, table: &str, op: StoreOp, nth: usize) {
        self.guard(&self.failures).push(FailureRule { table: table.to_string(), op, nth: Some(nth) });
    }

    /// Los inserts en `table` responden sin la columna de id.
    pub fn omit_identifiers(&self, table: &str) {
        self.guard(&self.omit_ids).insert(table.to_string());
    }

    /// Inserta filas directamente, sin registrar llamadas. Devuelve las
    /// filas con su id asignado.
    pub fn seed(&self, table: &str, rows: impl IntoIterator<Item = Row>) -> Vec<Row> {
        let key = self.key_for(table);
        let mut tables = self.guard(&self.tables);
        let t = tables.entry(table.to_string()).or_insert_with(|| Table { key_column: key, ..Default::default() });
        rows.into_iter().map(|r| t.push(r)).collect()
    }

    /// Copia del registro de llamadas.
    pub fn events(&self) -> Vec<StoreEvent> {
        self.guard(&self.events).clone()
    }

    /// Payloads enviados en las llamadas `op` sobre `table`, en orden de inicio.
    pub fn calls(&self, op: StoreOp, table: &str) -> Vec<Row> {
        self.guard(&self.events)
            .iter()
            .filter(|e| e.phase == Phase::Begin && e.op == op && e.table == table)
            .map(|e| e.row.clone().unwrap_or_default())
            .collect()
    }

    /// Número de llamadas iniciadas (cualquier operación salvo select).
    pub fn write_count(&self) -> usize {
        self.guard(&self.events)
            .iter()
            .filter(|e| e.phase == Phase::Begin && e.op != StoreOp::Select)
            .count()
    }

    /// Filas actuales de `table`.
    pub fn rows(&self, table: &str) -> Vec<Row> {
        self.guard(&self.tables)
            .get(table)
            .map(|t| t.rows.values().cloned().collect())
            .unwrap_or_default()
    }

    /// Máximo de llamadas simultáneas observado.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn guard<'a, T>(&'a self, m: &'a Mutex<T>) -> MutexGuard<'a, T> {
        m.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn key_for(&self, table: &str) -> String {
        self.guard(&self.keys).get(table).cloned().unwrap_or_else(|| "id".to_string())
    }

    fn record(&self, phase: Phase, op: StoreOp, table: &str, row: Option<Row>, ok: bool) {
        let seq = self.seq.fetch_add(1, Ordering::SeqCst);
        self.guard(&self.events).push(StoreEvent { seq,
                                                   phase,
                                                   op,
                                                   table: table.to_string(),
                                                   row,
                                                   ok,
                                                   at: Utc::now() });
    }

    /// Registra el inicio, aplica latencia y decide si la llamada falla.
    async fn begin(&self, op: StoreOp, table: &str, row: Option<Row>) -> Result<()> {
        self.record(Phase::Begin, op, table, row, true);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        let latency = self.guard(&self.table_latency)
                          .get(table)
                          .copied()
                          .unwrap_or_else(|| *self.guard(&self.latency));
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }

        let n = {
            let mut counters = self.guard(&self.counters);
            let c = counters.entry((table.to_string(), op)).or_insert(0);
            *c += 1;
            *c
        };
        let fails = self.guard(&self.failures)
                        .iter()
                        .any(|f| f.table == table && f.op == op && f.nth.map(|k| k == n).unwrap_or(true));
        if fails {
            self.finish(op, table, None, false);
            return Err(FlowError::Remote { status: 409,
                                           message: format!("{} rechazado en {} (llamada {})", op, table, n) });
        }
        Ok(())
    }

    fn finish(&self, op: StoreOp, table: &str, row: Option<Row>, ok: bool) {
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.record(Phase::End, op, table, row, ok);
    }

    /// Borra las filas que cumplen `filter` y aplica cascadas.
    fn delete_cascading(&self, tables: &mut HashMap<String, Table>, table: &str, filter: &Filter) {
        let removed: Vec<Row> = match tables.get_mut(table) {
            Some(t) => {
                let slots: Vec<u64> = t.rows.iter().filter(|(_, r)| filter.matches(r)).map(|(s, _)| *s).collect();
                slots.iter().filter_map(|s| t.rows.shift_remove(s)).collect()
            }
            None => Vec::new(),
        };
        if removed.is_empty() {
            return;
        }
        let key = tables.get(table).map(|t| t.key_column.clone()).unwrap_or_else(|| "id".into());
        let cascades: Vec<Cascade> = self.guard(&self.cascades)
                                         .iter()
                                         .filter(|c| c.parent_table == table)
                                         .cloned()
                                         .collect();
        for c in cascades {
            for r in &removed {
                if let Some(id) = r.get(&key).and_then(crate::domain::scalar_text) {
                    self.delete_cascading(tables, &c.child_table, &Filter::eq(&c.child_column, id));
                }
            }
        }
    }
}

impl Table {
    /// Guarda la fila asignando id si no trae uno.
    fn push(&mut self, mut row: Row) -> Row {
        let has_key = row.get(&self.key_column).map(|v| !v.is_null()).unwrap_or(false);
        if has_key {
            if let Some(n) = row.get(&self.key_column).and_then(JsonValue::as_i64) {
                self.next_id = self.next_id.max(n);
            }
        } else {
            self.next_id += 1;
            row.insert(self.key_column.clone(), JsonValue::from(self.next_id));
        }
        self.next_slot += 1;
        self.rows.insert(self.next_slot, row.clone());
        row
    }
}

#[async_trait]
impl TableStore for InMemoryTableStore {
    /// Aplica filtros de igualdad, cuenta y recorta por rango. La expresión
    /// `select` se ignora (no hay relaciones embebidas en memoria).
    async fn select(&self, table: &str, query: &SelectQuery) -> Result<PageResult> {
        self.begin(StoreOp::Select, table, None).await?;
        let matching: Vec<Row> = self.guard(&self.tables)
                                     .get(table)
                                     .map(|t| t.rows.values().filter(|r| query.filter.matches(r)).cloned().collect())
                                     .unwrap_or_default();
        let total = matching.len() as u64;
        let rows = match query.page {
            Some(p) => {
                let (from, to) = p.range();
                matching.into_iter().skip(from as usize).take((to - from + 1) as usize).collect()
            }
            None => matching,
        };
        self.finish(StoreOp::Select, table, None, true);
        Ok(PageResult { rows,
                        total: if query.count_exact { Some(total) } else { None } })
    }

    async fn insert(&self, table: &str, row: Row, prefer: Prefer) -> Result<Vec<Row>> {
        self.begin(StoreOp::Insert, table, Some(row.clone())).await?;
        let key = self.key_for(table);
        let mut stored = {
            let mut tables = self.guard(&self.tables);
            let t = tables.entry(table.to_string()).or_insert_with(|| Table { key_column: key.clone(), ..Default::default() });
            t.push(row)
        };
        if self.guard(&self.omit_ids).contains(table) {
            stored.remove(&key);
        }
        self.finish(StoreOp::Insert, table, Some(stored.clone()), true);
        Ok(match prefer {
            Prefer::ReturnRepresentation => vec![stored],
            Prefer::ReturnMinimal => Vec::new(),
        })
    }

    async fn update(&self, table: &str, filter: &Filter, patch: Row) -> Result<Vec<Row>> {
        self.begin(StoreOp::Update, table, Some(patch.clone())).await?;
        let updated: Vec<Row> = {
            let mut tables = self.guard(&self.tables);
            match tables.get_mut(table) {
                Some(t) => t.rows
                            .values_mut()
                            .filter(|r| filter.matches(r))
                            .map(|r| {
                                for (k, v) in patch.iter() {
                                    r.insert(k.clone(), v.clone());
                                }
                                r.clone()
                            })
                            .collect(),
                None => Vec::new(),
            }
        };
        self.finish(StoreOp::Update, table, None, true);
        Ok(updated)
    }

    async fn delete(&self, table: &str, filter: &Filter) -> Result<()> {
        let mut filter_row = Row::new();
        for (c, v) in filter.predicates() {
            filter_row.insert(c.clone(), JsonValue::from(v.clone()));
        }
        self.begin(StoreOp::Delete, table, Some(filter_row)).await?;
        {
            let mut tables = self.guard(&self.tables);
            self.delete_cascading(&mut tables, table, filter);
        }
        self.finish(StoreOp::Delete, table, None, true);
        Ok(())
    }
}
