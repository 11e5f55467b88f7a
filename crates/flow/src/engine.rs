// Archivo: engine.rs
// Propósito: motor de envío en abanico (fan-out) de un árbol de filas.
//
// Un envío crea una fila raíz, espera su id generado y a partir de ahí
// lanza en paralelo a todos los hijos que dependen de ese id. Un hijo con
// descendientes repite el patrón con su propio id. No hay transacción: lo
// que ya se creó queda creado salvo que la configuración pida compensar.
use crate::domain::{Filter, Prefer, Row, RowId};
use crate::errors::{FlowError, Result};
use crate::repository::TableStore;
use chrono::{DateTime, Utc};
use futures::future::BoxFuture;
use futures::stream::{FuturesUnordered, StreamExt};
use futures::FutureExt;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tokio::task::JoinHandle;
use uuid::Uuid;

/// Qué hacer con las tareas hermanas cuando una de ellas falla.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settle {
    /// Devolver el error de inmediato; las hermanas siguen en vuelo y sus
    /// resultados se descartan (no se cancelan).
    Detach,
    /// Esperar a que todas las hermanas terminen antes de devolver el error.
    Drain,
}

/// Política ante un fallo posterior a la creación de la raíz.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Compensation {
    /// Sin rollback: las filas creadas quedan persistidas.
    #[default]
    None,
    /// Esperar a las tareas en vuelo y borrar la fila raíz (los hijos caen
    /// por cascada en el almacén).
    DeleteRoot,
}

/// Configuración del motor.
#[derive(Debug, Clone, Default)]
pub struct FlowEngineConfig {
    pub compensation: Compensation,
}

/// Nodo del árbol de envío: una fila a crear y las filas que dependen de
/// su id generado.
#[derive(Debug, Clone, PartialEq)]
pub struct RowNode {
    pub table: String,
    /// Columna donde el almacén devuelve el id generado.
    pub key_column: String,
    /// Columna del hijo que recibe el id del padre; `None` en la raíz.
    pub parent_column: Option<String>,
    pub row: Row,
    pub children: Vec<RowNode>,
}

impl RowNode {
    pub fn new(table: &str, key_column: &str, row: Row) -> Self {
        Self { table: table.to_string(),
               key_column: key_column.to_string(),
               parent_column: None,
               row,
               children: Vec::new() }
    }

    /// Marca el nodo como hijo: el id del padre se escribirá en `column`.
    pub fn linked_by(mut self, column: &str) -> Self {
        self.parent_column = Some(column.to_string());
        self
    }

    pub fn with_child(mut self, child: RowNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = RowNode>) -> Self {
        self.children.extend(children);
        self
    }

    /// Número total de filas del subárbol (incluido este nodo).
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(RowNode::count).sum::<usize>()
    }

    /// Sólo se pide la representación cuando hace falta el id.
    fn prefer(&self) -> Prefer {
        if self.children.is_empty() {
            Prefer::ReturnMinimal
        } else {
            Prefer::ReturnRepresentation
        }
    }
}

/// Resumen de un envío completado.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowReport {
    pub submission_id: Uuid,
    pub root_table: String,
    pub root_id: RowId,
    /// Filas creadas, incluida la raíz.
    pub created: usize,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

/// Envío abortado. Conserva lo necesario para diagnosticar la escritura
/// parcial.
#[derive(Debug, Clone, Error)]
#[error("{error}")]
pub struct FlowAbort {
    pub submission_id: Uuid,
    pub error: FlowError,
    /// Id de la raíz si llegó a crearse.
    pub root_id: Option<RowId>,
    /// Filas confirmadas por el almacén hasta el momento del fallo.
    pub created: usize,
    /// `true` si la raíz se borró como compensación.
    pub rolled_back: bool,
}

/// Motor de envío sobre un `TableStore` compartido.
pub struct FlowEngine<S>
    where S: TableStore + ?Sized + 'static
{
    store: Arc<S>,
    config: FlowEngineConfig,
}

impl<S> FlowEngine<S> where S: TableStore + ?Sized + 'static
{
    pub fn new(store: Arc<S>, config: FlowEngineConfig) -> Self {
        Self { store, config }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn config(&self) -> &FlowEngineConfig {
        &self.config
    }

    /// Ejecuta el árbol completo.
    ///
    /// 1. Crea la raíz y espera su id (sin id no hay nada a qué colgar los
    ///    hijos: `MissingIdentifier`).
    /// 2. Lanza cada hijo como tarea propia con el id de la raíz.
    /// 3. Cada hijo con descendientes espera su propio id y lanza a los
    ///    suyos.
    /// 4. Espera a todos con semántica "todos o el primer error".
    pub async fn execute(&self, root: RowNode) -> std::result::Result<FlowReport, FlowAbort> {
        let submission_id = Uuid::new_v4();
        let started_at = Utc::now();
        let created = Arc::new(AtomicUsize::new(0));
        let RowNode { table,
                      key_column,
                      row,
                      children,
                      .. } = root;

        log::info!("envío {}: creando raíz en {} ({} hijos directos)", submission_id, table, children.len());
        let created_root = create_row(self.store.as_ref(), &table, &key_column, row, Prefer::ReturnRepresentation, &created)
            .await
            .and_then(|id| require_id(id, &table, &key_column));
        let root_id = match created_root {
            Ok(id) => id,
            Err(error) => {
                log::error!("envío {}: falló la raíz en {}: {}", submission_id, table, error);
                return Err(FlowAbort { submission_id,
                                       error,
                                       root_id: None,
                                       created: created.load(Ordering::SeqCst),
                                       rolled_back: false });
            }
        };

        let settle = match self.config.compensation {
            Compensation::None => Settle::Detach,
            Compensation::DeleteRoot => Settle::Drain,
        };
        let outcome = spawn_level(self.store.clone(), children, root_id.clone(), settle, created.clone()).await;

        match outcome {
            Ok(()) => {
                let report = FlowReport { submission_id,
                                          root_table: table,
                                          root_id,
                                          created: created.load(Ordering::SeqCst),
                                          started_at,
                                          finished_at: Utc::now() };
                log::info!("envío {}: {} filas creadas", submission_id, report.created);
                Ok(report)
            }
            Err(error) => {
                log::error!("envío {}: fallo parcial tras crear {} {}: {}", submission_id, table, root_id, error);
                let rolled_back = match self.config.compensation {
                    Compensation::None => false,
                    Compensation::DeleteRoot => {
                        let filter = Filter::eq(&key_column, &root_id);
                        match self.store.delete(&table, &filter).await {
                            Ok(()) => {
                                log::warn!("envío {}: raíz {} {} borrada como compensación", submission_id, table, root_id);
                                true
                            }
                            Err(e) => {
                                log::error!("envío {}: no se pudo compensar {} {}: {}", submission_id, table, root_id, e);
                                false
                            }
                        }
                    }
                };
                Err(FlowAbort { submission_id,
                                error,
                                root_id: Some(root_id),
                                created: created.load(Ordering::SeqCst),
                                rolled_back })
            }
        }
    }
}

/// Inserta una fila. Con `ReturnRepresentation` exige el id generado.
async fn create_row<S>(store: &S,
                       table: &str,
                       key_column: &str,
                       row: Row,
                       prefer: Prefer,
                       created: &AtomicUsize)
                       -> Result<Option<RowId>>
    where S: TableStore + ?Sized
{
    log::debug!("insert {} ({})", table, prefer.header_value());
    let returned = store.insert(table, row, prefer).await?;
    created.fetch_add(1, Ordering::SeqCst);
    if prefer == Prefer::ReturnMinimal {
        return Ok(None);
    }
    let id = returned.first().and_then(|r| RowId::from_row(r, key_column));
    require_id(id, table, key_column).map(Some)
}

fn require_id(id: Option<RowId>, table: &str, key_column: &str) -> Result<RowId> {
    id.ok_or_else(|| FlowError::MissingIdentifier { table: table.to_string(),
                                                    key_column: key_column.to_string() })
}

/// Lanza todos los nodos de un nivel con el id de su padre y espera con
/// semántica fail-fast.
fn spawn_level<S>(store: Arc<S>,
                  nodes: Vec<RowNode>,
                  parent_id: RowId,
                  settle: Settle,
                  created: Arc<AtomicUsize>)
                  -> BoxFuture<'static, Result<()>>
    where S: TableStore + ?Sized + 'static
{
    async move {
        if nodes.is_empty() {
            return Ok(());
        }
        let handles: Vec<JoinHandle<Result<()>>> =
            nodes.into_iter()
                 .map(|node| tokio::spawn(create_subtree(store.clone(), node, parent_id.clone(), settle, created.clone())))
                 .collect();
        join_fail_fast(handles, settle).await.map(|_| ())
    }.boxed()
}

fn create_subtree<S>(store: Arc<S>,
                     node: RowNode,
                     parent_id: RowId,
                     settle: Settle,
                     created: Arc<AtomicUsize>)
                     -> BoxFuture<'static, Result<()>>
    where S: TableStore + ?Sized + 'static
{
    async move {
        let prefer = node.prefer();
        let RowNode { table,
                      key_column,
                      parent_column,
                      mut row,
                      children } = node;
        if let Some(column) = parent_column {
            row.insert(column, parent_id.to_json());
        }
        let own_id = create_row(store.as_ref(), &table, &key_column, row, prefer, &created).await?;
        match own_id {
            Some(id) => spawn_level(store, children, id, settle, created).await,
            None => Ok(()),
        }
    }.boxed()
}

/// Espera un lote de tareas y devuelve sus resultados en orden de lote.
///
/// Al primer error: con `Settle::Detach` retorna ya (las tareas restantes
/// siguen ejecutándose, desacopladas); con `Settle::Drain` espera a que
/// terminen todas y luego retorna ese primer error.
pub async fn join_fail_fast<T>(handles: Vec<JoinHandle<Result<T>>>, settle: Settle) -> Result<Vec<T>>
    where T: Send + 'static
{
    let total = handles.len();
    let mut pending: FuturesUnordered<_> = handles.into_iter()
                                                  .enumerate()
                                                  .map(|(i, h)| async move { (i, h.await) })
                                                  .collect();
    let mut slots: Vec<Option<T>> = (0..total).map(|_| None).collect();
    while let Some((i, joined)) = pending.next().await {
        let result = joined.map_err(|e| FlowError::Other(format!("tarea interrumpida: {}", e)))
                           .and_then(|r| r);
        match result {
            Ok(v) => slots[i] = Some(v),
            Err(e) => {
                if settle == Settle::Drain {
                    while pending.next().await.is_some() {}
                }
                return Err(e);
            }
        }
    }
    Ok(slots.into_iter().flatten().collect())
}

/// Lanza cada futuro como tarea independiente y los une con
/// `join_fail_fast`.
pub async fn run_concurrently<T, F>(futures: Vec<F>, settle: Settle) -> Result<Vec<T>>
    where T: Send + 'static,
          F: Future<Output = Result<T>> + Send + 'static
{
    let handles = futures.into_iter().map(tokio::spawn).collect();
    join_fail_fast(handles, settle).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;

    fn row(v: serde_json::Value) -> Row {
        v.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn count_includes_every_descendant() {
        let tree = RowNode::new("a", "id", row(json!({})))
            .with_child(RowNode::new("b", "id", row(json!({}))).linked_by("a_id")
                                                                .with_child(RowNode::new("c", "id", row(json!({}))).linked_by("b_id")))
            .with_child(RowNode::new("d", "id", row(json!({}))).linked_by("a_id"));
        assert_eq!(tree.count(), 4);
        assert_eq!(tree.children[0].prefer(), Prefer::ReturnRepresentation);
        assert_eq!(tree.children[1].prefer(), Prefer::ReturnMinimal);
    }

    #[tokio::test]
    async fn join_keeps_batch_order() {
        let out = run_concurrently(vec![async {
                                            tokio::time::sleep(Duration::from_millis(20)).await;
                                            Ok::<_, FlowError>(1)
                                        }.boxed(),
                                        async { Ok::<_, FlowError>(2) }.boxed()],
                                   Settle::Detach).await
                                                  .expect("join");
        assert_eq!(out, vec![1, 2]);
    }

    #[tokio::test]
    async fn drain_waits_for_slow_siblings() {
        let finished = Arc::new(AtomicUsize::new(0));
        let f = finished.clone();
        let slow = async move {
            tokio::time::sleep(Duration::from_millis(30)).await;
            f.fetch_add(1, Ordering::SeqCst);
            Ok::<(), FlowError>(())
        }.boxed();
        let failing = async { Err::<(), FlowError>(FlowError::Other("boom".into())) }.boxed();
        let res = run_concurrently(vec![slow, failing], Settle::Drain).await;
        assert!(res.is_err());
        assert_eq!(finished.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn detach_returns_before_slow_siblings_finish() {
        let finished = Arc::new(AtomicUsize::new(0));
        let f = finished.clone();
        let slow = async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            f.fetch_add(1, Ordering::SeqCst);
            Ok::<(), FlowError>(())
        }.boxed();
        let failing = async { Err::<(), FlowError>(FlowError::Other("boom".into())) }.boxed();
        let res = run_concurrently(vec![slow, failing], Settle::Detach).await;
        assert!(res.is_err());
        assert_eq!(finished.load(Ordering::SeqCst), 0);
        // la hermana no se cancela: termina por su cuenta
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(finished.load(Ordering::SeqCst), 1);
    }
}
