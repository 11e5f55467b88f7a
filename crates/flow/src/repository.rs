// Archivo: repository.rs
// Propósito: definir el trait `TableStore`, el contrato que deben cumplir
// los almacenes de tablas (PostgREST remoto, en memoria, etc.).
use crate::domain::{Filter, PageResult, Prefer, Row, SelectQuery};
use crate::errors::Result;
use async_trait::async_trait;

/// Contrato mínimo de un almacén de tablas relacional expuesto por REST.
///
/// Cada método corresponde a una llamada remota independiente: no hay
/// transacciones entre llamadas. Las implementaciones deben ser seguras
/// para uso concurrente porque el motor lanza inserts hermanos en paralelo.
#[async_trait]
pub trait TableStore: Send + Sync {
    /// Lee filas de `table` según `query`. Si la consulta trae página y
    /// `count_exact`, el resultado incluye el total.
    async fn select(&self, table: &str, query: &SelectQuery) -> Result<PageResult>;

    /// Inserta una fila. Con `Prefer::ReturnRepresentation` devuelve la
    /// fila creada (incluido el id generado); con `ReturnMinimal` puede
    /// devolver un vector vacío.
    async fn insert(&self, table: &str, row: Row, prefer: Prefer) -> Result<Vec<Row>>;

    /// Actualiza parcialmente las filas que cumplen `filter` y devuelve
    /// las filas resultantes.
    async fn update(&self, table: &str, filter: &Filter, patch: Row) -> Result<Vec<Row>>;

    /// Elimina las filas que cumplen `filter`. Los hijos se eliminan por
    /// cascada en el propio almacén.
    async fn delete(&self, table: &str, filter: &Filter) -> Result<()>;
}
