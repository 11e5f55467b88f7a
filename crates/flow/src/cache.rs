// Archivo: cache.rs
// Propósito: caché de listados por tabla. Las pantallas de listado leen de
// aquí y los envíos exitosos invalidan la tabla afectada para forzar una
// nueva lectura.
use crate::domain::{PageResult, SelectQuery};
use crate::errors::Result;
use crate::repository::TableStore;
use dashmap::DashMap;

/// Caché concurrente `(tabla, consulta) -> PageResult`.
#[derive(Debug, Default)]
pub struct ListingCache {
    entries: DashMap<(String, String), PageResult>,
}

impl ListingCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, table: &str, query: &SelectQuery) -> Option<PageResult> {
        self.entries
            .get(&(table.to_string(), query.cache_key()))
            .map(|e| e.value().clone())
    }

    pub fn put(&self, table: &str, query: &SelectQuery, result: PageResult) {
        self.entries.insert((table.to_string(), query.cache_key()), result);
    }

    /// Descarta todas las entradas de `table`.
    pub fn invalidate(&self, table: &str) {
        self.entries.retain(|(t, _), _| t != table);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Devuelve la entrada cacheada o lee del almacén y la guarda.
    pub async fn fetch<S>(&self, store: &S, table: &str, query: &SelectQuery) -> Result<PageResult>
        where S: TableStore + ?Sized
    {
        if let Some(hit) = self.get(table, query) {
            log::debug!("caché: acierto en {}", table);
            return Ok(hit);
        }
        let fresh = store.select(table, query).await?;
        self.put(table, query, fresh.clone());
        Ok(fresh)
    }
}
