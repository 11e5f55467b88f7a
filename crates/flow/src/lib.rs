//! Crate `flow`: contrato de almacén de tablas y motor de envío en abanico
//!
//! Este crate define los tipos de valor de una API REST de tablas (`Row`,
//! `RowId`, `Filter`, `PageRequest`), el contrato asíncrono `TableStore`,
//! un motor (`FlowEngine`) que crea un árbol de filas padre → hijos
//! respetando que ningún hijo se cree antes de conocer el id de su padre,
//! y una implementación en memoria útil para pruebas
//! (`InMemoryTableStore`).
//!
//! Diseño resumido:
//! - Orden estricto sólo entre padre e hijo: los hermanos se lanzan en
//!   paralelo como tareas independientes.
//! - Unión fail-fast: el primer error aborta el envío; las hermanas en
//!   vuelo no se cancelan.
//! - Sin transacciones: opcionalmente se compensa borrando la raíz.
//!
//! Ejemplo rápido:
//! ```rust
//! use flow::stubs::InMemoryTableStore;
//! use flow::engine::FlowEngineConfig;
//! use std::sync::Arc;
//! let store = Arc::new(InMemoryTableStore::new());
//! let engine = flow::FlowEngine::new(store, FlowEngineConfig::default());
//! ```
pub mod cache;
pub mod domain;
pub mod engine;
pub mod errors;
pub mod repository;
pub mod stubs;

pub use cache::*;
pub use domain::*;
pub use engine::*;
pub use errors::*;
pub use repository::*;
pub use stubs::*;
