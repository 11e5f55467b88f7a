//! Persistencia remota: cliente PostgREST que implementa
//! `flow::TableStore`, su configuración desde el entorno y las utilidades
//! de paginación (`Range` / `Content-Range`).

pub mod config;
pub mod range;
mod rest_store;

pub use config::{ConfigError, RestConfig};
pub use range::{page_count, parse_content_range, ContentRange};
pub use rest_store::{new_from_env, PostgrestStore};
