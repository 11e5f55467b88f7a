// geography.rs
//
// Opciones de los desplegables de ubicación y de los catálogos simples.
// Las cuatro listas geográficas se cargan completas: no hay filtrado en
// cascada entre niveles.
use crate::errors::DomainError;
use crate::schema::{self, CatalogSpec};
use flow::{scalar_text, Row};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GeoLevel {
    Province,
    City,
    Barangay,
    Purok,
}

impl GeoLevel {
    pub const ALL: [GeoLevel; 4] = [Self::Province, Self::City, Self::Barangay, Self::Purok];

    pub fn spec(&self) -> CatalogSpec {
        match self {
            Self::Province => schema::PROVINCES,
            Self::City => schema::CITIES,
            Self::Barangay => schema::BARANGAYS,
            Self::Purok => schema::PUROKS,
        }
    }
}

impl fmt::Display for GeoLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.spec().table)
    }
}

/// Entrada `código → etiqueta` de un catálogo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupOption {
    pub code: String,
    pub label: String,
}

impl LookupOption {
    /// Construye la opción desde una fila del catálogo. Una etiqueta ausente
    /// se muestra como el propio código.
    pub fn from_row(spec: &CatalogSpec, row: &Row) -> Result<Self, DomainError> {
        let code = row.get(spec.key)
                      .and_then(scalar_text)
                      .ok_or_else(|| DomainError::ValidationError(format!("fila de {} sin {}", spec.table, spec.key)))?;
        let label = row.get(spec.label).and_then(scalar_text).unwrap_or_else(|| code.clone());
        Ok(Self { code, label })
    }

    pub fn from_rows(spec: &CatalogSpec, rows: &[Row]) -> Result<Vec<Self>, DomainError> {
        rows.iter().map(|r| Self::from_row(spec, r)).collect()
    }
}

pub type Province = LookupOption;
pub type City = LookupOption;
pub type Barangay = LookupOption;
pub type Purok = LookupOption;
