// edits.rs
//
// Ediciones puntuales desde las fichas de detalle: un campo, una fila, o
// la descripción de una institución.
use crate::engine::SubmissionEngine;
use crate::errors::{Result, WorkflowError};
use civic_domain::schema::{publication, specialist, support_group};
use civic_domain::{DescriptionStorage, InstitutionKind, TableSpec};
use flow::{Filter, Prefer, Row, RowId, TableStore};
use serde_json::Value as JsonValue;

/// Fila editable desde una ficha.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityRef {
    Institution(InstitutionKind),
    OperatingHour(InstitutionKind),
    Contact(InstitutionKind),
    Offering(InstitutionKind),
    Procedure(InstitutionKind),
    Requirement(InstitutionKind),
    /// Sólo existe para las financieras.
    Benefit,
    Specialist,
    Assignment,
    Schedule,
    Publication,
    SupportGroup,
}

impl EntityRef {
    pub fn spec(&self) -> Result<TableSpec> {
        Ok(match self {
            Self::Institution(k) => k.schema().root,
            Self::OperatingHour(k) => k.schema().hours,
            Self::Contact(k) => k.schema().contacts,
            Self::Offering(k) => k.schema().offerings,
            Self::Procedure(k) => k.schema().procedures,
            Self::Requirement(k) => k.schema().requirements,
            Self::Benefit => InstitutionKind::Financial.schema()
                                                       .benefits
                                                       .ok_or_else(|| WorkflowError::Other("sin tabla de beneficios".into()))?,
            Self::Specialist => specialist::SPECIALIST,
            Self::Assignment => specialist::ASSIGNMENT,
            Self::Schedule => specialist::SCHEDULE,
            Self::Publication => publication::PUBLICATION,
            Self::SupportGroup => support_group::SUPPORT_GROUP,
        })
    }

    /// Tabla del listado donde aparece la entidad.
    pub fn listing_table(&self) -> &'static str {
        match self {
            Self::Institution(k)
            | Self::OperatingHour(k)
            | Self::Contact(k)
            | Self::Offering(k)
            | Self::Procedure(k)
            | Self::Requirement(k) => k.schema().root.table,
            Self::Benefit => InstitutionKind::Financial.schema().root.table,
            Self::Specialist | Self::Assignment | Self::Schedule => specialist::SPECIALIST.table,
            Self::Publication => publication::PUBLICATION.table,
            Self::SupportGroup => support_group::SUPPORT_GROUP.table,
        }
    }
}

impl<S> SubmissionEngine<S> where S: TableStore + ?Sized + 'static
{
    /// `PATCH` parcial de una fila por su id.
    pub async fn update_field(&self, entity: EntityRef, id: &RowId, patch: Row) -> Result<Vec<Row>> {
        if patch.is_empty() {
            return Err(WorkflowError::Validation("no hay campos que actualizar".into()));
        }
        let spec = entity.spec()?;
        let updated = self.store().update(spec.table, &Filter::eq(spec.key, id), patch).await?;
        log::info!("{} {}: {} filas actualizadas", spec.table, id, updated.len());
        self.invalidate(entity.listing_table());
        Ok(updated)
    }

    /// Borra una fila; los hijos caen por cascada en el almacén.
    pub async fn delete_entity(&self, entity: EntityRef, id: &RowId) -> Result<()> {
        let spec = entity.spec()?;
        self.store().delete(spec.table, &Filter::eq(spec.key, id)).await?;
        log::info!("{} {} borrado", spec.table, id);
        self.invalidate(entity.listing_table());
        Ok(())
    }

    /// Reemplaza la descripción de una institución.
    ///
    /// Financieras: columna de la raíz. Salud: fila aparte; si la institución
    /// no tenía descripción, el `PATCH` no toca filas y se inserta una.
    pub async fn update_description(&self, kind: InstitutionKind, institution_id: &RowId, html: &str) -> Result<()> {
        let schema = kind.schema();
        let mut patch = Row::new();
        match schema.description {
            DescriptionStorage::Inline { column } => {
                patch.insert(column.to_string(), JsonValue::from(html));
                self.store()
                    .update(schema.root.table, &Filter::eq(schema.root.key, institution_id), patch)
                    .await?;
            }
            DescriptionStorage::Separate { table, column } => {
                patch.insert(column.to_string(), JsonValue::from(html));
                let filter = Filter::eq(table.parent_column(), institution_id);
                let updated = self.store().update(table.table, &filter, patch.clone()).await?;
                if updated.is_empty() {
                    patch.insert(table.parent_column().to_string(), institution_id.to_json());
                    self.store().insert(table.table, patch, Prefer::ReturnMinimal).await?;
                    log::debug!("{}: descripción creada para {}", table.table, institution_id);
                }
            }
        }
        self.invalidate(schema.root.table);
        Ok(())
    }
}
