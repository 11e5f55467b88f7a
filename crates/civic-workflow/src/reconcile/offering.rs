// offering.rs
//
// Guardado de una oferta (servicio o programa) editada desde la ficha de la
// institución.
use super::{is_blank_text, merge_reports, reconcile_list, EditableList, ReconcileReport};
use crate::engine::SubmissionEngine;
use crate::errors::{Result, WorkflowError};
use civic_domain::{benefit_row, procedure_row, requirement_row, InstitutionKind, OfferingDraft};
use flow::{Filter, FlowError, Prefer, RowId, TableStore};
use std::sync::Arc;

/// Estado editable de una oferta y sus tres listas.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OfferingEdit {
    /// `None` si la oferta aún no existe.
    pub offering_id: Option<RowId>,
    pub name: String,
    pub description: String,
    pub procedures: EditableList<String>,
    pub requirements: EditableList<String>,
    pub benefits: EditableList<String>,
}

impl OfferingEdit {
    /// Oferta nueva a partir de un borrador.
    pub fn from_draft(draft: &OfferingDraft) -> Self {
        let list = |items: &[String]| {
            let mut l = EditableList::new();
            for i in items {
                l.push(i.clone());
            }
            l
        };
        Self { offering_id: None,
               name: draft.name.clone(),
               description: draft.description.clone(),
               procedures: list(&draft.procedures),
               requirements: list(&draft.requirements),
               benefits: list(&draft.benefits) }
    }
}

/// Resultado de `reconcile_offering`.
#[derive(Debug, Clone, PartialEq)]
pub struct OfferingSync {
    pub offering_id: RowId,
    /// `true` si la oferta se creó en esta pasada.
    pub created: bool,
    pub items: ReconcileReport,
}

/// Guarda la oferta y sus listas.
///
/// Oferta existente: `update` de su fila. Oferta nueva: `insert` con
/// representación para obtener su id, igual que en el alta. Después se
/// reconcilian pasos, requisitos y beneficios a la vez; si alguna lista
/// falla, las demás terminan igualmente y se devuelve el primer error.
/// Los servicios de salud no tienen beneficios: una edición de salud con
/// beneficios se rechaza antes de llamar al almacén.
pub async fn reconcile_offering<S>(store: Arc<S>,
                                   kind: InstitutionKind,
                                   institution_id: &RowId,
                                   edit: &mut OfferingEdit)
                                   -> Result<OfferingSync>
    where S: TableStore + ?Sized + 'static
{
    let schema = kind.schema();
    if schema.benefits.is_none() && edit.benefits.values().any(|b| !b.trim().is_empty()) {
        return Err(WorkflowError::Validation("los servicios de salud no llevan beneficios".to_string()));
    }
    if edit.name.trim().is_empty() {
        return Err(WorkflowError::Validation(format!("{} sin nombre", kind.offering_label())));
    }

    let draft = OfferingDraft::new(&edit.name, &edit.description);
    let row = draft.to_row(schema);
    let (offering_id, created) = match edit.offering_id.clone() {
        Some(id) => {
            store.update(schema.offerings.table, &Filter::eq(schema.offerings.key, &id), row).await?;
            (id, false)
        }
        None => {
            let mut row = row;
            row.insert(schema.offerings.parent_column().to_string(), institution_id.to_json());
            let inserted = store.insert(schema.offerings.table, row, Prefer::ReturnRepresentation).await?;
            let id = inserted.first()
                             .and_then(|r| RowId::from_row(r, schema.offerings.key))
                             .ok_or_else(|| FlowError::MissingIdentifier { table: schema.offerings.table.to_string(),
                                                                           key_column: schema.offerings.key.to_string() })?;
            log::info!("{} {} creado para {}", schema.offerings.table, id, institution_id);
            edit.offering_id = Some(id.clone());
            (id, true)
        }
    };

    let OfferingEdit { procedures,
                       requirements,
                       benefits,
                       .. } = edit;
    let steps = reconcile_list(store.clone(),
                               &schema.procedures,
                               &offering_id,
                               procedures,
                               |i, text: &String| procedure_row(schema, i, text),
                               is_blank_text);
    let reqs = reconcile_list(store.clone(),
                              &schema.requirements,
                              &offering_id,
                              requirements,
                              |_, text: &String| requirement_row(schema, text),
                              is_blank_text);
    let benefs = async {
        match &schema.benefits {
            Some(spec) => {
                reconcile_list(store.clone(),
                               spec,
                               &offering_id,
                               benefits,
                               |_, text: &String| benefit_row(schema, text).unwrap_or_default(),
                               is_blank_text).await
            }
            None => Ok(ReconcileReport::default()),
        }
    };
    // las tres listas terminan antes de devolver el primer error: cada una
    // anota los ids de sus inserts
    let (a, b, c) = tokio::join!(steps, reqs, benefs);

    Ok(OfferingSync { offering_id,
                      created,
                      items: merge_reports([a?, b?, c?]) })
}

impl<S> SubmissionEngine<S> where S: TableStore + ?Sized + 'static
{
    /// `reconcile_offering` sobre el almacén del motor. Tras cualquier
    /// escritura, con o sin error, el listado de la institución se vuelve a
    /// leer.
    pub async fn save_offering(&self,
                               kind: InstitutionKind,
                               institution_id: &RowId,
                               edit: &mut OfferingEdit)
                               -> Result<OfferingSync> {
        let result = reconcile_offering(self.store().clone(), kind, institution_id, edit).await;
        if !matches!(result, Err(WorkflowError::Validation(_))) {
            self.invalidate(kind.schema().root.table);
        }
        result
    }
}
