// reconcile/mod.rs
//
// Edición de listas hijas ya persistidas. Guardar emite un `update` por
// cada elemento con id y un `insert` por cada elemento nuevo; nunca borra.
// Los borrados se hacen en el momento en que el usuario quita un elemento
// (`EditableList::remove`), tras confirmación.
mod offering;

pub use offering::{reconcile_offering, OfferingEdit, OfferingSync};

use crate::edits::EntityRef;
use crate::engine::SubmissionEngine;
use crate::errors::{Result, WorkflowError};
use crate::outcome::Notification;
use civic_domain::TableSpec;
use flow::{run_concurrently, Filter, FlowError, Prefer, Row, RowId, Settle, TableStore};
use std::sync::Arc;

/// Elemento de una lista editable. `persisted_id` es `None` hasta que el
/// almacén lo crea.
#[derive(Debug, Clone, PartialEq)]
pub struct EditableItem<T> {
    pub persisted_id: Option<RowId>,
    pub value: T,
}

/// Escritura que requiere un elemento al guardar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlannedWrite {
    Update { index: usize, id: RowId },
    Insert { index: usize },
}

/// Resultado de `EditableList::remove`.
#[derive(Debug, Clone, PartialEq)]
pub enum RemoveOutcome {
    /// El usuario no confirmó; la lista no cambia.
    Declined,
    /// Elemento sin id: se quitó sin llamada remota.
    RemovedLocal,
    /// Borrado remoto confirmado y elemento quitado.
    Deleted(RowId),
    /// Falló el borrado remoto: el elemento sigue en la lista.
    Kept(Notification),
}

/// Conteo de escrituras de una pasada de reconciliación.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub updated: usize,
    pub inserted: usize,
}

impl ReconcileReport {
    fn add(self, other: ReconcileReport) -> ReconcileReport {
        ReconcileReport { updated: self.updated + other.updated,
                          inserted: self.inserted + other.inserted }
    }
}

/// Confirmación bloqueante antes de un borrado.
pub trait Confirm {
    fn confirm(&self, prompt: &str) -> bool;
}

impl<F> Confirm for F where F: Fn(&str) -> bool
{
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EditableList<T> {
    items: Vec<EditableItem<T>>,
}

impl<T> Default for EditableList<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T> EditableList<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lista con el último estado persistido conocido.
    pub fn from_persisted(items: impl IntoIterator<Item = (RowId, T)>) -> Self {
        Self { items: items.into_iter()
                           .map(|(id, value)| EditableItem { persisted_id: Some(id),
                                                             value })
                           .collect() }
    }

    /// Añade un elemento nuevo (sin id).
    pub fn push(&mut self, value: T) {
        self.items.push(EditableItem { persisted_id: None,
                                       value });
    }

    pub fn items(&self) -> &[EditableItem<T>] {
        &self.items
    }

    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.items.iter().map(|i| &i.value)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut EditableItem<T>> {
        self.items.get_mut(index)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Escrituras necesarias para guardar la lista. Los elementos nuevos en
    /// blanco no se insertan.
    pub fn plan<F>(&self, is_blank: F) -> Vec<PlannedWrite>
        where F: Fn(&T) -> bool
    {
        self.items
            .iter()
            .enumerate()
            .filter_map(|(index, item)| match &item.persisted_id {
                Some(id) => Some(PlannedWrite::Update { index, id: id.clone() }),
                None if is_blank(&item.value) => None,
                None => Some(PlannedWrite::Insert { index }),
            })
            .collect()
    }

    /// Quita el elemento `index` previa confirmación.
    ///
    /// Si el elemento está persistido se borra en el almacén en ese momento;
    /// sólo si el borrado tiene éxito desaparece de la lista.
    pub async fn remove<S>(&mut self, index: usize, confirm: &dyn Confirm, store: &S, spec: &TableSpec)
                           -> Result<RemoveOutcome>
        where S: TableStore + ?Sized
    {
        let persisted = match self.items.get(index) {
            Some(item) => item.persisted_id.clone(),
            None => {
                return Err(WorkflowError::Validation(format!("índice {} fuera de rango ({} elementos)",
                                                             index,
                                                             self.items.len())))
            }
        };
        if !confirm.confirm("Are you sure you want to delete this item?") {
            return Ok(RemoveOutcome::Declined);
        }
        let Some(id) = persisted else {
            self.items.remove(index);
            return Ok(RemoveOutcome::RemovedLocal);
        };
        match store.delete(spec.table, &Filter::eq(spec.key, &id)).await {
            Ok(()) => {
                self.items.remove(index);
                log::info!("{} {} borrado", spec.table, id);
                Ok(RemoveOutcome::Deleted(id))
            }
            Err(e) => {
                log::error!("no se pudo borrar {} {}: {}", spec.table, id, e);
                Ok(RemoveOutcome::Kept(Notification::failure("Operation Failed",
                                                              format!("The item could not be deleted. Please try again. ({})",
                                                                      e))))
            }
        }
    }
}

impl EditableList<String> {
    /// Lista de textos leída de filas persistidas (`key` = id, `column` =
    /// texto).
    pub fn from_rows(rows: &[Row], key: &str, column: &str) -> Self {
        Self::from_persisted(rows.iter().filter_map(|r| {
                                            let id = RowId::from_row(r, key)?;
                                            let text = r.get(column).and_then(flow::scalar_text).unwrap_or_default();
                                            Some((id, text))
                                        }))
    }
}

impl<S> SubmissionEngine<S> where S: TableStore + ?Sized + 'static
{
    /// `EditableList::remove` sobre la tabla de `entity`. Un borrado remoto
    /// invalida el listado donde aparece la entidad.
    pub async fn remove_item<T>(&self,
                                entity: EntityRef,
                                list: &mut EditableList<T>,
                                index: usize,
                                confirm: &dyn Confirm)
                                -> Result<RemoveOutcome> {
        let spec = entity.spec()?;
        let outcome = list.remove(index, confirm, self.store().as_ref(), &spec).await?;
        if let RemoveOutcome::Deleted(_) = &outcome {
            self.invalidate(entity.listing_table());
        }
        Ok(outcome)
    }
}

/// Guarda `list` en `spec` bajo `parent_id`.
///
/// Updates e inserts se lanzan a la vez; se espera a todos para poder
/// asignar los ids de los inserts que sí tuvieron éxito, y luego se
/// devuelve el primer error, si lo hubo. `to_row` recibe la posición del
/// elemento en la lista.
pub async fn reconcile_list<S, T, F>(store: Arc<S>,
                                     spec: &TableSpec,
                                     parent_id: &RowId,
                                     list: &mut EditableList<T>,
                                     to_row: F,
                                     is_blank: impl Fn(&T) -> bool)
                                     -> Result<ReconcileReport>
    where S: TableStore + ?Sized + 'static,
          F: Fn(usize, &T) -> Row
{
    let planned = list.plan(is_blank);
    if planned.is_empty() {
        return Ok(ReconcileReport::default());
    }
    let table = spec.table;
    let key = spec.key;
    let parent_column = spec.parent_column();

    let writes: Vec<_> = planned.into_iter()
                                .map(|write| {
                                    let store = store.clone();
                                    let parent = parent_id.to_json();
                                    let row = match &write {
                                        PlannedWrite::Update { index, .. } | PlannedWrite::Insert { index } => {
                                            to_row(*index, &list.items[*index].value)
                                        }
                                    };
                                    async move {
                                        let result = match write {
                                            PlannedWrite::Update { index, id } => {
                                                store.update(table, &Filter::eq(key, &id), row).await.map(|_| (index, None))
                                            }
                                            PlannedWrite::Insert { index } => {
                                                let mut row = row;
                                                row.insert(parent_column.to_string(), parent);
                                                store.insert(table, row, Prefer::ReturnRepresentation)
                                                     .await
                                                     .and_then(|created| {
                                                         created.first()
                                                                .and_then(|r| RowId::from_row(r, key))
                                                                .map(|id| (index, Some(id)))
                                                                .ok_or_else(|| FlowError::MissingIdentifier { table: table.to_string(),
                                                                                                              key_column: key.to_string() })
                                                     })
                                            }
                                        };
                                        Ok::<_, FlowError>(result)
                                    }
                                })
                                .collect();

    let results = run_concurrently(writes, Settle::Drain).await?;
    let mut report = ReconcileReport::default();
    let mut first_error = None;
    for result in results {
        match result {
            Ok((index, Some(id))) => {
                list.items[index].persisted_id = Some(id);
                report.inserted += 1;
            }
            Ok((_, None)) => report.updated += 1,
            Err(e) => {
                log::error!("reconciliación de {}: {}", table, e);
                if first_error.is_none() {
                    first_error = Some(e);
                }
            }
        }
    }
    match first_error {
        Some(e) => Err(e.into()),
        None => {
            log::debug!("{}: {} actualizados, {} insertados", table, report.updated, report.inserted);
            Ok(report)
        }
    }
}

/// Vacío o sólo espacios.
pub(crate) fn is_blank_text(s: &String) -> bool {
    s.trim().is_empty()
}

pub(crate) fn merge_reports(reports: impl IntoIterator<Item = ReconcileReport>) -> ReconcileReport {
    reports.into_iter().fold(ReconcileReport::default(), ReconcileReport::add)
}
