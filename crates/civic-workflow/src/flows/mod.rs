// flows/mod.rs
//
// Cada tipo de envío sabe validar su borrador y convertirlo en el árbol de
// filas que ejecuta `flow::FlowEngine`.
mod institution;
mod publication;
mod specialist;
mod support_group;

pub use institution::{offering_node, InstitutionFlow};
pub use publication::PublicationFlow;
pub use specialist::SpecialistFlow;
pub use support_group::SupportGroupFlow;

use crate::submission_kind::SubmissionKind;
use civic_domain::{TableSpec, Validate};
use flow::{Row, RowNode};

/// Un tipo de envío: borrador validable → árbol de filas.
pub trait SubmissionFlow {
    type Draft: Validate;

    fn kind(draft: &Self::Draft) -> SubmissionKind;

    /// Árbol a crear. Se llama sólo con borradores ya validados.
    fn build(draft: &Self::Draft) -> RowNode;
}

/// Nodo para una tabla del esquema; los hijos se enlazan por su columna
/// de padre.
pub(crate) fn node(spec: &TableSpec, row: Row) -> RowNode {
    let n = RowNode::new(spec.table, spec.key, row);
    match spec.parent {
        Some(column) => n.linked_by(column),
        None => n,
    }
}
