use super::{node, SubmissionFlow};
use crate::submission_kind::SubmissionKind;
use civic_domain::schema::publication::{CONTENT, PUBLICATION, REFERENCE};
use civic_domain::PublicationDraft;
use flow::RowNode;

/// Publicación: cabecera → contenido y, si la hay, referencia.
pub struct PublicationFlow;

impl SubmissionFlow for PublicationFlow {
    type Draft = PublicationDraft;

    fn kind(_draft: &PublicationDraft) -> SubmissionKind {
        SubmissionKind::Publication
    }

    fn build(draft: &PublicationDraft) -> RowNode {
        let root = node(&PUBLICATION, draft.root_row()).with_child(node(&CONTENT, draft.content_row()));
        match draft.reference_row() {
            Some(row) => root.with_child(node(&REFERENCE, row)),
            None => root,
        }
    }
}
