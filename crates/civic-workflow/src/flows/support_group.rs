use super::{node, SubmissionFlow};
use crate::submission_kind::SubmissionKind;
use civic_domain::schema::support_group::SUPPORT_GROUP;
use civic_domain::SupportGroupDraft;
use flow::RowNode;

/// Grupo de apoyo: una sola fila.
pub struct SupportGroupFlow;

impl SubmissionFlow for SupportGroupFlow {
    type Draft = SupportGroupDraft;

    fn kind(_draft: &SupportGroupDraft) -> SubmissionKind {
        SubmissionKind::SupportGroup
    }

    fn build(draft: &SupportGroupDraft) -> RowNode {
        node(&SUPPORT_GROUP, draft.to_row())
    }
}
