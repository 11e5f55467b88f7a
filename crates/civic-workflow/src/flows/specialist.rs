use super::{node, SubmissionFlow};
use crate::submission_kind::SubmissionKind;
use civic_domain::schema::specialist::{ASSIGNMENT, SCHEDULE, SPECIALIST};
use civic_domain::SpecialistDraft;
use flow::RowNode;

/// Alta de especialista: especialista → un mapeo por institución → horarios.
pub struct SpecialistFlow;

impl SubmissionFlow for SpecialistFlow {
    type Draft = SpecialistDraft;

    fn kind(_draft: &SpecialistDraft) -> SubmissionKind {
        SubmissionKind::MedicalSpecialist
    }

    fn build(draft: &SpecialistDraft) -> RowNode {
        let assignments = draft.assignments.iter().map(|a| {
                                                       node(&ASSIGNMENT, a.to_row(&draft.email, &draft.phone))
                                                         .with_children(a.schedule.iter().map(|s| node(&SCHEDULE, s.to_row())))
                                                   });
        node(&SPECIALIST, draft.root_row()).with_children(assignments)
    }
}
