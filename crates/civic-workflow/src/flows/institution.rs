use super::{node, SubmissionFlow};
use crate::submission_kind::SubmissionKind;
use civic_domain::{benefit_row, procedure_row, requirement_row, DescriptionStorage, InstitutionDraft, InstitutionSchema,
                   OfferingDraft};
use flow::RowNode;

/// Alta de institución de salud o financiera.
///
/// raíz → descripción (sólo salud, si hay), horarios, contactos, ofertas;
/// cada oferta → pasos (`seq_no` = posición + 1), requisitos, beneficios.
pub struct InstitutionFlow;

impl SubmissionFlow for InstitutionFlow {
    type Draft = InstitutionDraft;

    fn kind(draft: &InstitutionDraft) -> SubmissionKind {
        draft.kind.into()
    }

    fn build(draft: &InstitutionDraft) -> RowNode {
        let schema = draft.schema();
        let mut root = node(&schema.root, draft.root_row());
        if let (DescriptionStorage::Separate { table, .. }, Some(row)) = (schema.description, draft.description_row()) {
            root = root.with_child(node(&table, row));
        }
        root.with_children(draft.hours.iter().map(|h| node(&schema.hours, h.to_row(schema))))
            .with_children(draft.contacts.iter().map(|c| node(&schema.contacts, c.to_row(schema))))
            .with_children(draft.offerings.iter().map(|o| offering_node(schema, o)))
    }
}

/// Subárbol de una oferta con sus pasos, requisitos y beneficios.
pub fn offering_node(schema: &InstitutionSchema, offering: &OfferingDraft) -> RowNode {
    let steps = offering.procedures
                        .iter()
                        .enumerate()
                        .map(|(i, p)| node(&schema.procedures, procedure_row(schema, i, p)));
    let requirements = offering.requirements.iter().map(|r| node(&schema.requirements, requirement_row(schema, r)));
    let benefits: Vec<RowNode> = match schema.benefits {
        Some(spec) => offering.benefits
                              .iter()
                              .filter_map(|b| benefit_row(schema, b))
                              .map(|row| node(&spec, row))
                              .collect(),
        None => Vec::new(),
    };
    node(&schema.offerings, offering.to_row(schema)).with_children(steps)
                                                    .with_children(requirements)
                                                    .with_children(benefits)
}

#[cfg(test)]
mod tests {
    use super::*;
    use civic_domain::{ContactDetail, ContactType, GeoRef, InstitutionKind, OperatingHour};

    fn clinic(kind: InstitutionKind) -> InstitutionDraft {
        InstitutionDraft { kind,
                           name: "Test Clinic".into(),
                           description: None,
                           latitude: "10.3".into(),
                           longitude: "123.9".into(),
                           location: GeoRef { province_code: "0722".into(),
                                              city_zip_code: "6000".into(),
                                              brgy_code: "1".into(),
                                              purok_code: "1".into() },
                           hours: vec![OperatingHour::new("Monday", "08:00", "17:00")],
                           contacts: vec![ContactDetail::new(ContactType::Mobile, "09123456789"),
                                          ContactDetail::new(ContactType::Email, "a@b.ph")],
                           offerings: vec![OfferingDraft::new("Checkup", "General").with_procedures(["Register", "Consult"])
                                                                                   .with_requirements(["ID"])
                                                                                   .with_benefits(["Free"])] }
    }

    #[test]
    fn health_tree_has_eight_rows_without_description() {
        let mut draft = clinic(InstitutionKind::Health);
        draft.offerings[0].benefits.clear();
        let tree = InstitutionFlow::build(&draft);
        assert_eq!(tree.table, "health_insti");
        assert_eq!(tree.count(), 8);
        let service = tree.children.iter().find(|c| c.table == "health_insti_services").expect("service");
        assert_eq!(service.parent_column.as_deref(), Some("health_insti_id"));
        assert!(service.children.iter().all(|c| c.parent_column.as_deref() == Some("service_id")));
    }

    #[test]
    fn description_row_is_a_child_only_for_health() {
        let mut health = clinic(InstitutionKind::Health);
        health.description = Some("<p>Open daily</p>".into());
        let tree = InstitutionFlow::build(&health);
        assert!(tree.children.iter().any(|c| c.table == "health_insti_desc"));

        let mut financial = clinic(InstitutionKind::Financial);
        financial.description = Some("<p>Loans</p>".into());
        let tree = InstitutionFlow::build(&financial);
        assert!(tree.children.iter().all(|c| !c.table.contains("desc")));
        assert_eq!(tree.row["financial_insti_desc"], "<p>Loans</p>");
        let program = tree.children.iter().find(|c| c.table == "program_offers").expect("program");
        assert_eq!(program.children.iter().filter(|c| c.table == "program_benefits").count(), 1);
    }
}
