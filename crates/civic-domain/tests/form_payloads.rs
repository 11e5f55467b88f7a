use civic_domain::{ContactType, InstitutionDraft, InstitutionKind, SupportGroupDraft, Validate};
use serde_json::json;

#[test]
fn financial_form_state_deserializes_and_validates() {
    let form = json!({
        "kind": "financial",
        "name": "Barangay Credit Coop",
        "description": "<p>Microloans</p>",
        "latitude": "10.29",
        "longitude": "123.90",
        "location": {"province_code": "0722", "city_zip_code": "6000", "brgy_code": "072217001", "purok_code": "3"},
        "hours": [{"day": "Tuesday", "open": "08:00", "close": "16:00"}],
        "contacts": [{"kind": "Landline", "value": "2345678"}, {"kind": "Email", "value": "coop@mail.ph"}],
        "offerings": [{
            "name": "Starter loan",
            "description": "Up to 10k",
            "procedures": ["Fill form", "Interview"],
            "requirements": ["Valid ID"],
            "benefits": ["Low interest"]
        }]
    });
    let draft: InstitutionDraft = serde_json::from_value(form).expect("form");
    assert_eq!(draft.kind, InstitutionKind::Financial);
    assert_eq!(draft.contacts[1].kind, ContactType::Email);
    assert!(draft.validate().is_valid(), "{}", draft.validate());

    let root = draft.root_row();
    assert_eq!(root["financial_insti_name"], "Barangay Credit Coop");
    assert_eq!(root["province_code"], "0722");
    assert!(!root.contains_key("provincial_code"));
}

#[test]
fn health_form_with_benefits_and_bad_contacts_is_rejected() {
    let form = json!({
        "kind": "health",
        "name": "Test Clinic",
        "latitude": "10.3",
        "longitude": "123.8",
        "location": {"province_code": "0722", "city_zip_code": "6000", "brgy_code": "1", "purok_code": "1"},
        "hours": [],
        "contacts": [{"kind": "Mobile", "value": "0912"}],
        "offerings": [{"name": "Lab", "description": "CBC", "procedures": [], "requirements": [""], "benefits": ["x"]}]
    });
    let draft: InstitutionDraft = serde_json::from_value(form).expect("form");
    let err = draft.ensure_valid().expect_err("invalid");
    let text = err.to_string();
    for field in ["hours", "contacts.0.value", "offerings.0.procedures", "offerings.0.requirements.0", "offerings.0.benefits"] {
        assert!(text.contains(field), "falta {} en {}", field, text);
    }
}

#[test]
fn support_group_started_date_uses_iso_format() {
    let g: SupportGroupDraft = serde_json::from_value(json!({
        "name": "Diabetes Circle", "type_code": "1", "detail": "", "started": "2023-02-14",
        "social_link": "", "founder": "J. Santos"
    })).expect("group");
    assert_eq!(g.to_row()["group_started_date"], "2023-02-14");
}
