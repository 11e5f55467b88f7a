use civic_domain::InstitutionKind;
use civic_workflow::{Catalog, EntityRef, GeoOptions, SubmissionConfig, SubmissionEngine, WorkflowError};
use flow::stubs::InMemoryTableStore;
use flow::{Row, RowId, StoreOp};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio_test::assert_ok;

fn row(v: serde_json::Value) -> Row {
    v.as_object().cloned().unwrap_or_default()
}

fn engine(store: &Arc<InMemoryTableStore>) -> SubmissionEngine<InMemoryTableStore> {
    SubmissionEngine::new(store.clone(), SubmissionConfig::default())
}

#[tokio::test]
async fn second_page_of_nine() {
    let store = Arc::new(InMemoryTableStore::new().with_key("medical_specialist", "msid"));
    store.seed("medical_specialist", (0..42).map(|i| row(json!({"name": format!("Specialist {}", i)}))));
    let page = assert_ok!(engine(&store).list_specialists(2).await);

    assert_eq!(page.rows.len(), 9);
    assert_eq!(page.total, 42);
    assert_eq!(page.page, 2);
    assert_eq!(page.page_count, 5);
    assert_eq!(page.rows[0]["msid"], 10);

    let last = assert_ok!(engine(&store).list_specialists(5).await);
    assert_eq!(last.rows.len(), 6);
}

#[tokio::test]
async fn pages_past_the_end_are_empty() {
    let store = Arc::new(InMemoryTableStore::new().with_key("medical_specialist", "msid"));
    store.seed("medical_specialist", (0..3).map(|i| row(json!({"name": format!("Specialist {}", i)}))));
    let page = assert_ok!(engine(&store).list_specialists(u64::MAX).await);

    assert!(page.rows.is_empty());
    assert_eq!(page.total, 3);
    assert_eq!(page.page_count, 1);
}

#[tokio::test]
async fn geography_lists_load_together_and_unfiltered() {
    let store = Arc::new(InMemoryTableStore::new().with_latency(Duration::from_millis(20)));
    store.seed("provinces", vec![row(json!({"province_code": "0722", "province_name": "Cebu"}))]);
    store.seed("cities",
               vec![row(json!({"city_zip_code": 6000, "city_name": "Cebu City", "province_code": "0722"})),
                    row(json!({"city_zip_code": 1000, "city_name": "Manila", "province_code": "1339"}))]);
    store.seed("barangays", vec![row(json!({"brgy_code": "072217001", "brgy_name": "Lahug"}))]);
    store.seed("puroks", vec![row(json!({"purok_code": 1, "purok_name": "Purok 1"}))]);

    let geo = assert_ok!(GeoOptions::fetch(store.as_ref()).await);
    assert_eq!(geo.provinces[0].label, "Cebu");
    assert_eq!(geo.cities.len(), 2);
    assert_eq!(geo.cities[0].code, "6000");
    assert_eq!(geo.puroks[0].code, "1");
    assert_eq!(store.max_in_flight(), 4);
}

#[tokio::test]
async fn catalog_writes_refresh_the_options() {
    let store = Arc::new(InMemoryTableStore::new().with_key("group_type", "group_type_code"));
    let engine = engine(&store);
    assert!(assert_ok!(engine.catalog_options(Catalog::GroupTypes).await).is_empty());

    let created = assert_ok!(engine.catalog_add(Catalog::GroupTypes, row(json!({"group_type_name": "Chronic illness"}))).await);
    let id = RowId::from_row(&created, "group_type_code").expect("id");
    let options = assert_ok!(engine.catalog_options(Catalog::GroupTypes).await);
    assert_eq!(options.len(), 1);
    assert_eq!(options[0].label, "Chronic illness");

    assert_ok!(engine.catalog_update(Catalog::GroupTypes, &id, row(json!({"group_type_name": "Chronic care"}))).await);
    assert_eq!(assert_ok!(engine.catalog_options(Catalog::GroupTypes).await)[0].label, "Chronic care");

    assert_ok!(engine.catalog_remove(Catalog::GroupTypes, &id).await);
    assert!(assert_ok!(engine.catalog_options(Catalog::GroupTypes).await).is_empty());
    assert_eq!(store.calls(StoreOp::Delete, "group_type").len(), 1);
}

#[tokio::test]
async fn health_description_is_inserted_when_missing() {
    let store = Arc::new(InMemoryTableStore::new().with_key("health_insti", "health_insti_id"));
    let engine = engine(&store);
    let id = RowId::from(8i64);

    assert_ok!(engine.update_description(InstitutionKind::Health, &id, "<p>First</p>").await);
    assert_eq!(store.calls(StoreOp::Update, "health_insti_desc").len(), 1);
    assert_eq!(store.calls(StoreOp::Insert, "health_insti_desc").len(), 1);

    assert_ok!(engine.update_description(InstitutionKind::Health, &id, "<p>Second</p>").await);
    assert_eq!(store.calls(StoreOp::Insert, "health_insti_desc").len(), 1);
    let rows = store.rows("health_insti_desc");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["hospitals_desc_content"], "<p>Second</p>");
    assert_eq!(rows[0]["health_insti_id"], 8);
}

#[tokio::test]
async fn financial_description_lives_in_the_root_row() {
    let store = Arc::new(InMemoryTableStore::new().with_key("financial_institution", "financial_insti_id"));
    let seeded = store.seed("financial_institution", vec![row(json!({"financial_insti_name": "Coop"}))]);
    let id = RowId::from_row(&seeded[0], "financial_insti_id").expect("id");

    assert_ok!(engine(&store).update_description(InstitutionKind::Financial, &id, "<p>Loans</p>").await);
    assert_eq!(store.rows("financial_institution")[0]["financial_insti_desc"], "<p>Loans</p>");
    assert!(store.calls(StoreOp::Insert, "financial_institution").is_empty());
}

#[tokio::test]
async fn field_edits_and_deletes_target_one_row() {
    let store = Arc::new(InMemoryTableStore::new().with_key("health_insti_contacts", "contact_id"));
    let seeded = store.seed("health_insti_contacts",
                            vec![row(json!({"health_insti_id": 1, "contact_type": "Mobile", "contact_detail": "09123456789"})),
                                 row(json!({"health_insti_id": 1, "contact_type": "Email", "contact_detail": "a@b.ph"}))]);
    let first = RowId::from_row(&seeded[0], "contact_id").expect("id");
    let second = RowId::from_row(&seeded[1], "contact_id").expect("id");
    let engine = engine(&store);
    let contact = EntityRef::Contact(InstitutionKind::Health);

    let updated = assert_ok!(engine.update_field(contact, &first, row(json!({"contact_detail": "09998887777"}))).await);
    assert_eq!(updated.len(), 1);
    assert_eq!(store.rows("health_insti_contacts")[1]["contact_detail"], "a@b.ph");

    assert!(matches!(engine.update_field(contact, &first, Row::new()).await, Err(WorkflowError::Validation(_))));

    assert_ok!(engine.delete_entity(contact, &second).await);
    assert_eq!(store.rows("health_insti_contacts").len(), 1);
    assert_eq!(EntityRef::Schedule.listing_table(), "medical_specialist");
}
