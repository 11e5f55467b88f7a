use flow::engine::{Compensation, FlowEngineConfig};
use flow::stubs::InMemoryTableStore;
use flow::{FlowEngine, FlowError, Row, RowNode, StoreOp};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

fn row(v: serde_json::Value) -> Row {
    v.as_object().cloned().unwrap_or_default()
}

fn tree() -> RowNode {
    RowNode::new("parent", "pid", row(json!({"name": "p"})))
        .with_child(RowNode::new("hours", "hid", row(json!({"day": "Mon"}))).linked_by("pid"))
        .with_child(RowNode::new("contacts", "cid", row(json!({"v": "1"}))).linked_by("pid"))
        .with_child(RowNode::new("offers", "oid", row(json!({"name": "o"}))).linked_by("pid")
                                                                           .with_child(RowNode::new("steps", "sid", row(json!({"s": 1}))).linked_by("oid")))
}

fn store() -> Arc<InMemoryTableStore> {
    Arc::new(InMemoryTableStore::new().with_keys(vec![("parent", "pid"), ("hours", "hid"), ("contacts", "cid"), ("offers", "oid"), ("steps", "sid")])
                                      .with_cascade("parent", "hours", "pid")
                                      .with_cascade("parent", "contacts", "pid")
                                      .with_cascade("parent", "offers", "pid")
                                      .with_cascade("offers", "steps", "oid")
                                      .with_latency(Duration::from_millis(5)))
}

#[tokio::test]
async fn missing_root_identifier_aborts_before_children() {
    let store = store();
    store.omit_identifiers("parent");
    let engine = FlowEngine::new(store.clone(), FlowEngineConfig::default());
    let abort = engine.execute(tree()).await.expect_err("sin id no hay hijos");
    assert!(matches!(abort.error, FlowError::MissingIdentifier { .. }));
    assert!(abort.root_id.is_none());
    assert_eq!(store.write_count(), 1);
}

#[tokio::test]
async fn missing_middle_identifier_skips_grandchildren() {
    let store = store();
    store.omit_identifiers("offers");
    let engine = FlowEngine::new(store.clone(), FlowEngineConfig { compensation: Compensation::None });
    let abort = engine.execute(tree()).await.expect_err("offers sin id");
    assert!(matches!(abort.error, FlowError::MissingIdentifier { ref table, .. } if table == "offers"));
    // esperar a que terminen las hermanas desacopladas
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(store.calls(StoreOp::Insert, "steps").is_empty());
}

#[tokio::test]
async fn one_failing_sibling_fails_the_whole_submission() {
    let store = store();
    store.fail_on("contacts", StoreOp::Insert);
    let engine = FlowEngine::new(store.clone(), FlowEngineConfig::default());
    let abort = engine.execute(tree()).await.expect_err("contacts rechazado");
    assert!(matches!(abort.error, FlowError::Remote { .. }));
    assert!(!abort.rolled_back);

    // sin compensación: la raíz y las hermanas exitosas quedan persistidas
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(store.rows("parent").len(), 1);
    assert_eq!(store.rows("hours").len(), 1);
    assert_eq!(store.rows("steps").len(), 1);
}

#[tokio::test]
async fn delete_root_compensation_drains_and_removes_rows() {
    let store = store();
    store.fail_on("hours", StoreOp::Insert);
    let engine = FlowEngine::new(store.clone(), FlowEngineConfig { compensation: Compensation::DeleteRoot });
    let abort = engine.execute(tree()).await.expect_err("hours rechazado");
    assert!(abort.rolled_back);
    assert!(abort.root_id.is_some());
    assert!(store.rows("parent").is_empty());
    assert!(store.rows("contacts").is_empty());
    assert!(store.rows("offers").is_empty());
    assert!(store.rows("steps").is_empty());
    assert_eq!(store.calls(StoreOp::Delete, "parent").len(), 1);
}

#[tokio::test]
async fn root_rejection_reports_nothing_created() {
    let store = store();
    store.fail_on("parent", StoreOp::Insert);
    let engine = FlowEngine::new(store.clone(), FlowEngineConfig { compensation: Compensation::DeleteRoot });
    let abort = engine.execute(tree()).await.expect_err("raíz rechazada");
    assert_eq!(abort.created, 0);
    assert!(!abort.rolled_back);
    assert!(store.calls(StoreOp::Delete, "parent").is_empty());
}
