use flow::engine::FlowEngineConfig;
use flow::stubs::{InMemoryTableStore, Phase, StoreEvent};
use flow::{FlowEngine, Row, RowNode, StoreOp};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

fn row(v: serde_json::Value) -> Row {
    v.as_object().cloned().unwrap_or_default()
}

fn end_of_insert(events: &[StoreEvent], table: &str) -> Vec<u64> {
    events.iter()
          .filter(|e| e.phase == Phase::End && e.op == StoreOp::Insert && e.table == table)
          .map(|e| e.seq)
          .collect()
}

fn begin_of_insert(events: &[StoreEvent], table: &str) -> Vec<u64> {
    events.iter()
          .filter(|e| e.phase == Phase::Begin && e.op == StoreOp::Insert && e.table == table)
          .map(|e| e.seq)
          .collect()
}

/// raíz -> (a, a, b -> (c, c, d))
fn sample_tree() -> RowNode {
    let b = RowNode::new("b", "b_id", row(json!({"name": "b"}))).linked_by("root_id")
                                                                .with_children(vec![RowNode::new("c", "c_id", row(json!({"n": 1}))).linked_by("b_id"),
                                                                                    RowNode::new("c", "c_id", row(json!({"n": 2}))).linked_by("b_id"),
                                                                                    RowNode::new("d", "d_id", row(json!({"n": 3}))).linked_by("b_id")]);
    RowNode::new("root", "root_id", row(json!({"name": "raíz"})))
        .with_child(RowNode::new("a", "a_id", row(json!({"n": 1}))).linked_by("root_id"))
        .with_child(RowNode::new("a", "a_id", row(json!({"n": 2}))).linked_by("root_id"))
        .with_child(b)
}

fn store() -> Arc<InMemoryTableStore> {
    Arc::new(InMemoryTableStore::new().with_keys(vec![("root", "root_id"), ("a", "a_id"), ("b", "b_id"), ("c", "c_id"), ("d", "d_id")])
                                      .with_latency(Duration::from_millis(15)))
}

#[tokio::test]
async fn full_tree_respects_parent_before_child() {
    let store = store();
    let engine = FlowEngine::new(store.clone(), FlowEngineConfig::default());
    let tree = sample_tree();
    let expected = tree.count();

    let report = engine.execute(tree).await.expect("execute");
    assert_eq!(report.created, expected);
    assert_eq!(report.root_table, "root");
    assert_eq!(store.write_count(), expected);

    let events = store.events();
    let root_end = end_of_insert(&events, "root")[0];
    for table in ["a", "b", "c", "d"] {
        for begin in begin_of_insert(&events, table) {
            assert!(begin > root_end, "{} empezó antes de conocer el id de la raíz", table);
        }
    }
    let b_end = end_of_insert(&events, "b")[0];
    for table in ["c", "d"] {
        for begin in begin_of_insert(&events, table) {
            assert!(begin > b_end, "{} empezó antes de conocer el id de b", table);
        }
    }
}

#[tokio::test]
async fn children_receive_their_parent_id() {
    let store = store();
    let engine = FlowEngine::new(store.clone(), FlowEngineConfig::default());
    let report = engine.execute(sample_tree()).await.expect("execute");

    for a in store.calls(StoreOp::Insert, "a") {
        assert_eq!(a["root_id"], report.root_id.to_json());
    }
    let b_id = store.rows("b")[0]["b_id"].clone();
    let grandchildren: Vec<Row> = store.calls(StoreOp::Insert, "c")
                                       .into_iter()
                                       .chain(store.calls(StoreOp::Insert, "d"))
                                       .collect();
    assert_eq!(grandchildren.len(), 3);
    for g in grandchildren {
        assert_eq!(g["b_id"], b_id);
    }
}

#[tokio::test]
async fn siblings_are_in_flight_together() {
    let store = store();
    let engine = FlowEngine::new(store.clone(), FlowEngineConfig::default());
    engine.execute(sample_tree()).await.expect("execute");
    // tres hijos directos de la raíz con 15ms de latencia cada uno
    assert!(store.max_in_flight() >= 3, "max en vuelo = {}", store.max_in_flight());
}

#[tokio::test]
async fn root_without_children_is_a_single_call() {
    let store = store();
    let engine = FlowEngine::new(store.clone(), FlowEngineConfig::default());
    let report = engine.execute(RowNode::new("root", "root_id", row(json!({"name": "solo"}))))
                       .await
                       .expect("execute");
    assert_eq!(report.created, 1);
    assert_eq!(store.write_count(), 1);
    assert_eq!(report.root_id.as_i64(), Some(1));
}
