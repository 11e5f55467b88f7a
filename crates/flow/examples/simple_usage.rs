use flow::engine::FlowEngineConfig;
use flow::errors::FlowError;
use flow::stubs::InMemoryTableStore;
use flow::{FlowEngine, Row, RowNode, StoreOp};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

fn row(v: serde_json::Value) -> Row {
    v.as_object().cloned().unwrap_or_default()
}

#[tokio::main]
async fn main() -> Result<(), FlowError> {
    // Almacén en memoria con latencia para que se vea el solapamiento
    let store = Arc::new(InMemoryTableStore::new().with_keys(vec![("parent", "parent_id"), ("child", "child_id"), ("leaf", "leaf_id")])
                                                  .with_latency(Duration::from_millis(25)));
    let engine = FlowEngine::new(store.clone(), FlowEngineConfig::default());

    let tree = RowNode::new("parent", "parent_id", row(json!({"name": "demo"})))
        .with_child(RowNode::new("child", "child_id", row(json!({"n": 1}))).linked_by("parent_id")
                                                                          .with_child(RowNode::new("leaf", "leaf_id", row(json!({"seq_no": 1}))).linked_by("child_id"))
                                                                          .with_child(RowNode::new("leaf", "leaf_id", row(json!({"seq_no": 2}))).linked_by("child_id")))
        .with_child(RowNode::new("child", "child_id", row(json!({"n": 2}))).linked_by("parent_id"));
    println!("filas a crear: {}", tree.count());

    let report = engine.execute(tree).await.map_err(|abort| abort.error)?;
    println!("envío {} -> raíz {} ({} filas)", report.submission_id, report.root_id, report.created);

    for event in store.events() {
        println!("{:>3} {:?} {} {}", event.seq, event.phase, event.op, event.table);
    }
    println!("inserts en leaf: {:?}", store.calls(StoreOp::Insert, "leaf"));
    println!("máximo en vuelo: {}", store.max_in_flight());
    Ok(())
}
