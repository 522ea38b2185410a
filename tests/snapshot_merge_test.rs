use schemagraph::analyzer::SchemaAnalyzer;
use schemagraph::config::GraphConfig;
use schemagraph::graph::{
    EdgeType, GraphError, GraphErrorKind, GraphSnapshot, MergePolicy, NodeId, PathOptions,
    SchemaGraph,
};
use schemagraph::loader::{load_schema, SchemaDescription};

const SHOP: &str = include_str!("fixtures/shop.yaml");

fn shop() -> SchemaGraph {
    let description = SchemaDescription::from_yaml_str(SHOP).unwrap();
    load_schema(&description, GraphConfig::default()).unwrap()
}

#[test]
fn test_round_trip_preserves_graph() {
    let graph = shop();
    let json = graph.to_json_pretty().unwrap();
    let restored = SchemaGraph::from_json(&json, None).unwrap();

    assert_eq!(restored.node_count(), graph.node_count());
    assert_eq!(restored.edge_count(), graph.edge_count());
    for node in graph.nodes() {
        let copy = restored.get_node(node.id()).unwrap();
        assert_eq!(copy.name(), node.name());
        assert_eq!(copy.schema(), node.schema());
        assert_eq!(copy.metadata(), node.metadata());
        assert_eq!(copy.edges().len(), node.edges().len());
    }
    for edge in graph.edges() {
        let copy = restored.get_edge(edge.id()).unwrap();
        assert_eq!(copy.source(), edge.source());
        assert_eq!(copy.target(), edge.target());
        assert_eq!(copy.weight(), edge.weight());
        assert_eq!(copy.metadata(), edge.metadata());
    }
    assert!(restored.verify_integrity().is_ok());

    // Behaves the same for queries
    let original = SchemaAnalyzer::new(&graph).find_join_path("orders", "customers", None);
    let reloaded = SchemaAnalyzer::new(&restored).find_join_path("orders", "customers", None);
    assert_eq!(original, reloaded);
}

#[test]
fn test_snapshot_metadata_counts() {
    let graph = shop();
    let snapshot = graph.to_snapshot();
    assert_eq!(snapshot.metadata.node_count, graph.node_count());
    assert_eq!(snapshot.metadata.edge_count, graph.edge_count());

    let value: serde_json::Value = serde_json::from_str(&graph.to_json().unwrap()).unwrap();
    assert!(value["metadata"]["createdAt"].is_i64());
    assert_eq!(value["nodes"].as_array().unwrap().len(), graph.node_count());
}

#[test]
fn test_import_aborts_on_first_bad_edge() {
    let mut snapshot = shop().to_snapshot();
    let fk = snapshot
        .edges
        .iter()
        .position(|e| e.edge_type() == EdgeType::ForeignKey)
        .unwrap();
    // Drop a column some foreign key points at
    let target = snapshot.edges[fk].target().clone();
    snapshot.nodes.retain(|n| n.id() != &target);

    let err = SchemaGraph::from_snapshot(snapshot, None).unwrap_err();
    assert_eq!(err.kind(), GraphErrorKind::ImportFailure);
    assert!(matches!(err, GraphError::ImportFailure { .. }));
}

#[test]
fn test_import_rejects_metadata_of_another_edge_kind() {
    let mut value = serde_json::to_value(shop().to_snapshot()).unwrap();
    let edge = value["edges"]
        .as_array_mut()
        .unwrap()
        .iter_mut()
        .find(|e| e["type"] == "FOREIGN_KEY")
        .unwrap();
    edge["metadata"] = serde_json::json!({ "kind": "index_column", "ordinalPosition": 1 });

    let err = SchemaGraph::from_json(&value.to_string(), None).unwrap_err();
    assert_eq!(err.kind(), GraphErrorKind::ImportFailure);
    assert!(err.to_string().contains("metadata"));
}

#[test]
fn test_import_rejects_malformed_json() {
    let err = SchemaGraph::from_json("{\"nodes\": 3}", None).unwrap_err();
    assert_eq!(err.kind(), GraphErrorKind::ImportFailure);

    let empty: GraphSnapshot = serde_json::from_str(&SchemaGraph::new().to_json().unwrap()).unwrap();
    assert!(SchemaGraph::from_snapshot(empty, None).unwrap().is_empty());
}

#[test]
fn test_clone_is_independent() {
    let graph = shop();
    let mut copy = graph.clone();
    copy.remove_node(&NodeId::new("table:public.orders"))
        .into_result()
        .unwrap();

    assert!(graph.has_node(&NodeId::new("table:public.orders")));
    assert_eq!(copy.node_count(), graph.node_count() - 1);
    assert!(copy.edge_count() < graph.edge_count());
}

#[test]
fn test_merge_skip_is_idempotent() {
    let mut graph = shop();
    let other = shop();
    let before = (graph.node_count(), graph.edge_count());

    let report = graph.merge(&other, MergePolicy::Skip).into_result().unwrap();
    assert_eq!(report.nodes_added, 0);
    assert_eq!(report.nodes_skipped, other.node_count());
    assert_eq!(report.edges_skipped, other.edge_count());
    assert_eq!((graph.node_count(), graph.edge_count()), before);
}

#[test]
fn test_merge_rename_rewires_edges() {
    let mut graph = shop();
    let other = shop();

    let report = graph.merge(&other, MergePolicy::Rename).into_result().unwrap();
    assert_eq!(report.nodes_renamed, other.node_count());
    assert_eq!(report.edges_renamed, other.edge_count());
    assert_eq!(graph.node_count(), other.node_count() * 2);
    assert!(graph.verify_integrity().is_ok());

    // Each renamed edge connects the renamed copies of its endpoints
    for edge in other.edges() {
        let renamed = graph.get_edge(&report.edge_id_map[edge.id()]).unwrap();
        assert_eq!(renamed.source(), &report.node_id_map[edge.source()]);
        assert_eq!(renamed.target(), &report.node_id_map[edge.target()]);
    }

    // The copy is a connected twin of the original
    let orders = &report.node_id_map[&NodeId::new("table:public.orders")];
    let customers = &report.node_id_map[&NodeId::new("table:public.customers")];
    let path = graph
        .find_path(orders, customers, &PathOptions::default())
        .into_result()
        .unwrap()
        .unwrap();
    assert_eq!(path.hops(), 3);
}

#[test]
fn test_merge_overwrite_replaces_and_failure_is_atomic() {
    let mut graph = shop();
    let other = shop();
    let report = graph
        .merge(&other, MergePolicy::Overwrite)
        .into_result()
        .unwrap();
    assert_eq!(report.nodes_overwritten, other.node_count());
    assert_eq!(graph.node_count(), other.node_count());
    assert_eq!(graph.edge_count(), other.edge_count());

    let mut small = SchemaGraph::with_config(GraphConfig::default().with_max_nodes(5));
    let err = small.merge(&other, MergePolicy::Skip).into_result().unwrap_err();
    assert_eq!(err.kind(), GraphErrorKind::CapacityExceeded);
    assert!(small.is_empty());
}
