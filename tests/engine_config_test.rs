use schemagraph::analyzer::SchemaAnalyzer;
use schemagraph::config::EngineConfig;
use schemagraph::graph::{NodeType, PathOptions, SchemaGraph};
use schemagraph::loader::{load_schema, SchemaDescription};
use schemagraph::tools::{SchemaTools, FIND_MULTI_TABLE_JOIN_PATHS};

const SHOP: &str = include_str!("fixtures/shop.yaml");

fn init_logging() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn load_with(config: &EngineConfig) -> SchemaGraph {
    let description = SchemaDescription::from_yaml_str(SHOP).unwrap();
    load_schema(&description, config.graph.clone()).unwrap()
}

#[test]
fn test_unindexed_uncached_graph_answers_the_same() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("engine.yaml");
    std::fs::write(
        &path,
        "graph:\n  enable_indexing: false\n  enable_path_caching: false\n",
    )
    .unwrap();

    let plain = load_with(&EngineConfig::from_file(&path).unwrap());
    let indexed = load_with(&EngineConfig::default());

    assert_eq!(
        plain.nodes_by_type(NodeType::Table).len(),
        indexed.nodes_by_type(NodeType::Table).len()
    );
    assert_eq!(plain.nodes_by_schema("audit").len(), indexed.nodes_by_schema("audit").len());
    assert_eq!(plain.nodes_by_name("orders").len(), 1);

    let a = SchemaAnalyzer::new(&plain).find_join_path("orders", "customers", None);
    let b = SchemaAnalyzer::new(&indexed).find_join_path("orders", "customers", None);
    assert_eq!(a, b);

    // Nothing is memoized without the cache
    let stats = plain.statistics();
    assert_eq!(stats.cached_paths, 0);
    assert_eq!(stats.cache_hits, 0);
}

#[test]
fn test_cache_capacity_bounds_memoized_paths() {
    init_logging();
    let config = EngineConfig::from_yaml_str("graph:\n  path_cache_capacity: 2\n").unwrap();
    let graph = load_with(&config);

    let tables: Vec<_> = graph
        .nodes_by_type(NodeType::Table)
        .iter()
        .map(|n| n.id().clone())
        .collect();
    for from in &tables {
        for to in &tables {
            let _ = graph.find_path(from, to, &PathOptions::default());
        }
    }
    assert_eq!(graph.cached_path_count(), 2);
}

#[test]
fn test_analyzer_depth_from_config_file() {
    init_logging();
    let config = EngineConfig::from_json_str(r#"{"analyzer": {"join_path_max_depth": 6}}"#).unwrap();
    let graph = load_with(&config);
    let tools = SchemaTools::new(SchemaAnalyzer::with_config(&graph, config.analyzer.clone()));

    let result = tools
        .call(
            FIND_MULTI_TABLE_JOIN_PATHS,
            serde_json::json!({ "tables": ["customers", "order_items"] }),
        )
        .unwrap();
    assert_eq!(result["joins"].as_array().unwrap().len(), 1);
}
