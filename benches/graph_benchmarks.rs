use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use schemagraph::analyzer::SchemaAnalyzer;
use schemagraph::config::GraphConfig;
use schemagraph::graph::{NodeType, PathOptions, SchemaGraph};
use schemagraph::loader::{
    load_schema, ColumnDescription, ForeignKeyDescription, SchemaDescription, TableDescription,
};

/// A chain of `size` tables where table i references table i-1
fn chain_schema(size: usize) -> SchemaDescription {
    let tables = (0..size)
        .map(|i| {
            let mut table = TableDescription::new(format!("t{}", i))
                .with_column(ColumnDescription::new("id", "integer").primary())
                .with_column(ColumnDescription::new("name", "text"));
            if i > 0 {
                table = table
                    .with_column(ColumnDescription::new("parent_id", "integer"))
                    .with_foreign_key(ForeignKeyDescription::new(
                        "parent_id",
                        format!("t{}", i - 1),
                        "id",
                    ));
            }
            table
        })
        .collect();
    SchemaDescription { tables }
}

fn load(size: usize) -> SchemaGraph {
    load_schema(&chain_schema(size), GraphConfig::default()).unwrap()
}

/// Benchmark schema loading throughput
fn bench_load_schema(c: &mut Criterion) {
    let mut group = c.benchmark_group("load_schema");

    for size in [10, 100, 1000].iter() {
        let description = chain_schema(*size);
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| {
                let graph = load_schema(&description, GraphConfig::default()).unwrap();
                criterion::black_box(graph.node_count());
            });
        });
    }
    group.finish();
}

/// Benchmark type and name index lookups
fn bench_index_lookup(c: &mut Criterion) {
    let mut group = c.benchmark_group("index_lookup");

    for size in [100, 1000].iter() {
        let graph = load(*size);
        group.bench_with_input(BenchmarkId::new("by_type", size), size, |b, _| {
            b.iter(|| criterion::black_box(graph.nodes_by_type(NodeType::Table).len()));
        });
        group.bench_with_input(BenchmarkId::new("by_wildcard", size), size, |b, _| {
            b.iter(|| criterion::black_box(graph.nodes_by_name("t1*").len()));
        });
    }
    group.finish();
}

/// Benchmark shortest paths with and without the cache
fn bench_find_path(c: &mut Criterion) {
    let mut group = c.benchmark_group("find_path");
    let options = PathOptions::default();

    let cached = load(200);
    let from = "table:public.t0".into();
    let to = "table:public.t20".into();
    group.bench_function("cached", |b| {
        b.iter(|| criterion::black_box(cached.find_path(&from, &to, &options).is_success()));
    });

    let uncached = load_schema(
        &chain_schema(200),
        GraphConfig::default().with_path_caching(false),
    )
    .unwrap();
    group.bench_function("uncached", |b| {
        b.iter(|| criterion::black_box(uncached.find_path(&from, &to, &options).is_success()));
    });

    group.finish();
}

/// Benchmark relationship analysis of a table in the middle of the chain
fn bench_analyze(c: &mut Criterion) {
    let mut group = c.benchmark_group("analyzer");
    let graph = load(500);

    group.bench_function("relationships", |b| {
        let analyzer = SchemaAnalyzer::new(&graph);
        b.iter(|| {
            let analysis =
                analyzer.analyze_table_relationships("t250", None, Default::default());
            criterion::black_box(analysis.map(|a| a.related_tables.len()));
        });
    });

    group.bench_function("table_info", |b| {
        let analyzer = SchemaAnalyzer::new(&graph);
        b.iter(|| criterion::black_box(analyzer.table_info("t250", None)));
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_load_schema,
    bench_index_lookup,
    bench_find_path,
    bench_analyze,
);
criterion_main!(benches);
