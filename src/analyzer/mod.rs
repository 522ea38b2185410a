//! Schema-aware queries on top of the graph
//!
//! The analyzer borrows a [`SchemaGraph`] read-only and answers table
//! introspection, relationship discovery and JOIN suggestion. It keeps no
//! state besides its [`AnalyzerConfig`]; shortest-path answers are memoized
//! by the graph's own path cache.

mod types;

pub use types::{
    AnalyzerError, AnalyzerResult, ColumnInfo, ColumnMatch, DirectRelationship, ForeignKeyInfo,
    IndexInfo, JoinPath, JoinSuggestion, JoinType, RelationshipAnalysis, RelationshipKind,
    RelationshipOptions, SchemaStatistics, TableInfo,
};

use crate::config::AnalyzerConfig;
use crate::graph::store::{is_wildcard, wildcard_regex};
use crate::graph::{
    Edge, EdgeType, Node, NodeId, NodeMetadata, NodeType, PathOptions, RelationshipQuery,
    SchemaGraph,
};
use indexmap::{IndexMap, IndexSet};
use std::cmp::Ordering;
use tracing::{debug, warn};

/// Edge types a join can follow
const JOIN_EDGE_TYPES: [EdgeType; 2] = [EdgeType::ForeignKey, EdgeType::TableColumn];
const JOIN_NODE_TYPES: [NodeType; 2] = [NodeType::Table, NodeType::Column];

/// Confidence for a join found along a path of the given weight
pub fn join_confidence(path_weight: f64) -> f64 {
    (1.0 - (path_weight - 1.0) * 0.2).max(0.1)
}

/// Name matcher shared by table and column lookups: `*`/`%` wildcards match
/// the whole name case-insensitively, anything else is a case-insensitive
/// substring test.
enum NamePattern {
    Wildcard(regex::Regex),
    Substring(String),
}

impl NamePattern {
    fn new(pattern: &str) -> Option<Self> {
        if is_wildcard(pattern) {
            wildcard_regex(pattern).map(NamePattern::Wildcard)
        } else {
            Some(NamePattern::Substring(pattern.to_lowercase()))
        }
    }

    fn matches(&self, name: &str) -> bool {
        match self {
            NamePattern::Wildcard(re) => re.is_match(name),
            NamePattern::Substring(needle) => name.to_lowercase().contains(needle.as_str()),
        }
    }
}

pub struct SchemaAnalyzer<'g> {
    graph: &'g SchemaGraph,
    config: AnalyzerConfig,
}

impl<'g> SchemaAnalyzer<'g> {
    pub fn new(graph: &'g SchemaGraph) -> Self {
        Self::with_config(graph, AnalyzerConfig::default())
    }

    pub fn with_config(graph: &'g SchemaGraph, config: AnalyzerConfig) -> Self {
        Self { graph, config }
    }

    pub fn graph(&self) -> &'g SchemaGraph {
        self.graph
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    // ============================================================
    // Table lookup
    // ============================================================

    /// Resolve a table node by name.
    ///
    /// `schema.table` is accepted when no schema is given. Exact matches win;
    /// otherwise the first case-insensitive match is used.
    pub fn find_table_node(&self, name: &str, schema: Option<&str>) -> Option<&'g Node> {
        let (schema, name) = match (schema, name.split_once('.')) {
            (None, Some((qualifier, table))) => (Some(qualifier), table),
            _ => (schema, name),
        };
        let in_schema = |node: &&Node| schema.map_or(true, |s| node.schema() == Some(s));
        let tables = self.graph.nodes_by_type(NodeType::Table);

        tables
            .iter()
            .copied()
            .filter(in_schema)
            .find(|node| node.name() == name)
            .or_else(|| {
                tables
                    .iter()
                    .copied()
                    .filter(in_schema)
                    .find(|node| node.name().eq_ignore_ascii_case(name))
            })
    }

    pub fn table_info(&self, name: &str, schema: Option<&str>) -> Option<TableInfo> {
        let table = self.find_table_node(name, schema)?;
        Some(self.describe_table(table))
    }

    /// Every table (optionally within one schema), sorted by name
    pub fn all_tables(&self, schema: Option<&str>) -> Vec<TableInfo> {
        self.table_nodes(schema)
            .into_iter()
            .map(|table| self.describe_table(table))
            .collect()
    }

    pub fn all_table_names(&self, schema: Option<&str>) -> Vec<String> {
        self.table_nodes(schema)
            .into_iter()
            .map(|table| table.name().to_string())
            .collect()
    }

    /// Tables whose name matches `pattern`
    pub fn find_tables(&self, pattern: &str, schema: Option<&str>) -> Vec<TableInfo> {
        let Some(matcher) = NamePattern::new(pattern) else {
            return Vec::new();
        };
        self.table_nodes(schema)
            .into_iter()
            .filter(|table| matcher.matches(table.name()))
            .map(|table| self.describe_table(table))
            .collect()
    }

    fn table_nodes(&self, schema: Option<&str>) -> Vec<&'g Node> {
        let mut tables: Vec<&Node> = self
            .graph
            .nodes_by_type(NodeType::Table)
            .into_iter()
            .filter(|node| schema.map_or(true, |s| node.schema() == Some(s)))
            .collect();
        tables.sort_by(|a, b| a.name().cmp(b.name()).then_with(|| a.schema().cmp(&b.schema())));
        tables
    }

    // ============================================================
    // Columns
    // ============================================================

    /// Columns of a table, sorted by name
    pub fn table_columns(&self, table_id: &NodeId) -> Vec<ColumnInfo> {
        let primary: IndexSet<&NodeId> = self
            .graph
            .outgoing_edges(table_id)
            .into_iter()
            .filter(|edge| edge.is_primary_key())
            .map(Edge::target)
            .collect();

        let mut columns: Vec<ColumnInfo> = self
            .column_nodes(table_id)
            .into_iter()
            .filter_map(|column| column_info(column, primary.contains(column.id())))
            .collect();
        columns.sort_by(|a, b| a.name.cmp(&b.name));
        columns
    }

    /// Columns whose name matches `pattern`, optionally restricted to tables
    /// with the given name
    pub fn find_columns(&self, pattern: &str, table_filter: Option<&str>) -> Vec<ColumnMatch> {
        let Some(matcher) = NamePattern::new(pattern) else {
            return Vec::new();
        };
        let mut matches = Vec::new();
        for column in self.graph.nodes_by_type(NodeType::Column) {
            if !matcher.matches(column.name()) {
                continue;
            }
            let Some(table) = self.owning_table(column.id()) else {
                continue;
            };
            if let Some(filter) = table_filter {
                if !table.name().eq_ignore_ascii_case(filter) {
                    continue;
                }
            }
            let is_pk = self
                .graph
                .edges_between(table.id(), column.id())
                .iter()
                .any(|edge| edge.is_primary_key());
            if let Some(info) = column_info(column, is_pk) {
                matches.push(ColumnMatch {
                    table: table.name().to_string(),
                    schema: table.schema().map(str::to_string),
                    column: info,
                });
            }
        }
        matches.sort_by(|a, b| a.table.cmp(&b.table).then_with(|| a.column.name.cmp(&b.column.name)));
        matches
    }

    fn column_nodes(&self, table_id: &NodeId) -> Vec<&'g Node> {
        self.graph
            .outgoing_edges(table_id)
            .into_iter()
            .filter(|edge| edge.is_table_column())
            .filter_map(|edge| self.graph.get_node(edge.target()))
            .filter(|node| node.is_column())
            .collect()
    }

    /// The table a column belongs to, via its incoming TABLE_COLUMN edge
    pub fn owning_table(&self, column_id: &NodeId) -> Option<&'g Node> {
        self.graph
            .incoming_edges(column_id)
            .into_iter()
            .filter(|edge| edge.is_table_column())
            .filter_map(|edge| self.graph.get_node(edge.source()))
            .find(|node| node.is_table())
    }

    fn describe_table(&self, table: &'g Node) -> TableInfo {
        let columns = self.table_columns(table.id());
        let primary_keys = columns
            .iter()
            .filter(|c| c.is_primary_key)
            .map(|c| c.name.clone())
            .collect();
        let metadata = table.table_metadata();

        TableInfo {
            id: table.id().clone(),
            name: table.name().to_string(),
            schema: table.schema().map(str::to_string),
            foreign_keys: self.foreign_keys(table),
            indexes: self.indexes(table),
            columns,
            primary_keys,
            row_count: metadata.and_then(|m| m.row_count),
            table_kind: metadata.and_then(|m| m.table_kind.clone()),
            comment: metadata.and_then(|m| m.comment.clone()),
        }
    }

    /// Outgoing foreign keys of the table's columns, in column order
    fn foreign_keys(&self, table: &'g Node) -> Vec<ForeignKeyInfo> {
        let mut columns = self.column_nodes(table.id());
        columns.sort_by(|a, b| a.name().cmp(b.name()));

        let mut keys = Vec::new();
        for column in columns {
            for edge in self.graph.outgoing_edges(column.id()) {
                if !edge.is_foreign_key() {
                    continue;
                }
                let metadata = edge.foreign_key_metadata();
                let target = self.graph.get_node(edge.target());
                let referenced_table = self
                    .owning_table(edge.target())
                    .map(|t| t.name().to_string())
                    .or_else(|| metadata.map(|m| m.referenced_table.clone()))
                    .unwrap_or_default();
                let referenced_column = target
                    .map(|t| t.name().to_string())
                    .or_else(|| metadata.map(|m| m.referenced_column.clone()))
                    .unwrap_or_default();

                keys.push(ForeignKeyInfo {
                    column: column.name().to_string(),
                    referenced_table,
                    referenced_column,
                    constraint_name: metadata.and_then(|m| m.constraint_name.clone()),
                    on_update: metadata.and_then(|m| m.on_update.clone()),
                    on_delete: metadata.and_then(|m| m.on_delete.clone()),
                });
            }
        }
        keys
    }

    /// Indexes reaching any of the table's columns through INDEX_COLUMN edges
    fn indexes(&self, table: &'g Node) -> Vec<IndexInfo> {
        let mut index_nodes: IndexSet<&NodeId> = IndexSet::new();
        for column in self.column_nodes(table.id()) {
            for edge in self.graph.incoming_edges(column.id()) {
                if edge.edge_type() == EdgeType::IndexColumn {
                    index_nodes.insert(edge.source());
                }
            }
        }

        let mut indexes: Vec<IndexInfo> = index_nodes
            .into_iter()
            .filter_map(|id| self.graph.get_node(id))
            .filter(|node| node.is_index())
            .map(|index| {
                let mut members: Vec<(u32, String)> = self
                    .graph
                    .outgoing_edges(index.id())
                    .into_iter()
                    .filter(|edge| edge.edge_type() == EdgeType::IndexColumn)
                    .filter_map(|edge| {
                        let column = self.graph.get_node(edge.target())?;
                        let ordinal = edge.index_column_metadata().map_or(0, |m| m.ordinal_position);
                        Some((ordinal, column.name().to_string()))
                    })
                    .collect();
                members.sort();
                let metadata = index.index_metadata();
                IndexInfo {
                    name: index.name().to_string(),
                    columns: members.into_iter().map(|(_, name)| name).collect(),
                    unique: metadata.map_or(false, |m| m.unique),
                    method: metadata.and_then(|m| m.method.clone()),
                }
            })
            .collect();
        indexes.sort_by(|a, b| a.name.cmp(&b.name));
        indexes
    }

    // ============================================================
    // Relationships and joins
    // ============================================================

    pub fn analyze_table_relationships(
        &self,
        table: &str,
        schema: Option<&str>,
        options: RelationshipOptions,
    ) -> Option<RelationshipAnalysis> {
        let table_node = self.find_table_node(table, schema)?;
        let depth = options.max_join_depth.unwrap_or(self.config.max_join_depth);

        let query = RelationshipQuery::from(table_node.id().clone())
            .with_edge_types(JOIN_EDGE_TYPES)
            .with_max_depth(depth);
        let explored = self.graph.query_relationships(&query).into_result().ok()?;

        let mut related_tables: Vec<&Node> = explored
            .nodes
            .iter()
            .filter_map(|id| self.graph.get_node(id))
            .filter(|node| node.is_table() && node.id() != table_node.id())
            .collect();
        related_tables.sort_by(|a, b| a.name().cmp(b.name()));
        related_tables.dedup_by(|a, b| a.id() == b.id());

        let mut grouped: IndexMap<String, Vec<ForeignKeyInfo>> = IndexMap::new();
        for fk in self.foreign_keys(table_node) {
            grouped.entry(fk.referenced_table.clone()).or_default().push(fk);
        }
        let direct_relationships = grouped
            .into_iter()
            .map(|(related_table, foreign_keys)| DirectRelationship {
                kind: RelationshipKind::Parent,
                related_table,
                foreign_keys,
            })
            .collect();

        let mut join_suggestions: Vec<JoinSuggestion> = related_tables
            .iter()
            .filter_map(|related| self.join_between(table_node, related))
            .flat_map(|join| join.joins)
            .collect();
        join_suggestions.sort_by(|a, b| {
            b.confidence
                .partial_cmp(&a.confidence)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.to_table.cmp(&b.to_table))
        });

        debug!(
            "Analyzed {}: {} related tables, {} join suggestions",
            table_node.name(),
            related_tables.len(),
            join_suggestions.len()
        );

        Some(RelationshipAnalysis {
            table: table_node.name().to_string(),
            schema: table_node.schema().map(str::to_string),
            direct_relationships,
            join_suggestions,
            related_tables: related_tables
                .into_iter()
                .map(|t| t.name().to_string())
                .collect(),
        })
    }

    /// Lowest-weight join route between two tables.
    ///
    /// `None` if either table is unknown, no route exists within the
    /// configured depth, or the route crosses no foreign key.
    pub fn find_join_path(&self, from: &str, to: &str, schema: Option<&str>) -> Option<JoinPath> {
        let from_node = self.find_table_node(from, schema)?;
        let to_node = self.find_table_node(to, schema)?;
        self.join_between(from_node, to_node)
    }

    fn join_between(&self, from: &Node, to: &Node) -> Option<JoinPath> {
        let options = PathOptions::default()
            .with_edge_types(JOIN_EDGE_TYPES)
            .with_node_types(JOIN_NODE_TYPES)
            .with_max_depth(self.config.join_path_max_depth);
        let path = self
            .graph
            .find_path(from.id(), to.id(), &options)
            .into_result()
            .ok()
            .flatten()?;

        let fk = path
            .edges
            .iter()
            .filter_map(|id| self.graph.get_edge(id))
            .find(|edge| edge.is_foreign_key())?;
        let condition = format!(
            "{} = {}",
            self.qualified_column(fk.source())?,
            self.qualified_column(fk.target())?
        );

        let suggestion = JoinSuggestion {
            from_table: from.name().to_string(),
            to_table: to.name().to_string(),
            condition,
            join_type: JoinType::Inner,
            confidence: join_confidence(path.total_weight),
        };
        Some(JoinPath {
            from_table: from.name().to_string(),
            to_table: to.name().to_string(),
            total_weight: path.total_weight,
            path,
            joins: vec![suggestion],
        })
    }

    /// `table.column` for a column node
    fn qualified_column(&self, column_id: &NodeId) -> Option<String> {
        let column = self.graph.get_node(column_id)?;
        let table = self.owning_table(column_id)?;
        Some(format!("{}.{}", table.name(), column.name()))
    }

    /// Greedy join plan connecting all `tables`.
    ///
    /// The first table seeds the connected set; each following table is
    /// attached through whichever connected table gives the lowest-weight
    /// join path. Tables that cannot be reached are logged and skipped.
    pub fn find_multi_table_join_paths<S: AsRef<str>>(
        &self,
        tables: &[S],
    ) -> AnalyzerResult<Vec<JoinSuggestion>> {
        if tables.len() < 2 {
            return Err(AnalyzerError::InvalidInput(
                "at least two table names are required".to_string(),
            ));
        }

        let mut connected: Vec<&Node> = Vec::new();
        match self.find_table_node(tables[0].as_ref(), None) {
            Some(seed) => connected.push(seed),
            None => warn!("Unknown table {}, cannot seed join plan", tables[0].as_ref()),
        }

        let mut suggestions = Vec::new();
        for name in &tables[1..] {
            let name = name.as_ref();
            let Some(next) = self.find_table_node(name, None) else {
                warn!("Unknown table {}, skipping", name);
                continue;
            };
            if connected.iter().any(|t| t.id() == next.id()) {
                continue;
            }

            let best = connected
                .iter()
                .filter_map(|table| self.join_between(table, next))
                .min_by(|a, b| {
                    a.total_weight
                        .partial_cmp(&b.total_weight)
                        .unwrap_or(Ordering::Equal)
                });
            match best {
                Some(join) => {
                    suggestions.extend(join.joins);
                    connected.push(next);
                }
                None if connected.is_empty() => connected.push(next),
                None => warn!("No join path reaches {}, skipping", name),
            }
        }
        Ok(suggestions)
    }

    // ============================================================
    // Schemas
    // ============================================================

    pub fn all_schemas(&self) -> Vec<String> {
        self.graph.schemas().into_iter().map(str::to_string).collect()
    }

    pub fn schema_statistics(&self, schema: &str) -> Option<SchemaStatistics> {
        let nodes = self.graph.nodes_by_schema(schema);
        if nodes.is_empty() {
            return None;
        }
        let mut stats = SchemaStatistics {
            schema: schema.to_string(),
            tables: 0,
            columns: 0,
            indexes: 0,
            constraints: 0,
            views: 0,
            total_rows: None,
        };
        for node in nodes {
            match node.metadata() {
                NodeMetadata::Table(table) => {
                    stats.tables += 1;
                    if let Some(rows) = table.row_count {
                        stats.total_rows = Some(stats.total_rows.unwrap_or(0) + rows);
                    }
                }
                NodeMetadata::Column(_) => stats.columns += 1,
                NodeMetadata::Index(_) => stats.indexes += 1,
                NodeMetadata::Constraint(_) => stats.constraints += 1,
                NodeMetadata::View(_) => stats.views += 1,
                _ => {}
            }
        }
        Some(stats)
    }
}

fn column_info(node: &Node, is_primary_key: bool) -> Option<ColumnInfo> {
    let metadata = node.column_metadata()?;
    Some(ColumnInfo {
        id: node.id().clone(),
        name: node.name().to_string(),
        data_type: metadata.data_type.clone(),
        nullable: metadata.nullable,
        is_primary_key,
        default_value: metadata.default_value.clone(),
        max_length: metadata.max_length,
        auto_increment: metadata.auto_increment,
        ordinal_position: metadata.ordinal_position,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GraphConfig;
    use crate::loader::{
        load_schema, ColumnDescription, ForeignKeyDescription, IndexDescription, SchemaDescription,
        TableDescription,
    };

    fn shop() -> SchemaGraph {
        let mut orders = TableDescription::new("orders")
            .with_column(ColumnDescription::new("id", "integer").primary())
            .with_column(ColumnDescription::new("customer_id", "integer"))
            .with_foreign_key(ForeignKeyDescription::new("customer_id", "customers", "id"));
        orders.indexes.push(IndexDescription {
            name: "orders_customer_idx".to_string(),
            columns: vec!["customer_id".to_string()],
            unique: false,
            method: Some("btree".to_string()),
        });
        orders.row_count = Some(40);

        let description = SchemaDescription {
            tables: vec![
                TableDescription::new("customers")
                    .with_column(ColumnDescription::new("id", "integer").primary())
                    .with_column(ColumnDescription::new("email", "text")),
                orders,
                TableDescription::new("order_items")
                    .with_column(ColumnDescription::new("id", "integer").primary())
                    .with_column(ColumnDescription::new("order_id", "integer"))
                    .with_foreign_key(ForeignKeyDescription::new("order_id", "orders", "id")),
            ],
        };
        load_schema(&description, GraphConfig::default()).unwrap()
    }

    #[test]
    fn test_join_confidence() {
        assert_eq!(join_confidence(1.0), 1.0);
        assert!((join_confidence(3.0) - 0.6).abs() < 1e-9);
        assert_eq!(join_confidence(50.0), 0.1);
    }

    #[test]
    fn test_table_info() {
        let graph = shop();
        let analyzer = SchemaAnalyzer::new(&graph);
        let info = analyzer.table_info("orders", None).unwrap();

        let names: Vec<&str> = info.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["customer_id", "id"]);
        assert_eq!(info.primary_keys, vec!["id"]);
        assert_eq!(info.foreign_keys.len(), 1);
        assert_eq!(info.foreign_keys[0].referenced_table, "customers");
        assert_eq!(info.foreign_keys[0].referenced_column, "id");
        assert_eq!(info.indexes.len(), 1);
        assert_eq!(info.indexes[0].columns, vec!["customer_id"]);
        assert_eq!(info.row_count, Some(40));
        assert!(info.column("id").unwrap().is_primary_key);
    }

    #[test]
    fn test_table_lookup_variants() {
        let graph = shop();
        let analyzer = SchemaAnalyzer::new(&graph);
        assert!(analyzer.table_info("ORDERS", None).is_some());
        assert!(analyzer.table_info("public.orders", None).is_some());
        assert!(analyzer.table_info("orders", Some("public")).is_some());
        assert!(analyzer.table_info("orders", Some("audit")).is_none());
        assert!(analyzer.table_info("nope", None).is_none());
    }

    #[test]
    fn test_table_names_and_patterns() {
        let graph = shop();
        let analyzer = SchemaAnalyzer::new(&graph);
        assert_eq!(
            analyzer.all_table_names(None),
            vec!["customers", "order_items", "orders"]
        );
        assert_eq!(analyzer.find_tables("order*", None).len(), 2);
        assert_eq!(analyzer.find_tables("ITEM", None).len(), 1);
        assert_eq!(analyzer.all_tables(Some("public")).len(), 3);
    }

    #[test]
    fn test_find_columns() {
        let graph = shop();
        let analyzer = SchemaAnalyzer::new(&graph);
        let ids = analyzer.find_columns("id", None);
        // id, customer_id, order_id across three tables
        assert_eq!(ids.len(), 5);

        let only_orders = analyzer.find_columns("*_id", Some("orders"));
        assert_eq!(only_orders.len(), 1);
        assert_eq!(only_orders[0].column.name, "customer_id");
        assert_eq!(only_orders[0].table, "orders");
    }

    #[test]
    fn test_join_path_orders_customers() {
        let graph = shop();
        let analyzer = SchemaAnalyzer::new(&graph);
        let join = analyzer.find_join_path("orders", "customers", None).unwrap();

        assert_eq!(join.joins.len(), 1);
        assert_eq!(join.joins[0].condition, "orders.customer_id = customers.id");
        assert_eq!(join.total_weight, 3.0);
        assert!((join.joins[0].confidence - 0.6).abs() < 1e-9);
        assert_eq!(join.joins[0].join_type, JoinType::Inner);
    }

    #[test]
    fn test_join_path_respects_depth() {
        let graph = shop();
        let analyzer = SchemaAnalyzer::new(&graph);
        // order_items -> orders -> customers needs six hops
        assert!(analyzer.find_join_path("order_items", "customers", None).is_none());
        assert!(analyzer.find_join_path("orders", "ghosts", None).is_none());
    }

    #[test]
    fn test_analyze_relationships() {
        let graph = shop();
        let analyzer = SchemaAnalyzer::new(&graph);
        let analysis = analyzer
            .analyze_table_relationships("orders", None, RelationshipOptions::default())
            .unwrap();

        assert_eq!(analysis.related_tables, vec!["customers", "order_items"]);
        assert_eq!(analysis.direct_relationships.len(), 1);
        assert_eq!(analysis.direct_relationships[0].related_table, "customers");
        assert_eq!(analysis.direct_relationships[0].kind, RelationshipKind::Parent);
        assert_eq!(analysis.join_suggestions.len(), 2);
        assert!(analysis.join_suggestions[0].confidence >= analysis.join_suggestions[1].confidence);
    }

    #[test]
    fn test_multi_table_join() {
        let graph = shop();
        let analyzer = SchemaAnalyzer::new(&graph);
        let joins = analyzer
            .find_multi_table_join_paths(&["customers", "orders", "order_items"])
            .unwrap();
        assert_eq!(joins.len(), 2);

        let err = analyzer.find_multi_table_join_paths(&["customers"]).unwrap_err();
        assert!(matches!(err, AnalyzerError::InvalidInput(_)));
    }

    #[test]
    fn test_schema_statistics() {
        let graph = shop();
        let analyzer = SchemaAnalyzer::new(&graph);
        assert_eq!(analyzer.all_schemas(), vec!["public"]);
        let stats = analyzer.schema_statistics("public").unwrap();
        assert_eq!(stats.tables, 3);
        assert_eq!(stats.columns, 6);
        assert_eq!(stats.indexes, 1);
        assert_eq!(stats.total_rows, Some(40));
        assert!(analyzer.schema_statistics("missing").is_none());
    }
}
