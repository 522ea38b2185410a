//! Schemagraph
//!
//! An in-memory typed graph of a relational database schema, built for
//! answering "how do these tables relate and how do I join them" quickly and
//! repeatedly.
//!
//! # Components
//!
//! - [`graph`]: typed nodes (tables, columns, indexes, constraints, views,
//!   triggers, routines) and weighted edges (foreign keys, table/column
//!   membership, primary keys, index membership) in a slot arena with
//!   type/schema/name indexes
//! - Relationship queries (bounded BFS) and cached shortest paths
//! - Snapshots to JSON, deep clone and merge with collision policies
//! - [`loader`]: builds a graph from a pre-extracted schema description
//! - [`analyzer`]: table introspection, relationship discovery and JOIN
//!   suggestion
//! - [`tools`]: JSON entry points over the analyzer for an agent layer
//!
//! ## Example Usage
//!
//! ```rust
//! use schemagraph::config::GraphConfig;
//! use schemagraph::loader::{
//!     load_schema, ColumnDescription, ForeignKeyDescription, SchemaDescription, TableDescription,
//! };
//! use schemagraph::analyzer::SchemaAnalyzer;
//!
//! let description = SchemaDescription {
//!     tables: vec![
//!         TableDescription::new("customers")
//!             .with_column(ColumnDescription::new("id", "integer").primary()),
//!         TableDescription::new("orders")
//!             .with_column(ColumnDescription::new("id", "integer").primary())
//!             .with_column(ColumnDescription::new("customer_id", "integer"))
//!             .with_foreign_key(ForeignKeyDescription::new("customer_id", "customers", "id")),
//!     ],
//! };
//!
//! let graph = load_schema(&description, GraphConfig::default()).unwrap();
//! let analyzer = SchemaAnalyzer::new(&graph);
//!
//! let join = analyzer.find_join_path("orders", "customers", None).unwrap();
//! assert_eq!(join.joins[0].condition, "orders.customer_id = customers.id");
//! ```

#![allow(missing_docs)]
#![warn(clippy::all)]

pub mod analyzer;
pub mod config;
pub mod graph;
pub mod loader;
pub mod tools;

// Re-export main types for convenience
pub use analyzer::{
    AnalyzerError, AnalyzerResult, JoinPath, JoinSuggestion, RelationshipAnalysis, SchemaAnalyzer,
    TableInfo,
};

pub use config::{AnalyzerConfig, ConfigError, EngineConfig, GraphConfig};

pub use graph::{
    Direction, Edge, EdgeId, EdgeMetadata, EdgeType, GraphError, GraphPath, GraphResult,
    GraphSnapshot, MergePolicy, MergeReport, Node, NodeId, NodeMetadata, NodeType, OpResult,
    PathOptions, PathWeight, RelationshipQuery, RelationshipResult, SchemaGraph,
};

pub use loader::{load_schema, LoadError, LoadResult, SchemaDescription};

pub use tools::{SchemaTools, ToolError, ToolResult};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get version string
pub fn version() -> &'static str {
    VERSION
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert_eq!(version(), "0.3.0");
    }
}
