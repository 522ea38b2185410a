//! Schema graph data model and store
//!
//! This module implements the typed schema graph:
//! - Nodes for tables, columns, indexes, constraints, views, triggers and routines
//! - Typed, weighted edges between them
//! - Slot-arena storage with type/schema/name indexes
//! - Relationship queries, cached shortest paths, snapshots and merging

pub mod edge;
pub mod metadata;
pub mod node;
pub mod path;
pub mod query;
pub mod snapshot;
pub mod store;
pub mod types;

// Re-export main types
pub use edge::Edge;
pub use metadata::{
    ColumnMetadata, ConstraintEdgeMetadata, ConstraintKind, ConstraintMetadata, EdgeMetadata,
    ForeignKeyMetadata, IndexColumnMetadata, IndexMetadata, NodeMetadata, RoutineMetadata,
    SortOrder, TableMetadata, TriggerMetadata, ViewMetadata,
};
pub use node::Node;
pub use path::{GraphPath, PathOptions, PathWeight, WeightFn};
pub use query::{RelationshipPath, RelationshipQuery, RelationshipResult};
pub use snapshot::{GraphSnapshot, MergePolicy, MergeReport, SnapshotMetadata, SNAPSHOT_VERSION};
pub use store::{
    Endpoint, EntityKind, ExecutionMetadata, GraphError, GraphErrorKind, GraphResult,
    GraphStatistics, OpResult, Resource, SchemaGraph,
};
pub use types::{Direction, EdgeId, EdgeType, NodeId, NodeType};
