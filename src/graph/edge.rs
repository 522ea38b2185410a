//! Edge implementation for the schema graph
//!
//! Edges always store a source and a target. Whether that order matters
//! during traversal is decided by [`EdgeType::is_directional`].

use super::metadata::{
    ConstraintEdgeMetadata, EdgeMetadata, ForeignKeyMetadata, IndexColumnMetadata, SortOrder,
};
use super::types::{now_millis, EdgeId, EdgeType, NodeId};
use serde::{Deserialize, Serialize};

/// A relationship between two schema elements
///
/// Edges have:
/// - A unique ID
/// - A source and a target node
/// - A relationship type
/// - A positive traversal weight
/// - Relationship-specific metadata
/// - Creation and update timestamps
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    /// Unique identifier for this edge
    pub(crate) id: EdgeId,

    #[serde(rename = "type")]
    pub(crate) edge_type: EdgeType,

    #[serde(rename = "sourceId")]
    pub(crate) source: NodeId,

    #[serde(rename = "targetId")]
    pub(crate) target: NodeId,

    pub(crate) weight: f64,

    #[serde(default)]
    pub(crate) metadata: EdgeMetadata,

    /// Creation timestamp (Unix milliseconds)
    pub(crate) created_at: i64,

    /// Last update timestamp (Unix milliseconds)
    pub(crate) updated_at: i64,
}

impl Edge {
    /// Create an edge with the type's default weight and no metadata
    pub fn new(
        id: impl Into<EdgeId>,
        edge_type: EdgeType,
        source: impl Into<NodeId>,
        target: impl Into<NodeId>,
    ) -> Self {
        let now = now_millis();
        Edge {
            id: id.into(),
            edge_type,
            source: source.into(),
            target: target.into(),
            weight: edge_type.default_weight(),
            metadata: EdgeMetadata::General,
            created_at: now,
            updated_at: now,
        }
    }

    /// Foreign key from a referencing column to the referenced column
    pub fn foreign_key(
        id: impl Into<EdgeId>,
        source_column: impl Into<NodeId>,
        target_column: impl Into<NodeId>,
        metadata: ForeignKeyMetadata,
    ) -> Self {
        let mut edge = Edge::new(id, EdgeType::ForeignKey, source_column, target_column);
        edge.metadata = EdgeMetadata::ForeignKey(metadata);
        edge
    }

    /// Ownership of a column by its table
    pub fn table_column(
        id: impl Into<EdgeId>,
        table: impl Into<NodeId>,
        column: impl Into<NodeId>,
    ) -> Self {
        Edge::new(id, EdgeType::TableColumn, table, column)
    }

    /// Table to one of its primary-key columns, at the cheaper 0.5 weight
    pub fn primary_key(
        id: impl Into<EdgeId>,
        table: impl Into<NodeId>,
        column: impl Into<NodeId>,
    ) -> Self {
        Edge::new(id, EdgeType::PrimaryKey, table, column)
    }

    /// Membership of a column in an index
    pub fn index_column(
        id: impl Into<EdgeId>,
        index: impl Into<NodeId>,
        column: impl Into<NodeId>,
        ordinal_position: u32,
        sort_order: SortOrder,
    ) -> Self {
        let mut edge = Edge::new(id, EdgeType::IndexColumn, index, column);
        edge.metadata = EdgeMetadata::IndexColumn(IndexColumnMetadata {
            ordinal_position,
            sort_order,
        });
        edge
    }

    /// Builder-style weight override. Invalid weights keep the default.
    pub fn with_weight(mut self, weight: f64) -> Self {
        if is_valid_weight(weight) {
            self.weight = weight;
        }
        self
    }

    /// Builder-style metadata setter. A variant that does not fit the edge
    /// type is ignored.
    pub fn with_metadata(mut self, metadata: EdgeMetadata) -> Self {
        if metadata.fits(self.edge_type) {
            self.metadata = metadata;
        }
        self
    }

    pub fn id(&self) -> &EdgeId {
        &self.id
    }

    pub fn edge_type(&self) -> EdgeType {
        self.edge_type
    }

    pub fn source(&self) -> &NodeId {
        &self.source
    }

    pub fn target(&self) -> &NodeId {
        &self.target
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn metadata(&self) -> &EdgeMetadata {
        &self.metadata
    }

    pub fn created_at(&self) -> i64 {
        self.created_at
    }

    pub fn updated_at(&self) -> i64 {
        self.updated_at
    }

    /// Exact-direction check: does this edge go from `source` to `target`?
    pub fn connects(&self, source: &NodeId, target: &NodeId) -> bool {
        &self.source == source && &self.target == target
    }

    /// Is `node` either endpoint?
    pub fn is_connected_to(&self, node: &NodeId) -> bool {
        &self.source == node || &self.target == node
    }

    /// The endpoint opposite `node`, or `None` if `node` is not an endpoint
    pub fn other_node_id(&self, node: &NodeId) -> Option<&NodeId> {
        if &self.source == node {
            Some(&self.target)
        } else if &self.target == node {
            Some(&self.source)
        } else {
            None
        }
    }

    pub fn is_directional(&self) -> bool {
        self.edge_type.is_directional()
    }

    pub fn is_primary_key(&self) -> bool {
        self.edge_type == EdgeType::PrimaryKey
    }

    pub fn is_foreign_key(&self) -> bool {
        self.edge_type == EdgeType::ForeignKey
    }

    pub fn is_table_column(&self) -> bool {
        self.edge_type == EdgeType::TableColumn
    }

    /// Mutate metadata and bump the update timestamp. Returns false (and
    /// changes nothing) if the result no longer fits the edge type.
    pub fn update_metadata(&mut self, update: impl FnOnce(&mut EdgeMetadata)) -> bool {
        let mut metadata = self.metadata.clone();
        update(&mut metadata);
        if !metadata.fits(self.edge_type) {
            return false;
        }
        self.metadata = metadata;
        self.touch();
        true
    }

    /// Set a new traversal weight. Returns false (and changes nothing) if the
    /// weight is not a positive finite number.
    pub fn update_weight(&mut self, weight: f64) -> bool {
        if !is_valid_weight(weight) {
            return false;
        }
        self.weight = weight;
        self.touch();
        true
    }

    pub fn foreign_key_metadata(&self) -> Option<&ForeignKeyMetadata> {
        match &self.metadata {
            EdgeMetadata::ForeignKey(m) if self.edge_type == EdgeType::ForeignKey => Some(m),
            _ => None,
        }
    }

    pub fn index_column_metadata(&self) -> Option<&IndexColumnMetadata> {
        match &self.metadata {
            EdgeMetadata::IndexColumn(m) if self.edge_type == EdgeType::IndexColumn => Some(m),
            _ => None,
        }
    }

    pub fn constraint_metadata(&self) -> Option<&ConstraintEdgeMetadata> {
        match &self.metadata {
            EdgeMetadata::Constraint(m) if self.edge_type == EdgeType::ConstraintColumn => Some(m),
            _ => None,
        }
    }

    /// Copy under a new id, optionally re-pointed at other endpoints
    pub fn clone_with(
        &self,
        new_id: impl Into<EdgeId>,
        new_source: Option<NodeId>,
        new_target: Option<NodeId>,
    ) -> Edge {
        let now = now_millis();
        Edge {
            id: new_id.into(),
            edge_type: self.edge_type,
            source: new_source.unwrap_or_else(|| self.source.clone()),
            target: new_target.unwrap_or_else(|| self.target.clone()),
            weight: self.weight,
            metadata: self.metadata.clone(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(self)
    }

    pub fn from_json(value: serde_json::Value) -> serde_json::Result<Edge> {
        serde_json::from_value(value)
    }

    /// Rough in-memory size, for statistics only
    pub fn memory_footprint(&self) -> usize {
        serde_json::to_vec(self).map(|v| v.len()).unwrap_or(0) * 2
    }

    fn touch(&mut self) {
        self.updated_at = now_millis().max(self.updated_at);
    }
}

pub(crate) fn is_valid_weight(weight: f64) -> bool {
    weight.is_finite() && weight > 0.0
}

impl PartialEq for Edge {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Edge {}

impl std::hash::Hash for Edge {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::metadata::ConstraintKind;

    fn fk_edge() -> Edge {
        Edge::foreign_key(
            "fk:orders.customer_id",
            "column:public.orders.customer_id",
            "column:public.customers.id",
            ForeignKeyMetadata::new("customers", "id"),
        )
    }

    #[test]
    fn test_create_edge() {
        let edge = Edge::new("e1", EdgeType::Reference, "a", "b");
        assert_eq!(edge.id().as_str(), "e1");
        assert_eq!(edge.source().as_str(), "a");
        assert_eq!(edge.target().as_str(), "b");
        assert_eq!(edge.edge_type(), EdgeType::Reference);
        assert_eq!(edge.weight(), 1.0);
        assert_eq!(edge.metadata(), &EdgeMetadata::General);
    }

    #[test]
    fn test_factory_shapes() {
        let pk = Edge::primary_key("pk1", "t", "c");
        assert!(pk.is_primary_key());
        assert_eq!(pk.weight(), 0.5);

        let tc = Edge::table_column("tc1", "t", "c");
        assert!(tc.is_table_column());
        assert_eq!(tc.weight(), 1.0);

        let fk = fk_edge();
        assert!(fk.is_foreign_key());
        assert!(fk.is_directional());
        assert_eq!(fk.foreign_key_metadata().unwrap().referenced_table, "customers");

        let ix = Edge::index_column("ix1", "i", "c", 2, SortOrder::Desc);
        let meta = ix.index_column_metadata().unwrap();
        assert_eq!(meta.ordinal_position, 2);
        assert_eq!(meta.sort_order, SortOrder::Desc);
        assert!(!ix.is_directional());
    }

    #[test]
    fn test_edge_direction() {
        let edge = fk_edge();
        let source = NodeId::new("column:public.orders.customer_id");
        let target = NodeId::new("column:public.customers.id");

        assert!(edge.connects(&source, &target));
        assert!(!edge.connects(&target, &source));
        assert!(edge.is_connected_to(&source));
        assert!(edge.is_connected_to(&target));
        assert!(!edge.is_connected_to(&NodeId::new("other")));
    }

    #[test]
    fn test_other_node_id() {
        let edge = Edge::table_column("tc", "t", "c");
        assert_eq!(edge.other_node_id(&NodeId::new("t")).unwrap().as_str(), "c");
        assert_eq!(edge.other_node_id(&NodeId::new("c")).unwrap().as_str(), "t");
        assert!(edge.other_node_id(&NodeId::new("x")).is_none());
    }

    #[test]
    fn test_typed_accessors_on_mismatch() {
        let tc = Edge::table_column("tc", "t", "c");
        assert!(tc.foreign_key_metadata().is_none());
        assert!(tc.index_column_metadata().is_none());
        assert!(tc.constraint_metadata().is_none());

        let constrained = Edge::new("cc", EdgeType::ConstraintColumn, "k", "c").with_metadata(
            EdgeMetadata::Constraint(ConstraintEdgeMetadata {
                constraint_name: "users_email_key".to_string(),
                kind: ConstraintKind::Unique,
            }),
        );
        assert_eq!(
            constrained.constraint_metadata().unwrap().kind,
            ConstraintKind::Unique
        );
    }

    #[test]
    fn test_update_weight() {
        let mut edge = Edge::table_column("tc", "t", "c");
        assert!(edge.update_weight(2.5));
        assert_eq!(edge.weight(), 2.5);
        assert!(!edge.update_weight(0.0));
        assert!(!edge.update_weight(-1.0));
        assert!(!edge.update_weight(f64::NAN));
        assert_eq!(edge.weight(), 2.5);

        let ignored = Edge::table_column("tc2", "t", "c").with_weight(-3.0);
        assert_eq!(ignored.weight(), 1.0);
    }

    #[test]
    fn test_update_metadata() {
        let mut edge = fk_edge();
        assert!(edge.update_metadata(|meta| {
            if let EdgeMetadata::ForeignKey(fk) = meta {
                fk.on_delete = Some("CASCADE".to_string());
            }
        }));
        assert_eq!(
            edge.foreign_key_metadata().unwrap().on_delete.as_deref(),
            Some("CASCADE")
        );

        // Swapping in another relationship kind is refused
        assert!(!edge.update_metadata(|meta| {
            *meta = EdgeMetadata::IndexColumn(IndexColumnMetadata {
                ordinal_position: 1,
                sort_order: SortOrder::Asc,
            });
        }));
        assert!(edge.foreign_key_metadata().is_some());
    }

    #[test]
    fn test_metadata_must_match_edge_type() {
        let fk_meta = EdgeMetadata::ForeignKey(ForeignKeyMetadata::new("t", "id"));
        let edge = Edge::new("x", EdgeType::TableColumn, "a", "b").with_metadata(fk_meta);
        assert!(!edge.is_foreign_key());
        assert!(edge.foreign_key_metadata().is_none());
        assert_eq!(edge.metadata(), &EdgeMetadata::General);

        // Deserialized edges bypass the builder; accessors still check the type
        let mut forged = Edge::table_column("y", "a", "b");
        forged.metadata = EdgeMetadata::ForeignKey(ForeignKeyMetadata::new("t", "id"));
        assert!(forged.foreign_key_metadata().is_none());
    }

    #[test]
    fn test_clone_with() {
        let edge = fk_edge();
        let moved = edge.clone_with("fk2", None, Some(NodeId::new("column:public.clients.id")));
        assert_eq!(moved.id().as_str(), "fk2");
        assert_eq!(moved.source(), edge.source());
        assert_eq!(moved.target().as_str(), "column:public.clients.id");
        assert_eq!(moved.foreign_key_metadata(), edge.foreign_key_metadata());
    }

    #[test]
    fn test_json_round_trip() {
        let edge = fk_edge();
        let json = edge.to_json().unwrap();
        assert_eq!(json["type"], "FOREIGN_KEY");
        assert_eq!(json["sourceId"], "column:public.orders.customer_id");
        assert_eq!(json["metadata"]["kind"], "foreign_key");

        let back = Edge::from_json(json).unwrap();
        assert_eq!(back, edge);
        assert_eq!(back.weight(), edge.weight());
        assert_eq!(back.foreign_key_metadata(), edge.foreign_key_metadata());
        assert!(back.memory_footprint() > 0);
    }
}
