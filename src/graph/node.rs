//! Node implementation for the schema graph
//!
//! A node is one schema element. Its adjacency sets are bookkeeping owned by
//! [`SchemaGraph`](super::SchemaGraph): the node never looks the graph up
//! itself, and only the graph adds or removes edge ids.

use super::metadata::{
    ColumnMetadata, ConstraintMetadata, IndexMetadata, NodeMetadata, RoutineMetadata,
    TableMetadata, TriggerMetadata, ViewMetadata,
};
use super::types::{now_millis, Direction, EdgeId, NodeId, NodeType};
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

/// Approximate bytes charged per adjacent edge id in memory estimates
const EDGE_REF_FOOTPRINT: usize = 64;

/// A node in the schema graph
///
/// Nodes have:
/// - A unique ID
/// - A name and optional schema (namespace)
/// - Free-form tags
/// - Typed metadata whose variant is the node type
/// - Creation and update timestamps
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    /// Unique identifier for this node
    pub(crate) id: NodeId,

    pub(crate) name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) schema: Option<String>,

    #[serde(default)]
    pub(crate) tags: IndexSet<String>,

    pub(crate) metadata: NodeMetadata,

    /// Creation timestamp (Unix milliseconds)
    pub(crate) created_at: i64,

    /// Last update timestamp (Unix milliseconds)
    pub(crate) updated_at: i64,

    /// Every adjacent edge, regardless of direction
    #[serde(skip)]
    pub(crate) edges: IndexSet<EdgeId>,

    #[serde(skip)]
    pub(crate) incoming: IndexSet<EdgeId>,

    #[serde(skip)]
    pub(crate) outgoing: IndexSet<EdgeId>,
}

impl Node {
    /// Create a new node; its type follows from the metadata variant
    pub fn new(
        id: impl Into<NodeId>,
        name: impl Into<String>,
        metadata: impl Into<NodeMetadata>,
    ) -> Self {
        let now = now_millis();
        Node {
            id: id.into(),
            name: name.into(),
            schema: None,
            tags: IndexSet::new(),
            metadata: metadata.into(),
            created_at: now,
            updated_at: now,
            edges: IndexSet::new(),
            incoming: IndexSet::new(),
            outgoing: IndexSet::new(),
        }
    }

    /// Convenience constructor for a table node
    pub fn table(id: impl Into<NodeId>, name: impl Into<String>, schema: Option<&str>) -> Self {
        Node::new(id, name, TableMetadata::default()).with_schema(schema)
    }

    /// Convenience constructor for a column node
    pub fn column(
        id: impl Into<NodeId>,
        name: impl Into<String>,
        schema: Option<&str>,
        column: ColumnMetadata,
    ) -> Self {
        Node::new(id, name, column).with_schema(schema)
    }

    /// Builder-style schema setter
    pub fn with_schema(mut self, schema: Option<&str>) -> Self {
        self.schema = schema.map(str::to_string);
        self
    }

    /// Builder-style tag setter
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }

    pub fn id(&self) -> &NodeId {
        &self.id
    }

    pub fn node_type(&self) -> NodeType {
        self.metadata.node_type()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn schema(&self) -> Option<&str> {
        self.schema.as_deref()
    }

    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.tags.iter().map(String::as_str)
    }

    pub fn metadata(&self) -> &NodeMetadata {
        &self.metadata
    }

    pub fn created_at(&self) -> i64 {
        self.created_at
    }

    pub fn updated_at(&self) -> i64 {
        self.updated_at
    }

    /// All adjacent edge ids
    pub fn edges(&self) -> &IndexSet<EdgeId> {
        &self.edges
    }

    pub fn incoming_edges(&self) -> &IndexSet<EdgeId> {
        &self.incoming
    }

    pub fn outgoing_edges(&self) -> &IndexSet<EdgeId> {
        &self.outgoing
    }

    /// Register an adjacent edge. `Both` marks a self-loop.
    pub(crate) fn add_edge(&mut self, edge_id: EdgeId, direction: Direction) {
        match direction {
            Direction::Incoming => {
                self.incoming.insert(edge_id.clone());
            }
            Direction::Outgoing => {
                self.outgoing.insert(edge_id.clone());
            }
            Direction::Both => {
                self.incoming.insert(edge_id.clone());
                self.outgoing.insert(edge_id.clone());
            }
        }
        self.edges.insert(edge_id);
    }

    /// Forget an adjacent edge. Returns true if it was registered.
    pub(crate) fn remove_edge(&mut self, edge_id: &EdgeId) -> bool {
        self.incoming.shift_remove(edge_id);
        self.outgoing.shift_remove(edge_id);
        self.edges.shift_remove(edge_id)
    }

    pub(crate) fn clear_edges(&mut self) {
        self.edges.clear();
        self.incoming.clear();
        self.outgoing.clear();
    }

    /// Number of adjacent edges
    pub fn degree(&self) -> usize {
        self.edges.len()
    }

    /// Rename the node. Inside a graph, call this through
    /// [`SchemaGraph::update_node`](super::SchemaGraph::update_node) so the
    /// name index follows.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
        self.touch();
    }

    pub fn set_schema(&mut self, schema: Option<&str>) {
        self.schema = schema.map(str::to_string);
        self.touch();
    }

    /// Mutate metadata in place and bump the update timestamp
    pub fn update_metadata(&mut self, update: impl FnOnce(&mut NodeMetadata)) {
        update(&mut self.metadata);
        self.touch();
    }

    /// Add tags. Returns how many were new.
    pub fn add_tags<I, S>(&mut self, tags: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut added = 0;
        for tag in tags {
            if self.tags.insert(tag.into()) {
                added += 1;
            }
        }
        if added > 0 {
            self.touch();
        }
        added
    }

    /// Remove tags. Returns how many were present.
    pub fn remove_tags<I, S>(&mut self, tags: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut removed = 0;
        for tag in tags {
            if self.tags.shift_remove(tag.as_ref()) {
                removed += 1;
            }
        }
        if removed > 0 {
            self.touch();
        }
        removed
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    pub fn is_table(&self) -> bool {
        self.node_type() == NodeType::Table
    }

    pub fn is_column(&self) -> bool {
        self.node_type() == NodeType::Column
    }

    pub fn is_index(&self) -> bool {
        self.node_type() == NodeType::Index
    }

    pub fn is_constraint(&self) -> bool {
        self.node_type() == NodeType::Constraint
    }

    pub fn is_view(&self) -> bool {
        self.node_type() == NodeType::View
    }

    pub fn is_trigger(&self) -> bool {
        self.node_type() == NodeType::Trigger
    }

    pub fn is_procedure(&self) -> bool {
        self.node_type() == NodeType::Procedure
    }

    pub fn is_function(&self) -> bool {
        self.node_type() == NodeType::Function
    }

    /// `schema.name`, or just `name` when the node has no schema
    pub fn fully_qualified_name(&self) -> String {
        match &self.schema {
            Some(schema) => format!("{}.{}", schema, self.name),
            None => self.name.clone(),
        }
    }

    pub fn table_metadata(&self) -> Option<&TableMetadata> {
        match &self.metadata {
            NodeMetadata::Table(m) => Some(m),
            _ => None,
        }
    }

    pub fn column_metadata(&self) -> Option<&ColumnMetadata> {
        match &self.metadata {
            NodeMetadata::Column(m) => Some(m),
            _ => None,
        }
    }

    pub fn index_metadata(&self) -> Option<&IndexMetadata> {
        match &self.metadata {
            NodeMetadata::Index(m) => Some(m),
            _ => None,
        }
    }

    pub fn constraint_metadata(&self) -> Option<&ConstraintMetadata> {
        match &self.metadata {
            NodeMetadata::Constraint(m) => Some(m),
            _ => None,
        }
    }

    pub fn view_metadata(&self) -> Option<&ViewMetadata> {
        match &self.metadata {
            NodeMetadata::View(m) => Some(m),
            _ => None,
        }
    }

    pub fn trigger_metadata(&self) -> Option<&TriggerMetadata> {
        match &self.metadata {
            NodeMetadata::Trigger(m) => Some(m),
            _ => None,
        }
    }

    /// Metadata of a procedure or function node
    pub fn routine_metadata(&self) -> Option<&RoutineMetadata> {
        match &self.metadata {
            NodeMetadata::Procedure(m) | NodeMetadata::Function(m) => Some(m),
            _ => None,
        }
    }

    /// Detached copy under a new id: same data, fresh timestamps, no edges
    pub fn clone_with_id(&self, new_id: impl Into<NodeId>) -> Node {
        let now = now_millis();
        Node {
            id: new_id.into(),
            name: self.name.clone(),
            schema: self.schema.clone(),
            tags: self.tags.clone(),
            metadata: self.metadata.clone(),
            created_at: now,
            updated_at: now,
            edges: IndexSet::new(),
            incoming: IndexSet::new(),
            outgoing: IndexSet::new(),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(self)
    }

    /// Rebuild a node from its serialized form. Adjacency is not serialized;
    /// the graph re-derives it when edges are inserted.
    pub fn from_json(value: serde_json::Value) -> serde_json::Result<Node> {
        serde_json::from_value(value)
    }

    /// Rough in-memory size, for statistics only
    pub fn memory_footprint(&self) -> usize {
        let serialized = serde_json::to_vec(self).map(|v| v.len()).unwrap_or(0);
        serialized * 2 + self.edges.len() * EDGE_REF_FOOTPRINT
    }

    /// Update the modification timestamp
    fn touch(&mut self) {
        self.updated_at = now_millis().max(self.updated_at);
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Node {}

impl std::hash::Hash for Node {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}
