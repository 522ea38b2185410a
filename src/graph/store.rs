//! In-memory schema graph storage
//!
//! Nodes and edges live in slot arenas (`Vec<Option<_>>`) with free-slot
//! reuse. Ids resolve to slots through hash maps, and every secondary index
//! (type, schema, name, edge type, source, target) maps a key to an
//! insertion-ordered set of slots. Indexes and the path cache are derived
//! state and can always be rebuilt from the arenas.

use super::edge::{is_valid_weight, Edge};
use super::node::Node;
use super::path::PathCache;
use super::types::{Direction, EdgeId, EdgeType, NodeId, NodeType};
use crate::config::GraphConfig;
use indexmap::IndexSet;
use regex::{Regex, RegexBuilder};
use rustc_hash::FxHashMap;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::hash::Hash;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, info};

/// Which capacity limit was hit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Nodes,
    Edges,
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resource::Nodes => f.write_str("nodes"),
            Resource::Edges => f.write_str("edges"),
        }
    }
}

/// Which end of an edge is dangling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Source,
    Target,
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endpoint::Source => f.write_str("source"),
            Endpoint::Target => f.write_str("target"),
        }
    }
}

/// Kind of record a snapshot import failed on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Snapshot,
    Node,
    Edge,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Snapshot => f.write_str("snapshot"),
            EntityKind::Node => f.write_str("node"),
            EntityKind::Edge => f.write_str("edge"),
        }
    }
}

/// Errors that can occur during graph operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GraphError {
    #[error("Node {0} already exists")]
    DuplicateNode(NodeId),

    #[error("Edge {0} already exists")]
    DuplicateEdge(EdgeId),

    #[error("Node {0} not found")]
    NodeNotFound(NodeId),

    #[error("Edge {0} not found")]
    EdgeNotFound(EdgeId),

    #[error("Capacity exceeded: {resource} limit of {limit} reached")]
    CapacityExceeded { resource: Resource, limit: usize },

    #[error("Invalid edge {edge}: {endpoint} node {node} does not exist")]
    DanglingReference {
        edge: EdgeId,
        endpoint: Endpoint,
        node: NodeId,
    },

    #[error("Invalid weight {weight} for edge {edge}")]
    InvalidWeight { edge: EdgeId, weight: f64 },

    #[error("Edge {edge} of type {edge_type} carries metadata of another relationship kind")]
    MetadataMismatch { edge: EdgeId, edge_type: EdgeType },

    #[error("Import failed at {entity} #{index}: {reason}")]
    ImportFailure {
        entity: EntityKind,
        index: usize,
        reason: String,
    },

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Coarse error classes, for callers that branch on the kind of failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphErrorKind {
    DuplicateId,
    NotFound,
    CapacityExceeded,
    DanglingReference,
    InvalidWeight,
    MetadataMismatch,
    ImportFailure,
    Serialization,
}

impl GraphError {
    pub fn kind(&self) -> GraphErrorKind {
        match self {
            GraphError::DuplicateNode(_) | GraphError::DuplicateEdge(_) => {
                GraphErrorKind::DuplicateId
            }
            GraphError::NodeNotFound(_) | GraphError::EdgeNotFound(_) => GraphErrorKind::NotFound,
            GraphError::CapacityExceeded { .. } => GraphErrorKind::CapacityExceeded,
            GraphError::DanglingReference { .. } => GraphErrorKind::DanglingReference,
            GraphError::InvalidWeight { .. } => GraphErrorKind::InvalidWeight,
            GraphError::MetadataMismatch { .. } => GraphErrorKind::MetadataMismatch,
            GraphError::ImportFailure { .. } => GraphErrorKind::ImportFailure,
            GraphError::Serialization(_) => GraphErrorKind::Serialization,
        }
    }
}

pub type GraphResult<T> = Result<T, GraphError>;

/// Work done by a single graph operation
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionMetadata {
    pub execution_time: Duration,
    pub nodes_visited: usize,
    pub edges_traversed: usize,
}

/// Outcome of a graph mutation or query plus its execution metadata.
///
/// Expected failures (duplicates, missing ids, capacity) are carried in
/// `outcome`; no graph operation panics on them.
#[derive(Debug, Clone)]
pub struct OpResult<T> {
    pub outcome: GraphResult<T>,
    pub metadata: ExecutionMetadata,
}

impl<T> OpResult<T> {
    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }

    pub fn data(&self) -> Option<&T> {
        self.outcome.as_ref().ok()
    }

    pub fn error(&self) -> Option<&GraphError> {
        self.outcome.as_ref().err()
    }

    pub fn into_result(self) -> GraphResult<T> {
        self.outcome
    }
}

/// Run an operation, timing it and collecting its metadata
pub(super) fn timed<T>(op: impl FnOnce(&mut ExecutionMetadata) -> GraphResult<T>) -> OpResult<T> {
    let started = Instant::now();
    let mut metadata = ExecutionMetadata::default();
    let outcome = op(&mut metadata);
    metadata.execution_time = started.elapsed();
    OpResult { outcome, metadata }
}

/// Aggregate counters reported by [`SchemaGraph::statistics`]
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphStatistics {
    pub node_count: usize,
    pub edge_count: usize,
    pub nodes_by_type: BTreeMap<NodeType, usize>,
    pub edges_by_type: BTreeMap<EdgeType, usize>,
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub cache_hit_rate: f64,
    pub cached_paths: usize,
    /// Approximate bytes, sum of per-entity estimates
    pub memory_footprint: usize,
}

type SlotIndex<K> = FxHashMap<K, IndexSet<usize>>;

fn index_insert<K: Hash + Eq>(index: &mut SlotIndex<K>, key: K, slot: usize) {
    index.entry(key).or_default().insert(slot);
}

fn index_remove<K: Hash + Eq>(index: &mut SlotIndex<K>, key: &K, slot: usize) {
    if let Some(slots) = index.get_mut(key) {
        slots.shift_remove(&slot);
        if slots.is_empty() {
            index.remove(key);
        }
    }
}

/// Translate a `*`/`%` wildcard pattern into an anchored, case-insensitive regex
pub(crate) fn wildcard_regex(pattern: &str) -> Option<Regex> {
    let body = pattern
        .split(['*', '%'])
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(".*");
    RegexBuilder::new(&format!("^{}$", body))
        .case_insensitive(true)
        .build()
        .ok()
}

pub(crate) fn is_wildcard(pattern: &str) -> bool {
    pattern.contains(['*', '%'])
}

/// In-memory schema graph
///
/// Owns every node and edge. Mutations keep node adjacency, the secondary
/// indexes and the path cache consistent with the arenas.
#[derive(Debug)]
pub struct SchemaGraph {
    pub(super) config: GraphConfig,

    /// Node arena
    pub(super) nodes: Vec<Option<Node>>,

    /// Edge arena
    pub(super) edges: Vec<Option<Edge>>,

    pub(super) node_slots: FxHashMap<NodeId, usize>,
    pub(super) edge_slots: FxHashMap<EdgeId, usize>,

    /// Free slots for reuse
    free_node_slots: Vec<usize>,
    free_edge_slots: Vec<usize>,

    type_index: SlotIndex<NodeType>,
    schema_index: SlotIndex<String>,
    name_index: SlotIndex<String>,
    edge_type_index: SlotIndex<EdgeType>,
    source_index: SlotIndex<NodeId>,
    target_index: SlotIndex<NodeId>,

    pub(super) path_cache: Mutex<PathCache>,

    /// Creation timestamp (Unix milliseconds)
    pub(super) created_at: i64,
    /// Last mutation timestamp (Unix milliseconds)
    pub(super) updated_at: i64,
}

impl SchemaGraph {
    /// Create an empty graph with default limits
    pub fn new() -> Self {
        Self::with_config(GraphConfig::default())
    }

    /// Create an empty graph with explicit limits
    pub fn with_config(config: GraphConfig) -> Self {
        let now = super::types::now_millis();
        SchemaGraph {
            path_cache: Mutex::new(PathCache::new(&config)),
            config,
            nodes: Vec::with_capacity(256),
            edges: Vec::with_capacity(1024),
            node_slots: FxHashMap::default(),
            edge_slots: FxHashMap::default(),
            free_node_slots: Vec::new(),
            free_edge_slots: Vec::new(),
            type_index: SlotIndex::default(),
            schema_index: SlotIndex::default(),
            name_index: SlotIndex::default(),
            edge_type_index: SlotIndex::default(),
            source_index: SlotIndex::default(),
            target_index: SlotIndex::default(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn config(&self) -> &GraphConfig {
        &self.config
    }

    pub(super) fn cache(&self) -> MutexGuard<'_, PathCache> {
        self.path_cache.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(super) fn cache_mut(&mut self) -> &mut PathCache {
        self.path_cache.get_mut().unwrap_or_else(PoisonError::into_inner)
    }

    /// Topology changed: drop memoized paths and bump the timestamp
    pub(super) fn invalidate(&mut self) {
        self.cache_mut().invalidate();
        self.updated_at = super::types::now_millis();
    }

    // ============================================================
    // Mutations
    // ============================================================

    /// Insert a node. Any adjacency it carries is discarded: nodes enter
    /// the graph detached and gain edges only through [`add_edge`](Self::add_edge).
    pub fn add_node(&mut self, node: Node) -> OpResult<NodeId> {
        timed(|meta| {
            let id = self.insert_node(node)?;
            meta.nodes_visited = 1;
            Ok(id)
        })
    }

    pub(super) fn insert_node(&mut self, mut node: Node) -> GraphResult<NodeId> {
        if self.node_slots.len() >= self.config.max_nodes {
            return Err(GraphError::CapacityExceeded {
                resource: Resource::Nodes,
                limit: self.config.max_nodes,
            });
        }
        if self.node_slots.contains_key(&node.id) {
            return Err(GraphError::DuplicateNode(node.id.clone()));
        }

        node.clear_edges();
        let id = node.id.clone();
        let slot = match self.free_node_slots.pop() {
            Some(slot) => slot,
            None => {
                self.nodes.push(None);
                self.nodes.len() - 1
            }
        };

        if self.config.enable_indexing {
            index_insert(&mut self.type_index, node.node_type(), slot);
            index_insert(&mut self.name_index, node.name.clone(), slot);
            if let Some(schema) = &node.schema {
                index_insert(&mut self.schema_index, schema.clone(), slot);
            }
        }

        self.nodes[slot] = Some(node);
        self.node_slots.insert(id.clone(), slot);
        self.invalidate();
        debug!("Added node {}", id);
        Ok(id)
    }

    /// Remove a node and, first, every edge touching it
    pub fn remove_node(&mut self, id: &NodeId) -> OpResult<Node> {
        timed(|meta| {
            let adjacent = self
                .get_node(id)
                .ok_or_else(|| GraphError::NodeNotFound(id.clone()))?
                .edges
                .clone();
            meta.edges_traversed = adjacent.len();
            let node = self.delete_node(id)?;
            meta.nodes_visited = 1;
            Ok(node)
        })
    }

    pub(super) fn delete_node(&mut self, id: &NodeId) -> GraphResult<Node> {
        let slot = *self
            .node_slots
            .get(id)
            .ok_or_else(|| GraphError::NodeNotFound(id.clone()))?;

        // Cascade first so no edge ever points at a missing node
        let adjacent: Vec<EdgeId> = self.nodes[slot]
            .as_ref()
            .map(|n| n.edges.iter().cloned().collect())
            .unwrap_or_default();
        for edge_id in &adjacent {
            self.delete_edge(edge_id)?;
        }

        let mut node = self.nodes[slot]
            .take()
            .ok_or_else(|| GraphError::NodeNotFound(id.clone()))?;
        self.node_slots.remove(id);
        self.free_node_slots.push(slot);

        if self.config.enable_indexing {
            index_remove(&mut self.type_index, &node.node_type(), slot);
            index_remove(&mut self.name_index, &node.name, slot);
            if let Some(schema) = &node.schema {
                index_remove(&mut self.schema_index, schema, slot);
            }
        }

        node.clear_edges();
        self.invalidate();
        debug!("Removed node {} (cascaded {} edges)", id, adjacent.len());
        Ok(node)
    }

    /// Insert an edge between two existing nodes
    pub fn add_edge(&mut self, edge: Edge) -> OpResult<EdgeId> {
        timed(|meta| {
            let id = self.insert_edge(edge)?;
            meta.nodes_visited = 2;
            meta.edges_traversed = 1;
            Ok(id)
        })
    }

    pub(super) fn insert_edge(&mut self, edge: Edge) -> GraphResult<EdgeId> {
        if self.edge_slots.len() >= self.config.max_edges {
            return Err(GraphError::CapacityExceeded {
                resource: Resource::Edges,
                limit: self.config.max_edges,
            });
        }
        if self.edge_slots.contains_key(&edge.id) {
            return Err(GraphError::DuplicateEdge(edge.id.clone()));
        }
        if !is_valid_weight(edge.weight) {
            return Err(GraphError::InvalidWeight {
                edge: edge.id.clone(),
                weight: edge.weight,
            });
        }
        if !edge.metadata.fits(edge.edge_type) {
            return Err(GraphError::MetadataMismatch {
                edge: edge.id.clone(),
                edge_type: edge.edge_type,
            });
        }
        let source_slot = *self.node_slots.get(&edge.source).ok_or_else(|| {
            GraphError::DanglingReference {
                edge: edge.id.clone(),
                endpoint: Endpoint::Source,
                node: edge.source.clone(),
            }
        })?;
        let target_slot = *self.node_slots.get(&edge.target).ok_or_else(|| {
            GraphError::DanglingReference {
                edge: edge.id.clone(),
                endpoint: Endpoint::Target,
                node: edge.target.clone(),
            }
        })?;

        let id = edge.id.clone();
        let slot = match self.free_edge_slots.pop() {
            Some(slot) => slot,
            None => {
                self.edges.push(None);
                self.edges.len() - 1
            }
        };

        // Update adjacency
        if source_slot == target_slot {
            if let Some(node) = self.nodes[source_slot].as_mut() {
                node.add_edge(id.clone(), Direction::Both);
            }
        } else {
            if let Some(node) = self.nodes[source_slot].as_mut() {
                node.add_edge(id.clone(), Direction::Outgoing);
            }
            if let Some(node) = self.nodes[target_slot].as_mut() {
                node.add_edge(id.clone(), Direction::Incoming);
            }
        }

        if self.config.enable_indexing {
            index_insert(&mut self.edge_type_index, edge.edge_type, slot);
            index_insert(&mut self.source_index, edge.source.clone(), slot);
            index_insert(&mut self.target_index, edge.target.clone(), slot);
        }

        self.edges[slot] = Some(edge);
        self.edge_slots.insert(id.clone(), slot);
        self.invalidate();
        debug!("Added edge {}", id);
        Ok(id)
    }

    /// Remove an edge, detaching it from both endpoints
    pub fn remove_edge(&mut self, id: &EdgeId) -> OpResult<Edge> {
        timed(|meta| {
            let edge = self.delete_edge(id)?;
            meta.nodes_visited = 2;
            meta.edges_traversed = 1;
            Ok(edge)
        })
    }

    pub(super) fn delete_edge(&mut self, id: &EdgeId) -> GraphResult<Edge> {
        let slot = self
            .edge_slots
            .remove(id)
            .ok_or_else(|| GraphError::EdgeNotFound(id.clone()))?;
        let edge = self.edges[slot]
            .take()
            .ok_or_else(|| GraphError::EdgeNotFound(id.clone()))?;
        self.free_edge_slots.push(slot);

        for endpoint in [&edge.source, &edge.target] {
            if let Some(&node_slot) = self.node_slots.get(endpoint) {
                if let Some(node) = self.nodes[node_slot].as_mut() {
                    node.remove_edge(id);
                }
            }
        }

        if self.config.enable_indexing {
            index_remove(&mut self.edge_type_index, &edge.edge_type, slot);
            index_remove(&mut self.source_index, &edge.source, slot);
            index_remove(&mut self.target_index, &edge.target, slot);
        }

        self.invalidate();
        debug!("Removed edge {}", id);
        Ok(edge)
    }

    /// Mutate a node in place through the graph so indexes stay correct.
    ///
    /// Name, schema and type changes are re-indexed; a type change also
    /// drops memoized paths since node-type filters may now answer differently.
    pub fn update_node(&mut self, id: &NodeId, update: impl FnOnce(&mut Node)) -> OpResult<()> {
        timed(|meta| {
            let slot = *self
                .node_slots
                .get(id)
                .ok_or_else(|| GraphError::NodeNotFound(id.clone()))?;
            let node = self.nodes[slot]
                .as_mut()
                .ok_or_else(|| GraphError::NodeNotFound(id.clone()))?;
            meta.nodes_visited = 1;

            let before = (node.node_type(), node.name.clone(), node.schema.clone());
            update(node);
            let after = (node.node_type(), node.name.clone(), node.schema.clone());
            if before == after {
                return Ok(());
            }

            if self.config.enable_indexing {
                index_remove(&mut self.type_index, &before.0, slot);
                index_remove(&mut self.name_index, &before.1, slot);
                if let Some(schema) = &before.2 {
                    index_remove(&mut self.schema_index, schema, slot);
                }
                index_insert(&mut self.type_index, after.0, slot);
                index_insert(&mut self.name_index, after.1, slot);
                if let Some(schema) = after.2 {
                    index_insert(&mut self.schema_index, schema, slot);
                }
            }
            if before.0 != after.0 {
                self.invalidate();
            }
            Ok(())
        })
    }

    /// Mutate an edge in place. Memoized paths are dropped since the weight
    /// may have changed.
    pub fn update_edge(&mut self, id: &EdgeId, update: impl FnOnce(&mut Edge)) -> OpResult<()> {
        timed(|meta| {
            let slot = *self
                .edge_slots
                .get(id)
                .ok_or_else(|| GraphError::EdgeNotFound(id.clone()))?;
            let edge = self.edges[slot]
                .as_mut()
                .ok_or_else(|| GraphError::EdgeNotFound(id.clone()))?;
            meta.edges_traversed = 1;
            update(edge);
            self.invalidate();
            Ok(())
        })
    }

    // ============================================================
    // Reads
    // ============================================================

    pub fn get_node(&self, id: &NodeId) -> Option<&Node> {
        self.node_slots
            .get(id)
            .and_then(|&slot| self.nodes[slot].as_ref())
    }

    pub fn get_edge(&self, id: &EdgeId) -> Option<&Edge> {
        self.edge_slots
            .get(id)
            .and_then(|&slot| self.edges[slot].as_ref())
    }

    pub fn has_node(&self, id: &NodeId) -> bool {
        self.node_slots.contains_key(id)
    }

    pub fn has_edge(&self, id: &EdgeId) -> bool {
        self.edge_slots.contains_key(id)
    }

    pub fn node_count(&self) -> usize {
        self.node_slots.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.node_slots.is_empty()
    }

    /// All nodes, in slot order
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter().flatten()
    }

    /// All edges, in slot order
    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.iter().flatten()
    }

    fn nodes_in(&self, slots: Option<&IndexSet<usize>>) -> Vec<&Node> {
        slots
            .map(|slots| {
                slots
                    .iter()
                    .filter_map(|&slot| self.nodes[slot].as_ref())
                    .collect()
            })
            .unwrap_or_default()
    }

    fn edges_in(&self, slots: Option<&IndexSet<usize>>) -> Vec<&Edge> {
        slots
            .map(|slots| {
                slots
                    .iter()
                    .filter_map(|&slot| self.edges[slot].as_ref())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// All nodes of a given type
    pub fn nodes_by_type(&self, node_type: NodeType) -> Vec<&Node> {
        if self.config.enable_indexing {
            self.nodes_in(self.type_index.get(&node_type))
        } else {
            self.nodes().filter(|n| n.node_type() == node_type).collect()
        }
    }

    /// All nodes in a given schema
    pub fn nodes_by_schema(&self, schema: &str) -> Vec<&Node> {
        if self.config.enable_indexing {
            self.nodes_in(self.schema_index.get(schema))
        } else {
            self.nodes().filter(|n| n.schema() == Some(schema)).collect()
        }
    }

    /// Nodes whose name matches `pattern`.
    ///
    /// A literal pattern is an exact (case-sensitive) lookup. `*` and `%`
    /// are wildcards; a wildcard pattern matches case-insensitively over the
    /// whole name.
    pub fn nodes_by_name(&self, pattern: &str) -> Vec<&Node> {
        if !is_wildcard(pattern) {
            if self.config.enable_indexing {
                return self.nodes_in(self.name_index.get(pattern));
            }
            return self.nodes().filter(|n| n.name == pattern).collect();
        }
        match wildcard_regex(pattern) {
            Some(re) => self.nodes().filter(|n| re.is_match(&n.name)).collect(),
            None => Vec::new(),
        }
    }

    /// All edges of a given type
    pub fn edges_by_type(&self, edge_type: EdgeType) -> Vec<&Edge> {
        if self.config.enable_indexing {
            self.edges_in(self.edge_type_index.get(&edge_type))
        } else {
            self.edges().filter(|e| e.edge_type == edge_type).collect()
        }
    }

    /// Edges stored with `source` -> `target`
    pub fn edges_between(&self, source: &NodeId, target: &NodeId) -> Vec<&Edge> {
        if self.config.enable_indexing {
            let (Some(from), Some(to)) = (self.source_index.get(source), self.target_index.get(target))
            else {
                return Vec::new();
            };
            return from
                .iter()
                .filter(|slot| to.contains(*slot))
                .filter_map(|&slot| self.edges[slot].as_ref())
                .collect();
        }
        self.edges().filter(|e| e.connects(source, target)).collect()
    }

    fn resolve_edges<'a>(&'a self, ids: impl Iterator<Item = &'a EdgeId>) -> Vec<&'a Edge> {
        ids.filter_map(|id| self.get_edge(id)).collect()
    }

    /// Edges leaving a node
    pub fn outgoing_edges(&self, node_id: &NodeId) -> Vec<&Edge> {
        self.get_node(node_id)
            .map(|n| self.resolve_edges(n.outgoing.iter()))
            .unwrap_or_default()
    }

    /// Edges arriving at a node
    pub fn incoming_edges(&self, node_id: &NodeId) -> Vec<&Edge> {
        self.get_node(node_id)
            .map(|n| self.resolve_edges(n.incoming.iter()))
            .unwrap_or_default()
    }

    /// Every edge touching a node
    pub fn adjacent_edges(&self, node_id: &NodeId) -> Vec<&Edge> {
        self.get_node(node_id)
            .map(|n| self.resolve_edges(n.edges.iter()))
            .unwrap_or_default()
    }

    /// Distinct schema names, sorted
    pub fn schemas(&self) -> Vec<&str> {
        let mut schemas: Vec<&str> = if self.config.enable_indexing {
            self.schema_index.keys().map(String::as_str).collect()
        } else {
            let set: IndexSet<&str> = self.nodes().filter_map(|n| n.schema()).collect();
            set.into_iter().collect()
        };
        schemas.sort_unstable();
        schemas
    }

    // ============================================================
    // Statistics and lifecycle
    // ============================================================

    pub fn statistics(&self) -> GraphStatistics {
        let cache = self.cache();
        let mut stats = GraphStatistics {
            node_count: self.node_count(),
            edge_count: self.edge_count(),
            cache_hits: cache.hits(),
            cache_misses: cache.misses(),
            cache_hit_rate: cache.hit_rate(),
            cached_paths: cache.len(),
            ..GraphStatistics::default()
        };
        drop(cache);
        for node in self.nodes() {
            *stats.nodes_by_type.entry(node.node_type()).or_default() += 1;
            stats.memory_footprint += node.memory_footprint();
        }
        for edge in self.edges() {
            *stats.edges_by_type.entry(edge.edge_type).or_default() += 1;
            stats.memory_footprint += edge.memory_footprint();
        }
        stats
    }

    /// Drop every node, edge, index entry, cached path and counter
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.edges.clear();
        self.node_slots.clear();
        self.edge_slots.clear();
        self.free_node_slots.clear();
        self.free_edge_slots.clear();
        self.type_index.clear();
        self.schema_index.clear();
        self.name_index.clear();
        self.edge_type_index.clear();
        self.source_index.clear();
        self.target_index.clear();
        self.cache_mut().reset();
        self.updated_at = super::types::now_millis();
        info!("Cleared schema graph");
    }

    /// Check that adjacency and indexes agree with the arenas.
    ///
    /// Returns a description of the first inconsistency found.
    pub fn verify_integrity(&self) -> Result<(), String> {
        for edge in self.edges() {
            for endpoint in [&edge.source, &edge.target] {
                let node = self
                    .get_node(endpoint)
                    .ok_or_else(|| format!("edge {} references missing node {}", edge.id, endpoint))?;
                if !node.edges.contains(&edge.id) {
                    return Err(format!("node {} does not list edge {}", endpoint, edge.id));
                }
            }
        }
        for node in self.nodes() {
            for edge_id in &node.edges {
                let edge = self
                    .get_edge(edge_id)
                    .ok_or_else(|| format!("node {} lists removed edge {}", node.id, edge_id))?;
                if !edge.is_connected_to(&node.id) {
                    return Err(format!("edge {} does not touch node {}", edge_id, node.id));
                }
            }
        }
        if self.config.enable_indexing {
            let indexed: usize = self.type_index.values().map(IndexSet::len).sum();
            if indexed != self.node_count() {
                return Err(format!(
                    "type index holds {} nodes, graph holds {}",
                    indexed,
                    self.node_count()
                ));
            }
            let indexed: usize = self.edge_type_index.values().map(IndexSet::len).sum();
            if indexed != self.edge_count() {
                return Err(format!(
                    "edge type index holds {} edges, graph holds {}",
                    indexed,
                    self.edge_count()
                ));
            }
        }
        Ok(())
    }
}

impl Default for SchemaGraph {
    fn default() -> Self {
        Self::new()
    }
}

/// Deep copy. Nodes and edges keep their ids and timestamps; the path cache
/// and its counters start empty, as after a snapshot round trip.
impl Clone for SchemaGraph {
    fn clone(&self) -> Self {
        SchemaGraph {
            config: self.config.clone(),
            nodes: self.nodes.clone(),
            edges: self.edges.clone(),
            node_slots: self.node_slots.clone(),
            edge_slots: self.edge_slots.clone(),
            free_node_slots: self.free_node_slots.clone(),
            free_edge_slots: self.free_edge_slots.clone(),
            type_index: self.type_index.clone(),
            schema_index: self.schema_index.clone(),
            name_index: self.name_index.clone(),
            edge_type_index: self.edge_type_index.clone(),
            source_index: self.source_index.clone(),
            target_index: self.target_index.clone(),
            path_cache: Mutex::new(PathCache::new(&self.config)),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}
