//! Snapshot export/import and graph merging
//!
//! A snapshot lists every node before any edge, so replaying it in order
//! always satisfies edge endpoint checks.

use super::edge::Edge;
use super::node::Node;
use super::path::PathCache;
use super::store::{timed, EntityKind, GraphError, GraphResult, OpResult, SchemaGraph};
use super::types::{EdgeId, NodeId};
use crate::config::GraphConfig;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Mutex;
use tracing::{debug, info};

/// Snapshot format version written by this crate
pub const SNAPSHOT_VERSION: &str = "1.0";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotMetadata {
    pub version: String,
    pub created_at: i64,
    pub updated_at: i64,
    pub node_count: usize,
    pub edge_count: usize,
}

/// Complete serialized form of a graph
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphSnapshot {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    pub metadata: SnapshotMetadata,
}

/// How [`SchemaGraph::merge`] resolves id collisions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MergePolicy {
    /// Keep the local entity, drop the incoming one
    #[default]
    Skip,
    /// Remove the local entity (cascading for nodes), then insert
    Overwrite,
    /// Insert the incoming entity under a fresh id
    Rename,
}

/// What a merge did
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeReport {
    pub nodes_added: usize,
    pub nodes_skipped: usize,
    pub nodes_overwritten: usize,
    pub nodes_renamed: usize,
    pub edges_added: usize,
    pub edges_skipped: usize,
    pub edges_overwritten: usize,
    pub edges_renamed: usize,
    /// Incoming node id -> id it was stored under
    pub node_id_map: BTreeMap<NodeId, NodeId>,
    /// Incoming edge id -> id it was stored under
    pub edge_id_map: BTreeMap<EdgeId, EdgeId>,
}

fn fresh_suffix() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

impl SchemaGraph {
    pub fn to_snapshot(&self) -> GraphSnapshot {
        GraphSnapshot {
            nodes: self.nodes().cloned().collect(),
            edges: self.edges().cloned().collect(),
            metadata: SnapshotMetadata {
                version: SNAPSHOT_VERSION.to_string(),
                created_at: self.created_at,
                updated_at: self.updated_at,
                node_count: self.node_count(),
                edge_count: self.edge_count(),
            },
        }
    }

    pub fn to_json(&self) -> GraphResult<String> {
        serde_json::to_string(&self.to_snapshot())
            .map_err(|e| GraphError::Serialization(e.to_string()))
    }

    pub fn to_json_pretty(&self) -> GraphResult<String> {
        serde_json::to_string_pretty(&self.to_snapshot())
            .map_err(|e| GraphError::Serialization(e.to_string()))
    }

    /// Rebuild a graph from a snapshot: nodes first, then edges.
    ///
    /// The first record that cannot be inserted aborts the import with
    /// `ImportFailure`; no partially built graph is returned.
    pub fn from_snapshot(snapshot: GraphSnapshot, config: Option<GraphConfig>) -> GraphResult<Self> {
        let mut graph = SchemaGraph::with_config(config.unwrap_or_default());

        for (index, node) in snapshot.nodes.into_iter().enumerate() {
            graph.insert_node(node).map_err(|e| GraphError::ImportFailure {
                entity: EntityKind::Node,
                index,
                reason: e.to_string(),
            })?;
        }
        for (index, edge) in snapshot.edges.into_iter().enumerate() {
            graph.insert_edge(edge).map_err(|e| GraphError::ImportFailure {
                entity: EntityKind::Edge,
                index,
                reason: e.to_string(),
            })?;
        }

        graph.created_at = snapshot.metadata.created_at;
        graph.updated_at = snapshot.metadata.updated_at;
        info!(
            "Imported snapshot with {} nodes and {} edges",
            graph.node_count(),
            graph.edge_count()
        );
        Ok(graph)
    }

    pub fn from_json(text: &str, config: Option<GraphConfig>) -> GraphResult<Self> {
        let snapshot: GraphSnapshot =
            serde_json::from_str(text).map_err(|e| GraphError::ImportFailure {
                entity: EntityKind::Snapshot,
                index: 0,
                reason: e.to_string(),
            })?;
        Self::from_snapshot(snapshot, config)
    }

    /// Copy every node and edge of `other` into this graph.
    ///
    /// Nodes are merged before edges; incoming edges that point at a renamed
    /// node follow it to its new id. The merge is all-or-nothing: on the first
    /// hard failure (capacity, dangling endpoint) this graph is left untouched.
    pub fn merge(&mut self, other: &SchemaGraph, policy: MergePolicy) -> OpResult<MergeReport> {
        timed(|meta| {
            let mut staged = self.clone();
            let mut report = MergeReport::default();

            for node in other.nodes() {
                meta.nodes_visited += 1;
                let incoming_id = node.id().clone();
                let stored_id = if staged.has_node(&incoming_id) {
                    match policy {
                        MergePolicy::Skip => {
                            report.nodes_skipped += 1;
                            continue;
                        }
                        MergePolicy::Overwrite => {
                            staged.delete_node(&incoming_id)?;
                            staged.insert_node(node.clone())?;
                            report.nodes_overwritten += 1;
                            incoming_id.clone()
                        }
                        MergePolicy::Rename => {
                            let new_id = NodeId::new(format!("{}_{}", incoming_id, fresh_suffix()));
                            staged.insert_node(node.clone_with_id(new_id.clone()))?;
                            report.nodes_renamed += 1;
                            new_id
                        }
                    }
                } else {
                    staged.insert_node(node.clone())?;
                    report.nodes_added += 1;
                    incoming_id.clone()
                };
                report.node_id_map.insert(incoming_id, stored_id);
            }

            for edge in other.edges() {
                meta.edges_traversed += 1;
                let source = report.node_id_map.get(edge.source()).cloned();
                let target = report.node_id_map.get(edge.target()).cloned();
                let incoming_id = edge.id().clone();

                let (stored_id, rewired) = if staged.has_edge(&incoming_id) {
                    match policy {
                        MergePolicy::Skip => {
                            report.edges_skipped += 1;
                            continue;
                        }
                        MergePolicy::Overwrite => {
                            staged.delete_edge(&incoming_id)?;
                            report.edges_overwritten += 1;
                            (incoming_id.clone(), rewire(edge, incoming_id.clone(), source, target))
                        }
                        MergePolicy::Rename => {
                            let new_id = EdgeId::new(format!("{}_{}", incoming_id, fresh_suffix()));
                            report.edges_renamed += 1;
                            (new_id.clone(), edge.clone_with(new_id, source, target))
                        }
                    }
                } else {
                    report.edges_added += 1;
                    (incoming_id.clone(), rewire(edge, incoming_id.clone(), source, target))
                };
                staged.insert_edge(rewired)?;
                report.edge_id_map.insert(incoming_id, stored_id);
            }

            // Keep the counters of the graph being merged into
            let cache = std::mem::replace(
                self.cache_mut(),
                PathCache::new(&staged.config),
            );
            staged.path_cache = Mutex::new(cache);
            staged.invalidate();
            *self = staged;

            info!(
                "Merged graph ({:?}): {} nodes added, {} renamed, {} edges added",
                policy, report.nodes_added, report.nodes_renamed, report.edges_added
            );
            Ok(report)
        })
    }
}

/// Same edge (id, timestamps, metadata) with endpoints mapped through the merge
fn rewire(edge: &Edge, id: EdgeId, source: Option<NodeId>, target: Option<NodeId>) -> Edge {
    let mut copy = edge.clone();
    copy.id = id;
    if let Some(source) = source {
        copy.source = source;
    }
    if let Some(target) = target {
        copy.target = target;
    }
    debug!("Rewired edge {} to {} -> {}", copy.id, copy.source, copy.target);
    copy
}
