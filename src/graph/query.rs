//! Multi-hop relationship exploration
//!
//! Breadth-first expansion from one node (or from every node) following edges
//! that pass the type and direction filters.

use super::store::{timed, GraphError, OpResult, SchemaGraph};
use super::types::{Direction, EdgeId, EdgeType, NodeId, NodeType};
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Filters and bounds for [`SchemaGraph::query_relationships`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RelationshipQuery {
    /// Start node. `None` starts from every node in turn.
    pub source: Option<NodeId>,
    pub node_types: Option<Vec<NodeType>>,
    pub edge_types: Option<Vec<EdgeType>>,
    pub direction: Direction,
    pub max_depth: usize,
}

impl Default for RelationshipQuery {
    fn default() -> Self {
        Self {
            source: None,
            node_types: None,
            edge_types: None,
            direction: Direction::Both,
            max_depth: 1,
        }
    }
}

impl RelationshipQuery {
    /// Query rooted at a single node
    pub fn from(source: impl Into<NodeId>) -> Self {
        Self {
            source: Some(source.into()),
            ..Self::default()
        }
    }

    pub fn with_node_types(mut self, node_types: impl IntoIterator<Item = NodeType>) -> Self {
        self.node_types = Some(node_types.into_iter().collect());
        self
    }

    pub fn with_edge_types(mut self, edge_types: impl IntoIterator<Item = EdgeType>) -> Self {
        self.edge_types = Some(edge_types.into_iter().collect());
        self
    }

    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

/// One discovered route: the nodes walked so far and the edge that
/// extended it last
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationshipPath {
    pub nodes: Vec<NodeId>,
    pub edge: EdgeId,
    pub total_weight: f64,
    pub relationship_types: Vec<EdgeType>,
}

impl RelationshipPath {
    pub fn depth(&self) -> usize {
        self.relationship_types.len()
    }

    pub fn end(&self) -> Option<&NodeId> {
        self.nodes.last()
    }
}

/// Everything reached by a relationship query, deduplicated and in
/// discovery order. Start nodes appear only if reached from another start.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationshipResult {
    pub nodes: Vec<NodeId>,
    pub edges: Vec<EdgeId>,
    pub paths: Vec<RelationshipPath>,
}

struct Frontier {
    node: NodeId,
    depth: usize,
    nodes: Vec<NodeId>,
    weight: f64,
    types: Vec<EdgeType>,
}

impl SchemaGraph {
    /// Breadth-first exploration bounded by `query.max_depth`.
    ///
    /// Each node is expanded at most once per start node. Fails with
    /// `NodeNotFound` when an explicit source is missing.
    pub fn query_relationships(&self, query: &RelationshipQuery) -> OpResult<RelationshipResult> {
        timed(|meta| {
            let starts: Vec<NodeId> = match &query.source {
                Some(source) => {
                    if !self.has_node(source) {
                        return Err(GraphError::NodeNotFound(source.clone()));
                    }
                    vec![source.clone()]
                }
                None => self.nodes().map(|n| n.id().clone()).collect(),
            };

            let mut nodes = IndexSet::new();
            let mut edges = IndexSet::new();
            let mut paths = Vec::new();

            for start in starts {
                let mut visited: IndexSet<NodeId> = IndexSet::new();
                visited.insert(start.clone());
                let mut queue = VecDeque::new();
                queue.push_back(Frontier {
                    nodes: vec![start.clone()],
                    node: start,
                    depth: 0,
                    weight: 0.0,
                    types: Vec::new(),
                });

                while let Some(current) = queue.pop_front() {
                    meta.nodes_visited += 1;
                    if current.depth >= query.max_depth {
                        continue;
                    }
                    let Some(node) = self.get_node(&current.node) else {
                        continue;
                    };
                    let incident = match query.direction {
                        Direction::Outgoing => node.outgoing_edges(),
                        Direction::Incoming => node.incoming_edges(),
                        Direction::Both => node.edges(),
                    };

                    for edge_id in incident {
                        let Some(edge) = self.get_edge(edge_id) else {
                            continue;
                        };
                        meta.edges_traversed += 1;
                        if let Some(types) = &query.edge_types {
                            if !types.contains(&edge.edge_type()) {
                                continue;
                            }
                        }
                        let Some(neighbor_id) = edge.other_node_id(&current.node) else {
                            continue;
                        };
                        let Some(neighbor) = self.get_node(neighbor_id) else {
                            continue;
                        };
                        if let Some(types) = &query.node_types {
                            if !types.contains(&neighbor.node_type()) {
                                continue;
                            }
                        }

                        edges.insert(edge_id.clone());
                        if !visited.insert(neighbor_id.clone()) {
                            continue;
                        }
                        nodes.insert(neighbor_id.clone());

                        let mut path_nodes = current.nodes.clone();
                        path_nodes.push(neighbor_id.clone());
                        let mut types = current.types.clone();
                        types.push(edge.edge_type());
                        let weight = current.weight + edge.weight();

                        paths.push(RelationshipPath {
                            nodes: path_nodes.clone(),
                            edge: edge_id.clone(),
                            total_weight: weight,
                            relationship_types: types.clone(),
                        });
                        queue.push_back(Frontier {
                            node: neighbor_id.clone(),
                            depth: current.depth + 1,
                            nodes: path_nodes,
                            weight,
                            types,
                        });
                    }
                }
            }

            Ok(RelationshipResult {
                nodes: nodes.into_iter().collect(),
                edges: edges.into_iter().collect(),
                paths,
            })
        })
    }
}
