//! Core type definitions for the schema graph

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a node
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        NodeId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for NodeId {
    fn from(id: String) -> Self {
        NodeId(id)
    }
}

impl From<&str> for NodeId {
    fn from(id: &str) -> Self {
        NodeId(id.to_string())
    }
}

/// Unique identifier for an edge
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
#[serde(transparent)]
pub struct EdgeId(String);

impl EdgeId {
    pub fn new(id: impl Into<String>) -> Self {
        EdgeId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for EdgeId {
    fn from(id: String) -> Self {
        EdgeId(id)
    }
}

impl From<&str> for EdgeId {
    fn from(id: &str) -> Self {
        EdgeId(id.to_string())
    }
}

/// Kind of schema element a node represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NodeType {
    Table,
    Column,
    Index,
    Constraint,
    View,
    Trigger,
    Procedure,
    Function,
}

impl NodeType {
    pub const ALL: [NodeType; 8] = [
        NodeType::Table,
        NodeType::Column,
        NodeType::Index,
        NodeType::Constraint,
        NodeType::View,
        NodeType::Trigger,
        NodeType::Procedure,
        NodeType::Function,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            NodeType::Table => "TABLE",
            NodeType::Column => "COLUMN",
            NodeType::Index => "INDEX",
            NodeType::Constraint => "CONSTRAINT",
            NodeType::View => "VIEW",
            NodeType::Trigger => "TRIGGER",
            NodeType::Procedure => "PROCEDURE",
            NodeType::Function => "FUNCTION",
        }
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Relationship type between two schema elements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EdgeType {
    ForeignKey,
    PrimaryKey,
    TableColumn,
    IndexColumn,
    ViewDependency,
    ConstraintColumn,
    Inheritance,
    Reference,
}

impl EdgeType {
    pub const ALL: [EdgeType; 8] = [
        EdgeType::ForeignKey,
        EdgeType::PrimaryKey,
        EdgeType::TableColumn,
        EdgeType::IndexColumn,
        EdgeType::ViewDependency,
        EdgeType::ConstraintColumn,
        EdgeType::Inheritance,
        EdgeType::Reference,
    ];

    /// Whether source -> target carries meaning for this relationship.
    ///
    /// Non-directional kinds are traversed both ways even though their
    /// endpoints are still stored as source/target.
    pub fn is_directional(&self) -> bool {
        matches!(
            self,
            EdgeType::ForeignKey
                | EdgeType::ViewDependency
                | EdgeType::Inheritance
                | EdgeType::Reference
        )
    }

    /// Traversal weight an edge of this type gets unless told otherwise.
    ///
    /// Primary-key edges are cheaper so pathfinding prefers them.
    pub fn default_weight(&self) -> f64 {
        match self {
            EdgeType::PrimaryKey => 0.5,
            _ => 1.0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EdgeType::ForeignKey => "FOREIGN_KEY",
            EdgeType::PrimaryKey => "PRIMARY_KEY",
            EdgeType::TableColumn => "TABLE_COLUMN",
            EdgeType::IndexColumn => "INDEX_COLUMN",
            EdgeType::ViewDependency => "VIEW_DEPENDENCY",
            EdgeType::ConstraintColumn => "CONSTRAINT_COLUMN",
            EdgeType::Inheritance => "INHERITANCE",
            EdgeType::Reference => "REFERENCE",
        }
    }
}

impl fmt::Display for EdgeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which side of an edge a node sits on, from the node's point of view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Incoming,
    Outgoing,
    Both,
}

impl Default for Direction {
    fn default() -> Self {
        Direction::Both
    }
}

/// Current time as Unix milliseconds
pub(crate) fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_id() {
        let id = NodeId::new("table:public.users");
        assert_eq!(id.as_str(), "table:public.users");
        assert_eq!(format!("{}", id), "table:public.users");

        let id2: NodeId = "column:public.users.id".into();
        assert_eq!(id2.as_str(), "column:public.users.id");
    }

    #[test]
    fn test_edge_id() {
        let id = EdgeId::new("fk:orders.customer_id");
        assert_eq!(id.as_str(), "fk:orders.customer_id");
        assert_eq!(format!("{}", id), "fk:orders.customer_id");
    }

    #[test]
    fn test_directionality() {
        assert!(EdgeType::ForeignKey.is_directional());
        assert!(EdgeType::ViewDependency.is_directional());
        assert!(EdgeType::Inheritance.is_directional());
        assert!(EdgeType::Reference.is_directional());
        assert!(!EdgeType::PrimaryKey.is_directional());
        assert!(!EdgeType::TableColumn.is_directional());
        assert!(!EdgeType::IndexColumn.is_directional());
        assert!(!EdgeType::ConstraintColumn.is_directional());
    }

    #[test]
    fn test_default_weights() {
        assert_eq!(EdgeType::PrimaryKey.default_weight(), 0.5);
        assert_eq!(EdgeType::ForeignKey.default_weight(), 1.0);
        assert_eq!(EdgeType::TableColumn.default_weight(), 1.0);
    }

    #[test]
    fn test_enum_serialization() {
        assert_eq!(serde_json::to_string(&NodeType::Table).unwrap(), "\"TABLE\"");
        assert_eq!(
            serde_json::to_string(&EdgeType::ForeignKey).unwrap(),
            "\"FOREIGN_KEY\""
        );
        let parsed: EdgeType = serde_json::from_str("\"TABLE_COLUMN\"").unwrap();
        assert_eq!(parsed, EdgeType::TableColumn);
        assert_eq!(EdgeType::IndexColumn.to_string(), "INDEX_COLUMN");
    }

    #[test]
    fn test_id_ordering() {
        let id1 = NodeId::new("a");
        let id2 = NodeId::new("b");
        assert!(id1 < id2);
    }
}
