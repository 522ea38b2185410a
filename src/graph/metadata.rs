//! Typed metadata carried by nodes and edges
//!
//! Each node type has its own metadata struct; the node's type is the variant
//! of its [`NodeMetadata`]. Reading column fields off a table node is therefore
//! a pattern-match miss (`None`) rather than a silently absent map key.

use super::types::{EdgeType, NodeType};
use serde::{Deserialize, Serialize};

/// Table-level attributes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engine: Option<String>,
    /// e.g. "BASE TABLE", "PARTITIONED", "FOREIGN"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// Column attributes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnMetadata {
    pub data_type: String,
    #[serde(default = "default_true")]
    pub nullable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u32>,
    #[serde(default)]
    pub auto_increment: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ordinal_position: Option<u32>,
}

impl ColumnMetadata {
    pub fn new(data_type: impl Into<String>) -> Self {
        Self {
            data_type: data_type.into(),
            nullable: true,
            default_value: None,
            max_length: None,
            auto_increment: false,
            ordinal_position: None,
        }
    }
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexMetadata {
    #[serde(default)]
    pub unique: bool,
    /// Access method, e.g. "btree"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConstraintKind {
    PrimaryKey,
    ForeignKey,
    Unique,
    Check,
    NotNull,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConstraintMetadata {
    pub kind: ConstraintKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub referenced_table: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub referenced_columns: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_update: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_delete: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub definition: Option<String>,
    #[serde(default)]
    pub updatable: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggerMetadata {
    /// BEFORE / AFTER / INSTEAD OF
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timing: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,
}

/// Stored procedures and functions
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutineMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub definition: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_type: Option<String>,
}

/// Node metadata, tagged by node type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NodeMetadata {
    Table(TableMetadata),
    Column(ColumnMetadata),
    Index(IndexMetadata),
    Constraint(ConstraintMetadata),
    View(ViewMetadata),
    Trigger(TriggerMetadata),
    Procedure(RoutineMetadata),
    Function(RoutineMetadata),
}

impl NodeMetadata {
    pub fn node_type(&self) -> NodeType {
        match self {
            NodeMetadata::Table(_) => NodeType::Table,
            NodeMetadata::Column(_) => NodeType::Column,
            NodeMetadata::Index(_) => NodeType::Index,
            NodeMetadata::Constraint(_) => NodeType::Constraint,
            NodeMetadata::View(_) => NodeType::View,
            NodeMetadata::Trigger(_) => NodeType::Trigger,
            NodeMetadata::Procedure(_) => NodeType::Procedure,
            NodeMetadata::Function(_) => NodeType::Function,
        }
    }
}

impl From<TableMetadata> for NodeMetadata {
    fn from(m: TableMetadata) -> Self {
        NodeMetadata::Table(m)
    }
}

impl From<ColumnMetadata> for NodeMetadata {
    fn from(m: ColumnMetadata) -> Self {
        NodeMetadata::Column(m)
    }
}

impl From<IndexMetadata> for NodeMetadata {
    fn from(m: IndexMetadata) -> Self {
        NodeMetadata::Index(m)
    }
}

impl From<ConstraintMetadata> for NodeMetadata {
    fn from(m: ConstraintMetadata) -> Self {
        NodeMetadata::Constraint(m)
    }
}

impl From<ViewMetadata> for NodeMetadata {
    fn from(m: ViewMetadata) -> Self {
        NodeMetadata::View(m)
    }
}

impl From<TriggerMetadata> for NodeMetadata {
    fn from(m: TriggerMetadata) -> Self {
        NodeMetadata::Trigger(m)
    }
}

/// Referential details of a foreign-key edge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForeignKeyMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constraint_name: Option<String>,
    pub referenced_table: String,
    pub referenced_column: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_update: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_delete: Option<String>,
}

impl ForeignKeyMetadata {
    pub fn new(referenced_table: impl Into<String>, referenced_column: impl Into<String>) -> Self {
        Self {
            constraint_name: None,
            referenced_table: referenced_table.into(),
            referenced_column: referenced_column.into(),
            on_update: None,
            on_delete: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl Default for SortOrder {
    fn default() -> Self {
        SortOrder::Asc
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexColumnMetadata {
    pub ordinal_position: u32,
    #[serde(default)]
    pub sort_order: SortOrder,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConstraintEdgeMetadata {
    pub constraint_name: String,
    pub kind: ConstraintKind,
}

/// Edge metadata, tagged by relationship kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EdgeMetadata {
    ForeignKey(ForeignKeyMetadata),
    IndexColumn(IndexColumnMetadata),
    Constraint(ConstraintEdgeMetadata),
    General,
}

impl Default for EdgeMetadata {
    fn default() -> Self {
        EdgeMetadata::General
    }
}

impl EdgeMetadata {
    /// Can this variant describe an edge of `edge_type`? `General` fits all.
    pub fn fits(&self, edge_type: EdgeType) -> bool {
        match self {
            EdgeMetadata::ForeignKey(_) => edge_type == EdgeType::ForeignKey,
            EdgeMetadata::IndexColumn(_) => edge_type == EdgeType::IndexColumn,
            EdgeMetadata::Constraint(_) => edge_type == EdgeType::ConstraintColumn,
            EdgeMetadata::General => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_metadata_tagging() {
        let meta: NodeMetadata = ColumnMetadata::new("integer").into();
        assert_eq!(meta.node_type(), NodeType::Column);

        let json = serde_json::to_value(&meta).unwrap();
        assert_eq!(json["type"], "COLUMN");
        assert_eq!(json["dataType"], "integer");
        assert_eq!(json["nullable"], true);
    }

    #[test]
    fn test_column_defaults_on_deserialize() {
        let meta: NodeMetadata =
            serde_json::from_str(r#"{"type":"COLUMN","dataType":"text"}"#).unwrap();
        match meta {
            NodeMetadata::Column(col) => {
                assert_eq!(col.data_type, "text");
                assert!(col.nullable);
                assert!(!col.auto_increment);
            }
            other => panic!("expected column metadata, got {:?}", other),
        }
    }

    #[test]
    fn test_routine_variants_keep_their_type() {
        let proc_meta = NodeMetadata::Procedure(RoutineMetadata::default());
        let func_meta = NodeMetadata::Function(RoutineMetadata::default());
        assert_eq!(proc_meta.node_type(), NodeType::Procedure);

        let json = serde_json::to_string(&func_meta).unwrap();
        let back: NodeMetadata = serde_json::from_str(&json).unwrap();
        assert_eq!(back.node_type(), NodeType::Function);
    }

    #[test]
    fn test_edge_metadata_tagging() {
        let fk = EdgeMetadata::ForeignKey(ForeignKeyMetadata::new("customers", "id"));
        let json = serde_json::to_value(&fk).unwrap();
        assert_eq!(json["kind"], "foreign_key");
        assert_eq!(json["referencedTable"], "customers");

        let general: EdgeMetadata = serde_json::from_str(r#"{"kind":"general"}"#).unwrap();
        assert_eq!(general, EdgeMetadata::General);
    }

    #[test]
    fn test_edge_metadata_fits_its_type_only() {
        let fk = EdgeMetadata::ForeignKey(ForeignKeyMetadata::new("customers", "id"));
        assert!(fk.fits(EdgeType::ForeignKey));
        assert!(!fk.fits(EdgeType::TableColumn));

        let ix = EdgeMetadata::IndexColumn(IndexColumnMetadata {
            ordinal_position: 1,
            sort_order: SortOrder::Desc,
        });
        assert!(ix.fits(EdgeType::IndexColumn));
        assert!(!ix.fits(EdgeType::ForeignKey));

        assert!(EdgeType::ALL.iter().all(|t| EdgeMetadata::General.fits(*t)));
    }
}
