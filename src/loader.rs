//! Building a schema graph from a pre-extracted schema description
//!
//! Tables, their columns, primary keys and indexes are inserted first; foreign
//! keys follow in a second pass once every column node exists.

use crate::config::GraphConfig;
use crate::graph::{
    ColumnMetadata, Edge, ForeignKeyMetadata, GraphResult, IndexMetadata, Node, SchemaGraph,
    SortOrder, TableMetadata,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Schema name used when a table does not specify one
pub const DEFAULT_SCHEMA: &str = "public";

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Failed to read schema description: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON schema description: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid YAML schema description: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Graph(#[from] crate::graph::GraphError),
}

pub type LoadResult<T> = Result<T, LoadError>;

/// A whole database schema, as produced by an external introspection step
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemaDescription {
    #[serde(default)]
    pub tables: Vec<TableDescription>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableDescription {
    pub name: String,

    /// Schema name (defaults to "public")
    #[serde(default)]
    pub schema: Option<String>,

    #[serde(default)]
    pub columns: Vec<ColumnDescription>,

    /// Primary key columns, in addition to any column flagged `primary_key`
    #[serde(default)]
    pub primary_key: Vec<String>,

    #[serde(default)]
    pub foreign_keys: Vec<ForeignKeyDescription>,

    #[serde(default)]
    pub indexes: Vec<IndexDescription>,

    #[serde(default)]
    pub row_count: Option<u64>,

    /// e.g. "BASE TABLE"
    #[serde(default)]
    pub table_kind: Option<String>,

    #[serde(default)]
    pub comment: Option<String>,
}

impl TableDescription {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            schema: None,
            columns: Vec::new(),
            primary_key: Vec::new(),
            foreign_keys: Vec::new(),
            indexes: Vec::new(),
            row_count: None,
            table_kind: None,
            comment: None,
        }
    }

    pub fn with_column(mut self, column: ColumnDescription) -> Self {
        self.columns.push(column);
        self
    }

    pub fn with_foreign_key(mut self, foreign_key: ForeignKeyDescription) -> Self {
        self.foreign_keys.push(foreign_key);
        self
    }

    pub fn schema_name(&self) -> &str {
        self.schema.as_deref().unwrap_or(DEFAULT_SCHEMA)
    }

    fn is_primary_key(&self, column: &ColumnDescription) -> bool {
        column.primary_key || self.primary_key.iter().any(|c| c == &column.name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDescription {
    pub name: String,
    pub data_type: String,
    #[serde(default = "default_nullable")]
    pub nullable: bool,
    #[serde(default)]
    pub primary_key: bool,
    #[serde(default)]
    pub default: Option<String>,
    #[serde(default)]
    pub max_length: Option<u32>,
    #[serde(default)]
    pub auto_increment: bool,
}

fn default_nullable() -> bool {
    true
}

impl ColumnDescription {
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            nullable: true,
            primary_key: false,
            default: None,
            max_length: None,
            auto_increment: false,
        }
    }

    /// Builder-style primary key flag; primary keys are never nullable
    pub fn primary(mut self) -> Self {
        self.primary_key = true;
        self.nullable = false;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForeignKeyDescription {
    pub column: String,
    pub referenced_table: String,
    /// Defaults to the referencing table's schema
    #[serde(default)]
    pub referenced_schema: Option<String>,
    pub referenced_column: String,
    #[serde(default)]
    pub constraint_name: Option<String>,
    #[serde(default)]
    pub on_update: Option<String>,
    #[serde(default)]
    pub on_delete: Option<String>,
}

impl ForeignKeyDescription {
    pub fn new(
        column: impl Into<String>,
        referenced_table: impl Into<String>,
        referenced_column: impl Into<String>,
    ) -> Self {
        Self {
            column: column.into(),
            referenced_table: referenced_table.into(),
            referenced_schema: None,
            referenced_column: referenced_column.into(),
            constraint_name: None,
            on_update: None,
            on_delete: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexDescription {
    pub name: String,
    pub columns: Vec<String>,
    #[serde(default)]
    pub unique: bool,
    #[serde(default)]
    pub method: Option<String>,
}

impl SchemaDescription {
    pub fn from_json_str(text: &str) -> LoadResult<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn from_yaml_str(text: &str) -> LoadResult<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Read a description file; `.yaml`/`.yml` are parsed as YAML, anything
    /// else as JSON
    pub fn from_file(path: impl AsRef<Path>) -> LoadResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        debug!("Reading schema description from {:?}", path);
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("yaml") | Some("yml") => Self::from_yaml_str(&text),
            _ => Self::from_json_str(&text),
        }
    }
}

pub fn table_id(schema: &str, table: &str) -> String {
    format!("table:{}.{}", schema, table)
}

pub fn column_id(schema: &str, table: &str, column: &str) -> String {
    format!("column:{}.{}.{}", schema, table, column)
}

pub fn index_id(schema: &str, table: &str, index: &str) -> String {
    format!("index:{}.{}.{}", schema, table, index)
}

/// Build a graph from a schema description.
///
/// Foreign keys whose local column, referenced table or referenced column is
/// absent from the description are logged and skipped. Any other insertion
/// failure (duplicate table, capacity) is returned.
pub fn load_schema(description: &SchemaDescription, config: GraphConfig) -> GraphResult<SchemaGraph> {
    let mut graph = SchemaGraph::with_config(config);

    for table in &description.tables {
        load_table(&mut graph, table)?;
    }

    let mut skipped = 0;
    for table in &description.tables {
        let schema = table.schema_name();
        for fk in &table.foreign_keys {
            let ref_schema = fk.referenced_schema.as_deref().unwrap_or(schema);
            let source = column_id(schema, &table.name, &fk.column);
            let target = column_id(ref_schema, &fk.referenced_table, &fk.referenced_column);

            if !graph.has_node(&source.as_str().into()) || !graph.has_node(&target.as_str().into()) {
                warn!(
                    "Skipping foreign key {}.{}.{} -> {}.{}.{}: column not found",
                    schema, table.name, fk.column, ref_schema, fk.referenced_table, fk.referenced_column
                );
                skipped += 1;
                continue;
            }

            let metadata = ForeignKeyMetadata {
                constraint_name: fk.constraint_name.clone(),
                on_update: fk.on_update.clone(),
                on_delete: fk.on_delete.clone(),
                ..ForeignKeyMetadata::new(&fk.referenced_table, &fk.referenced_column)
            };
            let edge_id = format!("fk:{}.{}.{}", schema, table.name, fk.column);
            graph
                .add_edge(Edge::foreign_key(edge_id, source, target, metadata))
                .into_result()?;
        }
    }

    info!(
        "Loaded schema graph: {} tables, {} nodes, {} edges ({} foreign keys skipped)",
        description.tables.len(),
        graph.node_count(),
        graph.edge_count(),
        skipped
    );
    Ok(graph)
}

fn load_table(graph: &mut SchemaGraph, table: &TableDescription) -> GraphResult<()> {
    let schema = table.schema_name();
    let table_node_id = table_id(schema, &table.name);

    let metadata = TableMetadata {
        row_count: table.row_count,
        table_kind: table.table_kind.clone(),
        comment: table.comment.clone(),
        ..TableMetadata::default()
    };
    graph
        .add_node(Node::new(table_node_id.as_str(), &table.name, metadata).with_schema(Some(schema)))
        .into_result()?;

    for (position, column) in table.columns.iter().enumerate() {
        let col_id = column_id(schema, &table.name, &column.name);
        let metadata = ColumnMetadata {
            nullable: column.nullable,
            default_value: column.default.clone(),
            max_length: column.max_length,
            auto_increment: column.auto_increment,
            ordinal_position: Some(position as u32 + 1),
            ..ColumnMetadata::new(&column.data_type)
        };
        graph
            .add_node(Node::column(col_id.as_str(), &column.name, Some(schema), metadata))
            .into_result()?;

        let suffix = format!("{}.{}.{}", schema, table.name, column.name);
        graph
            .add_edge(Edge::table_column(
                format!("tc:{}", suffix),
                table_node_id.as_str(),
                col_id.as_str(),
            ))
            .into_result()?;
        if table.is_primary_key(column) {
            graph
                .add_edge(Edge::primary_key(
                    format!("pk:{}", suffix),
                    table_node_id.as_str(),
                    col_id.as_str(),
                ))
                .into_result()?;
        }
    }

    for name in &table.primary_key {
        if !table.columns.iter().any(|c| &c.name == name) {
            warn!("Primary key column {}.{}.{} not found", schema, table.name, name);
        }
    }

    for index in &table.indexes {
        let idx_id = index_id(schema, &table.name, &index.name);
        let metadata = IndexMetadata {
            unique: index.unique,
            method: index.method.clone(),
        };
        graph
            .add_node(Node::new(idx_id.as_str(), &index.name, metadata).with_schema(Some(schema)))
            .into_result()?;

        for (position, column) in index.columns.iter().enumerate() {
            let col_id = column_id(schema, &table.name, column);
            if !graph.has_node(&col_id.as_str().into()) {
                warn!("Index {} references unknown column {}", idx_id, column);
                continue;
            }
            graph
                .add_edge(Edge::index_column(
                    format!("ix:{}.{}.{}.{}", schema, table.name, index.name, column),
                    idx_id.as_str(),
                    col_id.as_str(),
                    position as u32 + 1,
                    SortOrder::Asc,
                ))
                .into_result()?;
        }
    }

    debug!("Loaded table {}.{} ({} columns)", schema, table.name, table.columns.len());
    Ok(())
}
