//! Tool adapters
//!
//! Thin JSON entry points over [`SchemaAnalyzer`] for an external agent
//! layer. Each tool validates its arguments, forwards to the analyzer and
//! returns plain JSON. Lookups that find nothing return `null`.

use crate::analyzer::{AnalyzerError, RelationshipOptions, SchemaAnalyzer};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;
use tracing::debug;

pub const GET_TABLE_INFO: &str = "get_table_info";
pub const ANALYZE_TABLE_RELATIONSHIPS: &str = "analyze_table_relationships";
pub const FIND_JOIN_PATH: &str = "find_join_path";
pub const FIND_MULTI_TABLE_JOIN_PATHS: &str = "find_multi_table_join_paths";
pub const LIST_ALL_TABLE_NAMES: &str = "list_all_table_names";

#[derive(Error, Debug)]
pub enum ToolError {
    #[error("Invalid arguments for {tool}: {reason}")]
    InvalidArguments { tool: String, reason: String },

    #[error("Unknown tool: {0}")]
    ToolNotFound(String),

    #[error(transparent)]
    Analyzer(#[from] AnalyzerError),

    #[error("Failed to encode result: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type ToolResult<T> = Result<T, ToolError>;

/// Name, description and JSON input schema of one tool
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    pub name: &'static str,
    pub description: &'static str,
    pub input_schema: Value,
}

#[derive(Deserialize)]
struct TableArgs {
    table_name: String,
    #[serde(default)]
    schema: Option<String>,
}

#[derive(Deserialize)]
struct RelationshipArgs {
    table_name: String,
    #[serde(default)]
    schema: Option<String>,
    #[serde(default)]
    max_depth: Option<usize>,
}

#[derive(Deserialize)]
struct JoinArgs {
    from_table: String,
    to_table: String,
    #[serde(default)]
    schema: Option<String>,
}

#[derive(Deserialize)]
struct MultiJoinArgs {
    tables: Vec<String>,
}

#[derive(Deserialize, Default)]
struct ListArgs {
    #[serde(default)]
    schema: Option<String>,
}

fn parse<T: DeserializeOwned>(tool: &str, args: Value) -> ToolResult<T> {
    // A missing argument object is treated as an empty one
    let args = if args.is_null() { json!({}) } else { args };
    serde_json::from_value(args).map_err(|e| ToolError::InvalidArguments {
        tool: tool.to_string(),
        reason: e.to_string(),
    })
}

fn require_non_empty(tool: &str, field: &str, value: &str) -> ToolResult<()> {
    if value.trim().is_empty() {
        return Err(ToolError::InvalidArguments {
            tool: tool.to_string(),
            reason: format!("{} must not be empty", field),
        });
    }
    Ok(())
}

pub struct SchemaTools<'g> {
    analyzer: SchemaAnalyzer<'g>,
}

impl<'g> SchemaTools<'g> {
    pub fn new(analyzer: SchemaAnalyzer<'g>) -> Self {
        Self { analyzer }
    }

    pub fn analyzer(&self) -> &SchemaAnalyzer<'g> {
        &self.analyzer
    }

    /// Dispatch by tool name
    pub fn call(&self, name: &str, args: Value) -> ToolResult<Value> {
        debug!("Tool call {}", name);
        match name {
            GET_TABLE_INFO => self.get_table_info(args),
            ANALYZE_TABLE_RELATIONSHIPS => self.analyze_table_relationships(args),
            FIND_JOIN_PATH => self.find_join_path(args),
            FIND_MULTI_TABLE_JOIN_PATHS => self.find_multi_table_join_paths(args),
            LIST_ALL_TABLE_NAMES => self.list_all_table_names(args),
            other => Err(ToolError::ToolNotFound(other.to_string())),
        }
    }

    pub fn get_table_info(&self, args: Value) -> ToolResult<Value> {
        let args: TableArgs = parse(GET_TABLE_INFO, args)?;
        require_non_empty(GET_TABLE_INFO, "table_name", &args.table_name)?;
        let info = self
            .analyzer
            .table_info(&args.table_name, args.schema.as_deref());
        Ok(serde_json::to_value(info)?)
    }

    pub fn analyze_table_relationships(&self, args: Value) -> ToolResult<Value> {
        let args: RelationshipArgs = parse(ANALYZE_TABLE_RELATIONSHIPS, args)?;
        require_non_empty(ANALYZE_TABLE_RELATIONSHIPS, "table_name", &args.table_name)?;
        let options = RelationshipOptions {
            max_join_depth: args.max_depth,
        };
        let analysis = self.analyzer.analyze_table_relationships(
            &args.table_name,
            args.schema.as_deref(),
            options,
        );
        Ok(serde_json::to_value(analysis)?)
    }

    pub fn find_join_path(&self, args: Value) -> ToolResult<Value> {
        let args: JoinArgs = parse(FIND_JOIN_PATH, args)?;
        require_non_empty(FIND_JOIN_PATH, "from_table", &args.from_table)?;
        require_non_empty(FIND_JOIN_PATH, "to_table", &args.to_table)?;
        let join = self.analyzer.find_join_path(
            &args.from_table,
            &args.to_table,
            args.schema.as_deref(),
        );
        Ok(serde_json::to_value(join)?)
    }

    pub fn find_multi_table_join_paths(&self, args: Value) -> ToolResult<Value> {
        let args: MultiJoinArgs = parse(FIND_MULTI_TABLE_JOIN_PATHS, args)?;
        for table in &args.tables {
            require_non_empty(FIND_MULTI_TABLE_JOIN_PATHS, "tables[]", table)?;
        }
        let joins = self.analyzer.find_multi_table_join_paths(args.tables.as_slice())?;
        let sql: Vec<String> = joins.iter().map(|j| j.to_sql()).collect();
        Ok(json!({ "joins": joins, "sql": sql }))
    }

    pub fn list_all_table_names(&self, args: Value) -> ToolResult<Value> {
        let args: ListArgs = parse(LIST_ALL_TABLE_NAMES, args)?;
        let names = self.analyzer.all_table_names(args.schema.as_deref());
        Ok(json!({ "tables": names }))
    }

    pub fn definitions() -> Vec<ToolDefinition> {
        let schema_prop = json!({ "type": "string", "description": "Schema name" });
        vec![
            ToolDefinition {
                name: GET_TABLE_INFO,
                description: "Columns, keys and indexes of one table",
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "table_name": { "type": "string", "description": "Table name" },
                        "schema": schema_prop
                    },
                    "required": ["table_name"]
                }),
            },
            ToolDefinition {
                name: ANALYZE_TABLE_RELATIONSHIPS,
                description: "Related tables and suggested joins for a table",
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "table_name": { "type": "string", "description": "Table name" },
                        "schema": schema_prop,
                        "max_depth": { "type": "integer", "minimum": 1 }
                    },
                    "required": ["table_name"]
                }),
            },
            ToolDefinition {
                name: FIND_JOIN_PATH,
                description: "Join route between two tables",
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "from_table": { "type": "string" },
                        "to_table": { "type": "string" },
                        "schema": schema_prop
                    },
                    "required": ["from_table", "to_table"]
                }),
            },
            ToolDefinition {
                name: FIND_MULTI_TABLE_JOIN_PATHS,
                description: "Joins connecting several tables",
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "tables": {
                            "type": "array",
                            "items": { "type": "string" },
                            "minItems": 2
                        }
                    },
                    "required": ["tables"]
                }),
            },
            ToolDefinition {
                name: LIST_ALL_TABLE_NAMES,
                description: "Names of all tables",
                input_schema: json!({
                    "type": "object",
                    "properties": { "schema": schema_prop }
                }),
            },
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GraphConfig;
    use crate::graph::SchemaGraph;
    use crate::loader::{load_schema, ColumnDescription, ForeignKeyDescription, SchemaDescription, TableDescription};

    fn graph() -> SchemaGraph {
        let description = SchemaDescription {
            tables: vec![
                TableDescription::new("customers")
                    .with_column(ColumnDescription::new("id", "integer").primary()),
                TableDescription::new("orders")
                    .with_column(ColumnDescription::new("id", "integer").primary())
                    .with_column(ColumnDescription::new("customer_id", "integer"))
                    .with_foreign_key(ForeignKeyDescription::new("customer_id", "customers", "id")),
            ],
        };
        load_schema(&description, GraphConfig::default()).unwrap()
    }

    #[test]
    fn test_list_and_info() {
        let graph = graph();
        let tools = SchemaTools::new(SchemaAnalyzer::new(&graph));

        let names = tools.call(LIST_ALL_TABLE_NAMES, Value::Null).unwrap();
        assert_eq!(names["tables"], json!(["customers", "orders"]));

        let info = tools
            .call(GET_TABLE_INFO, json!({ "table_name": "orders" }))
            .unwrap();
        assert_eq!(info["name"], "orders");
        assert_eq!(info["primaryKeys"], json!(["id"]));

        let missing = tools
            .call(GET_TABLE_INFO, json!({ "table_name": "ghosts" }))
            .unwrap();
        assert!(missing.is_null());
    }

    #[test]
    fn test_join_tools() {
        let graph = graph();
        let tools = SchemaTools::new(SchemaAnalyzer::new(&graph));

        let join = tools
            .call(FIND_JOIN_PATH, json!({ "from_table": "orders", "to_table": "customers" }))
            .unwrap();
        assert_eq!(join["joins"][0]["condition"], "orders.customer_id = customers.id");

        let many = tools
            .call(FIND_MULTI_TABLE_JOIN_PATHS, json!({ "tables": ["orders", "customers"] }))
            .unwrap();
        assert_eq!(
            many["sql"][0],
            "INNER JOIN customers ON orders.customer_id = customers.id"
        );
    }

    #[test]
    fn test_argument_validation() {
        let graph = graph();
        let tools = SchemaTools::new(SchemaAnalyzer::new(&graph));

        let err = tools.call(GET_TABLE_INFO, json!({})).unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments { .. }));

        let err = tools.call(GET_TABLE_INFO, json!({ "table_name": 7 })).unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments { .. }));

        let err = tools
            .call(FIND_JOIN_PATH, json!({ "from_table": "", "to_table": "orders" }))
            .unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments { .. }));

        let err = tools
            .call(FIND_MULTI_TABLE_JOIN_PATHS, json!({ "tables": ["orders"] }))
            .unwrap_err();
        assert!(matches!(err, ToolError::Analyzer(AnalyzerError::InvalidInput(_))));

        let err = tools.call("drop_everything", json!({})).unwrap_err();
        assert!(matches!(err, ToolError::ToolNotFound(_)));
    }

    #[test]
    fn test_definitions() {
        let defs = SchemaTools::definitions();
        assert_eq!(defs.len(), 5);
        assert!(defs.iter().all(|d| d.input_schema["type"] == "object"));
    }
}
