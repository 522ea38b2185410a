//! Schemagraph CLI: load a schema description and ask it questions
//!
//! Schema files are YAML (`.yaml`/`.yml`) or JSON table descriptions.

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use comfy_table::{ContentArrangement, Table};
use schemagraph::analyzer::{JoinSuggestion, RelationshipOptions, SchemaAnalyzer};
use schemagraph::config::EngineConfig;
use schemagraph::graph::SchemaGraph;
use schemagraph::loader::{load_schema, SchemaDescription};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "schemagraph", version, about = "Explore a relational schema as a graph")]
struct Cli {
    /// Engine config file (YAML or JSON)
    #[arg(long, global = true, env = "SCHEMAGRAPH_CONFIG")]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, default_value = "table", global = true)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// List tables
    Tables {
        schema_file: PathBuf,
        /// Only tables in this schema
        #[arg(long)]
        schema: Option<String>,
    },
    /// Show columns, keys and indexes of a table
    Info { schema_file: PathBuf, table: String },
    /// Show tables related to a table and suggested joins
    Relationships {
        schema_file: PathBuf,
        table: String,
        /// Hops to explore
        #[arg(long)]
        depth: Option<usize>,
    },
    /// Find the join route between two tables
    Join {
        schema_file: PathBuf,
        from: String,
        to: String,
    },
    /// Plan joins connecting several tables
    JoinMany {
        schema_file: PathBuf,
        #[arg(required = true, num_args = 2..)]
        tables: Vec<String>,
    },
    /// Graph and per-schema statistics
    Stats { schema_file: PathBuf },
    /// Print the graph snapshot as JSON
    Snapshot { schema_file: PathBuf },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => EngineConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => EngineConfig::default(),
    };
    let format = cli.format;

    match cli.command {
        Commands::Tables { schema_file, schema } => {
            let graph = load_graph(&schema_file, &config)?;
            let analyzer = SchemaAnalyzer::with_config(&graph, config.analyzer.clone());
            let tables = analyzer.all_tables(schema.as_deref());
            render(format, &tables, || {
                let mut table = new_table(&["Schema", "Table", "Columns", "Rows"]);
                for t in &tables {
                    table.add_row(vec![
                        t.schema.clone().unwrap_or_default(),
                        t.name.clone(),
                        t.columns.len().to_string(),
                        t.row_count.map(|r| r.to_string()).unwrap_or_default(),
                    ]);
                }
                println!("{}", table);
                println!("{} table(s)", tables.len());
            })
        }
        Commands::Info { schema_file, table } => {
            let graph = load_graph(&schema_file, &config)?;
            let analyzer = SchemaAnalyzer::with_config(&graph, config.analyzer.clone());
            let info = analyzer
                .table_info(&table, None)
                .ok_or_else(|| anyhow!("table {} not found", table))?;
            render(format, &info, || {
                println!("{}", info.fully_qualified_name());
                let mut columns = new_table(&["Column", "Type", "Nullable", "PK", "Default"]);
                for c in &info.columns {
                    columns.add_row(vec![
                        c.name.clone(),
                        c.data_type.clone(),
                        c.nullable.to_string(),
                        if c.is_primary_key { "yes" } else { "" }.to_string(),
                        c.default_value.clone().unwrap_or_default(),
                    ]);
                }
                println!("{}", columns);

                if !info.foreign_keys.is_empty() {
                    let mut fks = new_table(&["Column", "References", "On delete"]);
                    for fk in &info.foreign_keys {
                        fks.add_row(vec![
                            fk.column.clone(),
                            format!("{}.{}", fk.referenced_table, fk.referenced_column),
                            fk.on_delete.clone().unwrap_or_default(),
                        ]);
                    }
                    println!("{}", fks);
                }
                if !info.indexes.is_empty() {
                    let mut indexes = new_table(&["Index", "Columns", "Unique"]);
                    for index in &info.indexes {
                        indexes.add_row(vec![
                            index.name.clone(),
                            index.columns.join(", "),
                            index.unique.to_string(),
                        ]);
                    }
                    println!("{}", indexes);
                }
            })
        }
        Commands::Relationships { schema_file, table, depth } => {
            let graph = load_graph(&schema_file, &config)?;
            let analyzer = SchemaAnalyzer::with_config(&graph, config.analyzer.clone());
            let options = RelationshipOptions {
                max_join_depth: depth,
            };
            let analysis = analyzer
                .analyze_table_relationships(&table, None, options)
                .ok_or_else(|| anyhow!("table {} not found", table))?;
            render(format, &analysis, || {
                println!("Related tables: {}", analysis.related_tables.join(", "));
                print_joins(&analysis.join_suggestions);
            })
        }
        Commands::Join { schema_file, from, to } => {
            let graph = load_graph(&schema_file, &config)?;
            let analyzer = SchemaAnalyzer::with_config(&graph, config.analyzer.clone());
            let join = analyzer
                .find_join_path(&from, &to, None)
                .ok_or_else(|| anyhow!("no join path from {} to {}", from, to))?;
            render(format, &join, || {
                let route: Vec<&str> = join.path.nodes.iter().map(|id| id.as_str()).collect();
                println!("Route ({} hops, weight {}):", join.path.hops(), join.total_weight);
                println!("  {}", route.join(" -> "));
                print_joins(&join.joins);
            })
        }
        Commands::JoinMany { schema_file, tables } => {
            let graph = load_graph(&schema_file, &config)?;
            let analyzer = SchemaAnalyzer::with_config(&graph, config.analyzer.clone());
            let joins = analyzer.find_multi_table_join_paths(tables.as_slice())?;
            render(format, &joins, || {
                if let Some(first) = tables.first() {
                    println!("SELECT * FROM {}", first);
                }
                for join in &joins {
                    println!("  {}", join.to_sql());
                }
            })
        }
        Commands::Stats { schema_file } => {
            let graph = load_graph(&schema_file, &config)?;
            let analyzer = SchemaAnalyzer::with_config(&graph, config.analyzer.clone());
            let per_schema: Vec<_> = analyzer
                .all_schemas()
                .iter()
                .filter_map(|s| analyzer.schema_statistics(s))
                .collect();
            let stats = graph.statistics();
            let report = serde_json::json!({ "graph": stats, "schemas": per_schema });
            render(format, &report, || {
                println!("Nodes: {}", stats.node_count);
                println!("Edges: {}", stats.edge_count);
                let mut table =
                    new_table(&["Schema", "Tables", "Columns", "Indexes", "Views", "Rows"]);
                for s in &per_schema {
                    table.add_row(vec![
                        s.schema.clone(),
                        s.tables.to_string(),
                        s.columns.to_string(),
                        s.indexes.to_string(),
                        s.views.to_string(),
                        s.total_rows.map(|r| r.to_string()).unwrap_or_default(),
                    ]);
                }
                println!("{}", table);
            })
        }
        Commands::Snapshot { schema_file } => {
            let graph = load_graph(&schema_file, &config)?;
            println!("{}", graph.to_json_pretty()?);
            Ok(())
        }
    }
}

fn load_graph(path: &Path, config: &EngineConfig) -> Result<SchemaGraph> {
    let description = SchemaDescription::from_file(path)
        .with_context(|| format!("reading schema {}", path.display()))?;
    let graph = load_schema(&description, config.graph.clone())?;
    info!("Loaded {} ({} nodes)", path.display(), graph.node_count());
    Ok(graph)
}

/// JSON goes straight to stdout; tables are drawn by `draw`
fn render<T: Serialize>(format: OutputFormat, value: &T, draw: impl FnOnce()) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
        OutputFormat::Table => draw(),
    }
    Ok(())
}

fn new_table(header: &[&str]) -> Table {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(header.to_vec());
    table
}

fn print_joins(joins: &[JoinSuggestion]) {
    if joins.is_empty() {
        println!("(no join suggestions)");
        return;
    }
    let mut table = new_table(&["From", "To", "Condition", "Confidence"]);
    for join in joins {
        table.add_row(vec![
            join.from_table.clone(),
            join.to_table.clone(),
            join.condition.clone(),
            format!("{:.2}", join.confidence),
        ]);
    }
    println!("{}", table);
}
