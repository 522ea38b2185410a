//! Engine configuration
//!
//! All limits are fixed when a graph or analyzer is constructed. Files may be
//! YAML (`.yaml`/`.yml`) or JSON; missing keys fall back to the defaults.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid YAML config: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid JSON config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid config value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Capacity and feature switches for a [`SchemaGraph`](crate::graph::SchemaGraph)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    /// Maximum number of nodes
    pub max_nodes: usize,
    /// Maximum number of edges
    pub max_edges: usize,
    /// Maintain type/schema/name indexes (otherwise lookups scan)
    pub enable_indexing: bool,
    /// Memoize `find_path` results until the next mutation
    pub enable_path_caching: bool,
    /// Upper bound on memoized paths (least recently used are evicted)
    pub path_cache_capacity: usize,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            max_nodes: 100_000,
            max_edges: 500_000,
            enable_indexing: true,
            enable_path_caching: true,
            path_cache_capacity: 1_000,
        }
    }
}

impl GraphConfig {
    pub fn with_max_nodes(mut self, max_nodes: usize) -> Self {
        self.max_nodes = max_nodes;
        self
    }

    pub fn with_max_edges(mut self, max_edges: usize) -> Self {
        self.max_edges = max_edges;
        self
    }

    pub fn with_indexing(mut self, enabled: bool) -> Self {
        self.enable_indexing = enabled;
        self
    }

    pub fn with_path_caching(mut self, enabled: bool) -> Self {
        self.enable_path_caching = enabled;
        self
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.enable_path_caching && self.path_cache_capacity == 0 {
            return Err(ConfigError::InvalidValue {
                field: "path_cache_capacity",
                reason: "must be at least 1 when path caching is enabled".to_string(),
            });
        }
        Ok(())
    }
}

/// Limits for [`SchemaAnalyzer`](crate::analyzer::SchemaAnalyzer) traversals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Hops explored by relationship analysis
    pub max_join_depth: usize,
    /// Hop cap for point-to-point join paths
    pub join_path_max_depth: usize,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            max_join_depth: 3,
            join_path_max_depth: 4,
        }
    }
}

impl AnalyzerConfig {
    pub fn validate(&self) -> ConfigResult<()> {
        if self.max_join_depth == 0 {
            return Err(ConfigError::InvalidValue {
                field: "max_join_depth",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.join_path_max_depth == 0 {
            return Err(ConfigError::InvalidValue {
                field: "join_path_max_depth",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

/// Top-level configuration file layout
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub graph: GraphConfig,
    pub analyzer: AnalyzerConfig,
}

impl EngineConfig {
    /// Parse YAML (a JSON document is valid YAML too)
    pub fn from_yaml_str(text: &str) -> ConfigResult<Self> {
        let config: EngineConfig = serde_yaml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_str(text: &str) -> ConfigResult<Self> {
        let config: EngineConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a file, choosing the parser by extension (`.json` or YAML)
    pub fn from_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        debug!("Loading engine config from {:?}", path);
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json_str(&text),
            _ => Self::from_yaml_str(&text),
        }
    }

    pub fn validate(&self) -> ConfigResult<()> {
        self.graph.validate()?;
        self.analyzer.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.graph.max_nodes, 100_000);
        assert!(config.graph.enable_indexing);
        assert!(config.graph.enable_path_caching);
        assert_eq!(config.analyzer.max_join_depth, 3);
        assert_eq!(config.analyzer.join_path_max_depth, 4);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let config = EngineConfig::from_yaml_str("graph:\n  max_nodes: 10\n").unwrap();
        assert_eq!(config.graph.max_nodes, 10);
        assert_eq!(config.graph.max_edges, 500_000);
        assert_eq!(config.analyzer, AnalyzerConfig::default());
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = EngineConfig::from_yaml_str("analyzer:\n  max_join_depth: 0\n").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue { field: "max_join_depth", .. }
        ));

        let err = EngineConfig::from_json_str(r#"{"graph": {"path_cache_capacity": 0}}"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn test_from_file_by_extension() {
        let dir = tempfile::tempdir().unwrap();

        let yaml_path = dir.path().join("engine.yaml");
        let mut file = std::fs::File::create(&yaml_path).unwrap();
        writeln!(file, "graph:\n  enable_indexing: false").unwrap();
        let config = EngineConfig::from_file(&yaml_path).unwrap();
        assert!(!config.graph.enable_indexing);

        let json_path = dir.path().join("engine.json");
        std::fs::write(&json_path, r#"{"analyzer": {"max_join_depth": 5}}"#).unwrap();
        let config = EngineConfig::from_file(&json_path).unwrap();
        assert_eq!(config.analyzer.max_join_depth, 5);

        assert!(matches!(
            EngineConfig::from_file(dir.path().join("missing.yaml")),
            Err(ConfigError::Io(_))
        ));
    }

    #[test]
    fn test_builder_methods() {
        let config = GraphConfig::default()
            .with_max_nodes(5)
            .with_max_edges(7)
            .with_indexing(false)
            .with_path_caching(false);
        assert_eq!(config.max_nodes, 5);
        assert_eq!(config.max_edges, 7);
        assert!(!config.enable_indexing);
        assert!(!config.enable_path_caching);
    }
}
