//! Configuration schema (relforge.toml)

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use crate::relation::Relation;

/// Clustering specification: one expression or an ordered list of them
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ClusterBy {
    /// A single clustering expression
    Single(String),

    /// Ordered clustering expressions
    Many(Vec<String>),
}

impl ClusterBy {
    /// Normalize to a list; a single expression becomes a one-element list
    pub fn columns(&self) -> Vec<&str> {
        match self {
            Self::Single(expr) => vec![expr.as_str()],
            Self::Many(exprs) => exprs.iter().map(String::as_str).collect(),
        }
    }
}

impl From<&str> for ClusterBy {
    fn from(expr: &str) -> Self {
        Self::Single(expr.to_string())
    }
}

impl From<String> for ClusterBy {
    fn from(expr: String) -> Self {
        Self::Single(expr)
    }
}

impl From<Vec<String>> for ClusterBy {
    fn from(exprs: Vec<String>) -> Self {
        Self::Many(exprs)
    }
}

impl From<Vec<&str>> for ClusterBy {
    fn from(exprs: Vec<&str>) -> Self {
        Self::Many(exprs.into_iter().map(str::to_string).collect())
    }
}

/// Physical layout options read by table creation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableConfig {
    /// Partitioning expression
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partition_by: Option<String>,

    /// Clustering expression(s)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster_by: Option<ClusterBy>,
}

impl TableConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn partition_by(mut self, expr: impl Into<String>) -> Self {
        self.partition_by = Some(expr.into());
        self
    }

    pub fn cluster_by(mut self, cluster: impl Into<ClusterBy>) -> Self {
        self.cluster_by = Some(cluster.into());
        self
    }
}

/// How a model is built in the warehouse
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Materialization {
    Table,
    #[default]
    View,
}

/// Per-model configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Materialization type
    #[serde(default)]
    pub materialized: Materialization,

    /// Partitioning and clustering
    #[serde(flatten)]
    pub table: TableConfig,
}

/// Target schema that models are built into
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetConfig {
    /// Database/project name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,

    /// Schema/dataset name
    pub schema: String,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            database: None,
            schema: "public".to_string(),
        }
    }
}

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Where models are created
    #[serde(default)]
    pub target: TargetConfig,

    /// Model configuration keyed by model name
    #[serde(default)]
    pub models: BTreeMap<String, ModelConfig>,
}

impl Config {
    /// Load config from TOML file
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::IoError(e.to_string()))?;

        Self::from_toml(&contents)
    }

    /// Load config from TOML string
    pub fn from_toml(toml: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml)
            .map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Save config to TOML file
    pub fn save_to_file(&self, path: &std::path::Path) -> Result<(), ConfigError> {
        let toml = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;

        std::fs::write(path, toml)
            .map_err(|e| ConfigError::IoError(e.to_string()))?;

        Ok(())
    }

    /// Configuration for a model, or the defaults if it has none
    pub fn model(&self, name: &str) -> ModelConfig {
        self.models.get(name).cloned().unwrap_or_default()
    }

    /// Relation a model is built into
    pub fn relation_for(&self, name: &str) -> Relation {
        let relation = Relation::new(self.target.schema.clone(), name);
        match &self.target.database {
            Some(database) => relation.with_database(database.clone()),
            None => relation,
        }
    }
}

/// Config error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Serialize error: {0}")]
    SerializeError(String),
}
