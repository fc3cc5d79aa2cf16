//! relforge core
//!
//! Shared domain types: relation identifiers and project/model configuration.

pub mod config;
pub mod relation;

pub use config::{ClusterBy, Config, ConfigError, Materialization, ModelConfig, TableConfig, TargetConfig};
pub use relation::{Relation, RelationError, RelationKind};
