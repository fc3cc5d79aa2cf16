//! Render context for DDL templates
//!
//! Holds the per-invocation values a template sees: the relation being built
//! (`this`), the model's SQL, its table configuration and the target.

use minijinja::Value as MinijinjaValue;
use relforge_core::{Config, TableConfig, TargetConfig};
use serde::{Deserialize, Serialize};

/// Context for rendering a single model
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelContext {
    /// Fully qualified relation being created
    pub this: String,

    /// Model SQL body
    pub sql: String,

    /// Partitioning/clustering for table creation
    pub model_config: TableConfig,

    /// Target the model is built into
    pub target: TargetConfig,
}

impl ModelContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Context for a named model in a project
    pub fn for_model(config: &Config, name: &str, sql: impl Into<String>) -> Self {
        Self {
            this: config.relation_for(name).to_string(),
            sql: sql.into(),
            model_config: config.model(name).table,
            target: config.target.clone(),
        }
    }

    /// Convert to MiniJinja value for rendering
    pub fn to_minijinja_value(&self) -> MinijinjaValue {
        MinijinjaValue::from_serialize(self)
    }
}

/// Builder for ModelContext
pub struct ModelContextBuilder {
    context: ModelContext,
}

impl ModelContextBuilder {
    pub fn new() -> Self {
        Self {
            context: ModelContext::new(),
        }
    }

    pub fn this(mut self, relation: impl ToString) -> Self {
        self.context.this = relation.to_string();
        self
    }

    pub fn sql(mut self, sql: impl Into<String>) -> Self {
        self.context.sql = sql.into();
        self
    }

    pub fn partition_by(mut self, expr: impl Into<String>) -> Self {
        self.context.model_config.partition_by = Some(expr.into());
        self
    }

    pub fn cluster_by(mut self, cluster: impl Into<relforge_core::ClusterBy>) -> Self {
        self.context.model_config.cluster_by = Some(cluster.into());
        self
    }

    pub fn target(mut self, target: TargetConfig) -> Self {
        self.context.target = target;
        self
    }

    pub fn build(self) -> ModelContext {
        self.context
    }
}

impl Default for ModelContextBuilder {
    fn default() -> Self {
        Self::new()
    }
}
