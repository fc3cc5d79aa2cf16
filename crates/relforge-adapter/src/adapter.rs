//! Adapter that renders DDL and keeps the relations cache in sync

use relforge_core::{Config, Materialization, Relation, RelationKind, TableConfig};
use serde::Serialize;
use std::sync::Arc;
use crate::cache::RelationsCache;

/// A rendered statement together with the relation it creates
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Statement {
    pub relation: Relation,
    pub kind: RelationKind,
    pub sql: String,
}

/// Renders create statements for a project and records created relations
pub struct Adapter {
    config: Config,
    cache: Arc<RelationsCache>,
}

impl Adapter {
    /// Create an adapter with its own empty cache
    pub fn new(config: Config) -> Self {
        Self::with_cache(config, Arc::new(RelationsCache::new()))
    }

    /// Create an adapter sharing an existing cache
    pub fn with_cache(config: Config, cache: Arc<RelationsCache>) -> Self {
        Self { config, cache }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn cache(&self) -> &Arc<RelationsCache> {
        &self.cache
    }

    /// Render `create or replace table` and cache the relation as a table
    pub fn create_table_as(
        &self,
        temporary: bool,
        relation: &Relation,
        sql: &str,
        table: &TableConfig,
    ) -> Statement {
        let ddl = relforge_ddl::create_table_as(temporary, relation, sql, table);
        self.cache.add_relation(relation.clone(), RelationKind::Table);

        Statement {
            relation: relation.clone(),
            kind: RelationKind::Table,
            sql: ddl,
        }
    }

    /// Render `create or replace view` and cache the relation as a view
    pub fn create_view_as(&self, relation: &Relation, sql: &str) -> Statement {
        let ddl = relforge_ddl::create_view_as(relation, sql);
        self.cache.add_relation(relation.clone(), RelationKind::View);

        Statement {
            relation: relation.clone(),
            kind: RelationKind::View,
            sql: ddl,
        }
    }

    /// Build a named model using its project configuration
    pub fn materialize(&self, name: &str, sql: &str) -> Statement {
        let relation = self.config.relation_for(name);
        let model = self.config.model(name);

        tracing::info!(model = name, relation = %relation, materialized = ?model.materialized, "materializing model");

        match model.materialized {
            Materialization::Table => self.create_table_as(false, &relation, sql, &model.table),
            Materialization::View => self.create_view_as(&relation, sql),
        }
    }
}
