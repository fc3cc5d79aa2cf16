//! In-memory cache of relations known to exist in the warehouse
//!
//! Relations are keyed by `(schema, identifier)` compared case-insensitively.
//! Each cached relation records which other relations reference it (for
//! example a view selecting from a table), so dropping a relation also drops
//! everything built on top of it.

use relforge_core::{Relation, RelationKind};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Case-insensitive cache key
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ReferenceKey {
    pub schema: String,
    pub identifier: String,
}

impl ReferenceKey {
    pub fn new(schema: &str, identifier: &str) -> Self {
        Self {
            schema: schema.to_lowercase(),
            identifier: identifier.to_lowercase(),
        }
    }
}

impl fmt::Display for ReferenceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.schema, self.identifier)
    }
}

/// A relation tracked by the cache
#[derive(Debug, Clone, PartialEq)]
pub struct CachedRelation {
    /// Schema as it was added (case preserved)
    pub schema: String,

    /// Identifier as it was added (case preserved)
    pub identifier: String,

    /// Table or view, if known
    pub kind: Option<RelationKind>,

    /// The relation object itself, if known
    pub inner: Option<Relation>,

    /// Relations that must be dropped when this one is dropped
    pub referenced_by: BTreeSet<ReferenceKey>,
}

impl CachedRelation {
    fn new(schema: &str, identifier: &str) -> Self {
        Self {
            schema: schema.to_string(),
            identifier: identifier.to_string(),
            kind: None,
            inner: None,
            referenced_by: BTreeSet::new(),
        }
    }

    pub fn key(&self) -> ReferenceKey {
        ReferenceKey::new(&self.schema, &self.identifier)
    }

    fn rename(&mut self, schema: &str, identifier: &str) {
        self.schema = schema.to_string();
        self.identifier = identifier.to_string();
        if let Some(inner) = &self.inner {
            self.inner = Some(inner.renamed(schema, identifier));
        }
    }
}

/// Errors raised by cache lookups and renames
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CacheError {
    #[error("Relation not found in cache: {0}")]
    RelationNotFound(ReferenceKey),

    #[error("Cannot rename {old} to {new}: {new} is already cached")]
    RenameTargetExists { old: ReferenceKey, new: ReferenceKey },
}

#[derive(Debug, Default)]
struct CacheState {
    relations: HashMap<ReferenceKey, CachedRelation>,
    schemas: BTreeSet<String>,
}

/// Relations cache shared by everything that creates or drops relations
///
/// ## Usage
///
/// ```rust
/// use relforge_adapter::RelationsCache;
/// use relforge_core::RelationKind;
///
/// let cache = RelationsCache::new();
/// cache.add("analytics", "orders", Some(RelationKind::Table), None);
/// cache.add("analytics", "orders_v", Some(RelationKind::View), None);
/// cache.add_link("analytics", "orders", "analytics", "orders_v");
///
/// cache.drop("analytics", "orders");
/// assert!(cache.is_empty());
/// ```
#[derive(Debug, Default)]
pub struct RelationsCache {
    state: RwLock<CacheState>,
}

impl RelationsCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, CacheState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, CacheState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Add a relation, or fill in `kind`/`inner` on one already cached
    pub fn add(
        &self,
        schema: &str,
        identifier: &str,
        kind: Option<RelationKind>,
        inner: Option<Relation>,
    ) {
        let mut state = self.write();
        state.schemas.insert(schema.to_string());

        let key = ReferenceKey::new(schema, identifier);
        tracing::debug!(relation = %key, ?kind, "adding relation to cache");

        let cached = state
            .relations
            .entry(key)
            .or_insert_with(|| CachedRelation::new(schema, identifier));

        if kind.is_some() {
            cached.kind = kind;
        }
        if inner.is_some() {
            cached.inner = inner;
        }
    }

    /// Add a cached relation for a `Relation` value
    pub fn add_relation(&self, relation: Relation, kind: RelationKind) {
        let (schema, identifier) = (relation.schema.clone(), relation.identifier.clone());
        self.add(&schema, &identifier, Some(kind), Some(relation));
    }

    /// Record that `dependent` references `referenced`
    ///
    /// Links from relations that are not cached are ignored.
    pub fn add_link(
        &self,
        referenced_schema: &str,
        referenced_identifier: &str,
        dependent_schema: &str,
        dependent_identifier: &str,
    ) {
        let referenced = ReferenceKey::new(referenced_schema, referenced_identifier);
        let dependent = ReferenceKey::new(dependent_schema, dependent_identifier);

        let mut state = self.write();
        match state.relations.get_mut(&referenced) {
            Some(cached) => {
                tracing::debug!(%referenced, %dependent, "adding link");
                cached.referenced_by.insert(dependent);
            }
            None => {
                tracing::debug!(%referenced, %dependent, "referenced relation not cached, skipping link");
            }
        }
    }

    /// Drop a relation and every relation that (transitively) references it
    ///
    /// Dropping a relation that is not cached is a no-op.
    pub fn drop(&self, schema: &str, identifier: &str) {
        let key = ReferenceKey::new(schema, identifier);
        let mut state = self.write();

        if !state.relations.contains_key(&key) {
            tracing::debug!(relation = %key, "drop of uncached relation, skipping");
            return;
        }

        let mut dropped = BTreeSet::new();
        let mut pending = vec![key];
        // Walk referenced_by edges; a key can be reached through several parents
        while let Some(next) = pending.pop() {
            if !dropped.insert(next.clone()) {
                continue;
            }
            if let Some(cached) = state.relations.remove(&next) {
                pending.extend(cached.referenced_by);
            }
        }

        // Survivors must not keep pointing at dropped relations
        for cached in state.relations.values_mut() {
            cached.referenced_by.retain(|k| !dropped.contains(k));
        }

        tracing::debug!(count = dropped.len(), "dropped relations from cache");
    }

    /// Move a relation to a new schema/identifier
    ///
    /// References to the old key are rewritten to the new one. Renaming onto
    /// a cached key fails even when the old key is not cached; otherwise
    /// renaming a relation that is not cached is a no-op.
    pub fn rename_relation(
        &self,
        old_schema: &str,
        old_identifier: &str,
        new_schema: &str,
        new_identifier: &str,
    ) -> Result<(), CacheError> {
        let old = ReferenceKey::new(old_schema, old_identifier);
        let new = ReferenceKey::new(new_schema, new_identifier);
        let mut state = self.write();

        // Landing on a cached key is an error whether or not the old key is cached
        if old != new && state.relations.contains_key(&new) {
            return Err(CacheError::RenameTargetExists { old, new });
        }
        if !state.relations.contains_key(&old) {
            tracing::debug!(%old, %new, "rename of uncached relation, skipping");
            return Ok(());
        }

        tracing::debug!(%old, %new, "renaming relation");

        if let Some(mut cached) = state.relations.remove(&old) {
            cached.rename(new_schema, new_identifier);
            state.relations.insert(new.clone(), cached);
        }
        state.schemas.insert(new_schema.to_string());

        // Dependents follow the relation to its new key
        for cached in state.relations.values_mut() {
            if cached.referenced_by.remove(&old) {
                cached.referenced_by.insert(new.clone());
            }
        }

        Ok(())
    }

    /// Look up a single cached relation
    pub fn get(&self, schema: &str, identifier: &str) -> Result<CachedRelation, CacheError> {
        let key = ReferenceKey::new(schema, identifier);
        self.read()
            .relations
            .get(&key)
            .cloned()
            .ok_or(CacheError::RelationNotFound(key))
    }

    /// Whether a relation is cached
    pub fn contains(&self, schema: &str, identifier: &str) -> bool {
        self.read()
            .relations
            .contains_key(&ReferenceKey::new(schema, identifier))
    }

    /// All cached relations in a schema (case-insensitive), ordered by identifier
    pub fn get_relations(&self, schema: &str) -> Vec<CachedRelation> {
        let schema = schema.to_lowercase();
        let state = self.read();

        let mut relations: Vec<CachedRelation> = state
            .relations
            .iter()
            .filter(|(key, _)| key.schema == schema)
            .map(|(_, cached)| cached.clone())
            .collect();
        relations.sort_by_key(|cached| cached.key());
        relations
    }

    /// Every schema name passed to `add` or used as a rename target, case preserved
    pub fn schemas(&self) -> BTreeSet<String> {
        self.read().schemas.clone()
    }

    /// Map of each cached relation to the relations referencing it
    pub fn dump_graph(&self) -> BTreeMap<String, Vec<String>> {
        self.read()
            .relations
            .iter()
            .map(|(key, cached)| {
                let referenced_by = cached.referenced_by.iter().map(|k| k.to_string()).collect();
                (key.to_string(), referenced_by)
            })
            .collect()
    }

    pub fn clear(&self) {
        let mut state = self.write();
        state.relations.clear();
        state.schemas.clear();
    }

    /// Number of cached relations
    pub fn len(&self) -> usize {
        self.read().relations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
