//! Warehouse adapter layer
//!
//! Renders create statements through `relforge-ddl` and tracks the relations
//! they create in a [`RelationsCache`], including drop cascades through
//! dependent relations and renames.
//!
//! ## Example
//!
//! ```rust
//! use relforge_adapter::Adapter;
//! use relforge_core::Config;
//!
//! let adapter = Adapter::new(Config::default());
//! let statement = adapter.materialize("users", "select 1");
//! assert_eq!(statement.sql, "create or replace view public.users as (select 1);");
//! assert_eq!(adapter.cache().len(), 1);
//! ```

pub mod adapter;
pub mod cache;

pub use adapter::{Adapter, Statement};
pub use cache::{CacheError, CachedRelation, ReferenceKey, RelationsCache};
