//! DDL generation for partitioned and clustered warehouse tables
//!
//! This crate handles:
//! - `partition by` / `cluster by` clause fragments
//! - `create or replace table ... as (...)` statements
//! - `create or replace view ... as (...)` statements
//!
//! Every function is pure: identical inputs give byte-identical output.

pub mod clauses;
pub mod statements;

pub use clauses::{cluster_by, partition_by};
pub use statements::{create_table_as, create_view_as};
