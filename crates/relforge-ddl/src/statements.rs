//! CREATE OR REPLACE statements

use relforge_core::TableConfig;
use std::fmt::Display;
use crate::clauses::{cluster_by, partition_by};

/// Build a `create or replace table` statement
///
/// Layout, one part per line:
///
/// ```text
/// create or replace table <relation>
/// partition by <expr>        (only when configured)
/// cluster by (<e1>,<e2>)     (only when configured)
/// as (<sql>);
/// ```
///
/// `temporary` is accepted for call-site compatibility with view creation and
/// table materializations; it does not change the statement.
pub fn create_table_as<R>(temporary: bool, relation: &R, sql: &str, config: &TableConfig) -> String
where
    R: Display + ?Sized,
{
    let mut lines = vec![format!("create or replace table {}", relation)];

    // Empty clauses get no line of their own
    let partition = partition_by(config.partition_by.as_deref());
    if !partition.is_empty() {
        lines.push(partition);
    }

    let cluster = cluster_by(config.cluster_by.as_ref());
    if !cluster.is_empty() {
        lines.push(cluster);
    }

    lines.push(format!("as ({});", sql));

    tracing::debug!(
        relation = %relation,
        temporary,
        partitioned = config.partition_by.is_some(),
        clustered = config.cluster_by.is_some(),
        "rendered create table statement"
    );

    lines.join("\n")
}

/// Build a `create or replace view` statement
pub fn create_view_as<R>(relation: &R, sql: &str) -> String
where
    R: Display + ?Sized,
{
    tracing::debug!(relation = %relation, "rendered create view statement");

    format!("create or replace view {} as ({});", relation, sql)
}
