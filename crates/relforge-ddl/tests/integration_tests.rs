//! Integration tests for DDL generation

use pretty_assertions::assert_eq;
use relforge_core::{ClusterBy, Config, Relation, TableConfig};
use relforge_ddl::{cluster_by, create_table_as, create_view_as, partition_by};

#[test]
fn clauses_appear_in_fixed_order() {
    let config = TableConfig::new().partition_by("dt").cluster_by(vec!["a", "b"]);
    let ddl = create_table_as(false, "db.t", "select 1", &config);

    let header = ddl.find("create or replace table db.t").unwrap();
    let partition = ddl.find("partition by dt").unwrap();
    let cluster = ddl.find("cluster by (a,b)").unwrap();
    let body = ddl.find("as (select 1);").unwrap();

    assert!(header < partition);
    assert!(partition < cluster);
    assert!(cluster < body);
}

#[test]
fn statement_lines_match_clause_builders() {
    let config = TableConfig::new().partition_by("dt").cluster_by("region");
    let ddl = create_table_as(false, "db.t", "select 1", &config);
    let lines: Vec<&str> = ddl.lines().collect();

    assert_eq!(lines[1], partition_by(config.partition_by.as_deref()));
    assert_eq!(lines[2], cluster_by(config.cluster_by.as_ref()));
}

#[test]
fn helpers_are_idempotent() {
    let config = TableConfig::new()
        .partition_by("date(ts)")
        .cluster_by(ClusterBy::from(vec!["user_id", "event"]));

    let first = create_table_as(false, "p.d.events", "select * from raw", &config);
    let second = create_table_as(false, "p.d.events", "select * from raw", &config);
    assert_eq!(first, second);

    assert_eq!(create_view_as("db.v", "select 1"), create_view_as("db.v", "select 1"));
    assert_eq!(partition_by(Some("dt")), partition_by(Some("dt")));
}

#[test]
fn project_config_drives_table_ddl() {
    let config = Config::from_toml(
        r#"
[target]
schema = "marts"

[models.orders]
materialized = "table"
partition_by = "order_date"
cluster_by = ["customer_id"]
"#,
    )
    .unwrap();

    let relation = config.relation_for("orders");
    let model = config.model("orders");
    let ddl = create_table_as(false, &relation, "select * from stg_orders", &model.table);

    assert_eq!(
        ddl,
        "create or replace table marts.orders\n\
         partition by order_date\n\
         cluster by (customer_id)\n\
         as (select * from stg_orders);"
    );
}

#[test]
fn view_for_parsed_relation() {
    let relation: Relation = "prod.analytics.v_users".parse().unwrap();
    assert_eq!(
        create_view_as(&relation, "select id from users"),
        "create or replace view prod.analytics.v_users as (select id from users);"
    );
}
