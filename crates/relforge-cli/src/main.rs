use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use relforge_adapter::Adapter;
use relforge_core::{ClusterBy, Config, Relation, TableConfig};
use relforge_jinja::{DdlRenderer, ModelContext};

/// relforge - CREATE OR REPLACE TABLE/VIEW generation for partitioned and clustered tables
#[derive(Parser)]
#[command(name = "relforge")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to config file (default: relforge.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print a create or replace table statement
    Table {
        /// Relation to create (schema.table or database.schema.table)
        #[arg(short, long)]
        relation: String,

        /// File containing the select body ("-" for stdin)
        #[arg(short, long)]
        sql: PathBuf,

        /// Partitioning expression
        #[arg(long)]
        partition_by: Option<String>,

        /// Clustering expression (repeat for several, order is kept)
        #[arg(long)]
        cluster_by: Vec<String>,

        /// Build as a temporary table
        #[arg(long)]
        temporary: bool,
    },

    /// Print a create or replace view statement
    View {
        /// Relation to create (schema.view or database.schema.view)
        #[arg(short, long)]
        relation: String,

        /// File containing the select body ("-" for stdin)
        #[arg(short, long)]
        sql: PathBuf,
    },

    /// Print the statement for a model configured in relforge.toml
    Model {
        /// Model name
        name: String,

        /// File containing the model's select body ("-" for stdin)
        #[arg(short, long)]
        sql: PathBuf,

        /// Print the statement as JSON
        #[arg(long)]
        json: bool,
    },

    /// Render a Jinja template that calls the DDL functions
    Render {
        /// Template file
        template: PathBuf,

        /// Model whose config populates this/model_config/target
        #[arg(short, long)]
        model: Option<String>,

        /// File bound to the `sql` template variable ("-" for stdin)
        #[arg(short, long)]
        sql: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    let config = load_config(cli.config.as_deref(), cli.verbose)?;

    let output = match cli.command {
        Commands::Table { relation, sql, partition_by, cluster_by, temporary } => {
            table_command(&relation, &sql, partition_by, cluster_by, temporary)?
        }
        Commands::View { relation, sql } => view_command(&relation, &sql)?,
        Commands::Model { name, sql, json } => model_command(config, &name, &sql, json, cli.verbose)?,
        Commands::Render { template, model, sql } => {
            render_command(&config, &template, model.as_deref(), sql.as_deref())?
        }
    };

    println!("{}", output);
    Ok(())
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn load_config(path: Option<&Path>, verbose: bool) -> Result<Config> {
    tracing::debug!(?path, "loading config");

    let config = if let Some(config_path) = path {
        Config::from_file(config_path)
            .with_context(|| format!("Failed to load config {}", config_path.display()))?
    } else if Path::new("relforge.toml").exists() {
        Config::from_file(Path::new("relforge.toml"))?
    } else {
        if verbose {
            eprintln!("{}", "No config file found, using defaults".yellow());
        }
        Config::default()
    };

    if verbose {
        eprintln!("{} target schema: {}", "Using".cyan(), config.target.schema);
    }

    Ok(config)
}

/// Read SQL from a file, or stdin for "-"
///
/// The body is returned verbatim: a trailing `-- comment` must keep its
/// newline or it would swallow the closing `);`.
fn read_sql(path: &Path) -> Result<String> {
    let sql = if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read SQL file {}", path.display()))?
    };

    Ok(sql)
}

fn parse_relation(relation: &str) -> Result<Relation> {
    relation
        .parse()
        .with_context(|| format!("Invalid relation '{}'", relation))
}

fn cluster_from_args(mut exprs: Vec<String>) -> Option<ClusterBy> {
    match exprs.len() {
        0 => None,
        1 => exprs.pop().map(ClusterBy::Single),
        _ => Some(ClusterBy::Many(exprs)),
    }
}

fn table_command(
    relation: &str,
    sql_path: &Path,
    partition_by: Option<String>,
    cluster_by: Vec<String>,
    temporary: bool,
) -> Result<String> {
    let relation = parse_relation(relation)?;
    let sql = read_sql(sql_path)?;
    let table = TableConfig {
        partition_by,
        cluster_by: cluster_from_args(cluster_by),
    };

    Ok(relforge_ddl::create_table_as(temporary, &relation, &sql, &table))
}

fn view_command(relation: &str, sql_path: &Path) -> Result<String> {
    let relation = parse_relation(relation)?;
    let sql = read_sql(sql_path)?;

    Ok(relforge_ddl::create_view_as(&relation, &sql))
}

fn model_command(config: Config, name: &str, sql_path: &Path, json: bool, verbose: bool) -> Result<String> {
    let sql = read_sql(sql_path)?;
    let adapter = Adapter::new(config);
    let statement = adapter.materialize(name, &sql);

    if verbose {
        eprintln!(
            "{} {} as {}",
            "Materializing".cyan(),
            statement.relation.to_string().bold(),
            statement.kind
        );
    }

    if json {
        Ok(serde_json::to_string_pretty(&statement)?)
    } else {
        Ok(statement.sql)
    }
}

fn render_command(config: &Config, template: &Path, model: Option<&str>, sql_path: Option<&Path>) -> Result<String> {
    let sql = match sql_path {
        Some(path) => read_sql(path)?,
        None => String::new(),
    };

    let context = match model {
        Some(name) => ModelContext::for_model(config, name, sql),
        None => ModelContext {
            sql,
            target: config.target.clone(),
            ..ModelContext::default()
        },
    };

    DdlRenderer::new(context)
        .render_file(template)
        .with_context(|| format!("Failed to render {}", template.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cluster_args_normalize() {
        assert_eq!(cluster_from_args(Vec::new()), None);
        assert_eq!(
            cluster_from_args(vec!["a".to_string()]),
            Some(ClusterBy::Single("a".to_string()))
        );
        assert_eq!(
            cluster_from_args(vec!["a".to_string(), "b".to_string()]),
            Some(ClusterBy::Many(vec!["a".to_string(), "b".to_string()]))
        );
    }

    #[test]
    fn cli_parses_table_command() {
        let cli = Cli::try_parse_from([
            "relforge", "table", "--relation", "db.t", "--sql", "model.sql",
            "--partition-by", "dt", "--cluster-by", "a", "--cluster-by", "b",
        ])
        .unwrap();

        match cli.command {
            Commands::Table { relation, partition_by, cluster_by, temporary, .. } => {
                assert_eq!(relation, "db.t");
                assert_eq!(partition_by.as_deref(), Some("dt"));
                assert_eq!(cluster_by, vec!["a", "b"]);
                assert!(!temporary);
            }
            _ => panic!("expected table command"),
        }
    }

    #[test]
    fn invalid_relation_is_error() {
        assert!(parse_relation("orders").is_err());
        assert!(parse_relation("db.orders").is_ok());
    }

    const PROJECT: &str = r#"
[target]
schema = "marts"

[models.orders]
materialized = "table"
partition_by = "dt"
cluster_by = ["a", "b"]
"#;

    fn write_file(dir: &tempfile::TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn read_sql_keeps_trailing_newline() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "model.sql", "select 1 -- keep rows\n");

        assert_eq!(read_sql(&path).unwrap(), "select 1 -- keep rows\n");
    }

    #[test]
    fn trailing_line_comment_does_not_swallow_closing_paren() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "model.sql", "select 1 -- keep rows\n");

        let ddl = view_command("db.v", &path).unwrap();
        assert_eq!(ddl, "create or replace view db.v as (select 1 -- keep rows\n);");
        assert!(ddl.lines().last().unwrap().starts_with(");"));
    }

    #[test]
    fn read_sql_missing_file_is_error() {
        let err = read_sql(Path::new("/nonexistent/model.sql")).unwrap_err();
        assert!(err.to_string().contains("Failed to read SQL file"));
    }

    #[test]
    fn table_command_builds_statement() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "model.sql", "select 1");

        let ddl = table_command(
            "db.t",
            &path,
            Some("dt".to_string()),
            vec!["a".to_string(), "b".to_string()],
            true,
        )
        .unwrap();

        assert_eq!(
            ddl,
            "create or replace table db.t\npartition by dt\ncluster by (a,b)\nas (select 1);"
        );
    }

    #[test]
    fn view_command_rejects_bad_relation() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "model.sql", "select 1");

        assert!(view_command("orders", &path).is_err());
    }

    #[test]
    fn model_command_uses_project_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "orders.sql", "select 1");
        let config = Config::from_toml(PROJECT).unwrap();

        let ddl = model_command(config.clone(), "orders", &path, false, false).unwrap();
        assert_eq!(
            ddl,
            "create or replace table marts.orders\npartition by dt\ncluster by (a,b)\nas (select 1);"
        );

        let ddl = model_command(config, "customers", &path, false, false).unwrap();
        assert_eq!(ddl, "create or replace view marts.customers as (select 1);");
    }

    #[test]
    fn model_command_json_output() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "orders.sql", "select 1");
        let config = Config::from_toml(PROJECT).unwrap();

        let json = model_command(config, "orders", &path, true, false).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["kind"], "table");
        assert_eq!(value["relation"]["schema"], "marts");
        assert_eq!(value["relation"]["identifier"], "orders");
        assert!(value["sql"].as_str().unwrap().starts_with("create or replace table marts.orders"));
    }

    #[test]
    fn render_command_with_model_context() {
        let dir = tempfile::tempdir().unwrap();
        let template = write_file(&dir, "orders.sql.j2", "{{ create_table_as(false, this, sql) }}");
        let sql = write_file(&dir, "orders.sql", "select 1");
        let config = Config::from_toml(PROJECT).unwrap();

        let rendered = render_command(&config, &template, Some("orders"), Some(&sql)).unwrap();
        assert_eq!(
            rendered,
            "create or replace table marts.orders\npartition by dt\ncluster by (a,b)\nas (select 1);"
        );
    }

    #[test]
    fn render_command_without_model() {
        let dir = tempfile::tempdir().unwrap();
        let template = write_file(&dir, "view.sql.j2", "{{ create_view_as('db.v', 'select 2') }}");

        let rendered = render_command(&Config::default(), &template, None, None).unwrap();
        assert_eq!(rendered, "create or replace view db.v as (select 2);");
    }

    #[test]
    fn render_command_missing_template_is_error() {
        let err = render_command(&Config::default(), Path::new("/nonexistent/t.j2"), None, None).unwrap_err();
        assert!(err.to_string().contains("Failed to render"));
    }

    #[test]
    fn load_config_from_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "relforge.toml", PROJECT);

        let config = load_config(Some(&path), false).unwrap();
        assert_eq!(config.target.schema, "marts");
        assert!(config.models.contains_key("orders"));
    }

    #[test]
    fn load_config_missing_explicit_path_is_error() {
        let err = load_config(Some(Path::new("/nonexistent/relforge.toml")), false).unwrap_err();
        assert!(err.to_string().contains("Failed to load config"));
    }
}
