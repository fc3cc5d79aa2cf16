//! DDL Jinja functions
//!
//! Exposes the DDL helpers to templates as `partition_by()`, `cluster_by()`,
//! `create_table_as()` and `create_view_as()`.

use minijinja::value::ValueKind;
use minijinja::{Environment, Error, ErrorKind, State, Value};
use relforge_core::{ClusterBy, TableConfig};

/// Name of the context variable holding the model's table configuration
pub const MODEL_CONFIG_VAR: &str = "model_config";

/// Register every DDL function on an environment
pub fn register_functions(env: &mut Environment<'_>) {
    env.add_function("partition_by", partition_by_function);
    env.add_function("cluster_by", cluster_by_function);
    env.add_function("create_table_as", create_table_as_function);
    env.add_function("create_view_as", create_view_as_function);
}

fn is_absent(value: &Value) -> bool {
    value.is_undefined() || value.is_none()
}

fn required_str<'a>(value: &'a Value, message: &str) -> Result<&'a str, Error> {
    value
        .as_str()
        .ok_or_else(|| Error::new(ErrorKind::InvalidOperation, message.to_string()))
}

/// Read a partition expression from a template value
pub fn partition_from_value(value: &Value) -> Result<Option<String>, Error> {
    if is_absent(value) {
        return Ok(None);
    }

    let expr = required_str(value, "partition_by expression must be a string")?;
    Ok(Some(expr.to_string()))
}

/// Read a cluster specification (string or list of strings) from a template value
pub fn cluster_from_value(value: &Value) -> Result<Option<ClusterBy>, Error> {
    if is_absent(value) {
        return Ok(None);
    }

    if let Some(expr) = value.as_str() {
        return Ok(Some(ClusterBy::Single(expr.to_string())));
    }

    if value.kind() != ValueKind::Seq {
        return Err(Error::new(
            ErrorKind::InvalidOperation,
            "cluster_by must be a string or a list of strings",
        ));
    }

    let mut exprs = Vec::new();
    for item in value.try_iter()? {
        let expr = required_str(&item, "cluster_by list items must be strings")?;
        exprs.push(expr.to_string());
    }

    Ok(Some(ClusterBy::Many(exprs)))
}

/// Read the table configuration of the model being rendered
fn table_config_from_state(state: &State) -> Result<TableConfig, Error> {
    let Some(config) = state.lookup(MODEL_CONFIG_VAR).filter(|v| !is_absent(v)) else {
        return Ok(TableConfig::default());
    };

    Ok(TableConfig {
        partition_by: partition_from_value(&config.get_attr("partition_by")?)?,
        cluster_by: cluster_from_value(&config.get_attr("cluster_by")?)?,
    })
}

/// partition_by() function
///
/// Usage in Jinja: {{ partition_by('dt') }}
/// Returns: `partition by dt`, or an empty string for none/undefined
pub fn partition_by_function(expr: Option<Value>) -> Result<Value, Error> {
    let expr = match expr {
        Some(value) => partition_from_value(&value)?,
        None => None,
    };

    Ok(Value::from(relforge_ddl::partition_by(expr.as_deref())))
}

/// cluster_by() function
///
/// Usage in Jinja: {{ cluster_by('a') }} or {{ cluster_by(['a', 'b']) }}
/// Returns: `cluster by (a,b)`, or an empty string for none/undefined
pub fn cluster_by_function(expr: Option<Value>) -> Result<Value, Error> {
    let cluster = match expr {
        Some(value) => cluster_from_value(&value)?,
        None => None,
    };

    Ok(Value::from(relforge_ddl::cluster_by(cluster.as_ref())))
}

/// create_table_as() function
///
/// Usage in Jinja: {{ create_table_as(false, this, sql) }}
/// Partitioning and clustering come from `model_config` in the render context.
pub fn create_table_as_function(
    state: &State,
    temporary: bool,
    relation: Value,
    sql: Value,
) -> Result<Value, Error> {
    let relation = required_str(&relation, "create_table_as() relation must be a string")?;
    let sql = required_str(&sql, "create_table_as() sql must be a string")?;
    let config = table_config_from_state(state)?;

    Ok(Value::from(relforge_ddl::create_table_as(temporary, relation, sql, &config)))
}

/// create_view_as() function
///
/// Usage in Jinja: {{ create_view_as(this, sql) }}
pub fn create_view_as_function(relation: Value, sql: Value) -> Result<Value, Error> {
    let relation = required_str(&relation, "create_view_as() relation must be a string")?;
    let sql = required_str(&sql, "create_view_as() sql must be a string")?;

    Ok(Value::from(relforge_ddl::create_view_as(relation, sql)))
}
