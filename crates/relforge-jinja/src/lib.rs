//! Jinja integration for relforge DDL helpers
//!
//! This crate handles:
//! - Registering the DDL helpers as MiniJinja functions
//! - Providing the per-model render context (this, sql, model_config, target)
//! - Rendering templates that call the helpers

pub mod context;
pub mod functions;
pub mod renderer;

pub use context::{ModelContext, ModelContextBuilder};
pub use functions::{
    cluster_by_function, create_table_as_function, create_view_as_function, partition_by_function,
    register_functions,
};
pub use renderer::{DdlRenderer, RenderError};
