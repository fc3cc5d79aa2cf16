//! Template rendering with the DDL functions registered

use minijinja::{Environment, Error as JinjaError};
use std::path::{Path, PathBuf};
use crate::context::ModelContext;

/// Error during template rendering
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("Jinja render error: {message}")]
    Template {
        message: String,
        file_path: Option<PathBuf>,
        line: Option<usize>,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Renders templates that call partition_by/cluster_by/create_table_as/create_view_as
pub struct DdlRenderer {
    env: Environment<'static>,
    context: ModelContext,
}

impl DdlRenderer {
    /// Create a renderer for the given model context
    pub fn new(context: ModelContext) -> Self {
        let mut env = Environment::new();
        crate::functions::register_functions(&mut env);

        Self { env, context }
    }

    /// Context the renderer was built with
    pub fn context(&self) -> &ModelContext {
        &self.context
    }

    /// Render a template string
    pub fn render(&self, template: &str) -> Result<String, RenderError> {
        self.render_with_path(template, None)
    }

    /// Render a template file
    pub fn render_file(&self, path: &Path) -> Result<String, RenderError> {
        let template = std::fs::read_to_string(path)?;
        self.render_with_path(&template, Some(path))
    }

    fn render_with_path(&self, template: &str, file_path: Option<&Path>) -> Result<String, RenderError> {
        let rendered = self
            .env
            .render_str(template, self.context.to_minijinja_value())
            .map_err(|e| Self::template_error(e, file_path))?;

        tracing::debug!(relation = %self.context.this, bytes = rendered.len(), "rendered template");

        Ok(rendered)
    }

    fn template_error(error: JinjaError, file_path: Option<&Path>) -> RenderError {
        RenderError::Template {
            message: error.to_string(),
            file_path: file_path.map(|p| p.to_path_buf()),
            line: error.line(),
        }
    }
}

impl Default for DdlRenderer {
    fn default() -> Self {
        Self::new(ModelContext::default())
    }
}
