//! File-backed prompt templates rendered with Tera.

use crate::error::PromptError;
use std::path::{Path, PathBuf};
use tera::{Context, Tera};

pub const PLANNER_TEMPLATE: &str = "planner.md";
pub const EXECUTOR_TEMPLATE: &str = "executor.md";

/// Resolves template files inside one directory and renders them on demand.
///
/// Templates are re-read per render, so a missing file surfaces at use time
/// as the recoverable condition each consumer defines for itself.
pub struct PromptStore {
    dir: PathBuf,
}

impl PromptStore {
    pub fn open(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn template_path(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    fn load(&self, name: &str) -> Result<String, PromptError> {
        let path = self.template_path(name);
        read_template(&path)
    }

    /// Render the named template against the given context. Undeclared
    /// variables in the template are render errors.
    pub fn render(&self, name: &str, context: &Context) -> Result<String, PromptError> {
        let template = self.load(name)?;
        Tera::one_off(&template, context, false)
            .map_err(|error| PromptError::Render(error.to_string()))
    }
}

fn read_template(path: &Path) -> Result<String, PromptError> {
    std::fs::read_to_string(path).map_err(|_| PromptError::NotFound(path.display().to_string()))
}
