//! Loading and rendering of the Go templates

// Internal imports (std, crate)
use std::path::Path;
use std::sync::Arc;

use super::TemplateDir;
use crate::error::{Error, Result};

// External imports (alphabetized)
use serde::Serialize;
use tera::{Context, Tera};

pub const SERVICE_TEMPLATE: &str = "service.go.tera";
pub const MODELS_TEMPLATE: &str = "models.go.tera";
pub const ROUTERS_TEMPLATE: &str = "routers.go.tera";
pub const COMMON_TEMPLATE: &str = "common.go.tera";
pub const VALIDATION_TEMPLATE: &str = "validation.go.tera";

const BUILTIN_TEMPLATES: [(&str, &str); 5] = [
    (
        SERVICE_TEMPLATE,
        include_str!("../../templates/gin/service.go.tera"),
    ),
    (
        MODELS_TEMPLATE,
        include_str!("../../templates/gin/models.go.tera"),
    ),
    (
        ROUTERS_TEMPLATE,
        include_str!("../../templates/gin/routers.go.tera"),
    ),
    (
        COMMON_TEMPLATE,
        include_str!("../../templates/gin/common.go.tera"),
    ),
    (
        VALIDATION_TEMPLATE,
        include_str!("../../templates/gin/validation.go.tera"),
    ),
];

/// Manages loading and rendering of code generation templates
#[derive(Debug, Clone)]
pub struct TemplateManager {
    /// Cached Tera template engine instance
    tera: Arc<Tera>,
    /// Directory the overrides were loaded from
    template_dir: Option<TemplateDir>,
}

impl TemplateManager {
    /// Create a manager over the built-in templates only
    pub fn builtin() -> Result<Self> {
        Ok(Self {
            tera: Arc::new(Self::builtin_tera()?),
            template_dir: None,
        })
    }

    /// Create a manager whose templates may be overridden from `template_dir`,
    /// or from a discovered directory when `None`.
    pub fn new(template_dir: Option<&Path>) -> Result<Self> {
        match TemplateDir::discover(template_dir)? {
            Some(dir) => Self::with_dir(dir),
            None => Self::builtin(),
        }
    }

    /// Load every `*.tera` file under `dir`, falling back to the built-in
    /// template for names the directory does not provide.
    pub fn with_dir(dir: TemplateDir) -> Result<Self> {
        let root = dir
            .path()
            .to_str()
            .ok_or_else(|| Error::config("Template path contains invalid UTF-8"))?;
        let glob = format!("{}/**/*.tera", root.trim_end_matches('/'));

        let mut tera = Tera::new(&glob).map_err(|source| Error::Template {
            path: dir.path().to_path_buf(),
            source,
        })?;
        tera.autoescape_on(vec![]);
        tera.extend(&Self::builtin_tera()?)
            .map_err(|source| Error::Template {
                path: dir.path().to_path_buf(),
                source,
            })?;

        log::info!("Using templates from {}", dir.display());
        log::debug!(
            "Available templates: {:?}",
            tera.get_template_names().collect::<Vec<_>>()
        );
        Ok(Self {
            tera: Arc::new(tera),
            template_dir: Some(dir),
        })
    }

    fn builtin_tera() -> Result<Tera> {
        let mut tera = Tera::default();
        tera.autoescape_on(vec![]);
        tera.add_raw_templates(BUILTIN_TEMPLATES.to_vec())
            .map_err(|source| Error::Template {
                path: SERVICE_TEMPLATE.into(),
                source,
            })?;
        Ok(tera)
    }

    /// Get the override directory, if any
    pub fn template_dir(&self) -> Option<&TemplateDir> {
        self.template_dir.as_ref()
    }

    /// Check if a template exists
    pub fn has_template(&self, name: &str) -> bool {
        self.tera.get_template(name).is_ok()
    }

    /// Render `template_name` with `context` for the file at `output_path`.
    ///
    /// Nothing is written; the caller formats the returned source first.
    pub fn render<T: Serialize>(
        &self,
        template_name: &str,
        context: &T,
        output_path: &Path,
    ) -> Result<String> {
        let template_error = |source| Error::Template {
            path: output_path.to_path_buf(),
            source,
        };

        log::debug!(
            "Rendering template {} for {}",
            template_name,
            output_path.display()
        );
        let context = Context::from_serialize(context).map_err(template_error)?;
        let content = self
            .tera
            .render(template_name, &context)
            .map_err(template_error)?;

        log::debug!(
            "Rendered {} ({} bytes)",
            output_path.display(),
            content.len()
        );
        Ok(content)
    }
}
