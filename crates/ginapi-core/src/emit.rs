//! Rendering of the reconciled model into the output package.

// Internal imports (std, crate)
use std::path::{Path, PathBuf};

use crate::{
    ast::Api,
    builders::{go::GoContextBuilder, ContextBuilder},
    config::Config,
    format::Formatter,
    models::copy_model,
    templates::{
        TemplateManager, COMMON_TEMPLATE, MODELS_TEMPLATE, ROUTERS_TEMPLATE, SERVICE_TEMPLATE,
        VALIDATION_TEMPLATE,
    },
};

// External imports (alphabetized)
use serde_json::Value as JsonValue;
use tokio::fs;

pub const MODELS_FILE: &str = "models.go";
pub const ROUTERS_FILE: &str = "routers.go";
pub const COMMON_FILE: &str = "common.go";
pub const VALIDATION_FILE: &str = "validation.go";

/// Writes the generated package for an [`Api`].
#[derive(Debug)]
pub struct Emitter<B> {
    templates: TemplateManager,
    builder: B,
    formatter: Formatter,
    out_dir: PathBuf,
    package: String,
}

impl Emitter<GoContextBuilder> {
    pub fn from_config(config: &Config) -> crate::Result<Self> {
        Ok(Self::new(
            TemplateManager::new(config.template_dir.as_deref())?,
            GoContextBuilder::from_config(config),
            Formatter::from_config(config),
            config.output_path(),
            config.package_name.clone(),
        ))
    }
}

impl<B: ContextBuilder> Emitter<B> {
    pub fn new(
        templates: TemplateManager,
        builder: B,
        formatter: Formatter,
        out_dir: PathBuf,
        package: impl Into<String>,
    ) -> Self {
        Self {
            templates,
            builder,
            formatter,
            out_dir,
            package: package.into(),
        }
    }

    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    /// Render, format and write every file of the package.
    ///
    /// All generated sources are final before the first one is written.
    /// Returns the written paths, model copies last.
    pub async fn emit(&self, api: &Api) -> crate::Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        for service in &api.services {
            let context = self.builder.service(service)?;
            files.push(
                self.render(SERVICE_TEMPLATE, &context, &service.file_name)
                    .await?,
            );
        }
        files.push(
            self.render(MODELS_TEMPLATE, &self.builder.models(api)?, MODELS_FILE)
                .await?,
        );
        files.push(
            self.render(ROUTERS_TEMPLATE, &self.builder.routers(api)?, ROUTERS_FILE)
                .await?,
        );
        if let Some(context) = self.builder.common()? {
            files.push(self.render(COMMON_TEMPLATE, &context, COMMON_FILE).await?);
            files.push(
                self.render(VALIDATION_TEMPLATE, &context, VALIDATION_FILE)
                    .await?,
            );
        }

        fs::create_dir_all(&self.out_dir).await?;

        let mut written = Vec::with_capacity(files.len() + api.model_files.len());
        for (path, content) in files {
            fs::write(&path, content).await?;
            log::info!("Generated {}", path.display());
            written.push(path);
        }
        for model in &api.model_files {
            written.push(copy_model(model, &self.out_dir, &self.package).await?);
        }
        Ok(written)
    }

    async fn render(
        &self,
        template: &str,
        context: &JsonValue,
        file_name: &str,
    ) -> crate::Result<(PathBuf, String)> {
        let path = self.out_dir.join(file_name);
        let rendered = self.templates.render(template, context, &path)?;
        let formatted = self.formatter.format(rendered, &path).await?;
        Ok((path, formatted))
    }
}
