//! Code generation entry point

use std::io;
use std::path::PathBuf;

use crate::{
    config::Config,
    emit::Emitter,
    error::{Error, Result},
    openapi::OpenApiContext,
    reconcile::Reconciler,
    skeleton::Skeleton,
};

use tokio::fs;

/// Main entry point for code generation
///
/// The whole model is reconciled before anything is written, so a failing
/// run leaves the output directory untouched.
pub async fn generate(config: &Config) -> Result<Vec<PathBuf>> {
    // 1. Validate the input layout
    let input = &config.input_dir;
    match fs::metadata(input).await {
        Ok(meta) if !meta.is_dir() => return Err(Error::InputNotDirectory(input.clone())),
        Ok(_) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(Error::InputMissing(input.clone()))
        }
        Err(e) => return Err(e.into()),
    }

    // 2. Scan the skeleton and load the document
    let skeleton = Skeleton::scan(config.code_dir()).await?;
    let spec = OpenApiContext::from_file(config.spec_path()).await?;
    log::info!(
        "Loaded {} {}",
        spec.title().unwrap_or("OpenAPI document"),
        spec.version().unwrap_or_default()
    );

    // 3. Reconcile
    let api = Reconciler::new(
        &skeleton,
        &spec,
        &config.server_vars,
        &config.ignored_tags,
    )
    .reconcile()?;

    // 4. Emit
    let emitter = Emitter::from_config(config)?;
    let written = emitter.emit(&api).await?;
    log::info!(
        "Wrote {} file(s) to {}",
        written.len(),
        emitter.out_dir().display()
    );
    Ok(written)
}
