//! Copying of the skeleton model files into the output package.

// Internal imports (std, crate)
use std::path::{Path, PathBuf};

use crate::{ast::ModelFile, skeleton::parse_source, Error};

// External imports (alphabetized)
use tokio::fs;

/// Replace the package clause of `src` with `package`.
pub fn rewrite_package(src: &str, package: &str) -> Result<String, String> {
    let source = parse_source(src)?;
    let span = source.package_span;

    let mut out = String::with_capacity(src.len() + package.len());
    out.push_str(&src[..span.start]);
    out.push_str(package);
    out.push_str(&src[span.end..]);
    Ok(out)
}

/// Copy `model` into `out_dir` under the same file name, moved to `package`.
pub async fn copy_model(model: &ModelFile, out_dir: &Path, package: &str) -> crate::Result<PathBuf> {
    let file_name = model
        .path
        .file_name()
        .ok_or_else(|| Error::scan(&model.path, "not a file"))?;
    let dest = out_dir.join(file_name);

    let src = fs::read_to_string(&model.path).await?;
    let content = rewrite_package(&src, package).map_err(|msg| Error::scan(&model.path, msg))?;
    fs::write(&dest, content).await?;

    log::debug!("Copied {} to {}", model.path.display(), dest.display());
    Ok(dest)
}
