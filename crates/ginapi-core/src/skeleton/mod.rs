//! Discovery of the upstream generated Go sources.
//!
//! The skeleton keeps one `api_<group>.go` file per tag, whose top-level
//! functions name the operations to implement, and one `model_<schema>.go`
//! file per schema. Function bodies and signatures are never looked at.
//!
//! # Examples
//!
//! ```no_run
//! use ginapi_core::skeleton::Skeleton;
//!
//! # #[tokio::main]
//! # async fn main() -> ginapi_core::Result<()> {
//! let skeleton = Skeleton::scan("petstore/go").await?;
//! for service in &skeleton.services {
//!     println!("{}: {:?}", service.name, service.functions);
//! }
//! # Ok(())
//! # }
//! ```

pub mod lexer;

// Internal imports (std, crate)
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::{ast::ModelFile, utils::service_name_from_path, Error};

pub use lexer::{parse_source, GoSource};

// External imports (alphabetized)
use tokio::fs;

/// Prefix of the files declaring operations.
pub const SERVICE_PREFIX: &str = "api_";
/// Prefix of the files declaring models.
pub const MODEL_PREFIX: &str = "model_";

/// A service file of the skeleton.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedService {
    /// Canonical service name, e.g. `PetsService`
    pub name: String,
    pub path: PathBuf,
    /// Top-level function names in declaration order
    pub functions: Vec<String>,
}

/// Result of scanning the skeleton code directory.
#[derive(Debug, Clone, Default)]
pub struct Skeleton {
    /// Service files, ordered by file name
    pub services: Vec<ScannedService>,
    /// Model files, ordered by file name
    pub models: Vec<ModelFile>,
    /// Flat index from function name to its position in `services`
    index: HashMap<String, usize>,
}

impl Skeleton {
    /// Scan every `*.go` file directly under `dir`.
    pub async fn scan<P: AsRef<Path>>(dir: P) -> crate::Result<Self> {
        let dir = dir.as_ref();
        if fs::metadata(dir).await.is_err() {
            return Err(Error::InputMissing(dir.to_path_buf()));
        }

        let mut paths = Vec::new();
        let mut entries = fs::read_dir(dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let is_go = path.extension().and_then(|e| e.to_str()) == Some("go");
            let is_test = path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.ends_with("_test.go"));
            if is_go && !is_test && entry.file_type().await?.is_file() {
                paths.push(path);
            }
        }
        paths.sort();

        let mut skeleton = Self::default();
        for path in paths {
            let src = fs::read_to_string(&path).await?;
            skeleton.add_source(&path, &src)?;
        }

        log::debug!(
            "Scanned {} service(s), {} model(s) in {}",
            skeleton.services.len(),
            skeleton.models.len(),
            dir.display()
        );
        Ok(skeleton)
    }

    /// Classify one source file and record what it declares.
    pub fn add_source(&mut self, path: &Path, src: &str) -> crate::Result<()> {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let is_service = file_name.starts_with(SERVICE_PREFIX);
        let is_model = file_name.starts_with(MODEL_PREFIX);
        if !is_service && !is_model {
            log::debug!("Ignoring {}", path.display());
            return Ok(());
        }

        let source = parse_source(src).map_err(|msg| Error::scan(path, msg))?;

        if is_model {
            self.models.push(ModelFile {
                path: path.to_path_buf(),
                package: source.package,
            });
            return Ok(());
        }

        let name = service_name_from_path(path);
        if let Some(other) = self.services.iter().find(|svc| svc.name == name) {
            return Err(Error::scan(
                path,
                format!(
                    "service {} is already declared by {}",
                    name,
                    other.path.display()
                ),
            ));
        }

        let position = self.services.len();
        for function in &source.functions {
            if let Some(&first) = self.index.get(function) {
                return Err(Error::DuplicateOperation {
                    name: function.clone(),
                    detail: format!(
                        "declared in both {} and {}",
                        self.services[first].path.display(),
                        path.display()
                    ),
                });
            }
            self.index.insert(function.clone(), position);
        }

        log::debug!(
            "Service {} declares {} function(s)",
            name,
            source.functions.len()
        );
        self.services.push(ScannedService {
            name,
            path: path.to_path_buf(),
            functions: source.functions,
        });
        Ok(())
    }

    /// Position in `services` of the file declaring `function`.
    pub fn service_index(&self, function: &str) -> Option<usize> {
        self.index.get(function).copied()
    }

    /// The service file declaring `function`.
    pub fn service_of(&self, function: &str) -> Option<&ScannedService> {
        self.service_index(function).map(|i| &self.services[i])
    }

    /// Position in `services` of the service named `name`.
    pub fn service_named(&self, name: &str) -> Option<usize> {
        self.services.iter().position(|svc| svc.name == name)
    }
}
