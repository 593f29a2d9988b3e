//! Error handling for the ginapi code generation library.
//!
//! This module defines the main error type `Error` used throughout the library,
//! along with a convenient `Result` type alias. It uses `thiserror` for easy
//! error handling and implements conversions from common error types.
//!
//! Every error is fatal: the generator stops at the point of detection and the
//! CLI reports it with the name of the originating component, see
//! [`Error::component`].
//!
//! # Examples
//!
//! ```
//! use ginapi_core::error::{Error, Result};
//!
//! fn might_fail() -> Result<()> {
//!     Err(Error::bad_spec("no servers"))
//! }
//!
//! assert_eq!(might_fail().unwrap_err().component(), "loader");
//! ```

use std::path::PathBuf;

use thiserror::Error;

use crate::types::TypeError;

/// Result type for ginapi generation operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for ginapi generation operations
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration or usage error
    #[error("Configuration error: {0}")]
    Config(String),

    /// The skeleton directory does not exist
    #[error("input path not exists: {}", .0.display())]
    InputMissing(PathBuf),

    /// The skeleton path is not a directory
    #[error("input path not a directory: {}", .0.display())]
    InputNotDirectory(PathBuf),

    /// Malformed OpenAPI document or missing required fields
    #[error("bad OpenAPI document: {0}")]
    BadSpec(String),

    /// A Go source of the skeleton could not be scanned
    #[error("cannot scan {}: {message}", path.display())]
    Scan { path: PathBuf, message: String },

    /// An operation name is declared twice
    #[error("duplicate operation {name:?}: {detail}")]
    DuplicateOperation { name: String, detail: String },

    /// An OpenAPI operation has no matching function in the skeleton
    #[error("method {0:?} not exists in the generated code")]
    UnknownOperation(String),

    /// A tag has no matching `api_*` file in the skeleton
    #[error("service {service:?} of tag {tag:?} not exists in the generated code")]
    UnknownService { tag: String, service: String },

    /// A parameter, request body or response has no usable schema
    #[error("no schema: {0}")]
    NoSchema(String),

    /// A schema could not be mapped to a Go type
    #[error("{location}: {source}")]
    Schema {
        location: String,
        #[source]
        source: TypeError,
    },

    /// Parameter `in` is neither `path`, `query` nor `header`
    #[error("unknown kind {kind:?} of parameter {param:?} in {operation}")]
    UnknownParamKind {
        operation: String,
        param: String,
        kind: String,
    },

    /// Template rendering error
    #[error("cannot render {}: {source}", path.display())]
    Template {
        path: PathBuf,
        #[source]
        source: tera::Error,
    },

    /// Formatting of rendered code failed
    #[error("cannot format {}: {message}", path.display())]
    Format { path: PathBuf, message: String },
}

impl Error {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new bad OpenAPI document error
    pub fn bad_spec<S: Into<String>>(msg: S) -> Self {
        Self::BadSpec(msg.into())
    }

    /// Create a new missing schema error
    pub fn no_schema<S: Into<String>>(msg: S) -> Self {
        Self::NoSchema(msg.into())
    }

    /// Create a new scanning error for the given source
    pub fn scan<P: Into<PathBuf>, S: Into<String>>(path: P, msg: S) -> Self {
        Self::Scan {
            path: path.into(),
            message: msg.into(),
        }
    }

    /// Name of the component the error originates from.
    pub fn component(&self) -> &'static str {
        match self {
            Self::Io(_) => "io",
            Self::Yaml(_) | Self::Json(_) | Self::BadSpec(_) => "loader",
            Self::Toml(_) | Self::Config(_) => "config",
            Self::InputMissing(_) | Self::InputNotDirectory(_) => "codegen",
            Self::Scan { .. } | Self::DuplicateOperation { .. } => "scanner",
            Self::UnknownOperation(_)
            | Self::UnknownService { .. }
            | Self::NoSchema(_)
            | Self::Schema { .. }
            | Self::UnknownParamKind { .. } => "reconciler",
            Self::Template { .. } | Self::Format { .. } => "emitter",
        }
    }
}
