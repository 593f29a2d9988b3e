//! The reconciled model handed from the reconciler to the emitter.
//!
//! Everything here is built once by [`crate::reconcile::Reconciler`] and only
//! read afterwards.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::types::{Primitive, TypeExpr};

/// HTTP methods an operation can be routed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    /// The methods iterated over in a path item, in that order.
    pub const ALL: [HttpMethod; 4] = [Self::Get, Self::Post, Self::Put, Self::Delete];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }

    /// Key of the method in an OpenAPI path item.
    pub fn key(&self) -> &'static str {
        match self {
            Self::Get => "get",
            Self::Post => "post",
            Self::Put => "put",
            Self::Delete => "delete",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A path variable binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathVar {
    /// Name on the wire
    pub name: String,
    pub ty: TypeExpr,
    pub field: String,
    /// Primitive used to select the runtime binder
    pub binder: Primitive,
}

/// A query parameter binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub name: String,
    pub ty: TypeExpr,
    pub field: String,
}

/// A header binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub name: String,
    pub ty: TypeExpr,
    pub field: String,
}

/// One HTTP entry point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operation {
    pub name: String,
    pub http_method: HttpMethod,
    /// Router path including the server root
    pub path: String,
    pub path_vars: Vec<PathVar>,
    pub queries: Vec<Query>,
    pub headers: Vec<Header>,
    pub request_body: Option<TypeExpr>,
    pub response: Option<TypeExpr>,
    pub comment: String,
}

/// Operations sharing a skeleton file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Service {
    pub name: String,
    /// Destination file name in the output directory
    pub file_name: String,
    pub comment: String,
    pub operations: Vec<Operation>,
}

impl Service {
    pub fn operation(&self, name: &str) -> Option<&Operation> {
        self.operations.iter().find(|op| op.name == name)
    }
}

/// Alias emitted for a top-level array schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Typedef {
    pub name: String,
    pub target: TypeExpr,
}

/// A model source of the skeleton, copied verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelFile {
    pub path: PathBuf,
    /// Package declared by the source
    pub package: String,
}

/// The whole reconciled API.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Api {
    /// Path of the first server, without trailing slash
    pub root_path: String,
    pub services: Vec<Service>,
    pub typedefs: Vec<Typedef>,
    pub model_files: Vec<ModelFile>,
}

impl Api {
    pub fn service(&self, name: &str) -> Option<&Service> {
        self.services.iter().find(|svc| svc.name == name)
    }

    /// Look an operation up across all services.
    pub fn operation(&self, name: &str) -> Option<&Operation> {
        self.services.iter().find_map(|svc| svc.operation(name))
    }
}
