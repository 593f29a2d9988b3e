//! Context builder traits and adapters for language-specific codegen.
//!
//! The reconciled [`Api`] is language neutral; a builder turns it into the
//! serializable contexts the templates of one target are rendered with.
pub mod go;

use crate::ast::{Api, Service};
use serde_json::Value as JsonValue;

/// Trait for converting the reconciled model into template contexts.
pub trait ContextBuilder {
    /// Context of the file emitted for one service.
    fn service(&self, service: &Service) -> crate::Result<JsonValue>;

    /// Context of the typedefs file.
    fn models(&self, api: &Api) -> crate::Result<JsonValue>;

    /// Context of the router initialization file.
    fn routers(&self, api: &Api) -> crate::Result<JsonValue>;

    /// Context of the runtime files (registry, binders and request
    /// validation), `None` when they are not emitted.
    fn common(&self) -> crate::Result<Option<JsonValue>>;
}
