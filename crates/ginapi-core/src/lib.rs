//! ginapi Core Library
//!
//! This library generates Gin adapters for the Go server skeleton produced
//! by openapi-generator: one typed service interface per skeleton file,
//! request binding handlers and route registration.

pub mod ast;
pub mod builders;
pub mod config;
pub mod emit;
pub mod error;
pub mod format;
pub mod generate;
pub mod models;
pub mod openapi;
pub mod reconcile;
pub mod skeleton;
pub mod templates;
pub mod types;
pub mod utils;

pub use crate::{
    ast::Api,
    config::Config,
    emit::Emitter,
    error::{Error, Result},
    format::Formatter,
    generate::generate,
    openapi::OpenApiContext,
    reconcile::Reconciler,
    skeleton::Skeleton,
    templates::{TemplateDir, TemplateManager},
};
