//! Mapping of OpenAPI schemas to target type expressions.
//!
//! [`TypeExpr`] is independent of the output language; the Go builder renders
//! it (see [`crate::builders::go`]).

use std::fmt;

use serde_json::Value as JsonValue;
use thiserror::Error;

use crate::utils::struct_name_from_ref;

/// Reasons a schema cannot be mapped to a type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypeError {
    #[error("inline objects not allowed, use $ref instead")]
    InlineObjectsNotAllowed,

    #[error("unsupported schema: {0}")]
    UnsupportedSchema(String),

    #[error("bad $ref {0:?}")]
    BadRef(String),
}

/// Primitive types a schema can map to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    String,
    Bool,
    Int32,
    Int64,
    Float32,
    Float64,
}

impl Primitive {
    /// Name of the runtime helper binding a path variable of this type.
    pub fn binder(self) -> &'static str {
        match self {
            Self::String => "ParamString",
            Self::Bool => "ParamBool",
            Self::Int32 => "ParamInt32",
            Self::Int64 => "ParamInt64",
            Self::Float32 => "ParamFloat32",
            Self::Float64 => "ParamFloat64",
        }
    }
}

/// A target type expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeExpr {
    /// A named struct, from a `$ref`
    Named(String),
    Primitive(Primitive),
    /// Sequence of the inner type
    Sequence(Box<TypeExpr>),
    /// Opaque byte stream
    Bytes,
    /// A value that may be absent
    Optional(Box<TypeExpr>),
}

impl TypeExpr {
    pub fn optional(inner: TypeExpr) -> Self {
        Self::Optional(Box::new(inner))
    }

    pub fn sequence(inner: TypeExpr) -> Self {
        Self::Sequence(Box::new(inner))
    }

    pub fn is_optional(&self) -> bool {
        matches!(self, Self::Optional(_))
    }

    /// The type with one level of optionality removed.
    pub fn required(&self) -> &TypeExpr {
        match self {
            Self::Optional(inner) => inner,
            other => other,
        }
    }

    /// The primitive behind this expression, looking through optionality.
    pub fn primitive(&self) -> Option<Primitive> {
        match self.required() {
            Self::Primitive(p) => Some(*p),
            _ => None,
        }
    }
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(name) => write!(f, "{name}"),
            Self::Primitive(p) => write!(f, "{p:?}"),
            Self::Sequence(inner) => write!(f, "sequence of {inner}"),
            Self::Bytes => write!(f, "bytes"),
            Self::Optional(inner) => write!(f, "optional {inner}"),
        }
    }
}

/// Map a schema, or a schema reference, to a type expression.
///
/// A schema that is not `required` is wrapped in [`TypeExpr::Optional`].
pub fn map_schema(schema: &JsonValue, required: bool) -> Result<TypeExpr, TypeError> {
    let ty = map_required(schema)?;
    Ok(if required { ty } else { TypeExpr::optional(ty) })
}

fn map_required(schema: &JsonValue) -> Result<TypeExpr, TypeError> {
    if let Some(reference) = schema.get("$ref").and_then(JsonValue::as_str) {
        if !reference.is_empty() {
            return struct_name_from_ref(reference).map(TypeExpr::Named);
        }
    }

    let typ = schema.get("type").and_then(JsonValue::as_str);
    let format = schema.get("format").and_then(JsonValue::as_str);

    let mapped = match (typ, format) {
        (Some("number"), Some("float")) => Some(TypeExpr::Primitive(Primitive::Float32)),
        (Some("number"), Some("double")) => Some(TypeExpr::Primitive(Primitive::Float64)),
        (Some("integer"), Some("int32")) => Some(TypeExpr::Primitive(Primitive::Int32)),
        (Some("integer"), Some("int64")) => Some(TypeExpr::Primitive(Primitive::Int64)),
        (Some("string"), _) => Some(TypeExpr::Primitive(Primitive::String)),
        (Some("boolean"), _) => Some(TypeExpr::Primitive(Primitive::Bool)),
        (Some("array"), _) => match schema.get("items") {
            Some(items) => Some(TypeExpr::sequence(map_required(items)?)),
            None => None,
        },
        (Some("object"), _) if schema.get("properties").is_some() => {
            return Err(TypeError::InlineObjectsNotAllowed);
        }
        _ => None,
    };

    mapped.ok_or_else(|| {
        TypeError::UnsupportedSchema(format!(
            "type {} format {}",
            typ.unwrap_or("<none>"),
            format.unwrap_or("<none>")
        ))
    })
}
