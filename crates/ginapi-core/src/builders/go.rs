//! Go/Gin context builder.
//!
//! Renders type expressions, signatures and doc comments as Go source
//! fragments so the templates only have to place them.

use super::ContextBuilder;
use crate::ast::{Api, Operation, Service};
use crate::config::Config;
use crate::types::{Primitive, TypeExpr};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};

/// Import alias of the runtime package when it is not emitted in place.
pub const RUNTIME_ALIAS: &str = "ginapiruntime";

/// A struct field with its tag.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoField {
    pub field: String,
    pub ty: String,
    /// Raw string tag including backquotes, empty when untagged
    pub tag: String,
}

/// A path variable bound by a runtime helper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoPathVar {
    pub field: String,
    pub ty: String,
    pub quoted_name: String,
    pub binder: String,
    /// The field is a pointer to the bound value
    pub optional: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoBody {
    pub ty: String,
    /// Read as raw bytes instead of decoding JSON
    pub raw: bool,
}

/// Go-specific context of one operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoOperationContext {
    pub name: String,
    pub quoted_name: String,
    /// Doc comment, continuation lines indented for an interface body
    pub doc: String,
    pub handler: String,
    pub quoted_method: String,
    pub quoted_url: String,
    pub path_vars_type: String,
    pub path_vars: Vec<GoPathVar>,
    pub queries_type: String,
    pub queries: Vec<GoField>,
    pub headers_type: String,
    pub headers: Vec<GoField>,
    pub body: Option<GoBody>,
    pub has_response: bool,
    /// Interface method, e.g. `ListPets(q ListPetsQueries) (*Pets, error)`
    pub signature: String,
    /// Same signature without parameter names, for the stub
    pub stub_signature: String,
    pub call_args: String,
}

/// Go-specific context of one service file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoServiceContext {
    pub package: String,
    pub name: String,
    pub doc: String,
    pub runtime_alias: String,
    pub runtime_import: Option<String>,
    /// Qualifier of runtime identifiers, empty when emitted in place
    pub rt: String,
    pub route_list: String,
    pub operations: Vec<GoOperationContext>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoTypedef {
    pub name: String,
    pub target: String,
}

/// Builds Go template contexts.
#[derive(Debug, Clone)]
pub struct GoContextBuilder {
    package: String,
    gin_context: bool,
    runtime_package: Option<String>,
}

impl GoContextBuilder {
    pub fn new(
        package: impl Into<String>,
        gin_context: bool,
        runtime_package: Option<String>,
    ) -> Self {
        Self {
            package: package.into(),
            gin_context,
            runtime_package,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.package_name.clone(),
            config.gin_context,
            config.runtime_package.clone(),
        )
    }

    fn rt(&self) -> String {
        match self.runtime_package {
            Some(_) => format!("{RUNTIME_ALIAS}."),
            None => String::new(),
        }
    }

    fn operation(&self, op: &Operation) -> GoOperationContext {
        let path_vars_type = format!("{}PathVars", op.name);
        let queries_type = format!("{}Queries", op.name);
        let headers_type = format!("{}Headers", op.name);

        // (name, type) in the canonical argument order
        let mut params: Vec<(&str, String)> = Vec::new();
        if self.gin_context {
            params.push(("c", "*gin.Context".to_string()));
        }
        if !op.path_vars.is_empty() {
            params.push(("vars", path_vars_type.clone()));
        }
        if !op.queries.is_empty() {
            params.push(("q", queries_type.clone()));
        }
        if !op.headers.is_empty() {
            params.push(("h", headers_type.clone()));
        }
        if let Some(body) = &op.request_body {
            params.push(("req", go_type(body)));
        }

        let results = match &op.response {
            Some(ty) => format!("({}, error)", go_type(ty)),
            None => "error".to_string(),
        };
        let named = params
            .iter()
            .map(|(name, ty)| format!("{name} {ty}"))
            .collect::<Vec<_>>()
            .join(", ");
        let unnamed = params
            .iter()
            .map(|(_, ty)| ty.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        let call_args = params
            .iter()
            .map(|(name, _)| *name)
            .collect::<Vec<_>>()
            .join(", ");

        GoOperationContext {
            quoted_name: go_quote(&op.name),
            doc: comment_block(&op.name, &op.comment, "\t"),
            handler: format!("defaultHandle{}", op.name),
            quoted_method: go_quote(op.http_method.as_str()),
            quoted_url: go_quote(&op.path),
            path_vars: op
                .path_vars
                .iter()
                .map(|v| GoPathVar {
                    field: v.field.clone(),
                    ty: go_type(&v.ty),
                    quoted_name: go_quote(&v.name),
                    binder: v.binder.binder().to_string(),
                    optional: v.ty.is_optional(),
                })
                .collect(),
            queries: op
                .queries
                .iter()
                .map(|q| GoField {
                    field: q.field.clone(),
                    ty: go_type(&q.ty),
                    tag: struct_tag("form", &q.name),
                })
                .collect(),
            headers: op
                .headers
                .iter()
                .map(|h| GoField {
                    field: h.field.clone(),
                    ty: go_type(&h.ty),
                    tag: struct_tag("header", &h.name),
                })
                .collect(),
            body: op.request_body.as_ref().map(|ty| GoBody {
                ty: go_type(ty),
                raw: *ty == TypeExpr::Bytes,
            }),
            has_response: op.response.is_some(),
            signature: format!("{}({}) {}", op.name, named, results),
            stub_signature: format!("{}({}) {}", op.name, unnamed, results),
            call_args,
            path_vars_type,
            queries_type,
            headers_type,
            name: op.name.clone(),
        }
    }
}

impl ContextBuilder for GoContextBuilder {
    fn service(&self, service: &Service) -> crate::Result<JsonValue> {
        let route_list = format!(
            "[]string{{{}}}",
            service
                .operations
                .iter()
                .map(|op| go_quote(&op.name))
                .collect::<Vec<_>>()
                .join(", ")
        );
        let context = GoServiceContext {
            package: self.package.clone(),
            name: service.name.clone(),
            doc: comment_block(&service.name, &service.comment, ""),
            runtime_alias: RUNTIME_ALIAS.to_string(),
            runtime_import: self.runtime_package.as_deref().map(go_quote),
            rt: self.rt(),
            route_list,
            operations: service
                .operations
                .iter()
                .map(|op| self.operation(op))
                .collect(),
        };
        Ok(serde_json::to_value(&context)?)
    }

    fn models(&self, api: &Api) -> crate::Result<JsonValue> {
        let typedefs: Vec<GoTypedef> = api
            .typedefs
            .iter()
            .map(|t| GoTypedef {
                name: t.name.clone(),
                target: go_type(&t.target),
            })
            .collect();
        Ok(json!({
            "package": self.package,
            "typedefs": typedefs,
        }))
    }

    fn routers(&self, api: &Api) -> crate::Result<JsonValue> {
        let services: Vec<&str> = api.services.iter().map(|s| s.name.as_str()).collect();
        Ok(json!({
            "package": self.package,
            "services": services,
        }))
    }

    fn common(&self) -> crate::Result<Option<JsonValue>> {
        if self.runtime_package.is_some() {
            return Ok(None);
        }
        Ok(Some(json!({ "package": self.package })))
    }
}

/// Go spelling of a type expression.
pub fn go_type(ty: &TypeExpr) -> String {
    match ty {
        TypeExpr::Named(name) => name.clone(),
        TypeExpr::Primitive(p) => primitive_name(*p).to_string(),
        TypeExpr::Sequence(inner) => format!("[]{}", go_type(inner)),
        TypeExpr::Bytes => "[]byte".to_string(),
        TypeExpr::Optional(inner) => format!("*{}", go_type(inner)),
    }
}

fn primitive_name(p: Primitive) -> &'static str {
    match p {
        Primitive::String => "string",
        Primitive::Bool => "bool",
        Primitive::Int32 => "int32",
        Primitive::Int64 => "int64",
        Primitive::Float32 => "float32",
        Primitive::Float64 => "float64",
    }
}

/// Go interpreted string literal of `s`.
pub fn go_quote(s: &str) -> String {
    let mut quoted = String::with_capacity(s.len() + 2);
    quoted.push('"');
    for ch in s.chars() {
        match ch {
            '"' => quoted.push_str("\\\""),
            '\\' => quoted.push_str("\\\\"),
            '\n' => quoted.push_str("\\n"),
            '\r' => quoted.push_str("\\r"),
            '\t' => quoted.push_str("\\t"),
            ch if ch.is_control() => quoted.push_str(&format!("\\u{:04x}", ch as u32)),
            ch => quoted.push(ch),
        }
    }
    quoted.push('"');
    quoted
}

fn struct_tag(key: &str, name: &str) -> String {
    format!("`{}:{}`", key, go_quote(name).replace('`', ""))
}

/// `// Name text` comment, one `//` line per text line, continuation lines
/// prefixed with `indent`.
pub fn comment_block(name: &str, text: &str, indent: &str) -> String {
    let mut lines = text.lines().map(str::trim_end);
    let first = match lines.next() {
        Some(line) if !line.trim().is_empty() => format!("// {} {}", name, line.trim_start()),
        _ => format!("// {name}"),
    };

    let mut block = first;
    for line in lines {
        block.push('\n');
        block.push_str(indent);
        if line.is_empty() {
            block.push_str("//");
        } else {
            block.push_str("// ");
            block.push_str(line);
        }
    }
    block
}
