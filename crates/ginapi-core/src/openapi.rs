//! OpenAPI document loading and querying.
//!
//! The document is kept as a raw JSON value, in document order. Local `$ref`s
//! of parameters, request bodies and responses are followed on access; schema
//! `$ref`s are left alone because their names become Go type names.
//!
//! # Examples
//!
//! ```no_run
//! use std::collections::BTreeMap;
//! use ginapi_core::openapi::OpenApiContext;
//! use ginapi_core::error::Result;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<()> {
//! let spec = OpenApiContext::from_file("api/openapi.yaml").await?;
//!
//! let vars = BTreeMap::from([("version".to_string(), "v1".to_string())]);
//! println!("routes are rooted at {:?}", spec.root_path(&vars)?);
//! for op in spec.operations()? {
//!     println!("{} {} {:?}", op.method, op.path, op.id);
//! }
//! # Ok(())
//! # }
//! ```

// Internal imports (std, crate)
use std::collections::BTreeMap;
use std::path::Path;

use crate::ast::HttpMethod;
use crate::Error;

// External imports (alphabetized)
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map as JsonMap, Value as JsonValue};
use tokio::fs;
use url::Url;

/// Longest `$ref` chain followed before giving up.
const MAX_REF_DEPTH: usize = 32;

/// Path item keys that are operations but never routed.
const SKIPPED_METHODS: [&str; 4] = ["head", "patch", "options", "trace"];

static SERVER_VAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{([^{}]*)\}").expect("valid server variable regex"));

/// Represents an OpenAPI specification
#[derive(Debug, serde::Serialize)]
#[serde(transparent)]
pub struct OpenApiContext {
    /// The raw JSON value of the OpenAPI spec
    pub json: JsonValue,
}

impl OpenApiContext {
    /// Create a new context from a file (supports both YAML and JSON)
    pub async fn from_file<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).await?;
        Self::parse_content(&content).map_err(|e| {
            Error::bad_spec(format!(
                "Failed to parse OpenAPI spec at {}: {}",
                path.display(),
                e
            ))
        })
    }

    /// Parse content as either JSON or YAML
    pub fn parse_content(content: &str) -> Result<Self, String> {
        if let Ok(json) = serde_json::from_str(content) {
            return Ok(Self { json });
        }

        match serde_yaml::from_str::<JsonValue>(content) {
            Ok(json) if json.is_object() => Ok(Self { json }),
            Ok(_) => Err("document is not a mapping".to_string()),
            Err(e) => Err(format!("content is neither valid JSON nor YAML: {e}")),
        }
    }

    /// Get a reference to the raw JSON value
    pub fn as_json(&self) -> &JsonValue {
        &self.json
    }

    /// Get the title of the API
    pub fn title(&self) -> Option<&str> {
        self.json.get("info")?.get("title")?.as_str()
    }

    /// Get the version of the API
    pub fn version(&self) -> Option<&str> {
        self.json.get("info")?.get("version")?.as_str()
    }

    /// Follow `$ref` until a concrete object is reached.
    pub fn resolve<'a>(&'a self, value: &'a JsonValue) -> crate::Result<&'a JsonValue> {
        let mut current = value;
        for _ in 0..MAX_REF_DEPTH {
            let Some(reference) = current.get("$ref").and_then(JsonValue::as_str) else {
                return Ok(current);
            };
            let pointer = reference.strip_prefix('#').ok_or_else(|| {
                Error::bad_spec(format!("external reference {reference:?} not supported"))
            })?;
            current = self
                .json
                .pointer(pointer)
                .ok_or_else(|| Error::bad_spec(format!("dangling reference {reference:?}")))?;
        }
        Err(Error::bad_spec(format!(
            "reference chain deeper than {MAX_REF_DEPTH}"
        )))
    }

    /// URL path of the first server, with `{var}` substituted from `vars`.
    ///
    /// The result has no trailing slash, so a root server yields `""`.
    pub fn root_path(&self, vars: &BTreeMap<String, String>) -> crate::Result<String> {
        let raw = self
            .json
            .get("servers")
            .and_then(JsonValue::as_array)
            .and_then(|servers| servers.first())
            .and_then(|server| server.get("url"))
            .and_then(JsonValue::as_str)
            .ok_or_else(|| Error::bad_spec("no server url"))?;

        let mut missing = Vec::new();
        let substituted = SERVER_VAR.replace_all(raw, |caps: &regex::Captures| {
            match vars.get(&caps[1]) {
                Some(value) => value.clone(),
                None => {
                    missing.push(caps[1].to_string());
                    caps[0].to_string()
                }
            }
        });
        if !missing.is_empty() {
            return Err(Error::bad_spec(format!(
                "server url {raw:?} has unsubstituted variables {missing:?}"
            )));
        }

        let path = match Url::parse(&substituted) {
            Ok(url) => url.path().to_string(),
            Err(url::ParseError::RelativeUrlWithoutBase) => {
                let base = Url::parse("http://localhost/")
                    .map_err(|e| Error::bad_spec(e.to_string()))?;
                base.join(&substituted)
                    .map_err(|e| Error::bad_spec(format!("bad server url {substituted:?}: {e}")))?
                    .path()
                    .to_string()
            }
            Err(e) => {
                return Err(Error::bad_spec(format!(
                    "bad server url {substituted:?}: {e}"
                )));
            }
        };

        Ok(path.trim_end_matches('/').to_string())
    }

    /// Top-level tags as `(name, description)` pairs.
    pub fn tags(&self) -> Vec<(String, String)> {
        self.json
            .get("tags")
            .and_then(JsonValue::as_array)
            .map(|tags| {
                tags.iter()
                    .filter_map(|tag| {
                        let name = tag.get("name")?.as_str()?.to_string();
                        let description = tag
                            .get("description")
                            .and_then(JsonValue::as_str)
                            .unwrap_or_default()
                            .to_string();
                        Some((name, description))
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Component schemas whose type is `array`, in document order.
    pub fn array_schemas(&self) -> Vec<(&str, &JsonValue)> {
        self.json
            .get("components")
            .and_then(|c| c.get("schemas"))
            .and_then(JsonValue::as_object)
            .map(|schemas| {
                schemas
                    .iter()
                    .filter(|(_, schema)| {
                        schema.get("type").and_then(JsonValue::as_str) == Some("array")
                    })
                    .map(|(name, schema)| (name.as_str(), schema))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Every routed operation, path by path, in document order.
    pub fn operations(&self) -> crate::Result<Vec<OpenApiOperation>> {
        let paths = self
            .json
            .get("paths")
            .and_then(JsonValue::as_object)
            .ok_or_else(|| Error::bad_spec("key \"paths\" not exists"))?;

        let mut operations = Vec::new();
        for (path, item) in paths {
            let item = self.resolve(item)?;
            let Some(item) = item.as_object() else {
                return Err(Error::bad_spec(format!("path {path:?} is not a map")));
            };

            for skipped in SKIPPED_METHODS {
                if item.contains_key(skipped) {
                    log::warn!(
                        "Skipping {} {}: method not supported",
                        skipped.to_uppercase(),
                        path
                    );
                }
            }

            let shared = self.extract_parameters(item.get("parameters"))?;
            for method in HttpMethod::ALL {
                let Some(op) = item.get(method.key()) else {
                    continue;
                };
                let Some(op) = op.as_object() else {
                    return Err(Error::bad_spec(format!(
                        "{method} {path:?} is not a map"
                    )));
                };
                operations.push(self.extract_operation(path, method, op, &shared)?);
            }
        }
        Ok(operations)
    }

    fn extract_operation(
        &self,
        path: &str,
        method: HttpMethod,
        op: &JsonMap<String, JsonValue>,
        shared: &[OpenApiParameter],
    ) -> crate::Result<OpenApiOperation> {
        let text = |key: &str| op.get(key).and_then(JsonValue::as_str).map(String::from);

        let mut parameters = shared.to_vec();
        for param in self.extract_parameters(op.get("parameters"))? {
            match parameters
                .iter_mut()
                .find(|p| p.name == param.name && p.in_ == param.in_)
            {
                Some(existing) => *existing = param,
                None => parameters.push(param),
            }
        }

        let request_body = op
            .get("requestBody")
            .map(|body| self.resolve(body).cloned())
            .transpose()?;

        let mut responses = JsonMap::new();
        if let Some(map) = op.get("responses").and_then(JsonValue::as_object) {
            for (status, response) in map {
                responses.insert(status.clone(), self.resolve(response)?.clone());
            }
        }

        Ok(OpenApiOperation {
            id: text("operationId"),
            path: path.to_string(),
            method,
            tags: op
                .get("tags")
                .and_then(JsonValue::as_array)
                .map(|arr| {
                    arr.iter()
                        .filter_map(JsonValue::as_str)
                        .map(String::from)
                        .collect()
                })
                .unwrap_or_default(),
            summary: text("summary"),
            description: text("description"),
            parameters,
            request_body,
            responses,
        })
    }

    fn extract_parameters(
        &self,
        parameters: Option<&JsonValue>,
    ) -> crate::Result<Vec<OpenApiParameter>> {
        let Some(parameters) = parameters else {
            return Ok(Vec::new());
        };
        let list = parameters
            .as_array()
            .ok_or_else(|| Error::bad_spec("key \"parameters\" not a list"))?;

        list.iter()
            .map(|param| {
                let param = self.resolve(param)?;
                serde_json::from_value(param.clone())
                    .map_err(|e| Error::bad_spec(format!("bad parameter {param}: {e}")))
            })
            .collect()
    }
}

/// Parsed OpenAPI operation, references resolved
#[derive(Clone, Debug)]
pub struct OpenApiOperation {
    /// Unique string used to identify the operation.
    pub id: Option<String>,
    /// The path template where this operation is defined (e.g., "/pets/{petId}")
    pub path: String,
    pub method: HttpMethod,
    /// A list of tags for API documentation control.
    pub tags: Vec<String>,
    /// A short summary of what the operation does.
    pub summary: Option<String>,
    /// A verbose explanation of the operation behavior.
    pub description: Option<String>,
    /// Path item parameters followed by the operation's own, in declaration order.
    pub parameters: Vec<OpenApiParameter>,
    /// The request body applicable for this operation.
    pub request_body: Option<JsonValue>,
    /// Responses by status code.
    pub responses: JsonMap<String, JsonValue>,
}

impl OpenApiOperation {
    /// Schema of `media_type` in a request body or response object.
    pub fn media_schema<'a>(object: &'a JsonValue, media_type: &str) -> Option<&'a JsonValue> {
        object.get("content")?.get(media_type)?.get("schema")
    }

    /// Whether `media_type` is declared in a request body or response object.
    pub fn has_media(object: &JsonValue, media_type: &str) -> bool {
        object
            .get("content")
            .and_then(|content| content.get(media_type))
            .is_some()
    }
}

/// Information about a single parameter in an OpenAPI operation.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct OpenApiParameter {
    /// The name of the parameter. Parameter names are case sensitive.
    pub name: String,
    /// The location of the parameter. Possible values: "query", "header", "path", or "cookie".
    #[serde(rename = "in")]
    pub in_: String,
    /// A brief description of the parameter.
    pub description: Option<String>,
    /// Determines whether this parameter is mandatory.
    pub required: Option<bool>,
    /// The schema defining the type used for the parameter.
    pub schema: Option<JsonValue>,
    /// A map containing the representations for the parameter.
    pub content: Option<JsonMap<String, JsonValue>>,
}

impl OpenApiParameter {
    /// The parameter schema, falling back to its JSON content schema.
    pub fn effective_schema(&self) -> Option<&JsonValue> {
        self.schema.as_ref().or_else(|| {
            self.content
                .as_ref()?
                .get("application/json")?
                .get("schema")
        })
    }

    pub fn is_required(&self) -> bool {
        self.required.unwrap_or(false)
    }
}
