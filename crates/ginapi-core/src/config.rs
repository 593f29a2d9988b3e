//! Configuration management for ginapi code generation.
//!
//! This module defines the `Config` struct holding every generation setting.
//! A configuration can be created programmatically, loaded from a YAML, JSON
//! or TOML file, and is finally overridden by command-line arguments.
//!
//! # Examples
//!
//! ```no_run
//! use ginapi_core::config::Config;
//!
//! # #[tokio::main]
//! # async fn main() -> ginapi_core::Result<()> {
//! // Create a new config programmatically
//! let mut config = Config::new("petstore");
//! config.gin_context = true;
//! config.server_vars.insert("version".into(), "v1".into());
//!
//! // Or load from a config file
//! let config = Config::from_file("ginapi.yaml").await?;
//! # Ok(())
//! # }
//! ```

// Internal imports (std, crate)
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::format::GOFMT;

// External imports (alphabetized)
use serde::{Deserialize, Serialize};
use tokio::fs;

/// Directory of the skeleton Go sources, relative to the input directory.
pub const CODE_DIR: &str = "go";
/// Path of the OpenAPI document, relative to the input directory.
pub const SPEC_FILE: &str = "api/openapi.yaml";
/// Default output directory, relative to the input directory.
pub const OUTPUT_DIR: &str = "ginapi";

/// Configuration for ginapi generation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Root of the upstream generator output
    pub input_dir: PathBuf,

    /// Destination directory, `<input_dir>/ginapi` when unset
    #[serde(default)]
    pub output_dir: Option<PathBuf>,

    /// Pass `*gin.Context` as the first argument of every service method
    #[serde(default)]
    pub gin_context: bool,

    /// Tags whose operations are skipped
    #[serde(default)]
    pub ignored_tags: Vec<String>,

    /// Go package of the emitted files
    #[serde(default = "default_package_name")]
    pub package_name: String,

    /// Import path providing `GinRegistry` and the `Param*` binders
    #[serde(default)]
    pub runtime_package: Option<String>,

    /// Formatter command, formatting is disabled when `None`
    ///
    /// Written as `""` when disabled, since TOML has no null.
    #[serde(default = "default_gofmt", with = "formatter_command")]
    pub gofmt: Option<String>,

    /// Directory of templates overriding the built-in ones
    #[serde(default)]
    pub template_dir: Option<PathBuf>,

    /// Values substituted into the first server URL
    #[serde(default)]
    pub server_vars: BTreeMap<String, String>,
}

impl Config {
    /// Create a new Config with default values
    pub fn new(input_dir: impl Into<PathBuf>) -> Self {
        Self {
            input_dir: input_dir.into(),
            output_dir: None,
            server_vars: BTreeMap::new(),
            gin_context: false,
            ignored_tags: Vec::new(),
            package_name: default_package_name(),
            runtime_package: None,
            gofmt: default_gofmt(),
            template_dir: None,
        }
    }

    /// Directory holding the skeleton `api_*.go` and `model_*.go` files
    pub fn code_dir(&self) -> PathBuf {
        self.input_dir.join(CODE_DIR)
    }

    /// Path of the OpenAPI document
    pub fn spec_path(&self) -> PathBuf {
        self.input_dir.join(SPEC_FILE)
    }

    /// Directory the generated files are written to
    pub fn output_path(&self) -> PathBuf {
        self.output_dir
            .clone()
            .unwrap_or_else(|| self.input_dir.join(OUTPUT_DIR))
    }

    /// Load configuration from a file, by extension: `.json`, `.toml`, else YAML
    pub async fn from_file<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).await?;
        let config = match extension(path).as_deref() {
            Some("json") => serde_json::from_str(&content)?,
            Some("toml") => toml::from_str(&content)?,
            _ => serde_yaml::from_str(&content)?,
        };
        Ok(config)
    }

    /// Save configuration to a file, by extension like [`Config::from_file`]
    pub async fn save<P: AsRef<Path>>(&self, path: P) -> crate::Result<()> {
        let path = path.as_ref();
        let content = match extension(path).as_deref() {
            Some("json") => serde_json::to_string_pretty(self)?,
            Some("toml") => {
                toml::to_string(self).map_err(|e| crate::Error::config(e.to_string()))?
            }
            _ => serde_yaml::to_string(self)?,
        };
        fs::write(path, content).await?;
        Ok(())
    }
}

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
}

fn default_package_name() -> String {
    "ginapi".to_string()
}

fn default_gofmt() -> Option<String> {
    Some(GOFMT.to_string())
}

/// `None` and a blank command are the same setting: no formatting.
mod formatter_command {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        value: &Option<String>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(value.as_deref().unwrap_or_default())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<String>, D::Error> {
        let command = Option::<String>::deserialize(deserializer)?;
        Ok(command.filter(|c| !c.trim().is_empty()))
    }
}
