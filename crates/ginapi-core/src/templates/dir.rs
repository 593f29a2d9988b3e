//! Resolution of the directory holding user templates

use std::io;
use std::path::{Path, PathBuf};

/// Environment variable naming a template directory.
pub const TEMPLATE_DIR_ENV: &str = "GINAPI_TEMPLATE_DIR";

/// A directory whose `*.tera` files override the built-in templates
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateDir {
    path: PathBuf,
}

impl TemplateDir {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Discover the override directory.
    ///
    /// An explicit directory must exist. Otherwise `GINAPI_TEMPLATE_DIR` and
    /// `~/.ginapi/templates` are tried in that order, and `None` means only
    /// the built-in templates are used.
    pub fn discover(custom_dir: Option<&Path>) -> io::Result<Option<Self>> {
        if let Some(dir) = custom_dir {
            if !dir.is_dir() {
                return Err(io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("Template directory not found: {}", dir.display()),
                ));
            }
            return Ok(Some(Self::new(dir)));
        }

        Ok(Self::find_default_dir().map(Self::new))
    }

    fn find_default_dir() -> Option<PathBuf> {
        if let Ok(dir) = std::env::var(TEMPLATE_DIR_ENV) {
            let path = PathBuf::from(dir);
            if path.is_dir() {
                return Some(path);
            }
            log::warn!(
                "{} points to {}, which is not a directory",
                TEMPLATE_DIR_ENV,
                path.display()
            );
        }

        dirs::home_dir()
            .map(|home| home.join(".ginapi").join("templates"))
            .filter(|path| path.is_dir())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn display(&self) -> std::path::Display<'_> {
        self.path.display()
    }
}
