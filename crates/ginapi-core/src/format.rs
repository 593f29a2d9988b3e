//! Formatting of rendered Go sources.

// Internal imports (std, crate)
use std::path::Path;
use std::process::Stdio;

use crate::{config::Config, Error};

// External imports (alphabetized)
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// Default formatter command.
pub const GOFMT: &str = "gofmt";

/// How rendered sources are normalized before being written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Formatter {
    /// Pipe the source through a gofmt-compatible command, e.g. `gofmt -s`
    GoFmt { command: String },
    /// Leave the source untouched
    Passthrough,
}

impl Formatter {
    pub fn from_config(config: &Config) -> Self {
        match &config.gofmt {
            Some(command) if !command.trim().is_empty() => Self::GoFmt {
                command: command.clone(),
            },
            _ => Self::Passthrough,
        }
    }

    /// Format `src`, the content destined for `path`.
    pub async fn format(&self, src: String, path: &Path) -> crate::Result<String> {
        match self {
            Self::Passthrough => Ok(src),
            Self::GoFmt { command } => run(command, src, path).await,
        }
    }
}

async fn run(command: &str, src: String, path: &Path) -> crate::Result<String> {
    let format_error = |message: String| Error::Format {
        path: path.to_path_buf(),
        message,
    };

    let mut words = command.split_whitespace();
    let program = words
        .next()
        .ok_or_else(|| format_error("empty formatter command".to_string()))?;

    let mut child = Command::new(program)
        .args(words)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| format_error(format!("cannot run {program}: {e}")))?;

    let mut stdin = child
        .stdin
        .take()
        .ok_or_else(|| format_error(format!("cannot write to {program}")))?;
    let writer = async move {
        stdin.write_all(src.as_bytes()).await?;
        stdin.shutdown().await
    };
    let (written, output) = tokio::join!(writer, child.wait_with_output());
    let output = output.map_err(|e| format_error(format!("{program} failed: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(format_error(format!(
            "{program} exited with {}: {}",
            output.status,
            stderr.trim()
        )));
    }
    written.map_err(|e| format_error(format!("cannot write to {program}: {e}")))?;

    String::from_utf8(output.stdout)
        .map_err(|_| format_error(format!("{program} produced invalid UTF-8")))
}
