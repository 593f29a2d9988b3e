//! ginapi CLI entrypoint
//! Parses command-line arguments and dispatches to the core generator.

// Internal imports (std, crate)
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process::ExitCode;

// External imports (alphabetized)
use anyhow::{bail, Context};
use clap::error::ErrorKind;
use clap::Parser;
use ginapi_core::Config;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "ginapi")]
#[command(author, about, long_about = None, disable_version_flag = true)]
struct Cli {
    /// Output directory of openapi-generator (holds go/ and api/openapi.yaml)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Server variables as a JSON object, e.g. '{"version": "v1"}'
    #[arg(long)]
    vars: Option<String>,

    /// Pass *gin.Context as the first argument of every service method
    #[arg(long)]
    ctx: bool,

    /// Comma separated tags whose operations are skipped
    #[arg(long, value_delimiter = ',')]
    ignored_tags: Vec<String>,

    /// Output directory (default: <input>/ginapi)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Go package of the generated files (default: ginapi)
    #[arg(long)]
    package: Option<String>,

    /// Import path providing GinRegistry and the Param* binders;
    /// common.go and validation.go are not generated when set
    #[arg(long)]
    runtime_package: Option<String>,

    /// Formatter command (default: gofmt)
    #[arg(long, conflicts_with = "no_fmt")]
    gofmt: Option<String>,

    /// Write the generated sources unformatted
    #[arg(long)]
    no_fmt: bool,

    /// Directory of templates overriding the built-in ones
    #[arg(long)]
    template_dir: Option<PathBuf>,

    /// Configuration file (YAML, JSON or TOML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print version
    #[arg(short, long)]
    version: bool,
}

impl Cli {
    /// Build the effective configuration, flags taking precedence over the file.
    async fn into_config(self) -> anyhow::Result<Config> {
        let mut config = match (&self.config, &self.input) {
            (Some(path), _) => Config::from_file(path).await?,
            (None, Some(input)) => Config::new(input),
            (None, None) => bail!("input path is required (-i)"),
        };

        if let Some(input) = self.input {
            config.input_dir = input;
        }
        if let Some(vars) = self.vars {
            config.server_vars = parse_vars(&vars)?;
        }
        if self.ctx {
            config.gin_context = true;
        }
        if !self.ignored_tags.is_empty() {
            config.ignored_tags = self
                .ignored_tags
                .into_iter()
                .map(|tag| tag.trim().to_string())
                .filter(|tag| !tag.is_empty())
                .collect();
        }
        if let Some(output) = self.output {
            config.output_dir = Some(output);
        }
        if let Some(package) = self.package {
            config.package_name = package;
        }
        if let Some(runtime_package) = self.runtime_package {
            config.runtime_package = Some(runtime_package);
        }
        if let Some(gofmt) = self.gofmt {
            config.gofmt = Some(gofmt);
        }
        if self.no_fmt {
            config.gofmt = None;
        }
        if let Some(template_dir) = self.template_dir {
            config.template_dir = Some(template_dir);
        }
        Ok(config)
    }
}

fn parse_vars(vars: &str) -> anyhow::Result<BTreeMap<String, String>> {
    serde_json::from_str(vars).with_context(|| format!("invalid --vars {vars:?}"))
}

/// `ERROR: <component>: <message>`, the component being `cli` for errors
/// raised here.
fn describe(err: &anyhow::Error) -> String {
    match err.downcast_ref::<ginapi_core::Error>() {
        Some(core) => format!("ERROR: {}: {}", core.component(), core),
        None => format!("ERROR: cli: {err:#}"),
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = cli.into_config().await?;
    tracing::debug!(?config, "Effective configuration");

    let written = ginapi_core::generate(&config).await?;
    for path in &written {
        tracing::debug!("{}", path.display());
    }
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => match err.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                let _ = err.print();
                return ExitCode::SUCCESS;
            }
            _ => {
                let message = err.to_string();
                let first = message.lines().next().unwrap_or_default();
                eprintln!("ERROR: cli: {}", first.trim_start_matches("error: "));
                return ExitCode::FAILURE;
            }
        },
    };

    if cli.version {
        println!("ginapi {}", env!("CARGO_PKG_VERSION"));
        return ExitCode::SUCCESS;
    }

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{}", describe(&err));
            ExitCode::FAILURE
        }
    }
}
