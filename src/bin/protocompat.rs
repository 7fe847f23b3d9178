//! Compatibility Checker CLI
//!
//! Compares a newer schema against an older one and exits non-zero when a
//! breaking change is found.
//!
//! Usage:
//!   protocompat next.pb build/next:proto released.pb build/released
//!   protocompat            (configured defaults, else the built-in demo pair)

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Context};
use clap::Parser;
use proto_compat::{
    compare, demo, load_tree, CompatConfig, OutputFormat, SchemaLocation, SchemaTree,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "protocompat")]
#[command(about = "Check that a newer protobuf schema stays compatible with an older one")]
struct Cli {
    /// Newer schema: a JSON schema tree or a binary descriptor set
    newer: Option<PathBuf>,

    /// Colon-separated directories searched for the newer schema
    newer_deps: Option<String>,

    /// Older schema: a JSON schema tree or a binary descriptor set
    older: Option<PathBuf>,

    /// Colon-separated directories searched for the older schema
    older_deps: Option<String>,

    /// Leave the warning section out of the report
    #[arg(short = 'q', long)]
    no_warnings: bool,

    /// Output format (defaults to the configured format)
    #[arg(short, long, value_enum)]
    format: Option<OutputFormat>,

    /// Extra config file, layered over protocompat.toml
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(2)
        }
    }
}

/// Returns whether the two versions are compatible
fn run(cli: Cli) -> anyhow::Result<bool> {
    let config = match &cli.config {
        Some(path) => CompatConfig::load_from(Some(&path.to_string_lossy())),
        None => CompatConfig::load(),
    }
    .context("loading configuration")?;

    let (newer, older) = match (cli.newer, cli.newer_deps, cli.older, cli.older_deps) {
        (Some(newer), Some(newer_deps), Some(older), Some(older_deps)) => (
            load(&SchemaLocation::with_search_path(newer, &newer_deps))?,
            load(&SchemaLocation::with_search_path(older, &older_deps))?,
        ),
        (None, None, None, None) => match config.defaults.pair() {
            Some((newer, older)) => (load(&newer)?, load(&older)?),
            None => {
                info!("no schemas given, comparing the built-in demo pair");
                demo::demo_pair()?
            }
        },
        _ => bail!(
            "expected either no schema arguments or all of NEWER NEWER_DEPS OLDER OLDER_DEPS"
        ),
    };

    let mut report = compare(&newer, &older);
    let suppress_warnings = cli.no_warnings || config.report.suppress_warnings;

    match cli.format.unwrap_or(config.report.format) {
        OutputFormat::Text => print!("{}", report.render(suppress_warnings)),
        OutputFormat::Json => {
            if suppress_warnings {
                report.warnings.clear();
            }
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    info!(
        errors = report.errors.len(),
        warnings = report.warnings.len(),
        compatible = report.is_compatible(),
        "compatibility check finished"
    );
    Ok(report.is_compatible())
}

fn load(location: &SchemaLocation) -> anyhow::Result<SchemaTree> {
    info!(path = %location.path.display(), "loading schema");
    load_tree(location).with_context(|| format!("loading schema {}", location.path.display()))
}
