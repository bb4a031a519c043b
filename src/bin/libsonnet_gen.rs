//! Library Generator CLI
//!
//! Reads a schema document and writes the generated Jsonnet library.
//!
//! Usage:
//!   libsonnet-gen swagger.json -o k8s.libsonnet
//!   libsonnet-gen swagger.json --customizations custom.toml --check k8s.libsonnet

use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use libsonnet_gen::{detect_drift, generate_library, GenConfig, Provenance, SchemaDocument};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "libsonnet-gen")]
#[command(about = "Generate a Jsonnet library from an OpenAPI schema document")]
struct Cli {
    /// Schema document (swagger.json)
    schema: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Configuration file
    #[arg(short, long)]
    config: Option<String>,

    /// Customization tables (overrides `output.customizations`)
    #[arg(long)]
    customizations: Option<PathBuf>,

    /// Library revision stamped into the header
    #[arg(long)]
    library_revision: Option<String>,

    /// Schema revision stamped into the header
    #[arg(long)]
    schema_revision: Option<String>,

    /// Compare against an existing library instead of writing; exit 1 on drift
    #[arg(long, conflicts_with = "output")]
    check: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match run(cli) {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Returns `Ok(false)` when a drift check found differences
fn run(cli: Cli) -> anyhow::Result<bool> {
    let mut config = GenConfig::load_from(cli.config.as_deref()).context("loading configuration")?;
    if let Some(path) = cli.customizations {
        config.output.customizations = Some(path);
    }
    if cli.library_revision.is_some() {
        config.output.library_revision = cli.library_revision;
    }
    if cli.schema_revision.is_some() {
        config.output.schema_revision = cli.schema_revision;
    }

    let customizations = config.customizations()?;
    let naming = config.naming_policy(&customizations);
    let document = SchemaDocument::from_path(&cli.schema)
        .with_context(|| format!("reading schema {}", cli.schema.display()))?;
    let provenance = Provenance {
        library_revision: config.output.library_revision.clone(),
        schema_revision: config.output.schema_revision.clone(),
    };

    let output = generate_library(document, provenance, &naming, &customizations)?;

    if !output.diagnostics.is_empty() {
        eprintln!("{}", output.diagnostics.format_all());
    }
    eprintln!(
        "Generated {} objects ({} properties, {} aliases) from schema {}",
        output.stats.objects,
        output.stats.properties,
        output.stats.aliases,
        output.schema_checksum.short()
    );

    if let Some(path) = cli.check {
        let stored = fs::read_to_string(&path).with_context(|| format!("reading {}", path.display()))?;
        return Ok(match detect_drift(&stored, &output.code) {
            None => {
                eprintln!("{} is up to date", path.display());
                true
            }
            Some(report) => {
                print!("{}", report.diff);
                eprintln!(
                    "{} is out of date (+{} -{} lines)",
                    path.display(),
                    report.added,
                    report.removed
                );
                false
            }
        });
    }

    match cli.output {
        Some(path) => {
            fs::write(&path, &output.code).with_context(|| format!("writing {}", path.display()))?;
            eprintln!("Wrote {}", path.display());
        }
        None => print!("{}", output.code),
    }
    Ok(true)
}
