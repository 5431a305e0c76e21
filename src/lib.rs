pub mod config;
pub mod models;
pub mod pipeline;
pub mod schema;

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::config::ClassifierConfig;
use crate::models::enums::ReportFlavor;
use crate::pipeline::processor::{ReportInput, ReportProcessor};

#[derive(Debug, Parser)]
#[command(name = "sectorscan", version, about = "Classify industries in survey report narratives")]
struct Cli {
    /// Classifier config (JSON). Defaults to the user config dir.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Classify one or more report files (a report object or an array of them).
    Classify {
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Write the JSON result here instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Override the flavor of every report.
        #[arg(long)]
        flavor: Option<String>,
        /// Report all-invalid classifications as-is.
        #[arg(long)]
        no_forced_pass: bool,
        /// Write per-report pipeline artifacts under this directory.
        #[arg(long)]
        dump_dir: Option<PathBuf>,
    },
    /// Print the active canonical schema.
    Schema {
        #[arg(long, default_value = "manufacturing")]
        flavor: String,
    },
}

pub fn run() -> anyhow::Result<()> {
    // Logs go to stderr; stdout carries JSON output
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env(config::LOG_ENV_VAR)
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    tracing::debug!("Sectorscan starting v{}", config::APP_VERSION);

    let mut config = ClassifierConfig::load(cli.config.as_deref())?;

    match cli.command {
        Command::Classify {
            files,
            output,
            flavor,
            no_forced_pass,
            dump_dir,
        } => {
            if no_forced_pass {
                config.forced_pass = false;
            }
            if dump_dir.is_some() {
                config.dump_dir = dump_dir;
            }
            let flavor = flavor.as_deref().map(parse_flavor).transpose()?;

            let mut inputs = Vec::new();
            for file in &files {
                inputs.extend(load_inputs(file)?);
            }
            if let Some(flavor) = flavor {
                for input in &mut inputs {
                    input.flavor = Some(flavor.as_str().to_string());
                }
            }

            let processor = ReportProcessor::new(config)?;
            let reports = processor.process_batch(&inputs);
            tracing::info!(
                files = files.len(),
                reports = reports.len(),
                forced = reports.iter().filter(|r| r.validation.forced_pass.is_some()).count(),
                "Classification complete"
            );
            write_json(output.as_deref(), &reports)
        }
        Command::Schema { flavor } => {
            let processor = ReportProcessor::new(config)?;
            let schema = processor.schema_for(parse_flavor(&flavor)?);
            write_json(None, &schema)
        }
    }
}

fn parse_flavor(label: &str) -> anyhow::Result<ReportFlavor> {
    Ok(ReportFlavor::from_label(label)?)
}

/// A report file holds one report object or an array of them.
fn load_inputs(path: &Path) -> anyhow::Result<Vec<ReportInput>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let value: serde_json::Value =
        serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))?;
    let inputs = match value {
        serde_json::Value::Array(items) => items
            .into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<ReportInput>, _>>(),
        other => serde_json::from_value(other).map(|input| vec![input]),
    };
    inputs.with_context(|| format!("decoding reports in {}", path.display()))
}

fn write_json<T: serde::Serialize>(output: Option<&Path>, value: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    match output {
        Some(path) => std::fs::write(path, json + "\n")
            .with_context(|| format!("writing {}", path.display()))?,
        None => {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{json}")?;
        }
    }
    Ok(())
}
