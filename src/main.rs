// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use the_layercake::config::{load_config, JobRegistry};
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Run layered map/reduce pipelines described by YAML or TOML files.
#[derive(Debug, Parser)]
#[command(name = "the-layercake", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Build and run the pipeline described by a config file.
    Run {
        /// Pipeline config (.yaml, .yml or .toml).
        config: PathBuf,

        /// Directory that input and output paths are relative to.
        /// Defaults to the current directory.
        #[arg(long)]
        base_dir: Option<PathBuf>,
    },
    /// List the jobs a config file can reference.
    Jobs,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so a stdout output stays machine readable.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    debug!("Parsed command line arguments: {:?}", cli);
    let registry = JobRegistry::with_builtin_jobs();

    match cli.command {
        Command::Run { config, base_dir } => {
            let base_dir = match base_dir {
                Some(dir) => dir,
                None => std::env::current_dir().context("resolving current directory")?,
            };
            let pipeline_config = load_config(&config)
                .with_context(|| format!("loading {}", config.display()))?;
            let pipeline = pipeline_config.build(&registry, &base_dir)?;
            let count = pipeline.start().await?;
            eprintln!("{count} results written");
        }
        Command::Jobs => {
            for name in registry.names() {
                println!("{name}");
            }
        }
    }
    Ok(())
}
