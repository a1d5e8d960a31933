//! blink-suppress - Blink Suppressor command-line driver
//!
//! Suppresses a blend shape in JSON mesh documents, or runs the full build
//! pass on JSON subject documents.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use blink_suppress::{default_output, inspect_mesh, suppress_mesh, suppress_subject};
use blink_suppressor_core::PassOutcome;

#[derive(Parser)]
#[command(name = "blink-suppress")]
#[command(about = "Duplicate blend-shape-affected geometry behind a hard toggle channel")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Suppress one blend shape of a mesh document
    Mesh {
        /// Input mesh JSON
        input: PathBuf,

        /// Blend shape index to suppress
        #[arg(short, long)]
        channel: usize,

        /// Minimum vertex displacement (overrides the settings file)
        #[arg(short, long)]
        threshold: Option<f32>,

        /// Suppressor settings TOML
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output mesh JSON (default: <input>.suppressed.json)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Run the build pass on a subject document
    Subject {
        /// Input subject JSON
        input: PathBuf,

        /// Output subject JSON (default: <input>.suppressed.json)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print statistics of a mesh document
    Inspect {
        /// Input mesh JSON
        input: PathBuf,
    },
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Mesh {
            input,
            channel,
            threshold,
            config,
            output,
        } => {
            let output = output.unwrap_or_else(|| default_output(&input));
            tracing::info!("Suppressing channel {} of {:?} -> {:?}", channel, input, output);
            let result = suppress_mesh(&input, &output, channel, threshold, config.as_deref())?;
            tracing::info!(
                "Done! {} vertices, {} primitives duplicated, toggle '{}'",
                result.affected_vertices,
                result.affected_primitives,
                result.toggle.name
            );
        }

        Commands::Subject { input, output } => {
            let output = output.unwrap_or_else(|| default_output(&input));
            tracing::info!("Building {:?} -> {:?}", input, output);
            match suppress_subject(&input, &output)? {
                PassOutcome::Applied(report) => tracing::info!(
                    "Done! toggle '{}', {} clips retargeted",
                    report.toggle.name,
                    report.clips_rewritten
                ),
                PassOutcome::Skipped(reason) => tracing::info!("Skipped: {:?}", reason),
            }
        }

        Commands::Inspect { input } => {
            let stats = inspect_mesh(&input)?;
            print!("{}", stats);
        }
    }

    Ok(())
}
