//! Credrank CLI - Command-line interface for credrank
//!
//! This is the main entry point for users interacting with credrank.
//! It scores an example contribution graph and manages weight files.

use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod demo;

#[derive(Parser)]
#[command(name = "credrank")]
#[command(author = "Credrank Contributors")]
#[command(version)]
#[command(about = "Weighted PageRank over contribution graphs", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score the built-in example contribution graph
    Demo {
        /// Maximum PageRank iterations
        #[arg(long, default_value = "255")]
        max_iterations: usize,

        /// Stop once no score moves by more than this
        #[arg(long, default_value = "1e-7")]
        threshold: f64,

        /// Weights file overriding the plugin defaults
        #[arg(short, long)]
        weights: Option<PathBuf>,

        /// Number of nodes to show
        #[arg(short, long, default_value = "10")]
        limit: usize,

        /// Output as JSON instead of formatted text
        #[arg(long)]
        json: bool,
    },

    /// Show the default weights, or write them to a file for editing
    Weights {
        /// Output file for the weights JSON
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Set up logging
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .with(tracing_subscriber::EnvFilter::new(filter))
        .init();

    let result = match cli.command {
        Commands::Demo {
            max_iterations,
            threshold,
            weights,
            limit,
            json,
        } => {
            commands::demo(
                max_iterations,
                threshold,
                weights.as_deref(),
                limit,
                json,
            )
            .await
        }
        Commands::Weights { output } => commands::weights(output.as_deref()),
    };

    if let Err(e) = result {
        eprintln!("{} {}", "error:".red().bold(), e);
        std::process::exit(1);
    }
}
