//! Dragline CLI: replay recorded pointer traces through the gesture controller.
//!
//! Usage:
//!   dragline replay <TRACE>    Replay a trace and print the notifications
//!   dragline config            Show the effective configuration

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "dragline",
    about = "Pointer drag-gesture recognition and trace replay",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a JSONL pointer trace
    Replay {
        /// Path to the trace file
        trace: PathBuf,

        /// Write notifications to this JSONL file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Drag delay in milliseconds (overrides config)
        #[arg(long)]
        delay: Option<u64>,

        /// Detach threshold in pixels (overrides config)
        #[arg(long)]
        threshold: Option<f64>,

        /// Threshold metric: manhattan|signed-sum|euclidean
        #[arg(long)]
        metric: Option<String>,

        /// Feed events through the async pump at recorded speed
        #[arg(long)]
        live: bool,

        /// Print the replay summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show or initialize the configuration file
    Config {
        /// Write the default configuration to the standard location
        #[arg(long)]
        init: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = dragline_common::config::DraglineConfig::load();

    let mut logging = config.logging.clone();
    if cli.verbose {
        logging.level = "debug".to_string();
    }
    dragline_common::logging::init_logging(&logging);

    match cli.command {
        Commands::Replay {
            trace,
            output,
            delay,
            threshold,
            metric,
            live,
            json,
        } => {
            let options = commands::replay::ReplayOptions {
                output,
                delay,
                threshold,
                metric,
                live,
                json,
            };
            commands::replay::run(trace, &config, options).await
        }
        Commands::Config { init } => commands::config::run(&config, init),
    }
}
