//! Command-line interface
//!
//! Local driver for the dispatch core: inspect the registered tools, run one
//! invocation through the full pipeline, and check configuration.

pub mod commands;
pub mod output;

use clap::{Parser, Subcommand};

use commands::config::ConfigArgs;
use commands::run::RunArgs;
use commands::tools::ToolsArgs;

#[derive(Parser, Debug)]
#[command(name = "amber")]
#[command(about = "Amber - command dispatch core for conversational assistants", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Inspect registered tools
    Tools(ToolsArgs),

    /// Run a command through the dispatch pipeline
    Run(RunArgs),

    /// Show or validate configuration
    Config(ConfigArgs),
}

/// Print a top-level error and exit non-zero.
pub fn handle_error(err: anyhow::Error, json_mode: bool) -> ! {
    if json_mode {
        let body = serde_json::json!({
            "success": false,
            "error": format!("{err:#}"),
        });
        println!("{}", serde_json::to_string_pretty(&body).unwrap_or_default());
    } else {
        eprintln!("Error: {err:#}");
    }
    std::process::exit(1);
}
