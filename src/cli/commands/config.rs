//! Configuration commands.

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use serde::Serialize;
use std::path::PathBuf;

use crate::cli::output::{output, CommandOutput};
use crate::domain::models::Config;
use crate::infrastructure::config::ConfigLoader;

#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Print the effective configuration after merging all sources
    Show,
    /// Validate a configuration file, or the merged configuration
    Validate {
        /// Config file to validate instead of .amber/
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

#[derive(Debug, Serialize)]
pub struct ConfigShowOutput {
    pub config: Config,
}

impl CommandOutput for ConfigShowOutput {
    fn to_human(&self) -> String {
        serde_yaml::to_string(&self.config).unwrap_or_default()
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(&self.config).unwrap_or_default()
    }
}

#[derive(Debug, Serialize)]
pub struct ConfigValidateOutput {
    pub valid: bool,
    pub source: String,
    pub identities: usize,
}

impl CommandOutput for ConfigValidateOutput {
    fn to_human(&self) -> String {
        format!(
            "Configuration is valid ({}, {} identities)",
            self.source, self.identities
        )
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub async fn execute(args: ConfigArgs, json_mode: bool) -> Result<()> {
    match args.command {
        ConfigCommands::Show => {
            let config = ConfigLoader::load().context("Failed to load configuration")?;
            output(&ConfigShowOutput { config }, json_mode);
        }

        ConfigCommands::Validate { file } => {
            let (config, source) = match file {
                Some(path) => (
                    ConfigLoader::load_from_file(&path)?,
                    path.display().to_string(),
                ),
                None => (ConfigLoader::load()?, ".amber/".to_string()),
            };

            let out = ConfigValidateOutput {
                valid: true,
                source,
                identities: config.identities.len(),
            };
            output(&out, json_mode);
        }
    }

    Ok(())
}
