//! TOML configuration file parsing

use super::Config;
use crate::config::cli::Cli;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Parse TOML configuration file
pub fn parse_toml_file(path: &Path) -> Result<Config> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    parse_toml_string(&contents)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Parse TOML configuration from string
pub fn parse_toml_string(contents: &str) -> Result<Config> {
    let config: Config =
        ::toml::from_str(contents).context("Failed to parse TOML configuration")?;

    Ok(config)
}

/// Merge CLI arguments with TOML configuration (CLI takes precedence)
pub fn merge_cli_with_config(cli: &Cli, mut config: Config) -> Result<Config> {
    if let Some(ref input) = cli.input {
        config.input = input.clone();
    }

    // Override output only when it differs from the CLI default
    if cli.output != PathBuf::from("counts.txt") {
        config.output = cli.output.clone();
    }

    if let Some(workers) = cli.workers {
        config.workers = workers;
    }

    Ok(config)
}
