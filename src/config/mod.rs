//! Configuration module
//!
//! Handles CLI argument parsing, TOML configuration files, and validation.

pub mod cli;
pub mod toml;
pub mod validator;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Complete run configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Input text file (whitespace-delimited words)
    pub input: PathBuf,

    /// Output file for the result table (one `<word> <count>` line per entry)
    #[serde(default = "default_output")]
    pub output: PathBuf,

    /// Worker pool size
    #[serde(default = "default_workers")]
    pub workers: usize,
}

fn default_output() -> PathBuf {
    PathBuf::from("counts.txt")
}

/// Default worker pool size: one worker per CPU.
pub fn default_workers() -> usize {
    num_cpus::get().max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_apply() {
        let config: Config = ::toml::from_str("input = \"speech.txt\"").unwrap();
        assert_eq!(config.input, PathBuf::from("speech.txt"));
        assert_eq!(config.output, PathBuf::from("counts.txt"));
        assert!(config.workers >= 1);
    }
}
