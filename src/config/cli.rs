//! CLI argument parsing using clap

use anyhow::Result;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Execution mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExecutionMode {
    /// Standalone mode (default) - spawn local workers and count on one machine
    Standalone,
    /// Coordinator mode - orchestrate a distributed count across workers
    Coordinator,
    /// Worker mode - run the worker service (accepts coordinator commands)
    Worker,
}

/// WordPulse - Distributed word-frequency counting tool
#[derive(Parser, Debug)]
#[command(name = "wordpulse")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Execution mode: standalone, coordinator, or worker
    #[arg(long, value_enum, default_value = "standalone")]
    pub mode: ExecutionMode,

    /// Port for the worker service to listen on (worker mode only)
    #[arg(long, default_value = "9999")]
    pub listen_port: u16,

    /// Comma-separated list of worker addresses for coordinator mode
    /// (e.g., "10.0.1.10:9999,10.0.1.11:9999")
    #[arg(long)]
    pub host_list: Option<String>,

    /// File containing worker addresses (one per line, for coordinator mode)
    #[arg(long)]
    pub clients_file: Option<PathBuf>,

    /// Port to connect to on workers when an address has none (coordinator mode only)
    #[arg(long, default_value = "9999")]
    pub worker_port: u16,

    /// Input text file (whitespace-delimited words)
    ///
    /// Not required in worker mode (the coordinator sends the partitions)
    #[arg(value_name = "INPUT")]
    pub input: Option<PathBuf>,

    /// Output file for the result table
    #[arg(short = 'o', long, default_value = "counts.txt")]
    pub output: PathBuf,

    /// Number of workers (standalone mode; defaults to one per CPU)
    #[arg(short = 'w', long)]
    pub workers: Option<usize>,

    /// TOML configuration file (CLI arguments take precedence)
    #[arg(short = 'c', long)]
    pub config: Option<PathBuf>,
}

impl Cli {
    /// Parse command-line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate mode-specific argument combinations
    pub fn validate(&self) -> Result<()> {
        match self.mode {
            ExecutionMode::Standalone | ExecutionMode::Coordinator => {
                if self.input.is_none() && self.config.is_none() {
                    anyhow::bail!("Input file required (positional argument or --config)");
                }
            }
            ExecutionMode::Worker => {}
        }

        if self.mode == ExecutionMode::Coordinator
            && self.host_list.is_none()
            && self.clients_file.is_none()
        {
            anyhow::bail!("Coordinator mode requires --host-list or --clients-file");
        }

        if self.workers == Some(0) {
            anyhow::bail!("--workers must be at least 1");
        }

        Ok(())
    }
}
