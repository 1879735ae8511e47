//! WordPulse CLI entry point

use anyhow::{Context, Result};
use std::sync::Arc;
use wordpulse::config::cli::{Cli, ExecutionMode};
use wordpulse::config::Config;

fn main() -> Result<()> {
    println!("WordPulse v{}", env!("CARGO_PKG_VERSION"));
    println!("Distributed word-frequency counting tool");
    println!();

    let cli = Cli::parse_args();
    cli.validate()?;

    match cli.mode {
        ExecutionMode::Standalone => run_standalone(cli),
        ExecutionMode::Coordinator => run_coordinator(cli),
        ExecutionMode::Worker => run_worker(cli),
    }
}

/// Run in standalone mode (single machine)
///
/// Uses the same distributed architecture as coordinator mode, against
/// auto-spawned worker processes on localhost.
fn run_standalone(cli: Cli) -> Result<()> {
    let config = build_config_from_cli(&cli)?;
    wordpulse::config::validator::validate_config(&config)
        .context("Configuration validation failed")?;

    println!("Starting {} local workers...", config.workers);

    let ports = find_available_ports(config.workers)?;
    let mut workers = Vec::with_capacity(ports.len());
    for port in &ports {
        workers.push(launch_localhost_worker(*port)?);
    }

    // Give the services a moment to come up
    std::thread::sleep(std::time::Duration::from_millis(500));

    let worker_addresses: Vec<String> =
        ports.iter().map(|port| format!("localhost:{}", port)).collect();

    let runtime = tokio::runtime::Runtime::new().context("Failed to create tokio runtime")?;

    let result = runtime.block_on(async {
        let coordinator =
            wordpulse::distributed::Coordinator::new(Arc::new(config), worker_addresses)
                .context("Failed to create coordinator")?;

        coordinator.run().await
    });

    // Cleanup worker processes
    for worker in workers {
        if let Err(e) = cleanup_worker(worker) {
            eprintln!("Warning: Failed to cleanup worker: {}", e);
        }
    }

    result
}

/// Run in coordinator mode (distributed orchestration)
fn run_coordinator(cli: Cli) -> Result<()> {
    // Parse worker addresses
    let worker_addresses = if let Some(ref host_list) = cli.host_list {
        // Parse comma-separated list
        host_list
            .split(',')
            .map(|s| {
                let addr = s.trim();
                // Add port if not specified
                if addr.contains(':') {
                    addr.to_string()
                } else {
                    format!("{}:{}", addr, cli.worker_port)
                }
            })
            .collect()
    } else if let Some(ref clients_file) = cli.clients_file {
        // Read from file
        let content = std::fs::read_to_string(clients_file)
            .context("Failed to read clients file")?;

        content
            .lines()
            .filter(|line| !line.trim().is_empty() && !line.trim().starts_with('#'))
            .map(|line| {
                let addr = line.trim();
                if addr.contains(':') {
                    addr.to_string()
                } else {
                    format!("{}:{}", addr, cli.worker_port)
                }
            })
            .collect()
    } else {
        anyhow::bail!("Coordinator mode requires --host-list or --clients-file");
    };

    let config = build_config_from_cli(&cli)?;
    wordpulse::config::validator::validate_config(&config)
        .context("Configuration validation failed")?;

    let runtime = tokio::runtime::Runtime::new().context("Failed to create tokio runtime")?;

    runtime.block_on(async {
        let coordinator =
            wordpulse::distributed::Coordinator::new(Arc::new(config), worker_addresses)
                .context("Failed to create coordinator")?;

        coordinator.run().await
    })
}

/// Run in worker mode (distributed worker service)
fn run_worker(cli: Cli) -> Result<()> {
    let runtime = tokio::runtime::Runtime::new().context("Failed to create tokio runtime")?;

    runtime.block_on(async {
        let service = wordpulse::distributed::WorkerService::bind(cli.listen_port)
            .await
            .context("Failed to create worker service")?;

        service.run().await
    })
}

/// Build configuration from CLI arguments (merged with TOML file if given)
fn build_config_from_cli(cli: &Cli) -> Result<Config> {
    if let Some(ref config_path) = cli.config {
        let file_config = wordpulse::config::toml::parse_toml_file(config_path)?;
        return wordpulse::config::toml::merge_cli_with_config(cli, file_config);
    }

    let input = cli
        .input
        .clone()
        .ok_or_else(|| anyhow::anyhow!("Input file required"))?;

    Ok(Config {
        input,
        output: cli.output.clone(),
        workers: cli.workers.unwrap_or_else(wordpulse::config::default_workers),
    })
}

/// Find available localhost ports for the worker pool
fn find_available_ports(count: usize) -> Result<Vec<u16>> {
    use std::net::TcpListener;

    let mut ports = Vec::with_capacity(count);

    // Try ports 9999-10099
    for port in 9999..10100 {
        if ports.len() == count {
            break;
        }
        if let Ok(listener) = TcpListener::bind(("127.0.0.1", port)) {
            drop(listener);
            ports.push(port);
        }
    }

    if ports.len() < count {
        anyhow::bail!(
            "Only {} of {} ports available in range 9999-10099. Close other WordPulse instances or reduce --workers.",
            ports.len(),
            count
        );
    }

    Ok(ports)
}

/// Launch a localhost worker process in the background
fn launch_localhost_worker(port: u16) -> Result<std::process::Child> {
    use std::process::{Command, Stdio};

    // Get current executable path
    let exe_path = std::env::current_exe().context("Failed to get current executable path")?;

    let mut cmd = Command::new(&exe_path);
    cmd.arg("--mode").arg("worker");
    cmd.arg("--listen-port").arg(port.to_string());
    cmd.stdout(Stdio::null());
    cmd.stderr(Stdio::null());

    let child = cmd.spawn().context("Failed to spawn worker process")?;

    Ok(child)
}

/// Cleanup a worker process
fn cleanup_worker(mut worker: std::process::Child) -> Result<()> {
    // The service loops waiting for the next coordinator, so a graceful exit
    // only happens if it already failed; otherwise kill it.
    match worker.try_wait()? {
        Some(_status) => Ok(()),
        None => {
            worker.kill()?;
            worker.wait()?;
            Ok(())
        }
    }
}
