//! Configuration validation

use super::Config;
use anyhow::Result;

/// Validate complete configuration
pub fn validate_config(config: &Config) -> Result<()> {
    if config.workers == 0 {
        anyhow::bail!("workers must be at least 1, got {}", config.workers);
    }

    if config.input == config.output {
        anyhow::bail!(
            "Input and output must be different files: {}",
            config.input.display()
        );
    }

    Ok(())
}
