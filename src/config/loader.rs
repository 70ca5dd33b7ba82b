//! Configuration Loader - File Loading and Validation
//!
//! Handles loading `config.toml`, validating all parameters,
//! and providing clear error messages for misconfiguration.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use super::AppConfig;

/// Load and validate configuration from a TOML file.
///
/// # Errors
/// Returns detailed error if:
/// - File doesn't exist or can't be read
/// - TOML parsing fails
/// - Validation rules are violated
pub fn load_config(path: &str) -> Result<AppConfig> {
  let path = Path::new(path);

  let content = std::fs::read_to_string(path)
    .with_context(|| format!("Failed to read config file: {}", path.display()))?;

  load_config_str(&content)
}

/// Parse and validate configuration from TOML text.
pub fn load_config_str(content: &str) -> Result<AppConfig> {
  let config: AppConfig = toml::from_str(content)
    .with_context(|| "Failed to parse config.toml")?;

  validate_config(&config)?;

  info!(
    name = %config.core.name,
    venue = %config.adapter.venue,
    authorized = config.adapter.authorized_callers.len(),
    "Configuration loaded successfully"
  );

  Ok(config)
}

/// Validate all configuration parameters.
///
/// Checks for:
/// - Non-zero adapter, venue, proxy and fee-token addresses
/// - A non-empty authorization set with no zero address
/// - Auction fractions within [0, 1]
fn validate_config(config: &AppConfig) -> Result<()> {
  let adapter = &config.adapter;

  for (name, addr) in [
    ("adapter.address", adapter.address),
    ("adapter.venue", adapter.venue),
    ("adapter.settlement_proxy", adapter.settlement_proxy),
    ("adapter.fee_token", adapter.fee_token),
  ] {
    anyhow::ensure!(!addr.is_zero(), "{name} must not be the zero address");
  }

  anyhow::ensure!(
    !adapter.authorized_callers.is_empty(),
    "adapter.authorized_callers must list at least one caller"
  );
  anyhow::ensure!(
    adapter.authorized_callers.iter().all(|a| !a.is_zero()),
    "adapter.authorized_callers must not contain the zero address"
  );

  config
    .auction
    .pricer()
    .context("Invalid auction constants")?;

  Ok(())
}
