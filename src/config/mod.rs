//! Configuration Module - TOML-based Settlement Configuration
//!
//! Loads and validates configuration from `config.toml`.
//! Venue addresses, the adapter's authorized callers and the auction
//! ramp are externalized here - nothing is hardcoded in the domain layer.

pub mod loader;

use alloy::primitives::{Address, U256};
use serde::Deserialize;

use crate::domain::auction::DutchAuctionPricer;
use crate::domain::authorization::AuthorizationSet;
use crate::error::PricerError;

/// Top-level configuration.
///
/// Loaded from `config.toml` at startup. All fields are validated
/// before any component is built from them.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
  /// Identity and logging.
  pub core: CoreConfig,
  /// Exchange adapter constants.
  pub adapter: AdapterConfig,
  /// Dutch auction ramp.
  pub auction: AuctionConfig,
}

/// Identity configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct CoreConfig {
  /// Human-readable deployment name.
  pub name: String,
  /// Log level (trace, debug, info, warn, error).
  #[serde(default = "default_log_level")]
  pub log_level: String,
}

/// Exchange adapter configuration.
///
/// Contract addresses are ALWAYS in config - never hardcoded.
#[derive(Debug, Clone, Deserialize)]
pub struct AdapterConfig {
  /// Custody address of the adapter.
  pub address: Address,
  /// External order-book venue.
  pub venue: Address,
  /// Venue settlement proxy that pulls approved tokens.
  pub settlement_proxy: Address,
  /// Token used for maker / taker fees.
  pub fee_token: Address,
  /// Callers allowed to invoke `exchange` (normally the lending core).
  pub authorized_callers: Vec<Address>,
}

impl AdapterConfig {
  /// Freeze the configured callers into an authorization set.
  pub fn authorization_set(&self) -> AuthorizationSet {
    AuthorizationSet::new(self.authorized_callers.iter().copied())
  }
}

/// Dutch auction ramp configuration.
///
/// Start and end are fractions in [0, 1]. Whether the ramp rises or
/// falls is protocol policy.
#[derive(Debug, Clone, Deserialize)]
pub struct AuctionConfig {
  #[serde(default)]
  pub start_numerator: u64,
  #[serde(default = "default_one")]
  pub start_denominator: u64,
  #[serde(default = "default_one")]
  pub end_numerator: u64,
  #[serde(default = "default_one")]
  pub end_denominator: u64,
}

impl AuctionConfig {
  /// Build the pricer, failing on bad constants.
  pub fn pricer(&self) -> Result<DutchAuctionPricer, PricerError> {
    DutchAuctionPricer::from_constants(
      U256::from(self.start_numerator),
      U256::from(self.start_denominator),
      U256::from(self.end_numerator),
      U256::from(self.end_denominator),
    )
  }
}

// Default value functions for serde

fn default_log_level() -> String {
  "info".to_string()
}

fn default_one() -> u64 {
  1
}
