//! Exchange Adapter Port - Uniform Trade-Execution Contract
//!
//! The lending core trades through this trait without knowing which
//! venue sits behind it. Each adapter normalizes one external order
//! format (partial fills, fees, expiry, cancellation) into three calls:
//! quote cost, quote capacity, execute.
//!
//! Rounding contract:
//! - `get_exchange_cost` rounds UP (never under-ask)
//! - `get_max_maker_amount` rounds DOWN (never over-report liquidity)

use alloy::primitives::{Address, Bytes, U256};
use async_trait::async_trait;

use crate::error::AdapterError;

/// Arguments of a single `exchange` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExchangeRequest {
  /// Immediate caller; must be in the adapter's authorization set.
  pub caller: Address,
  /// Account on whose behalf the trade is made (for audit).
  pub trade_originator: Address,
  /// Receives the maker-token proceeds.
  pub receiver: Address,
  /// Token being bought.
  pub maker_token: Address,
  /// Token being sold; must already sit in the adapter's balance.
  pub taker_token: Address,
  /// Taker-token amount to sell.
  pub requested_taker_amount: U256,
  /// Venue-specific order payload.
  pub order_payload: Bytes,
}

/// Trait for exchange adapters.
#[async_trait]
pub trait ExchangeAdapter: Send + Sync + 'static {
  /// Address that holds custody during a trade; callers pre-fund it.
  fn address(&self) -> Address;

  /// Taker-token amount required to obtain `desired_maker_amount`,
  /// rounded up.
  async fn get_exchange_cost(
    &self,
    maker_token: Address,
    taker_token: Address,
    desired_maker_amount: U256,
    order_payload: &[u8],
  ) -> Result<U256, AdapterError>;

  /// Maker-token amount still obtainable from the order, rounded down.
  ///
  /// Returns zero (not an error) for malformed, expired or fully
  /// consumed orders.
  async fn get_max_maker_amount(
    &self,
    maker_token: Address,
    taker_token: Address,
    order_payload: &[u8],
  ) -> Result<U256, AdapterError>;

  /// Execute the trade and forward proceeds to `request.receiver`.
  ///
  /// Returns the maker-token amount delivered.
  async fn exchange(&self, request: ExchangeRequest) -> Result<U256, AdapterError>;
}
