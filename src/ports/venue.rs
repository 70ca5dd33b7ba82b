//! Order-Book Venue Port - External Exchange Interface
//!
//! The venue is the source of truth for order fill state. It tracks
//! filled and cancelled taker amounts keyed by the canonical order hash
//! and settles fills atomically: signature, expiry, taker restriction
//! and fee routing are verified before any token moves.

use alloy::primitives::{Address, B256, U256};
use async_trait::async_trait;

use crate::domain::order::Order;
use crate::error::VenueError;

/// Trait for order-book venues.
#[async_trait]
pub trait OrderBookVenue: Send + Sync + 'static {
  /// Venue address; part of every order hash.
  fn address(&self) -> Address;

  /// Settlement proxy that pulls tokens from makers and takers.
  /// Traders approve this address, not the venue itself.
  fn token_transfer_proxy(&self) -> Address;

  /// Token in which maker and taker fees are paid.
  fn fee_token(&self) -> Address;

  /// Taker amount filled so far for `order_hash`.
  async fn filled(&self, order_hash: B256) -> Result<U256, VenueError>;

  /// Taker amount cancelled by the maker for `order_hash`.
  async fn cancelled(&self, order_hash: B256) -> Result<U256, VenueError>;

  /// Filled plus cancelled taker amount for `order_hash`.
  async fn unavailable_taker_amount(&self, order_hash: B256) -> Result<U256, VenueError>;

  /// Fill up to `fill_taker_amount` of `order` as `taker`.
  ///
  /// The fill is clamped to the order's remaining amount. Returns the
  /// taker amount actually filled.
  ///
  /// # Errors
  /// Invalid signature, expired order, nothing left to fill, taker
  /// restriction, excessive rounding, or insufficient balances /
  /// allowances on either side.
  async fn fill_order(
    &self,
    taker: Address,
    order: &Order,
    fill_taker_amount: U256,
  ) -> Result<U256, VenueError>;

  /// Fill exactly `fill_taker_amount` of `order` as `taker`, or nothing.
  ///
  /// Fails with `VenueError::InsufficientRemaining` before any token moves
  /// when less than the requested amount is left at fill time.
  async fn fill_or_kill_order(
    &self,
    taker: Address,
    order: &Order,
    fill_taker_amount: U256,
  ) -> Result<U256, VenueError>;

  /// Cancel up to `cancel_taker_amount` of `order`; only the maker may.
  ///
  /// Returns the taker amount actually cancelled.
  async fn cancel_order(
    &self,
    caller: Address,
    order: &Order,
    cancel_taker_amount: U256,
  ) -> Result<U256, VenueError>;
}
