//! Lending Core Port - Position Reads and the Close Entry Point
//!
//! The lending ledger itself is an external collaborator. The settlement
//! path needs exactly two things from it: a position snapshot and the
//! close mutation, which trades through a caller-chosen exchange adapter.

use std::sync::Arc;

use alloy::primitives::{Address, Bytes, U256};
use async_trait::async_trait;

use crate::domain::position::{Position, PositionId};
use crate::error::LendingError;
use crate::ports::exchange::ExchangeAdapter;

/// A request to close (part of) a position by trading collateral for debt.
#[derive(Clone)]
pub struct CloseRequest {
  pub position_id: PositionId,
  /// Debt units to close; zero means "close the maximum available".
  pub requested_amount: U256,
  /// Smallest close the caller accepts. Checked against the debt at
  /// close time; if it cannot be met nothing is closed.
  pub min_amount: U256,
  /// Receives collateral left over after the debt is repaid.
  pub payout_recipient: Address,
  /// Adapter that executes the collateral -> debt trade.
  pub adapter: Arc<dyn ExchangeAdapter>,
  /// Order payload forwarded verbatim to the adapter.
  pub order_payload: Bytes,
}

impl std::fmt::Debug for CloseRequest {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("CloseRequest")
      .field("position_id", &self.position_id)
      .field("requested_amount", &self.requested_amount)
      .field("min_amount", &self.min_amount)
      .field("payout_recipient", &self.payout_recipient)
      .field("order_payload_len", &self.order_payload.len())
      .finish_non_exhaustive()
  }
}

/// Outcome of a close. `amount_traded == 0` is a valid, non-error result:
/// the position no longer allowed a close of at least `min_amount`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TradeResult {
  /// Debt units actually repaid.
  pub amount_traded: U256,
  /// Collateral released from the position.
  pub collateral_released: U256,
}

/// Trait for the lending core collaborator.
#[async_trait]
pub trait LendingCore: Send + Sync + 'static {
  /// Address the core acts as when calling adapters.
  fn address(&self) -> Address;

  /// Current snapshot of a position, `None` if it never existed.
  async fn position(&self, id: PositionId) -> Result<Option<Position>, LendingError>;

  /// Close part or all of a position through `request.adapter`.
  ///
  /// All-or-nothing: on error no balance or position field changes.
  async fn close_position(
    &self,
    caller: Address,
    request: CloseRequest,
  ) -> Result<TradeResult, LendingError>;
}
