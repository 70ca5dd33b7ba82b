//! Auction Proxy - Dutch-Auction Liquidation of Margin-Called Positions
//!
//! Lets any liquidator close a margin-called position through an
//! exchange adapter, once enough of the call window has elapsed that
//! the available liquidity meets the auction minimum.
//!
//! Flow:
//! 1. Read the position; missing, closed or uncalled -> 0
//! 2. Caller's own minimum above the outstanding debt -> 0
//! 3. Required = max(caller minimum, auction minimum at `now`)
//! 4. Available = min(debt, adapter capacity for the order)
//! 5. Available below required (or zero) -> 0
//! 6. Delegate the close to the lending core, proxy as closer and payee,
//!    with `required` as the floor the core re-checks under its lock
//! 7. A position closed or shrunk by a racing closer in the meantime -> 0
//!
//! A zero result is benign: nothing moved, and the call may simply be
//! retried later with a better order or after more time has passed.

use std::sync::Arc;

use alloy::primitives::{Address, Bytes, U256};
use tracing::{debug, info, instrument};

use crate::domain::auction::DutchAuctionPricer;
use crate::domain::position::PositionId;
use crate::error::{LendingError, ProxyError};
use crate::ports::clock::Clock;
use crate::ports::exchange::ExchangeAdapter;
use crate::ports::lending::{CloseRequest, LendingCore, TradeResult};

/// Why a close attempt traded nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnavailableReason {
  /// Position does not exist or is already closed.
  PositionNotOpen,
  /// Position has no active margin call.
  NotCalled,
  /// Caller asked to close more than the outstanding debt.
  ExceedsDebt { min_close_amount: U256, debt: U256 },
  /// The order cannot supply the required amount right now.
  InsufficientLiquidity { available: U256, required: U256 },
  /// The debt shrank between the read and the close, leaving less than
  /// the required amount to close.
  Superseded { required: U256 },
}

/// Result of a single close attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseOutcome {
  Closed(TradeResult),
  Unavailable(UnavailableReason),
}

impl CloseOutcome {
  /// Debt units repaid; zero when unavailable.
  pub fn amount_traded(&self) -> U256 {
    match self {
      Self::Closed(result) => result.amount_traded,
      Self::Unavailable(_) => U256::ZERO,
    }
  }
}

/// Proxy that liquidates margin-called positions via dutch auction.
pub struct AuctionProxy {
  /// Address the proxy acts as toward the lending core.
  address: Address,
  core: Arc<dyn LendingCore>,
  clock: Arc<dyn Clock>,
}

impl AuctionProxy {
  /// Create a proxy bound to `core`.
  pub fn new(address: Address, core: Arc<dyn LendingCore>, clock: Arc<dyn Clock>) -> Self {
    Self {
      address,
      core,
      clock,
    }
  }

  /// Address that must be an approved closer on the core.
  pub fn address(&self) -> Address {
    self.address
  }

  /// Close a margin-called position, returning the debt amount repaid.
  ///
  /// Zero means nothing was closed and no state changed.
  ///
  /// # Errors
  /// Propagates pricer arithmetic failures and any error from the
  /// lending core's close, in which case no state changed either.
  pub async fn close_position(
    &self,
    position_id: PositionId,
    min_close_amount: U256,
    pricer: &DutchAuctionPricer,
    adapter: Arc<dyn ExchangeAdapter>,
    order_payload: Bytes,
  ) -> Result<U256, ProxyError> {
    let outcome = self
      .try_close(position_id, min_close_amount, pricer, adapter, order_payload)
      .await?;
    Ok(outcome.amount_traded())
  }

  /// Same as [`close_position`](Self::close_position) but reports why a
  /// zero outcome happened.
  #[instrument(skip(self, pricer, adapter, order_payload), fields(proxy = %self.address))]
  pub async fn try_close(
    &self,
    position_id: PositionId,
    min_close_amount: U256,
    pricer: &DutchAuctionPricer,
    adapter: Arc<dyn ExchangeAdapter>,
    order_payload: Bytes,
  ) -> Result<CloseOutcome, ProxyError> {
    let Some(position) = self.core.position(position_id).await?.filter(|p| p.is_open) else {
      debug!("Position not open, nothing to close");
      return Ok(CloseOutcome::Unavailable(UnavailableReason::PositionNotOpen));
    };

    let now = self.clock.now_unix();
    let Some(auction_minimum) = pricer.minimum_close_amount(&position, now)? else {
      info!("Position not margin-called, nothing to close");
      return Ok(CloseOutcome::Unavailable(UnavailableReason::NotCalled));
    };

    let debt = position.debt_amount;
    if min_close_amount > debt {
      debug!(min_close_amount = %min_close_amount, debt = %debt, "Minimum exceeds debt");
      return Ok(CloseOutcome::Unavailable(UnavailableReason::ExceedsDebt {
        min_close_amount,
        debt,
      }));
    }

    let required = min_close_amount.max(auction_minimum);
    let capacity = adapter
      .get_max_maker_amount(position.debt_token, position.collateral_token, &order_payload)
      .await?;
    let available = capacity.min(debt);

    if available.is_zero() || available < required {
      info!(
        available = %available,
        required = %required,
        auction_minimum = %auction_minimum,
        "Insufficient liquidity for auction close"
      );
      return Ok(CloseOutcome::Unavailable(
        UnavailableReason::InsufficientLiquidity {
          available,
          required,
        },
      ));
    }

    let close = self
      .core
      .close_position(
        self.address,
        CloseRequest {
          position_id,
          requested_amount: available,
          min_amount: required,
          payout_recipient: self.address,
          adapter,
          order_payload,
        },
      )
      .await;

    // Another closer may have run since the position was read.
    let result = match close {
      Ok(result) if result.amount_traded.is_zero() => {
        info!(required = %required, "Position changed before close, nothing closed");
        return Ok(CloseOutcome::Unavailable(UnavailableReason::Superseded {
          required,
        }));
      }
      Ok(result) => result,
      Err(LendingError::PositionNotOpen(_)) => {
        info!("Position closed concurrently, nothing to close");
        return Ok(CloseOutcome::Unavailable(UnavailableReason::PositionNotOpen));
      }
      Err(e) => return Err(e.into()),
    };

    info!(
      amount_traded = %result.amount_traded,
      collateral_released = %result.collateral_released,
      auction_minimum = %auction_minimum,
      "Auction close executed"
    );

    Ok(CloseOutcome::Closed(result))
  }
}
