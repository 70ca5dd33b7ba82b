//! In-Memory Lending Core - Position Book with a Trading Close Path
//!
//! Reference implementation of the `LendingCore` port. It owns a vault
//! address holding every position's collateral and closes positions by
//! selling collateral for debt through a caller-chosen exchange adapter.
//!
//! Close flow:
//! 1. Serialize on the close lock; look up the open position
//! 2. Authorize: the owner, or an approved closer once the position is called
//! 3. Close `min(requested, debt)` (zero requested = all of it); below the
//!    caller's `min_amount` nothing is closed
//! 4. Release collateral pro rata, rounded down
//! 5. Quote the trade; it must fit inside the released collateral
//! 6. Fund the adapter, trade, require proceeds >= amount
//! 7. Repay the lender; surplus collateral and debt go to the payout recipient
//!
//! Steps 6-7 run against a snapshot of the ledger and of every tracked
//! venue's fill book, and are rolled back on error.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use alloy::primitives::{Address, U256};
use async_trait::async_trait;
use tracing::{info, instrument, warn};

use super::ledger::InMemoryTokenLedger;
use super::venue::InMemoryVenue;
use crate::domain::authorization::AuthorizationSet;
use crate::domain::math::{checked_sub, get_partial_amount, Rounding};
use crate::domain::position::{Position, PositionId};
use crate::error::LendingError;
use crate::ports::exchange::ExchangeRequest;
use crate::ports::lending::{CloseRequest, LendingCore, TradeResult};
use crate::ports::token::TokenLedger;

/// Position book plus collateral vault.
pub struct InMemoryLendingCore {
    /// Vault address; holds collateral and calls adapters.
    address: Address,
    ledger: Arc<InMemoryTokenLedger>,
    /// Callers allowed to close positions they do not own, once called.
    approved_closers: AuthorizationSet,
    positions: Mutex<HashMap<PositionId, Position>>,
    /// Venues whose fill books roll back with the ledger.
    venues: Vec<Arc<InMemoryVenue>>,
    close_lock: tokio::sync::Mutex<()>,
}

impl InMemoryLendingCore {
    pub fn new(
        address: Address,
        ledger: Arc<InMemoryTokenLedger>,
        approved_closers: AuthorizationSet,
    ) -> Self {
        Self {
            address,
            ledger,
            approved_closers,
            positions: Mutex::new(HashMap::new()),
            venues: Vec::new(),
            close_lock: tokio::sync::Mutex::new(()),
        }
    }

    /// Include `venue` in the rollback of a failed close.
    #[must_use]
    pub fn with_venue(mut self, venue: Arc<InMemoryVenue>) -> Self {
        self.venues.push(venue);
        self
    }

    fn positions(&self) -> MutexGuard<'_, HashMap<PositionId, Position>> {
        self.positions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Seed a position. The caller is responsible for placing its
    /// collateral in the vault.
    pub fn insert_position(&self, position: Position) {
        info!(
            position_id = %position.id,
            debt = %position.debt_amount,
            collateral = %position.collateral_amount,
            "Position registered"
        );
        self.positions().insert(position.id, position);
    }

    fn may_close(&self, position: &Position, caller: Address) -> bool {
        caller == position.owner
            || (position.is_called && self.approved_closers.contains(caller))
    }

    /// Token legs of a close; rolled back by the caller on error.
    async fn settle(
        &self,
        caller: Address,
        position: &Position,
        request: &CloseRequest,
        amount: U256,
        collateral_released: U256,
        cost: U256,
    ) -> Result<(), LendingError> {
        let adapter = &request.adapter;

        self.ledger
            .transfer(position.collateral_token, self.address, adapter.address(), cost)
            .await?;

        let received = adapter
            .exchange(ExchangeRequest {
                caller: self.address,
                trade_originator: caller,
                receiver: self.address,
                maker_token: position.debt_token,
                taker_token: position.collateral_token,
                requested_taker_amount: cost,
                order_payload: request.order_payload.clone(),
            })
            .await?;

        if received < amount {
            return Err(LendingError::InsufficientProceeds {
                received,
                required: amount,
            });
        }

        self.ledger
            .transfer(position.debt_token, self.address, position.lender, amount)
            .await?;

        let excess_debt = received - amount;
        if !excess_debt.is_zero() {
            self.ledger
                .transfer(position.debt_token, self.address, request.payout_recipient, excess_debt)
                .await?;
        }

        let surplus = collateral_released - cost;
        if !surplus.is_zero() {
            self.ledger
                .transfer(
                    position.collateral_token,
                    self.address,
                    request.payout_recipient,
                    surplus,
                )
                .await?;
        }

        Ok(())
    }
}

#[async_trait]
impl LendingCore for InMemoryLendingCore {
    fn address(&self) -> Address {
        self.address
    }

    async fn position(&self, id: PositionId) -> Result<Option<Position>, LendingError> {
        Ok(self.positions().get(&id).cloned())
    }

    #[instrument(skip(self, request), fields(position_id = %request.position_id))]
    async fn close_position(
        &self,
        caller: Address,
        request: CloseRequest,
    ) -> Result<TradeResult, LendingError> {
        let _serial = self.close_lock.lock().await;

        let position = self
            .positions()
            .get(&request.position_id)
            .filter(|p| p.is_open)
            .cloned()
            .ok_or(LendingError::PositionNotOpen(request.position_id))?;

        if !self.may_close(&position, caller) {
            warn!(closer = %caller, "Close rejected: caller not permitted");
            return Err(LendingError::UnauthorizedCloser {
                position_id: position.id,
                closer: caller,
            });
        }

        let amount = if request.requested_amount.is_zero()
            || request.requested_amount > position.debt_amount
        {
            position.debt_amount
        } else {
            request.requested_amount
        };
        if amount.is_zero() || amount < request.min_amount {
            info!(
                amount = %amount,
                min_amount = %request.min_amount,
                "Close below caller minimum, nothing closed"
            );
            return Ok(TradeResult::default());
        }

        let collateral_released = get_partial_amount(
            amount,
            position.debt_amount,
            position.collateral_amount,
            Rounding::Down,
        )?;

        let cost = request
            .adapter
            .get_exchange_cost(
                position.debt_token,
                position.collateral_token,
                amount,
                &request.order_payload,
            )
            .await?;
        if cost > collateral_released {
            return Err(LendingError::InsufficientCollateral {
                cost,
                available: collateral_released,
            });
        }

        let snapshot = self.ledger.snapshot();
        let mut venue_snapshots = Vec::with_capacity(self.venues.len());
        for venue in &self.venues {
            venue_snapshots.push(venue.snapshot().await);
        }
        if let Err(e) = self
            .settle(caller, &position, &request, amount, collateral_released, cost)
            .await
        {
            warn!(error = %e, "Close failed, rolling back token movements and fills");
            self.ledger.restore(snapshot);
            for (venue, venue_snapshot) in self.venues.iter().zip(venue_snapshots) {
                venue.restore(venue_snapshot).await;
            }
            return Err(e);
        }

        let debt_amount = checked_sub(position.debt_amount, amount)?;
        let collateral_amount = checked_sub(position.collateral_amount, collateral_released)?;
        let updated = Position {
            debt_amount,
            collateral_amount,
            is_open: !debt_amount.is_zero(),
            ..position
        };
        self.positions().insert(updated.id, updated);

        info!(
            closer = %caller,
            amount = %amount,
            collateral_released = %collateral_released,
            trade_cost = %cost,
            remaining_debt = %debt_amount,
            "Position closed"
        );

        Ok(TradeResult {
            amount_traded: amount,
            collateral_released,
        })
    }
}
