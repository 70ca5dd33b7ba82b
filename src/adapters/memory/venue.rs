//! In-Memory Venue - Signed-Order Exchange with Fill Tracking
//!
//! Reference implementation of the `OrderBookVenue` port with 0x-v1
//! exchange semantics:
//! 1. Taker restriction, non-zero amounts, EIP-191 maker signature
//! 2. Expiry (`now >= expiration` is expired)
//! 3. Fill clamped to `taker_amount - filled - cancelled`
//! 4. 0.1% rounding-error guard on the maker leg
//! 5. Fees charged in the fee token only when `fee_recipient != 0`
//! 6. All legs move through the settlement proxy as one all-or-nothing batch
//!
//! Tokens move through the settlement proxy's allowances, never the
//! venue's own.

use std::collections::HashMap;
use std::sync::Arc;

use alloy::primitives::{Address, B256, U256};
use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use crate::domain::math::{checked_add, get_partial_amount, is_rounding_error, Rounding};
use crate::domain::order::Order;
use crate::error::VenueError;
use crate::ports::clock::Clock;
use crate::ports::token::{TokenLedger, TokenTransfer};
use crate::ports::venue::OrderBookVenue;

/// Filled / cancelled taker amounts for one order hash.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct FillState {
    filled: U256,
    cancelled: U256,
}

impl FillState {
    fn unavailable(self) -> U256 {
        self.filled.saturating_add(self.cancelled)
    }
}

/// Point-in-time copy of a venue's fill book.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VenueSnapshot {
    orders: HashMap<B256, FillState>,
}

/// Whether a fill may be clamped to what is left.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FillMode {
    Partial,
    FillOrKill,
}

/// Order-book venue backed by a shared token ledger.
pub struct InMemoryVenue {
    address: Address,
    token_transfer_proxy: Address,
    fee_token: Address,
    ledger: Arc<dyn TokenLedger>,
    clock: Arc<dyn Clock>,
    /// Held for the whole of a fill or cancel.
    orders: Mutex<HashMap<B256, FillState>>,
}

impl InMemoryVenue {
    pub fn new(
        address: Address,
        token_transfer_proxy: Address,
        fee_token: Address,
        ledger: Arc<dyn TokenLedger>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            address,
            token_transfer_proxy,
            fee_token,
            ledger,
            clock,
            orders: Mutex::new(HashMap::new()),
        }
    }

    /// Copy the fill / cancel book.
    pub async fn snapshot(&self) -> VenueSnapshot {
        VenueSnapshot {
            orders: self.orders.lock().await.clone(),
        }
    }

    /// Replace the fill / cancel book with an earlier snapshot.
    pub async fn restore(&self, snapshot: VenueSnapshot) {
        *self.orders.lock().await = snapshot.orders;
        debug!(venue = %self.address, "Venue restored from snapshot");
    }

    /// Shared fill path. The order lock is held from the remaining-amount
    /// check until the fill is recorded; all legs settle as one batch.
    async fn fill(
        &self,
        taker: Address,
        order: &Order,
        fill_taker_amount: U256,
        mode: FillMode,
    ) -> Result<U256, VenueError> {
        let hash = order.hash(self.address);

        if !order.taker.is_zero() && order.taker != taker {
            return Err(VenueError::TakerNotPermitted {
                hash,
                expected: order.taker,
            });
        }
        if order.maker_amount.is_zero() || order.taker_amount.is_zero() {
            return Err(VenueError::InvalidAmounts);
        }
        if fill_taker_amount.is_zero() {
            return Err(VenueError::ZeroFillAmount);
        }
        if !order.is_signed_by_maker(hash) {
            warn!(order_hash = %hash, "Signature does not recover to maker");
            return Err(VenueError::InvalidSignature(hash));
        }

        let now = self.clock.now_unix();
        if order.is_expired(now) {
            return Err(VenueError::Expired {
                hash,
                expiration: order.expiration_unix_timestamp_sec.saturating_to(),
                now,
            });
        }

        let mut orders = self.orders.lock().await;
        let state = orders.get(&hash).copied().unwrap_or_default();
        let remaining = order.taker_amount.saturating_sub(state.unavailable());
        if mode == FillMode::FillOrKill && remaining < fill_taker_amount {
            return Err(VenueError::InsufficientRemaining {
                hash,
                requested: fill_taker_amount,
                remaining,
            });
        }
        let filled_taker = fill_taker_amount.min(remaining);
        if filled_taker.is_zero() {
            return Err(VenueError::FullyFilledOrCancelled(hash));
        }
        if is_rounding_error(filled_taker, order.taker_amount, order.maker_amount)? {
            return Err(VenueError::RoundingErrorTooLarge(filled_taker));
        }

        let filled = checked_add(state.filled, filled_taker)?;
        let legs = self.legs(taker, order, filled_taker)?;
        self.ledger
            .transfer_from_batch(self.token_transfer_proxy, &legs)
            .await?;
        orders.insert(hash, FillState { filled, ..state });

        info!(
            order_hash = %hash,
            taker = %taker,
            filled_taker = %filled_taker,
            total_filled = %filled,
            "Order filled"
        );

        Ok(filled_taker)
    }

    /// Legs of a fill of `filled_taker` taker units.
    fn legs(&self, taker: Address, order: &Order, filled_taker: U256) -> Result<Vec<TokenTransfer>, VenueError> {
        let filled_maker = get_partial_amount(
            filled_taker,
            order.taker_amount,
            order.maker_amount,
            Rounding::Down,
        )?;

        let mut legs = vec![
            TokenTransfer {
                token: order.maker_token,
                from: order.maker,
                to: taker,
                amount: filled_maker,
            },
            TokenTransfer {
                token: order.taker_token,
                from: taker,
                to: order.maker,
                amount: filled_taker,
            },
        ];

        if !order.fee_recipient.is_zero() {
            for (payer, fee) in [(order.maker, order.maker_fee), (taker, order.taker_fee)] {
                let paid = get_partial_amount(filled_taker, order.taker_amount, fee, Rounding::Down)?;
                if !paid.is_zero() {
                    legs.push(TokenTransfer {
                        token: self.fee_token,
                        from: payer,
                        to: order.fee_recipient,
                        amount: paid,
                    });
                }
            }
        }

        Ok(legs)
    }
}

#[async_trait]
impl OrderBookVenue for InMemoryVenue {
    fn address(&self) -> Address {
        self.address
    }

    fn token_transfer_proxy(&self) -> Address {
        self.token_transfer_proxy
    }

    fn fee_token(&self) -> Address {
        self.fee_token
    }

    async fn filled(&self, order_hash: B256) -> Result<U256, VenueError> {
        let orders = self.orders.lock().await;
        Ok(orders.get(&order_hash).map(|s| s.filled).unwrap_or_default())
    }

    async fn cancelled(&self, order_hash: B256) -> Result<U256, VenueError> {
        let orders = self.orders.lock().await;
        Ok(orders.get(&order_hash).map(|s| s.cancelled).unwrap_or_default())
    }

    async fn unavailable_taker_amount(&self, order_hash: B256) -> Result<U256, VenueError> {
        let orders = self.orders.lock().await;
        Ok(orders
            .get(&order_hash)
            .map(|s| s.unavailable())
            .unwrap_or_default())
    }

    #[instrument(skip(self, order), fields(maker = %order.maker))]
    async fn fill_order(
        &self,
        taker: Address,
        order: &Order,
        fill_taker_amount: U256,
    ) -> Result<U256, VenueError> {
        self.fill(taker, order, fill_taker_amount, FillMode::Partial).await
    }

    #[instrument(skip(self, order), fields(maker = %order.maker))]
    async fn fill_or_kill_order(
        &self,
        taker: Address,
        order: &Order,
        fill_taker_amount: U256,
    ) -> Result<U256, VenueError> {
        self.fill(taker, order, fill_taker_amount, FillMode::FillOrKill).await
    }

    #[instrument(skip(self, order), fields(maker = %order.maker))]
    async fn cancel_order(
        &self,
        caller: Address,
        order: &Order,
        cancel_taker_amount: U256,
    ) -> Result<U256, VenueError> {
        let hash = order.hash(self.address);
        if caller != order.maker {
            return Err(VenueError::NotMaker(hash));
        }
        if order.maker_amount.is_zero() || order.taker_amount.is_zero() {
            return Err(VenueError::InvalidAmounts);
        }
        if cancel_taker_amount.is_zero() {
            return Err(VenueError::ZeroFillAmount);
        }

        if order.is_expired(self.clock.now_unix()) {
            warn!(order_hash = %hash, "Cancel of expired order ignored");
            return Ok(U256::ZERO);
        }

        let mut orders = self.orders.lock().await;
        let state = orders.get(&hash).copied().unwrap_or_default();
        let remaining = order.taker_amount.saturating_sub(state.unavailable());
        let cancelled_taker = cancel_taker_amount.min(remaining);
        if cancelled_taker.is_zero() {
            warn!(order_hash = %hash, "Cancel of fully consumed order ignored");
            return Ok(U256::ZERO);
        }

        let cancelled = checked_add(state.cancelled, cancelled_taker)?;
        orders.insert(hash, FillState { cancelled, ..state });

        info!(
            order_hash = %hash,
            cancelled_taker = %cancelled_taker,
            "Order cancelled"
        );
        Ok(cancelled_taker)
    }
}
