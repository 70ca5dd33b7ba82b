//! 0x-Style Exchange Adapter - Signed-Order Trades for the Lending Core
//!
//! Implements the `ExchangeAdapter` port on top of an `OrderBookVenue`
//! that settles 0x-v1 style signed orders.
//!
//! Key rules:
//! - Only callers in the immutable authorization set may `exchange`
//! - Orders charging a taker fee to a fee recipient are refused
//! - Quotes round up, capacity rounds down
//! - No fill state is cached; every query asks the venue
//! - Fills are fill-or-kill; proceeds are forwarded in the same call

use std::sync::Arc;

use alloy::primitives::{Address, U256};
use async_trait::async_trait;
use tracing::{debug, info, instrument, warn};

use super::approvals::AllowanceManager;
use crate::config::AdapterConfig;
use crate::domain::authorization::AuthorizationSet;
use crate::domain::math::{get_partial_amount, Rounding};
use crate::domain::order::Order;
use crate::error::AdapterError;
use crate::ports::clock::Clock;
use crate::ports::exchange::{ExchangeAdapter, ExchangeRequest};
use crate::ports::token::TokenLedger;
use crate::ports::venue::OrderBookVenue;

/// Exchange adapter for 0x-v1 style orders.
pub struct ZeroExExchangeAdapter {
    /// Custody address of the adapter.
    address: Address,
    venue: Arc<dyn OrderBookVenue>,
    ledger: Arc<dyn TokenLedger>,
    clock: Arc<dyn Clock>,
    /// Fixed at construction.
    authorized: AuthorizationSet,
    allowances: AllowanceManager,
}

impl ZeroExExchangeAdapter {
    /// Create an adapter bound to `venue`.
    pub fn new(
        address: Address,
        venue: Arc<dyn OrderBookVenue>,
        ledger: Arc<dyn TokenLedger>,
        clock: Arc<dyn Clock>,
        authorized: AuthorizationSet,
    ) -> Self {
        info!(
            adapter = %address,
            venue = %venue.address(),
            proxy = %venue.token_transfer_proxy(),
            authorized = authorized.len(),
            "Exchange adapter constructed"
        );
        Self {
            allowances: AllowanceManager::new(Arc::clone(&ledger), address),
            address,
            venue,
            ledger,
            clock,
            authorized,
        }
    }

    /// Create an adapter from config, checking the configured venue
    /// constants against the venue actually supplied.
    pub fn from_config(
        config: &AdapterConfig,
        venue: Arc<dyn OrderBookVenue>,
        ledger: Arc<dyn TokenLedger>,
        clock: Arc<dyn Clock>,
    ) -> anyhow::Result<Self> {
        for (name, configured, actual) in [
            ("venue", config.venue, venue.address()),
            ("settlement proxy", config.settlement_proxy, venue.token_transfer_proxy()),
            ("fee token", config.fee_token, venue.fee_token()),
        ] {
            anyhow::ensure!(
                configured == actual,
                "Configured {name} {configured} does not match venue's {actual}"
            );
        }

        Ok(Self::new(
            config.address,
            venue,
            ledger,
            clock,
            config.authorization_set(),
        ))
    }

    /// Address of the external venue.
    pub fn venue_address(&self) -> Address {
        self.venue.address()
    }

    /// Settlement proxy holding the adapter's standing approval.
    pub fn settlement_proxy(&self) -> Address {
        self.venue.token_transfer_proxy()
    }

    /// Token used for maker / taker fees.
    pub fn fee_token(&self) -> Address {
        self.venue.fee_token()
    }

    /// Callers allowed to `exchange`.
    pub fn authorized_callers(&self) -> &AuthorizationSet {
        &self.authorized
    }

    /// Taker units still fillable on `order` according to the venue.
    async fn remaining_taker_amount(&self, order: &Order) -> Result<U256, AdapterError> {
        let hash = order.hash(self.venue.address());
        let unavailable = self.venue.unavailable_taker_amount(hash).await?;
        Ok(order.taker_amount.saturating_sub(unavailable))
    }
}

#[async_trait]
impl ExchangeAdapter for ZeroExExchangeAdapter {
    fn address(&self) -> Address {
        self.address
    }

    #[instrument(skip(self, order_payload))]
    async fn get_exchange_cost(
        &self,
        maker_token: Address,
        taker_token: Address,
        desired_maker_amount: U256,
        order_payload: &[u8],
    ) -> Result<U256, AdapterError> {
        let order = Order::decode_for_pair(order_payload, maker_token, taker_token)?;
        let cost = get_partial_amount(
            desired_maker_amount,
            order.maker_amount,
            order.taker_amount,
            Rounding::Up,
        )?;
        debug!(cost = %cost, "Exchange cost quoted");
        Ok(cost)
    }

    #[instrument(skip(self, order_payload))]
    async fn get_max_maker_amount(
        &self,
        maker_token: Address,
        taker_token: Address,
        order_payload: &[u8],
    ) -> Result<U256, AdapterError> {
        let order = match Order::decode_for_pair(order_payload, maker_token, taker_token) {
            Ok(order) => order,
            Err(e) => {
                debug!(error = %e, "Unusable order payload, no capacity");
                return Ok(U256::ZERO);
            }
        };

        if order.maker_amount.is_zero() || order.taker_amount.is_zero() {
            return Ok(U256::ZERO);
        }
        if order.is_expired(self.clock.now_unix()) {
            debug!(
                expiration = %order.expiration_unix_timestamp_sec,
                "Order expired, no capacity"
            );
            return Ok(U256::ZERO);
        }

        let remaining = self.remaining_taker_amount(&order).await?;
        if remaining.is_zero() {
            return Ok(U256::ZERO);
        }

        Ok(get_partial_amount(
            remaining,
            order.taker_amount,
            order.maker_amount,
            Rounding::Down,
        )?)
    }

    #[instrument(
        skip(self, request),
        fields(
            caller = %request.caller,
            originator = %request.trade_originator,
            requested = %request.requested_taker_amount,
        )
    )]
    async fn exchange(&self, request: ExchangeRequest) -> Result<U256, AdapterError> {
        // ── Preconditions: nothing has moved yet ────────────────
        if let Err(e) = self.authorized.ensure(request.caller) {
            warn!("Exchange rejected: caller not authorized");
            return Err(e);
        }

        let order = Order::decode_for_pair(
            &request.order_payload,
            request.maker_token,
            request.taker_token,
        )?;

        if order.charges_taker_fee() {
            warn!(
                fee_recipient = %order.fee_recipient,
                taker_fee = %order.taker_fee,
                "Exchange rejected: order charges a taker fee"
            );
            return Err(AdapterError::TakerFeeNotAllowed {
                fee_recipient: order.fee_recipient,
                taker_fee: order.taker_fee,
            });
        }

        let requested = request.requested_taker_amount;
        let balance = self
            .ledger
            .balance_of(request.taker_token, self.address)
            .await?;
        if balance < requested {
            return Err(AdapterError::InsufficientTakerBalance {
                token: request.taker_token,
                needed: requested,
                available: balance,
            });
        }

        let remaining = self.remaining_taker_amount(&order).await?;
        if remaining.is_zero() {
            return Err(AdapterError::OrderFullyConsumed(
                order.hash(self.venue.address()),
            ));
        }
        if requested > remaining {
            return Err(AdapterError::ExceedsRemainingFill {
                requested,
                remaining,
            });
        }

        // ── Execute ─────────────────────────────────────────────
        self.allowances
            .ensure_allowance(request.taker_token, self.venue.token_transfer_proxy(), requested)
            .await?;

        // Fill-or-kill: a competing fill since the check above fails here,
        // inside the venue, before any token moves.
        let filled = self
            .venue
            .fill_or_kill_order(self.address, &order, requested)
            .await?;

        let received = get_partial_amount(
            filled,
            order.taker_amount,
            order.maker_amount,
            Rounding::Down,
        )?;

        // ── Forward proceeds ────────────────────────────────────
        self.ledger
            .transfer(request.maker_token, self.address, request.receiver, received)
            .await?;

        info!(
            filled_taker = %filled,
            received_maker = %received,
            receiver = %request.receiver,
            "Exchange executed"
        );

        Ok(received)
    }
}
