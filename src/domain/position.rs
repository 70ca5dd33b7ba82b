//! Margin position as exposed by the lending core.
//!
//! The settlement path only ever reads positions; every mutation goes
//! through the lending core's close entry point.

use alloy::primitives::{Address, B256, U256};
use serde::{Deserialize, Serialize};

/// Lightweight position identifier used at the ports boundary.
pub type PositionId = B256;

/// Snapshot of a leveraged position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub id: PositionId,
    /// Trader who opened the position.
    pub owner: Address,
    /// Lender owed the debt.
    pub lender: Address,
    pub collateral_token: Address,
    pub debt_token: Address,
    /// Collateral held by the lending core for this position.
    pub collateral_amount: U256,
    /// Outstanding principal in debt-token units.
    pub debt_amount: U256,
    pub is_open: bool,
    /// Set when the lender has margin-called the position.
    pub is_called: bool,
    /// Unix seconds at which the margin call was issued.
    pub call_timestamp: u64,
    /// Length of the call window in seconds.
    pub call_time_limit: u64,
}

impl Position {
    /// Whether the margin-call window has run out at `now`.
    pub fn call_window_lapsed(&self, now: u64) -> bool {
        self.is_called && now >= self.call_timestamp.saturating_add(self.call_time_limit)
    }
}
