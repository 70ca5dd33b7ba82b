//! In-Memory Token Ledger - ERC-20 Balances for Tests and Simulation
//!
//! Multi-token balance and allowance book implementing the `TokenLedger`
//! port. Every operation validates before it mutates, so a failed call
//! leaves the book untouched. `snapshot` / `restore` let a caller roll
//! back a whole multi-step settlement, the way a reverted transaction
//! would.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use alloy::primitives::{Address, U256};
use async_trait::async_trait;
use tracing::debug;

use crate::domain::math::{checked_add, checked_sub};
use crate::error::TokenError;
use crate::ports::token::{TokenLedger, TokenTransfer};

/// Point-in-time copy of the ledger.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LedgerSnapshot {
    /// (token, owner) -> balance
    balances: HashMap<(Address, Address), U256>,
    /// (token, owner, spender) -> allowance
    allowances: HashMap<(Address, Address, Address), U256>,
}

/// Mutex-guarded token book.
#[derive(Debug, Default)]
pub struct InMemoryTokenLedger {
    state: Mutex<LedgerSnapshot>,
}

impl InMemoryTokenLedger {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, LedgerSnapshot> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Credit `amount` of `token` to `to` out of thin air.
    pub fn mint(&self, token: Address, to: Address, amount: U256) -> Result<(), TokenError> {
        let mut state = self.state();
        let balance = state.balances.entry((token, to)).or_default();
        *balance = checked_add(*balance, amount)?;
        debug!(token = %token, to = %to, amount = %amount, "Minted");
        Ok(())
    }

    /// Synchronous balance read.
    pub fn balance(&self, token: Address, owner: Address) -> U256 {
        self.state()
            .balances
            .get(&(token, owner))
            .copied()
            .unwrap_or_default()
    }

    /// Copy the whole book.
    pub fn snapshot(&self) -> LedgerSnapshot {
        self.state().clone()
    }

    /// Replace the whole book with an earlier snapshot.
    pub fn restore(&self, snapshot: LedgerSnapshot) {
        *self.state() = snapshot;
        debug!("Ledger restored from snapshot");
    }
}

impl LedgerSnapshot {
    /// Delegated transfer; checks everything before mutating.
    fn spend(
        &mut self,
        token: Address,
        spender: Address,
        from: Address,
        to: Address,
        amount: U256,
    ) -> Result<(), TokenError> {
        let allowance = self.allowance(token, from, spender);
        if allowance < amount {
            return Err(TokenError::InsufficientAllowance {
                token,
                owner: from,
                spender,
                needed: amount,
                available: allowance,
            });
        }
        self.move_balance(token, from, to, amount)?;
        if allowance != U256::MAX {
            self.allowances
                .insert((token, from, spender), allowance - amount);
        }
        Ok(())
    }

    fn balance(&self, token: Address, owner: Address) -> U256 {
        self.balances
            .get(&(token, owner))
            .copied()
            .unwrap_or_default()
    }

    fn allowance(&self, token: Address, owner: Address, spender: Address) -> U256 {
        self.allowances
            .get(&(token, owner, spender))
            .copied()
            .unwrap_or_default()
    }

    fn move_balance(
        &mut self,
        token: Address,
        from: Address,
        to: Address,
        amount: U256,
    ) -> Result<(), TokenError> {
        let available = self.balance(token, from);
        if available < amount {
            return Err(TokenError::InsufficientBalance {
                token,
                owner: from,
                needed: amount,
                available,
            });
        }
        if from == to {
            return Ok(());
        }
        // Check the credit before touching the debit.
        let credited = checked_add(self.balance(token, to), amount)?;
        self.balances.insert((token, from), checked_sub(available, amount)?);
        self.balances.insert((token, to), credited);
        Ok(())
    }
}

#[async_trait]
impl TokenLedger for InMemoryTokenLedger {
    async fn balance_of(&self, token: Address, owner: Address) -> Result<U256, TokenError> {
        Ok(self.balance(token, owner))
    }

    async fn allowance(
        &self,
        token: Address,
        owner: Address,
        spender: Address,
    ) -> Result<U256, TokenError> {
        Ok(self.state().allowance(token, owner, spender))
    }

    async fn transfer(
        &self,
        token: Address,
        from: Address,
        to: Address,
        amount: U256,
    ) -> Result<(), TokenError> {
        self.state().move_balance(token, from, to, amount)
    }

    async fn approve(
        &self,
        token: Address,
        owner: Address,
        spender: Address,
        amount: U256,
    ) -> Result<(), TokenError> {
        self.state()
            .allowances
            .insert((token, owner, spender), amount);
        Ok(())
    }

    async fn transfer_from(
        &self,
        token: Address,
        spender: Address,
        from: Address,
        to: Address,
        amount: U256,
    ) -> Result<(), TokenError> {
        self.state().spend(token, spender, from, to, amount)
    }

    async fn transfer_from_batch(
        &self,
        spender: Address,
        transfers: &[TokenTransfer],
    ) -> Result<(), TokenError> {
        let mut state = self.state();
        let mut working = state.clone();
        for t in transfers {
            working.spend(t.token, spender, t.from, t.to, t.amount)?;
        }
        *state = working;
        Ok(())
    }
}
