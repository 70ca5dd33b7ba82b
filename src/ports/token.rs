//! Token Ledger Port - Fungible Token Balances and Allowances
//!
//! ERC-20 style balance / allowance / transfer interface consumed by the
//! exchange adapter, the venue and the lending core. The acting account
//! is always passed explicitly (`from` for transfers, `owner` for
//! approvals, `spender` for delegated transfers).

use alloy::primitives::{Address, U256};
use async_trait::async_trait;

use crate::error::TokenError;

/// One delegated movement inside an atomic batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenTransfer {
  pub token: Address,
  pub from: Address,
  pub to: Address,
  pub amount: U256,
}

/// Trait for token ledgers.
///
/// Implementors MUST leave balances untouched when an operation fails.
#[async_trait]
pub trait TokenLedger: Send + Sync + 'static {
  /// Balance of `owner` in `token`.
  async fn balance_of(&self, token: Address, owner: Address) -> Result<U256, TokenError>;

  /// Amount `spender` may still move out of `owner`'s balance.
  async fn allowance(
    &self,
    token: Address,
    owner: Address,
    spender: Address,
  ) -> Result<U256, TokenError>;

  /// Move `amount` from `from` (the caller) to `to`.
  async fn transfer(
    &self,
    token: Address,
    from: Address,
    to: Address,
    amount: U256,
  ) -> Result<(), TokenError>;

  /// Set `spender`'s allowance over `owner`'s balance to `amount`.
  async fn approve(
    &self,
    token: Address,
    owner: Address,
    spender: Address,
    amount: U256,
  ) -> Result<(), TokenError>;

  /// Move `amount` from `from` to `to` on behalf of `spender`,
  /// consuming allowance. A `U256::MAX` allowance is never decremented.
  async fn transfer_from(
    &self,
    token: Address,
    spender: Address,
    from: Address,
    to: Address,
    amount: U256,
  ) -> Result<(), TokenError>;

  /// Apply every transfer in `transfers` on behalf of `spender`, or none.
  ///
  /// Legs are applied in order, so several legs from one owner draw on
  /// the same balance and allowance.
  async fn transfer_from_batch(
    &self,
    spender: Address,
    transfers: &[TokenTransfer],
  ) -> Result<(), TokenError>;
}
