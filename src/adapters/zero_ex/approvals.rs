//! Standing Allowance Manager - Token Spend Approvals
//!
//! Keeps a maximal allowance from the adapter toward the venue's
//! settlement proxy so repeated trades never re-approve.
//!
//! Approvals use max uint256 and are only re-issued once the remaining
//! allowance falls below what the next trade needs.

use std::sync::Arc;

use alloy::primitives::{Address, U256};
use tracing::{debug, info, instrument};

use crate::error::TokenError;
use crate::ports::token::TokenLedger;

/// Manages the adapter's standing approvals.
pub struct AllowanceManager {
    ledger: Arc<dyn TokenLedger>,
    /// Account whose tokens are being approved.
    owner: Address,
}

impl AllowanceManager {
    pub fn new(ledger: Arc<dyn TokenLedger>, owner: Address) -> Self {
        Self { ledger, owner }
    }

    /// Ensure `spender` may move at least `needed` of `token`.
    ///
    /// Returns `true` if a fresh max approval was issued.
    #[instrument(skip(self))]
    pub async fn ensure_allowance(
        &self,
        token: Address,
        spender: Address,
        needed: U256,
    ) -> Result<bool, TokenError> {
        let current = self.ledger.allowance(token, self.owner, spender).await?;

        if current >= needed {
            debug!(current = %current, "Allowance sufficient");
            return Ok(false);
        }

        info!(
            current = %current,
            spender = %spender,
            "Submitting max approval"
        );
        self.ledger
            .approve(token, self.owner, spender, U256::MAX)
            .await?;

        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryTokenLedger;
    use alloy::primitives::address;

    #[tokio::test]
    async fn test_approves_once_then_stands() {
        let token = address!("00000000000000000000000000000000000000b1");
        let owner = address!("00000000000000000000000000000000000000b2");
        let proxy = address!("00000000000000000000000000000000000000b3");
        let ledger = Arc::new(InMemoryTokenLedger::new());
        let manager = AllowanceManager::new(ledger.clone(), owner);

        assert!(manager.ensure_allowance(token, proxy, U256::from(10u8)).await.unwrap());
        assert!(!manager.ensure_allowance(token, proxy, U256::from(10u8)).await.unwrap());
        assert_eq!(
            ledger.allowance(token, owner, proxy).await.unwrap(),
            U256::MAX
        );
    }

    #[tokio::test]
    async fn test_tops_up_exhausted_allowance() {
        let token = address!("00000000000000000000000000000000000000b1");
        let owner = address!("00000000000000000000000000000000000000b2");
        let proxy = address!("00000000000000000000000000000000000000b3");
        let ledger = Arc::new(InMemoryTokenLedger::new());
        ledger.approve(token, owner, proxy, U256::from(5u8)).await.unwrap();
        let manager = AllowanceManager::new(ledger.clone(), owner);

        assert!(!manager.ensure_allowance(token, proxy, U256::from(5u8)).await.unwrap());
        assert!(manager.ensure_allowance(token, proxy, U256::from(6u8)).await.unwrap());
    }
}
