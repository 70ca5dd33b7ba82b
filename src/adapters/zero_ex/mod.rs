//! 0x-Style Venue Adapters
//!
//! Trade execution against venues settling 0x-v1 style signed orders:
//! - `adapter`: the `ExchangeAdapter` implementation
//! - `approvals`: standing max allowance toward the settlement proxy

pub mod adapter;
pub mod approvals;

pub use adapter::ZeroExExchangeAdapter;
pub use approvals::AllowanceManager;
