//! In-Memory Collaborators - Reference Implementations of External Ports
//!
//! Self-contained token ledger, order-book venue and lending core used by
//! the test suites and for local simulation. They follow the same
//! all-or-nothing rules as the on-chain systems they stand in for.

pub mod ledger;
pub mod lending_core;
pub mod venue;

pub use ledger::{InMemoryTokenLedger, LedgerSnapshot};
pub use lending_core::InMemoryLendingCore;
pub use venue::{InMemoryVenue, VenueSnapshot};
