//! Ports Layer - Hexagonal Architecture Boundaries
//!
//! Defines the interfaces (traits) that the domain/usecases layer
//! requires from the outside world. Adapters implement these traits.
//!
//! Port categories:
//! - `TokenLedger`: balances, allowances, transfers
//! - `OrderBookVenue`: external order book fill state and settlement
//! - `ExchangeAdapter`: the protocol's uniform trade-execution contract
//! - `LendingCore`: position reads and the close entry point
//! - `Clock`: unix time

pub mod clock;
pub mod exchange;
pub mod lending;
pub mod token;
pub mod venue;
