//! Use Cases Layer - Application Business Logic
//!
//! Orchestrates domain logic with port interfaces to implement
//! the settlement workflows.
//!
//! Use cases:
//! - `AuctionProxy`: Dutch-auction liquidation of margin-called positions

pub mod auction_proxy;

pub use auction_proxy::{AuctionProxy, CloseOutcome, UnavailableReason};
