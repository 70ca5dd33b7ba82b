//! Margin Settlement Core - Library Root
//!
//! Close / liquidate path of a margin-lending protocol: partial-amount
//! arithmetic, a 0x-style exchange adapter behind an authorization gate,
//! and a dutch-auction liquidation proxy.
//!
//! Re-exports all modules for integration tests and benchmarks.

pub mod adapters;
pub mod config;
pub mod domain;
pub mod error;
pub mod ports;
pub mod usecases;
