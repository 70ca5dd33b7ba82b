//! Adapters Layer - Hexagonal Architecture Outer Ring
//!
//! Implements the port traits defined in `crate::ports` with concrete
//! collaborators. Each sub-module groups adapters by concern.
//!
//! Adapter categories:
//! - `zero_ex`: exchange adapter for 0x-v1 style signed orders
//! - `memory`: in-process token ledger, venue and lending core
//! - `clock`: wall clock and manual clock

pub mod clock;
pub mod memory;
pub mod zero_ex;

pub use clock::{ManualClock, SystemClock};
