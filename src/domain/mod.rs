//! Domain layer - Core settlement logic and models.
//!
//! Pure logic for the close / liquidate path: partial-amount arithmetic,
//! the order model and its wire codec, the position snapshot, the
//! authorization gate and the dutch auction pricer.
//! No I/O here (hexagonal architecture inner ring).

pub mod auction;
pub mod authorization;
pub mod math;
pub mod order;
pub mod position;

// Re-export core types for convenience
pub use auction::{AuctionPhase, DutchAuctionPricer, Fraction};
pub use authorization::AuthorizationSet;
pub use math::{get_partial_amount, is_rounding_error, Rounding};
pub use order::{Order, OrderSignature};
pub use position::{Position, PositionId};
