//! Dutch auction pricer for margin-called positions.
//!
//! Once a lender calls a position, the minimum share of the outstanding
//! debt a liquidator must retire ramps linearly from `start` to `end` over
//! the call window, then stays pinned at `end` forever:
//!
//! ```text
//! fraction(t) = start + (end - start) * elapsed / call_time_limit   elapsed < limit
//! fraction(t) = end                                                  elapsed >= limit
//! ```
//!
//! Whether the ramp rises or falls is configuration, not mechanism. Both
//! bounds are validated into `[0, 1]` at construction, so every value on
//! the ramp is too. Ramp points are computed exactly in a 1024-bit
//! intermediate and only narrowed back to `U256` once reduced.

use std::cmp::Ordering;

use alloy::primitives::ruint::{Uint, UintTryTo};
use alloy::primitives::{U256, U512};
use serde::{Deserialize, Serialize};

use super::math::{get_partial_amount, Rounding};
use super::position::Position;
use crate::error::{MathError, PricerError};

/// A ratio in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fraction {
    numerator: U256,
    denominator: U256,
}

impl Fraction {
    /// Builds a fraction, rejecting a zero denominator or a value above one.
    pub fn new(numerator: U256, denominator: U256) -> Result<Self, PricerError> {
        if denominator.is_zero() || numerator > denominator {
            return Err(PricerError::InvalidFraction {
                numerator,
                denominator,
            });
        }
        Ok(Self {
            numerator,
            denominator,
        })
    }

    /// Convenience constructor for small constants.
    pub fn from_parts(numerator: u64, denominator: u64) -> Result<Self, PricerError> {
        Self::new(U256::from(numerator), U256::from(denominator))
    }

    pub const fn numerator(&self) -> U256 {
        self.numerator
    }

    pub const fn denominator(&self) -> U256 {
        self.denominator
    }

    /// `amount * self`, rounded as requested.
    pub fn apply(&self, amount: U256, rounding: Rounding) -> Result<U256, MathError> {
        get_partial_amount(self.numerator, self.denominator, amount, rounding)
    }

    /// Compares the values of two fractions regardless of representation.
    pub fn value_cmp(&self, other: &Self) -> Ordering {
        let lhs = U512::from(self.numerator) * U512::from(other.denominator);
        let rhs = U512::from(other.numerator) * U512::from(self.denominator);
        lhs.cmp(&rhs)
    }
}

/// Where a position sits in its liquidation lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuctionPhase {
    /// No margin call; liquidation is not available.
    NotCalled,
    /// Inside the call window.
    Running { elapsed: u64 },
    /// Window has run out; the terminal fraction applies.
    Lapsed { overdue: u64 },
}

/// Linear-ramp dutch auction over a margin call window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DutchAuctionPricer {
    start: Fraction,
    end: Fraction,
}

impl DutchAuctionPricer {
    /// Creates a pricer ramping from `start` to `end`.
    pub fn new(start: Fraction, end: Fraction) -> Self {
        Self { start, end }
    }

    /// Validates raw constants and builds the pricer.
    ///
    /// # Errors
    /// `PricerError::InvalidFraction` if either denominator is zero or
    /// either numerator exceeds its denominator.
    pub fn from_constants(
        start_numerator: U256,
        start_denominator: U256,
        end_numerator: U256,
        end_denominator: U256,
    ) -> Result<Self, PricerError> {
        Ok(Self::new(
            Fraction::new(start_numerator, start_denominator)?,
            Fraction::new(end_numerator, end_denominator)?,
        ))
    }

    pub const fn start(&self) -> Fraction {
        self.start
    }

    pub const fn end(&self) -> Fraction {
        self.end
    }

    /// Classifies `position` at unix time `now`.
    ///
    /// A call timestamp in the future counts as zero elapsed time.
    pub fn phase(&self, position: &Position, now: u64) -> AuctionPhase {
        if !position.is_called {
            return AuctionPhase::NotCalled;
        }
        let elapsed = now.saturating_sub(position.call_timestamp);
        if elapsed >= position.call_time_limit {
            AuctionPhase::Lapsed {
                overdue: elapsed - position.call_time_limit,
            }
        } else {
            AuctionPhase::Running { elapsed }
        }
    }

    /// Exact ramp value `(numerator, denominator)` in the wide domain.
    ///
    /// Interior points sit over the common denominator `ds * de * limit`,
    /// which needs up to 576 bits.
    fn ramp(&self, elapsed: u64, call_time_limit: u64) -> (Wide, Wide) {
        let wide = |x: U256| Wide::from(x);
        if call_time_limit == 0 || elapsed >= call_time_limit {
            return (wide(self.end.numerator), wide(self.end.denominator));
        }
        if elapsed == 0 {
            return (wide(self.start.numerator), wide(self.start.denominator));
        }

        let limit = Wide::from(call_time_limit);
        let elapsed = Wide::from(elapsed);
        let start = wide(self.start.numerator) * wide(self.end.denominator);
        let end = wide(self.end.numerator) * wide(self.start.denominator);
        let denominator = wide(self.start.denominator) * wide(self.end.denominator) * limit;
        let base = start * limit;

        let numerator = if end >= start {
            base + (end - start) * elapsed
        } else {
            // (start - end) * elapsed < start * limit, cannot underflow
            base - (start - end) * elapsed
        };
        (numerator, denominator)
    }

    /// Required fraction after `elapsed` seconds of a `call_time_limit` window.
    ///
    /// The exact value is reduced to lowest terms. If its denominator still
    /// exceeds 256 bits it is re-expressed over `U256::MAX`, rounding up.
    pub fn required_fraction(
        &self,
        elapsed: u64,
        call_time_limit: u64,
    ) -> Result<Fraction, PricerError> {
        if call_time_limit == 0 || elapsed >= call_time_limit {
            return Ok(self.end);
        }
        if elapsed == 0 {
            return Ok(self.start);
        }

        let (numerator, denominator) = self.ramp(elapsed, call_time_limit);
        let gcd = numerator.gcd(denominator);
        let (numerator, denominator) = (numerator / gcd, denominator / gcd);

        if let (Ok(n), Ok(d)) = (narrow_wide(numerator), narrow_wide(denominator)) {
            return Fraction::new(n, d);
        }

        let scale = Wide::from(U256::MAX);
        let product = numerator * scale;
        let mut scaled = product / denominator;
        if !(product % denominator).is_zero() {
            scaled += Wide::from(1u8);
        }
        Fraction::new(narrow_wide(scaled.min(scale))?, U256::MAX)
    }

    /// Minimum debt a liquidator must retire from `position` at `now`,
    /// rounded up. `None` when the position is not margin-called.
    pub fn minimum_close_amount(
        &self,
        position: &Position,
        now: u64,
    ) -> Result<Option<U256>, PricerError> {
        let elapsed = match self.phase(position, now) {
            AuctionPhase::NotCalled => return Ok(None),
            AuctionPhase::Running { elapsed } => elapsed,
            AuctionPhase::Lapsed { .. } => position.call_time_limit,
        };
        let (numerator, denominator) = self.ramp(elapsed, position.call_time_limit);

        let product = Wide::from(position.debt_amount) * numerator;
        let mut amount = product / denominator;
        if !(product % denominator).is_zero() {
            amount += Wide::from(1u8);
        }
        Ok(Some(narrow_wide(amount)?))
    }
}

/// Intermediate wide enough for `debt * ds * de * limit`.
type Wide = Uint<1024, 16>;

fn narrow_wide(value: Wide) -> Result<U256, MathError> {
    value.uint_try_to().map_err(|_| MathError::Overflow)
}
