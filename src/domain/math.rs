//! Partial-amount arithmetic.
//!
//! Scales an order's maker / taker / fee quantities by a fill ratio:
//! `target * numerator / denominator`. The product is formed in a 512-bit
//! intermediate so no `U256` input can overflow it; only a quotient that
//! does not fit back into 256 bits is rejected.
//!
//! Rounding is explicit at every call site:
//! - `Rounding::Up` where over-asking protects the protocol (cost quotes)
//! - `Rounding::Down` for amounts actually delivered or reported available

use alloy::primitives::{U256, U512};
use alloy::primitives::ruint::UintTryTo;
use serde::{Deserialize, Serialize};

use crate::error::MathError;

/// Rounding direction for a partial amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Rounding {
    /// Truncate toward zero.
    Down,
    /// Round toward positive infinity.
    Up,
}

/// Relative rounding error above which a fill is refused (0.1%, in ppm).
const MAX_ROUNDING_ERROR_PPM: u64 = 1_000;

/// Computes `target * numerator / denominator` with the given rounding.
///
/// # Errors
/// - `MathError::DivisionByZero` if `denominator` is zero
/// - `MathError::Overflow` if the quotient exceeds `U256::MAX`
pub fn get_partial_amount(
    numerator: U256,
    denominator: U256,
    target: U256,
    rounding: Rounding,
) -> Result<U256, MathError> {
    if denominator.is_zero() {
        return Err(MathError::DivisionByZero);
    }

    let product = U512::from(target) * U512::from(numerator);
    let denominator = U512::from(denominator);

    let mut quotient = product / denominator;
    if rounding == Rounding::Up && !(product % denominator).is_zero() {
        quotient += U512::from(1u8);
    }

    narrow(quotient)
}

/// Narrows a 512-bit intermediate back to `U256`.
///
/// # Errors
/// Returns `MathError::Overflow` if `value` exceeds `U256::MAX`.
pub fn narrow(value: U512) -> Result<U256, MathError> {
    value.uint_try_to().map_err(|_| MathError::Overflow)
}

/// Reports whether `target * numerator / denominator` loses more than 0.1%
/// of its value to truncation. The venue refuses such fills.
///
/// # Errors
/// Returns `MathError::DivisionByZero` if `denominator` is zero.
pub fn is_rounding_error(
    numerator: U256,
    denominator: U256,
    target: U256,
) -> Result<bool, MathError> {
    if denominator.is_zero() {
        return Err(MathError::DivisionByZero);
    }

    let product = U512::from(target) * U512::from(numerator);
    let remainder = product % U512::from(denominator);
    if remainder.is_zero() {
        return Ok(false);
    }

    let error_ppm = remainder * U512::from(1_000_000u64) / product;
    Ok(error_ppm > U512::from(MAX_ROUNDING_ERROR_PPM))
}

/// `a + b`, failing on overflow.
pub fn checked_add(a: U256, b: U256) -> Result<U256, MathError> {
    a.checked_add(b).ok_or(MathError::Overflow)
}

/// `a - b`, failing on underflow.
pub fn checked_sub(a: U256, b: U256) -> Result<U256, MathError> {
    a.checked_sub(b).ok_or(MathError::Underflow)
}
