//! Error Taxonomy - Typed Failures for the Settlement Path
//!
//! Every fatal condition on the close / liquidate / exchange path has a
//! typed variant here. Benign "nothing to do" outcomes are NOT errors;
//! they surface as a zero amount (see `usecases::auction_proxy`).
//!
//! Layering mirrors the call graph:
//! `ProxyError` ⊃ `LendingError` ⊃ `AdapterError` ⊃ `VenueError` ⊃ `TokenError`.

use alloy::primitives::{Address, B256, U256};
use thiserror::Error;

/// Arithmetic precondition failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MathError {
    #[error("division by zero")]
    DivisionByZero,
    #[error("arithmetic overflow")]
    Overflow,
    #[error("arithmetic underflow")]
    Underflow,
}

/// Order payload decoding failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderCodecError {
    #[error("order payload must be {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },
    #[error("unsupported order payload version {0:#04x}")]
    UnsupportedVersion(u8),
    #[error("word {index} is not a left-padded address")]
    DirtyAddressWord { index: usize },
    #[error("signature v does not fit in a byte")]
    InvalidSignatureV,
    #[error("order is for pair {order_maker}/{order_taker}, caller asked for {maker_token}/{taker_token}")]
    TokenPairMismatch {
        order_maker: Address,
        order_taker: Address,
        maker_token: Address,
        taker_token: Address,
    },
}

/// Token ledger failures (balance / allowance).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("{owner} holds {available} of {token}, needs {needed}")]
    InsufficientBalance {
        token: Address,
        owner: Address,
        needed: U256,
        available: U256,
    },
    #[error("{spender} may move {available} of {token} for {owner}, needs {needed}")]
    InsufficientAllowance {
        token: Address,
        owner: Address,
        spender: Address,
        needed: U256,
        available: U256,
    },
    #[error(transparent)]
    Math(#[from] MathError),
}

/// Rejections reported by the external order-book venue.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VenueError {
    #[error("order amounts must be non-zero")]
    InvalidAmounts,
    #[error("fill amount must be non-zero")]
    ZeroFillAmount,
    #[error("order {0} signature does not recover to its maker")]
    InvalidSignature(B256),
    #[error("order {hash} expired at {expiration} (now {now})")]
    Expired { hash: B256, expiration: u64, now: u64 },
    #[error("order {0} is fully filled or cancelled")]
    FullyFilledOrCancelled(B256),
    #[error("order {hash} is restricted to taker {expected}")]
    TakerNotPermitted { hash: B256, expected: Address },
    #[error("fill of {0} rounds by more than 0.1%")]
    RoundingErrorTooLarge(U256),
    #[error("order {hash} has {remaining} taker units left, fill-or-kill needs {requested}")]
    InsufficientRemaining {
        hash: B256,
        requested: U256,
        remaining: U256,
    },
    #[error("only the maker may cancel order {0}")]
    NotMaker(B256),
    #[error(transparent)]
    Token(#[from] TokenError),
    #[error(transparent)]
    Math(#[from] MathError),
}

/// Exchange adapter failures. All are raised before any token movement
/// except those passed through from the venue, which itself moves nothing
/// on failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdapterError {
    #[error("caller {0} is not in the adapter authorization set")]
    Unauthorized(Address),
    #[error("order charges taker fee {taker_fee} to fee recipient {fee_recipient}")]
    TakerFeeNotAllowed {
        fee_recipient: Address,
        taker_fee: U256,
    },
    #[error("malformed order payload: {0}")]
    MalformedOrder(#[from] OrderCodecError),
    #[error("adapter holds {available} of taker token {token}, needs {needed}")]
    InsufficientTakerBalance {
        token: Address,
        needed: U256,
        available: U256,
    },
    #[error("order {0} has no remaining fillable amount")]
    OrderFullyConsumed(B256),
    #[error("requested {requested} taker units exceeds remaining {remaining}")]
    ExceedsRemainingFill { requested: U256, remaining: U256 },
    #[error(transparent)]
    Venue(#[from] VenueError),
    #[error(transparent)]
    Token(#[from] TokenError),
    #[error(transparent)]
    Math(#[from] MathError),
}

/// Dutch auction pricer construction / evaluation failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PricerError {
    #[error("fraction {numerator}/{denominator} is outside [0, 1]")]
    InvalidFraction { numerator: U256, denominator: U256 },
    #[error(transparent)]
    Math(#[from] MathError),
}

/// Lending core close-path failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LendingError {
    #[error("position {0} is not open")]
    PositionNotOpen(B256),
    #[error("{closer} may not close position {position_id}")]
    UnauthorizedCloser { position_id: B256, closer: Address },
    #[error("trade costs {cost} collateral but only {available} is released")]
    InsufficientCollateral { cost: U256, available: U256 },
    #[error("trade returned {received} debt tokens, {required} required")]
    InsufficientProceeds { received: U256, required: U256 },
    #[error(transparent)]
    Exchange(#[from] AdapterError),
    #[error(transparent)]
    Token(#[from] TokenError),
    #[error(transparent)]
    Math(#[from] MathError),
}

/// Auction proxy failures. Only hard failures reach this type; absent
/// positions and unfillable requests resolve to a zero amount instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProxyError {
    #[error(transparent)]
    Lending(#[from] LendingError),
    #[error(transparent)]
    Pricer(#[from] PricerError),
    #[error(transparent)]
    Adapter(#[from] AdapterError),
}
