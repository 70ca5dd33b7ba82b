//! Clock Port - Unix Time Source
//!
//! Expiry checks and auction pricing read time through this trait so
//! tests can pin it.

/// Source of the current unix time in seconds.
pub trait Clock: Send + Sync + 'static {
  fn now_unix(&self) -> u64;
}
