//! Shared Test Fixtures - A Wired In-Memory Settlement World
//!
//! One ledger, one venue, one adapter, one lending core and one auction
//! proxy, plus a deterministic maker key for signing orders.

#![allow(dead_code)]

use std::sync::Arc;

use alloy::primitives::{address, Address, Bytes, B256, U256};
use alloy::signers::local::PrivateKeySigner;
use alloy::signers::SignerSync;

use margin_settlement_core::adapters::memory::{
  InMemoryLendingCore, InMemoryTokenLedger, InMemoryVenue,
};
use margin_settlement_core::adapters::zero_ex::ZeroExExchangeAdapter;
use margin_settlement_core::adapters::ManualClock;
use margin_settlement_core::domain::auction::{DutchAuctionPricer, Fraction};
use margin_settlement_core::domain::authorization::AuthorizationSet;
use margin_settlement_core::domain::order::{Order, OrderSignature};
use margin_settlement_core::domain::position::Position;
use margin_settlement_core::ports::token::TokenLedger;
use margin_settlement_core::usecases::AuctionProxy;

pub const VENUE: Address = address!("0000000000000000000000000000000000001000");
pub const SETTLEMENT_PROXY: Address = address!("0000000000000000000000000000000000001001");
pub const FEE_TOKEN: Address = address!("0000000000000000000000000000000000001002");
pub const ADAPTER: Address = address!("0000000000000000000000000000000000001003");
pub const CORE: Address = address!("0000000000000000000000000000000000001004");
pub const AUCTION: Address = address!("0000000000000000000000000000000000001005");

/// Token the maker sells (the position's debt token).
pub const DEBT_TOKEN: Address = address!("0000000000000000000000000000000000002001");
/// Token the adapter sells (the position's collateral token).
pub const COLLATERAL_TOKEN: Address = address!("0000000000000000000000000000000000002002");

pub const TRADER: Address = address!("0000000000000000000000000000000000003001");
pub const OWNER: Address = address!("0000000000000000000000000000000000003002");
pub const LENDER: Address = address!("0000000000000000000000000000000000003003");
pub const RECEIVER: Address = address!("0000000000000000000000000000000000003004");

pub const START_TIME: u64 = 1_700_000_000;

pub fn u(v: u64) -> U256 {
  U256::from(v)
}

pub struct World {
  pub ledger: Arc<InMemoryTokenLedger>,
  pub clock: Arc<ManualClock>,
  pub venue: Arc<InMemoryVenue>,
  pub adapter: Arc<ZeroExExchangeAdapter>,
  pub core: Arc<InMemoryLendingCore>,
  pub proxy: AuctionProxy,
  pub maker: PrivateKeySigner,
}

/// Route `tracing` output to the test harness; `RUST_LOG` filters it.
pub fn init_tracing() {
  let _ = tracing_subscriber::fmt()
    .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
    .with_test_writer()
    .try_init();
}

impl World {
  pub fn new() -> Self {
    init_tracing();
    let ledger = Arc::new(InMemoryTokenLedger::new());
    let clock = Arc::new(ManualClock::new(START_TIME));
    let venue = Arc::new(InMemoryVenue::new(
      VENUE,
      SETTLEMENT_PROXY,
      FEE_TOKEN,
      ledger.clone(),
      clock.clone(),
    ));
    let adapter = Arc::new(ZeroExExchangeAdapter::new(
      ADAPTER,
      venue.clone(),
      ledger.clone(),
      clock.clone(),
      AuthorizationSet::new([CORE, TRADER]),
    ));
    let core = Arc::new(
      InMemoryLendingCore::new(CORE, ledger.clone(), AuthorizationSet::new([AUCTION]))
        .with_venue(venue.clone()),
    );
    let proxy = AuctionProxy::new(AUCTION, core.clone(), clock.clone());
    let maker = PrivateKeySigner::from_bytes(&B256::repeat_byte(0x42)).unwrap();

    Self {
      ledger,
      clock,
      venue,
      adapter,
      core,
      proxy,
      maker,
    }
  }

  /// Unsigned order selling `maker_amount` debt tokens for
  /// `taker_amount` collateral tokens, valid for an hour.
  pub fn order(&self, maker_amount: u64, taker_amount: u64) -> Order {
    Order {
      maker: self.maker.address(),
      taker: Address::ZERO,
      maker_token: DEBT_TOKEN,
      taker_token: COLLATERAL_TOKEN,
      fee_recipient: Address::ZERO,
      maker_amount: u(maker_amount),
      taker_amount: u(taker_amount),
      maker_fee: U256::ZERO,
      taker_fee: U256::ZERO,
      expiration_unix_timestamp_sec: u(START_TIME + 3_600),
      salt: u(7),
      signature: OrderSignature {
        v: 0,
        r: B256::ZERO,
        s: B256::ZERO,
      },
    }
  }

  /// Second order from the same maker, distinguished by salt.
  pub fn other_order(&self, maker_amount: u64, taker_amount: u64) -> Order {
    Order {
      salt: u(8),
      ..self.order(maker_amount, taker_amount)
    }
  }

  /// Sign `order` with the maker key and return its payload.
  pub fn sign(&self, mut order: Order) -> (Order, Bytes) {
    let hash = order.hash(VENUE);
    let signature = self.maker.sign_message_sync(hash.as_slice()).unwrap();
    order.signature = OrderSignature::from_rsv(&signature.as_bytes());
    let payload = order.encode();
    (order, payload)
  }

  /// Give the maker the maker tokens of `order` and approve the proxy.
  pub async fn fund_maker(&self, order: &Order) {
    self
      .ledger
      .mint(order.maker_token, order.maker, order.maker_amount)
      .unwrap();
    self
      .ledger
      .approve(order.maker_token, order.maker, SETTLEMENT_PROXY, U256::MAX)
      .await
      .unwrap();
  }

  /// Register a position whose collateral sits in the core's vault.
  pub fn open_position(&self, debt: u64, collateral: u64, called: bool) -> Position {
    let position = Position {
      id: B256::repeat_byte(0x01),
      owner: OWNER,
      lender: LENDER,
      collateral_token: COLLATERAL_TOKEN,
      debt_token: DEBT_TOKEN,
      collateral_amount: u(collateral),
      debt_amount: u(debt),
      is_open: true,
      is_called: called,
      call_timestamp: START_TIME,
      call_time_limit: 1_000,
    };
    self
      .ledger
      .mint(COLLATERAL_TOKEN, CORE, u(collateral))
      .unwrap();
    self.core.insert_position(position.clone());
    position
  }
}

/// Ramp from closing all of the debt down to a tenth of it.
pub fn falling_pricer() -> DutchAuctionPricer {
  DutchAuctionPricer::new(
    Fraction::from_parts(1, 1).unwrap(),
    Fraction::from_parts(1, 10).unwrap(),
  )
}
