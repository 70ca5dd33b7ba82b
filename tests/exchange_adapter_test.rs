//! Exchange Adapter Tests - Trades Against the In-Memory Venue
//!
//! Drives `ZeroExExchangeAdapter` end-to-end: quotes, capacity, fills,
//! and every precondition that must reject a trade before tokens move.

mod common;

use alloy::primitives::{address, Address, Bytes, U256};

use common::*;
use margin_settlement_core::adapters::zero_ex::ZeroExExchangeAdapter;
use margin_settlement_core::config::AdapterConfig;
use margin_settlement_core::error::{AdapterError, VenueError};
use margin_settlement_core::ports::exchange::{ExchangeAdapter, ExchangeRequest};
use margin_settlement_core::ports::token::TokenLedger;
use margin_settlement_core::ports::venue::OrderBookVenue;

fn request(caller: Address, amount: u64, payload: Bytes) -> ExchangeRequest {
  ExchangeRequest {
    caller,
    trade_originator: TRADER,
    receiver: RECEIVER,
    maker_token: DEBT_TOKEN,
    taker_token: COLLATERAL_TOKEN,
    requested_taker_amount: u(amount),
    order_payload: payload,
  }
}

// ── Happy path ──────────────────────────────────────────────

#[tokio::test]
async fn test_partial_fill_end_to_end() {
  let w = World::new();
  let (order, payload) = w.sign(w.order(100, 100));
  w.fund_maker(&order).await;
  w.ledger.mint(COLLATERAL_TOKEN, ADAPTER, u(20)).unwrap();

  let received = w.adapter.exchange(request(TRADER, 20, payload.clone())).await.unwrap();

  assert_eq!(received, u(20));
  assert_eq!(w.ledger.balance(DEBT_TOKEN, RECEIVER), u(20));
  assert_eq!(w.ledger.balance(DEBT_TOKEN, ADAPTER), U256::ZERO);
  assert_eq!(w.ledger.balance(COLLATERAL_TOKEN, order.maker), u(20));
  assert_eq!(
    w.venue.unavailable_taker_amount(order.hash(VENUE)).await.unwrap(),
    u(20)
  );
  assert_eq!(
    w.adapter
      .get_max_maker_amount(DEBT_TOKEN, COLLATERAL_TOKEN, &payload)
      .await
      .unwrap(),
    u(80)
  );
  // Standing approval sits on the token the venue pulls from the adapter.
  assert_eq!(
    w.ledger
      .allowance(COLLATERAL_TOKEN, ADAPTER, SETTLEMENT_PROXY)
      .await
      .unwrap(),
    U256::MAX
  );
}

#[tokio::test]
async fn test_quote_rounds_up_and_capacity_rounds_down() {
  let w = World::new();
  let (_, payload) = w.sign(w.order(3, 7));

  let cost = w
    .adapter
    .get_exchange_cost(DEBT_TOKEN, COLLATERAL_TOKEN, u(1), &payload)
    .await
    .unwrap();
  assert_eq!(cost, u(3));

  let capacity = w
    .adapter
    .get_max_maker_amount(DEBT_TOKEN, COLLATERAL_TOKEN, &payload)
    .await
    .unwrap();
  assert_eq!(capacity, u(3));
}

#[tokio::test]
async fn test_capacity_shrinks_with_each_fill() {
  let w = World::new();
  let (order, payload) = w.sign(w.order(100, 100));
  w.fund_maker(&order).await;
  w.ledger.mint(COLLATERAL_TOKEN, ADAPTER, u(100)).unwrap();

  let mut last = u(100);
  for amount in [10, 30, 60] {
    w.adapter.exchange(request(TRADER, amount, payload.clone())).await.unwrap();
    let capacity = w
      .adapter
      .get_max_maker_amount(DEBT_TOKEN, COLLATERAL_TOKEN, &payload)
      .await
      .unwrap();
    assert!(capacity < last);
    last = capacity;
  }
  assert_eq!(last, U256::ZERO);

  w.ledger.mint(COLLATERAL_TOKEN, ADAPTER, u(1)).unwrap();
  let err = w.adapter.exchange(request(TRADER, 1, payload)).await.unwrap_err();
  assert!(matches!(err, AdapterError::OrderFullyConsumed(_)));
}

#[tokio::test]
async fn test_capacity_drops_by_exact_maker_share() {
  let w = World::new();
  let (order, payload) = w.sign(w.order(300, 700));
  w.fund_maker(&order).await;
  w.ledger.mint(COLLATERAL_TOKEN, ADAPTER, u(420)).unwrap();

  let capacity = |w: &World| {
    let adapter = w.adapter.clone();
    let payload = payload.clone();
    async move {
      adapter
        .get_max_maker_amount(DEBT_TOKEN, COLLATERAL_TOKEN, &payload)
        .await
        .unwrap()
    }
  };

  let mut last = capacity(&w).await;
  assert_eq!(last, u(300));
  for (taker, maker) in [(70, 30), (140, 60), (210, 90)] {
    let received = w.adapter.exchange(request(TRADER, taker, payload.clone())).await.unwrap();
    assert_eq!(received, u(maker));

    let now = capacity(&w).await;
    assert_eq!(last - now, u(maker));
    last = now;
  }
  assert_eq!(last, u(120));
  assert_eq!(w.ledger.balance(DEBT_TOKEN, RECEIVER), u(180));
}

// ── Rejections ──────────────────────────────────────────────

#[tokio::test]
async fn test_unauthorized_caller_moves_nothing() {
  let w = World::new();
  let (order, payload) = w.sign(w.order(100, 100));
  w.fund_maker(&order).await;
  w.ledger.mint(COLLATERAL_TOKEN, ADAPTER, u(20)).unwrap();
  let before = w.ledger.snapshot();

  let err = w.adapter.exchange(request(OWNER, 20, payload)).await.unwrap_err();

  assert_eq!(err, AdapterError::Unauthorized(OWNER));
  assert_eq!(w.ledger.snapshot(), before);
}

#[tokio::test]
async fn test_taker_fee_order_is_refused() {
  let w = World::new();
  let mut order = w.order(100, 100);
  order.fee_recipient = address!("0000000000000000000000000000000000004001");
  order.taker_fee = u(1);
  let (order, payload) = w.sign(order);
  w.fund_maker(&order).await;
  w.ledger.mint(COLLATERAL_TOKEN, ADAPTER, u(20)).unwrap();
  let before = w.ledger.snapshot();

  let err = w.adapter.exchange(request(TRADER, 20, payload)).await.unwrap_err();

  assert!(matches!(err, AdapterError::TakerFeeNotAllowed { .. }));
  assert_eq!(w.ledger.snapshot(), before);
  assert_eq!(w.venue.filled(order.hash(VENUE)).await.unwrap(), U256::ZERO);
}

#[tokio::test]
async fn test_unfunded_adapter_is_refused() {
  let w = World::new();
  let (order, payload) = w.sign(w.order(100, 100));
  w.fund_maker(&order).await;
  w.ledger.mint(COLLATERAL_TOKEN, ADAPTER, u(19)).unwrap();

  let err = w.adapter.exchange(request(TRADER, 20, payload)).await.unwrap_err();

  assert_eq!(
    err,
    AdapterError::InsufficientTakerBalance {
      token: COLLATERAL_TOKEN,
      needed: u(20),
      available: u(19),
    }
  );
}

#[tokio::test]
async fn test_request_above_remaining_is_refused() {
  let w = World::new();
  let (order, payload) = w.sign(w.order(100, 100));
  w.fund_maker(&order).await;
  w.ledger.mint(COLLATERAL_TOKEN, ADAPTER, u(200)).unwrap();

  let err = w.adapter.exchange(request(TRADER, 101, payload)).await.unwrap_err();

  assert_eq!(
    err,
    AdapterError::ExceedsRemainingFill {
      requested: u(101),
      remaining: u(100),
    }
  );
}

#[tokio::test]
async fn test_expired_order_has_no_capacity_and_cannot_fill() {
  let w = World::new();
  let (order, payload) = w.sign(w.order(100, 100));
  w.fund_maker(&order).await;
  w.ledger.mint(COLLATERAL_TOKEN, ADAPTER, u(20)).unwrap();
  w.clock.set(START_TIME + 3_600);

  let capacity = w
    .adapter
    .get_max_maker_amount(DEBT_TOKEN, COLLATERAL_TOKEN, &payload)
    .await
    .unwrap();
  assert_eq!(capacity, U256::ZERO);

  let err = w.adapter.exchange(request(TRADER, 20, payload)).await.unwrap_err();
  assert!(matches!(err, AdapterError::Venue(VenueError::Expired { .. })));
  assert_eq!(w.ledger.balance(COLLATERAL_TOKEN, ADAPTER), u(20));
  assert_eq!(w.ledger.balance(DEBT_TOKEN, order.maker), u(100));
}

#[tokio::test]
async fn test_mismatched_pair_is_malformed() {
  let w = World::new();
  let (_, payload) = w.sign(w.order(100, 100));

  let err = w
    .adapter
    .get_exchange_cost(COLLATERAL_TOKEN, DEBT_TOKEN, u(1), &payload)
    .await
    .unwrap_err();
  assert!(matches!(err, AdapterError::MalformedOrder(_)));

  let capacity = w
    .adapter
    .get_max_maker_amount(COLLATERAL_TOKEN, DEBT_TOKEN, &payload)
    .await
    .unwrap();
  assert_eq!(capacity, U256::ZERO);
}

// ── Construction ────────────────────────────────────────────

#[tokio::test]
async fn test_from_config_rejects_miswired_venue() {
  let w = World::new();
  let mut config = AdapterConfig {
    address: ADAPTER,
    venue: VENUE,
    settlement_proxy: SETTLEMENT_PROXY,
    fee_token: FEE_TOKEN,
    authorized_callers: vec![CORE],
  };

  let adapter = ZeroExExchangeAdapter::from_config(
    &config,
    w.venue.clone(),
    w.ledger.clone(),
    w.clock.clone(),
  )
  .unwrap();
  assert_eq!(adapter.address(), ADAPTER);
  assert!(adapter.authorized_callers().contains(CORE));
  assert!(!adapter.authorized_callers().contains(TRADER));

  config.settlement_proxy = address!("0000000000000000000000000000000000004002");
  let result = ZeroExExchangeAdapter::from_config(
    &config,
    w.venue.clone(),
    w.ledger.clone(),
    w.clock.clone(),
  );
  assert!(result.is_err());
}
