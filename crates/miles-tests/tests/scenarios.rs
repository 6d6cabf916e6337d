//! End-to-end session scenarios.
//!
//! Each test wires a `SessionState` to scripted wallet and ledger
//! collaborators and drives it the way a presentation layer would.

use chrono::Duration;
use miles_core::error::{ConnectionError, LedgerFetchError};
use miles_core::types::*;
use miles_tests::helpers::*;

// ======================================================================
// Scenario A: unknown ledger gates even zero-requirement products.
// ======================================================================

#[tokio::test]
async fn scenario_a_unknown_ledger_gates_zero_requirement() {
    let mut h = Harness::new(catalog(&[(1, 0)]));
    assert_eq!(h.session.eligibility().get(ProductId(1)), Some(false));

    // Connected, but the ledger source fails: still unknown, still gated.
    h.ledger.push_response(Err(LedgerFetchError::Unavailable("indexer down".into())));
    h.session.request_connect(Network::Testnet).await.unwrap();
    assert!(h.session.is_ready());
    assert_eq!(h.session.ledger(), &MilesLedger::Unknown);
    assert_eq!(h.session.aggregate().total_active_miles, None);
    assert_eq!(h.session.eligibility().get(ProductId(1)), Some(false));
}

// ======================================================================
// Scenario B: balance exactly at a threshold.
// ======================================================================

#[tokio::test]
async fn scenario_b_threshold() {
    let mut h = Harness::new(catalog(&[(1, 500), (2, 501)]));
    h.ledger.push_response(Ok(vec![grant(500, 30)]));
    h.session.request_connect(Network::Testnet).await.unwrap();

    let snap = h.session.snapshot();
    assert_eq!(snap.total_active_miles(), Some(500));
    assert_eq!(snap.next_expiration(), Some(t0() + Duration::days(30)));
    assert_eq!(snap.eligibility.get(ProductId(1)), Some(true));
    assert_eq!(snap.eligibility.get(ProductId(2)), Some(false));
}

// ======================================================================
// Scenario C: expired grants still count toward the total.
// ======================================================================

#[tokio::test]
async fn scenario_c_expired_grants_counted() {
    let mut h = Harness::new(catalog(&[(1, 150), (2, 151)]));
    h.ledger.push_response(Ok(vec![grant(100, -1), grant(50, 5)]));
    h.session.request_connect(Network::Testnet).await.unwrap();

    assert_eq!(h.session.aggregate().total_active_miles, Some(150));
    assert_eq!(h.session.aggregate().next_expiration, Some(t0() + Duration::days(5)));
    assert!(h.session.eligibility().is_eligible(ProductId(1)));
    assert!(!h.session.eligibility().is_eligible(ProductId(2)));
}

// ======================================================================
// Scenario D: rejected connect reverts and surfaces the error.
// ======================================================================

#[tokio::test]
async fn scenario_d_rejected_connect() {
    let mut h = Harness::new(catalog(&[(1, 0), (2, 100)]));
    h.wallet.push_outcome(Err(ConnectionError::Rejected("user aborted".into())));
    let before = h.session.snapshot();

    let err = h.session.request_connect(Network::Mainnet).await.unwrap_err();
    assert_eq!(err, ConnectionError::Rejected("user aborted".into()));
    assert_eq!(err.to_string(), "connection rejected: user aborted");
    assert_eq!(h.session.connection_state(), ConnectionState::Disconnected);
    assert_eq!(h.session.aggregate(), &before.aggregate);
    assert_eq!(h.session.eligibility(), &before.eligibility);
    assert!(h.ledger.fetch_calls().is_empty());
    assert_eq!(h.wallet.connect_calls(), vec![Network::Mainnet]);
}

#[tokio::test]
async fn unsupported_network_then_retry_succeeds() {
    let mut h = Harness::new(catalog(&[(1, 10)]));
    h.wallet.push_outcome(Err(ConnectionError::UnsupportedNetwork(Network::Sandbox)));
    h.ledger.push_response(Ok(vec![grant(10, 1)]));

    assert!(h.session.request_connect(Network::Sandbox).await.is_err());
    h.session.request_connect(Network::Testnet).await.unwrap();

    assert_eq!(h.wallet.connect_calls(), vec![Network::Sandbox, Network::Testnet]);
    assert_eq!(h.ledger.fetch_calls(), vec![AccountId::new(ScriptedWallet::ACCOUNT)]);
    assert!(h.session.eligibility().is_eligible(ProductId(1)));
}

// ======================================================================
// Idempotence and time sensitivity
// ======================================================================

#[tokio::test]
async fn repeated_ledger_update_is_identical() {
    let mut h = Harness::new(catalog(&[(1, 100), (2, 1_000)]));
    h.ledger.push_response(Ok(vec![grant(40, 2), grant(80, 9)]));
    h.session.request_connect(Network::Testnet).await.unwrap();

    let ledger = h.session.ledger().clone();
    h.session.handle_ledger_update(ledger.clone());
    let first = h.session.snapshot();
    h.session.handle_ledger_update(ledger);
    assert_eq!(h.session.snapshot(), first);
}

#[tokio::test]
async fn next_expiration_moves_as_clock_advances() {
    let mut h = Harness::new(catalog(&[]));
    h.ledger.push_response(Ok(vec![grant(10, 1), grant(20, 3)]));
    h.session.request_connect(Network::Testnet).await.unwrap();
    assert_eq!(h.session.aggregate().next_expiration, Some(t0() + Duration::days(1)));

    h.clock.advance(Duration::days(2));
    let ledger = h.session.ledger().clone();
    h.session.handle_ledger_update(ledger);
    assert_eq!(h.session.aggregate().next_expiration, Some(t0() + Duration::days(3)));
    assert_eq!(h.session.aggregate().total_active_miles, Some(30));

    h.clock.advance(Duration::days(2));
    let ledger = h.session.ledger().clone();
    h.session.handle_ledger_update(ledger);
    assert_eq!(h.session.aggregate().next_expiration, None);
}

// ======================================================================
// Disconnect and session loss
// ======================================================================

#[tokio::test]
async fn session_loss_via_event_stream() {
    let mut h = Harness::new(catalog(&[(1, 5)]));
    h.ledger.push_response(Ok(vec![grant(5, 10)]));
    h.session.request_connect(Network::Testnet).await.unwrap();
    assert!(h.session.eligibility().is_eligible(ProductId(1)));

    let mut events = h.session.controller().wallet_events();
    h.wallet.emit_session_lost("extension closed");
    let event = events.recv().await.unwrap();
    h.session.handle_wallet_event(event).await;

    assert_eq!(h.session.connection_state(), ConnectionState::Disconnected);
    // Last known balance stays visible.
    assert_eq!(h.session.aggregate().total_active_miles, Some(5));
    assert!(!h.session.eligibility().is_eligible(ProductId(1)));
}

#[tokio::test]
async fn explicit_disconnect_then_reconnect() {
    let mut h = Harness::new(catalog(&[(1, 5)]));
    h.ledger.push_response(Ok(vec![grant(5, 10)]));
    h.ledger.push_response(Ok(vec![grant(2, 10)]));

    h.session.request_connect(Network::Testnet).await.unwrap();
    h.session.disconnect().await.unwrap();
    assert_eq!(h.session.eligibility().eligible_count(), 0);

    h.session.request_connect(Network::Testnet).await.unwrap();
    assert_eq!(h.session.ledger().len(), 1);
    assert_eq!(h.session.aggregate().total_active_miles, Some(2));
    assert!(!h.session.eligibility().is_eligible(ProductId(1)));
    assert_eq!(h.ledger.fetch_calls().len(), 2);
}

#[tokio::test]
async fn account_switch_while_connected_refetches() {
    let mut h = Harness::new(catalog(&[(1, 500)]));
    h.ledger.push_response(Ok(vec![grant(500, 30)]));
    h.session.request_connect(Network::Testnet).await.unwrap();
    assert!(h.session.eligibility().is_eligible(ProductId(1)));

    h.wallet.push_outcome(Ok(WalletSession {
        account: AccountId::new("tz1other"),
        network: Network::Testnet,
    }));
    h.ledger.push_response(Ok(vec![grant(20, 5)]));
    h.session.request_connect(Network::Testnet).await.unwrap();

    assert_eq!(
        h.ledger.fetch_calls(),
        vec![AccountId::new(ScriptedWallet::ACCOUNT), AccountId::new("tz1other")]
    );
    assert_eq!(h.session.wallet_session().unwrap().account, AccountId::new("tz1other"));
    assert_eq!(h.session.aggregate().total_active_miles, Some(20));
    assert!(!h.session.eligibility().is_eligible(ProductId(1)));
}

#[tokio::test]
async fn eligibility_follows_catalog_order() {
    let mut h = Harness::new(catalog(&[(3, 100), (1, 900), (2, 0)]));
    h.ledger.push_response(Ok(vec![grant(150, 10)]));
    h.session.request_connect(Network::Testnet).await.unwrap();

    let order: Vec<(ProductId, bool)> = h.session.eligibility().iter().collect();
    assert_eq!(
        order,
        vec![(ProductId(3), true), (ProductId(1), false), (ProductId(2), true)]
    );
}

#[tokio::test]
async fn detail_view_round_trip() {
    let mut h = Harness::new(catalog(&[(1, 5)]));
    h.session.toggle_detail_view(true);
    assert!(h.session.snapshot().detail_view_open);
    h.session.toggle_detail_view(false);
    assert!(!h.session.snapshot().detail_view_open);
}

#[tokio::test]
async fn snapshot_serializes_for_presentation() {
    let mut h = Harness::new(catalog(&[(1, 5)]));
    h.ledger.push_response(Ok(vec![grant(7, 1)]));
    h.session.request_connect(Network::Testnet).await.unwrap();

    let json = serde_json::to_value(h.session.snapshot()).unwrap();
    assert_eq!(json["connection"], "connected");
    assert_eq!(json["aggregate"]["total_active_miles"], 7);
    assert_eq!(json["ledger"]["status"], "known");
    assert_eq!(json["eligibility"]["entries"][0], serde_json::json!([1, true]));
    assert_eq!(json["detail_view_open"], false);
}
