//! Property tests over the full session recomputation path.

use chrono::Duration;
use miles_core::types::*;
use miles_tests::helpers::*;
use proptest::prelude::*;

fn arb_grants() -> impl Strategy<Value = Vec<MileGrant>> {
    prop::collection::vec((0u64..10_000, -400i64..400), 0..30).prop_map(|entries| {
        entries
            .into_iter()
            .map(|(qty, hours)| MileGrant::new(qty, t0() + Duration::hours(hours)))
            .collect()
    })
}

proptest! {
    #[test]
    fn disconnected_session_never_eligible(
        grants in arb_grants(),
        reqs in prop::collection::vec(0u64..50_000, 0..10),
    ) {
        let entries: Vec<(u32, u64)> = reqs.iter().enumerate().map(|(i, r)| (i as u32, *r)).collect();
        let mut h = Harness::new(catalog(&entries));
        h.session.handle_ledger_update(MilesLedger::known(grants));
        prop_assert_eq!(h.session.eligibility().len(), entries.len());
        prop_assert_eq!(h.session.eligibility().eligible_count(), 0);
    }

    #[test]
    fn recomputation_matches_ledger(grants in arb_grants()) {
        let expected: u64 = grants.iter().map(|g| g.quantity).sum();
        let mut h = Harness::new(catalog(&[]));
        h.session.handle_ledger_update(MilesLedger::known(grants));
        prop_assert_eq!(h.session.aggregate().total_active_miles, Some(expected));
        if let Some(next) = h.session.aggregate().next_expiration {
            prop_assert!(next >= t0());
        }
    }

    #[test]
    fn connected_threshold_boundary(grants in arb_grants()) {
        let total: u64 = grants.iter().map(|g| g.quantity).sum();
        let mut h = Harness::new(catalog(&[(1, total), (2, total + 1)]));
        h.ledger.push_response(Ok(grants));
        let rt = tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap();
        rt.block_on(h.session.request_connect(Network::Testnet)).unwrap();
        prop_assert!(h.session.eligibility().is_eligible(ProductId(1)));
        prop_assert!(!h.session.eligibility().is_eligible(ProductId(2)));
    }
}
