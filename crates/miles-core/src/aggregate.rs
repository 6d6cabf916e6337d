//! Ledger aggregation: total active miles and next expiration.
//!
//! Both functions are pure. The total counts every grant in the ledger,
//! including grants whose expiration has passed; the ledger source is the
//! authority on which grants are still on the account.

use chrono::{DateTime, Utc};

use crate::types::{AggregateState, MilesLedger};

/// Sum of grant quantities, or `None` when the ledger is unknown.
///
/// Saturates at `u64::MAX` rather than wrapping.
pub fn compute_total(ledger: &MilesLedger) -> Option<u64> {
    match ledger {
        MilesLedger::Unknown => None,
        MilesLedger::Known(grants) => Some(
            grants
                .iter()
                .fold(0u64, |acc, g| acc.saturating_add(g.quantity)),
        ),
    }
}

/// Soonest expiration at or after `now`.
///
/// Returns `None` for an unknown or empty ledger, or when every grant has
/// already expired.
pub fn compute_next_expiration(ledger: &MilesLedger, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    ledger
        .grants()
        .iter()
        .filter(|g| g.is_active_at(now))
        .map(|g| g.expiration)
        .min()
}

/// Both derivations at once.
pub fn aggregate(ledger: &MilesLedger, now: DateTime<Utc>) -> AggregateState {
    AggregateState {
        total_active_miles: compute_total(ledger),
        next_expiration: compute_next_expiration(ledger, now),
    }
}
