//! Redemption eligibility.
//!
//! A product is redeemable iff the wallet is ready, the balance is known,
//! and the balance covers the product's requirement. An unknown balance
//! gates every product, including those that require zero miles.

use crate::types::{EligibilityVector, Product};

/// Eligibility of every product in `catalog`.
///
/// Always rebuilds the whole vector; entries follow catalog order.
pub fn compute_eligibility(
    connection_ready: bool,
    total_active_miles: Option<u64>,
    catalog: &[Product],
) -> EligibilityVector {
    let entries = catalog
        .iter()
        .map(|product| {
            let eligible = match total_active_miles {
                Some(total) => connection_ready && total >= product.required_miles,
                None => false,
            };
            (product.id, eligible)
        })
        .collect();
    EligibilityVector::from_entries(entries)
}
