//! Plain-text rendering of session snapshots.

use std::fmt::{self, Write};

use chrono::{DateTime, Utc};

use miles_core::catalog::Catalog;
use miles_core::types::{MilesLedger, ProductId};
use miles_session::SessionSnapshot;

/// What a product card shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductStatus {
    ConnectWallet,
    NotEnoughMiles,
    Redeemable,
}

impl ProductStatus {
    pub fn for_product(snapshot: &SessionSnapshot, id: ProductId) -> Self {
        if !snapshot.connection.is_ready() {
            ProductStatus::ConnectWallet
        } else if snapshot.eligibility.is_eligible(id) {
            ProductStatus::Redeemable
        } else {
            ProductStatus::NotEnoughMiles
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ProductStatus::ConnectWallet => "connect wallet",
            ProductStatus::NotEnoughMiles => "not enough miles",
            ProductStatus::Redeemable => "redeemable",
        }
    }
}

fn format_date(ts: DateTime<Utc>) -> String {
    ts.format("%Y-%m-%d").to_string()
}

pub fn render_status(
    out: &mut impl Write,
    title: &str,
    account: Option<&str>,
    snapshot: &SessionSnapshot,
    catalog: &Catalog,
) -> fmt::Result {
    writeln!(out, "=== {title} ===")?;
    writeln!(out, "Wallet:          {}", snapshot.connection)?;
    if let Some(account) = account {
        writeln!(out, "Account:         {account}")?;
    }
    match snapshot.total_active_miles() {
        Some(total) => writeln!(out, "Balance:         {total} miles")?,
        None => writeln!(out, "Balance:         unknown")?,
    }
    let next = snapshot
        .next_expiration()
        .map(format_date)
        .unwrap_or_else(|| "-".to_string());
    writeln!(out, "Next expiration: {next}")?;

    if catalog.is_empty() {
        return Ok(());
    }
    writeln!(out, "\nProducts:")?;
    for product in catalog {
        let status = ProductStatus::for_product(snapshot, product.id);
        writeln!(
            out,
            "  [{:>3}] {:<24} {:>8} miles  {}",
            product.id.0,
            product.title,
            product.required_miles,
            status.label()
        )?;
    }
    Ok(())
}

/// Grant listing, soonest expiration first.
pub fn render_ledger(out: &mut impl Write, ledger: &MilesLedger, now: DateTime<Utc>) -> fmt::Result {
    match ledger {
        MilesLedger::Unknown => writeln!(out, "Miles: not loaded"),
        MilesLedger::Known(grants) if grants.is_empty() => writeln!(out, "Miles: none"),
        MilesLedger::Known(_) => {
            writeln!(out, "Miles:")?;
            for grant in ledger.sorted_by_expiration() {
                let marker = if grant.is_active_at(now) { "" } else { "  (expired)" };
                writeln!(
                    out,
                    "  {:>8}  expires {}{marker}",
                    grant.quantity,
                    format_date(grant.expiration)
                )?;
            }
            Ok(())
        }
    }
}
