//! Core data model: mile grants, ledgers, products, and derived state.
//!
//! All mile quantities are `u64`, so a grant can never carry a negative
//! balance. Timestamps are UTC instants.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Wallet network a session is established on.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    /// Production network.
    Mainnet,
    /// Public test network.
    #[default]
    Testnet,
    /// Local sandbox node.
    Sandbox,
}

impl Network {
    /// Lowercase name, as used in configuration files.
    pub fn as_str(&self) -> &'static str {
        match self {
            Network::Mainnet => "mainnet",
            Network::Testnet => "testnet",
            Network::Sandbox => "sandbox",
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Network {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mainnet" => Ok(Network::Mainnet),
            "testnet" => Ok(Network::Testnet),
            "sandbox" => Ok(Network::Sandbox),
            other => Err(format!("unknown network: {other}")),
        }
    }
}

/// Identity of the connected wallet account, passed to the ledger source.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash)]
pub struct AccountId(pub String);

impl AccountId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An established wallet session, as reported by the provider on connect.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct WalletSession {
    pub account: AccountId,
    pub network: Network,
}

/// Asynchronous notifications from the wallet provider.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WalletEvent {
    /// The provider dropped the session (wallet locked, extension closed, ...).
    SessionLost { reason: String },
}

/// One award of miles. Immutable once issued.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash)]
pub struct MileGrant {
    /// Number of miles in this grant.
    pub quantity: u64,
    /// Instant after which the grant lapses.
    pub expiration: DateTime<Utc>,
}

impl MileGrant {
    pub fn new(quantity: u64, expiration: DateTime<Utc>) -> Self {
        Self { quantity, expiration }
    }

    /// Whether the grant is still live at `now` (boundary inclusive).
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        self.expiration >= now
    }
}

/// A user's mile grants, or `Unknown` when no snapshot has been fetched.
///
/// `Unknown` is distinct from an empty ledger: an empty ledger has a total
/// of zero, an unknown ledger has no total at all.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Default)]
#[serde(tag = "status", content = "grants", rename_all = "lowercase")]
pub enum MilesLedger {
    #[default]
    Unknown,
    Known(Vec<MileGrant>),
}

impl MilesLedger {
    pub fn known(grants: Vec<MileGrant>) -> Self {
        MilesLedger::Known(grants)
    }

    pub fn is_known(&self) -> bool {
        matches!(self, MilesLedger::Known(_))
    }

    /// Grants in ledger order. Empty for an unknown ledger.
    pub fn grants(&self) -> &[MileGrant] {
        match self {
            MilesLedger::Unknown => &[],
            MilesLedger::Known(grants) => grants,
        }
    }

    pub fn len(&self) -> usize {
        self.grants().len()
    }

    pub fn is_empty(&self) -> bool {
        self.grants().is_empty()
    }

    /// Grants ordered by expiration, soonest first. Used by the detail view.
    pub fn sorted_by_expiration(&self) -> Vec<MileGrant> {
        let mut grants = self.grants().to_vec();
        grants.sort_by_key(|g| g.expiration);
        grants
    }
}

/// Numeric product identifier, unique within a catalog.
#[derive(
    Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord,
)]
#[serde(transparent)]
pub struct ProductId(pub u32);

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A redeemable catalog entry.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Product {
    pub id: ProductId,
    /// Display name.
    pub title: String,
    /// Image reference (path or URL), opaque to the core.
    #[serde(default)]
    pub image: String,
    /// Miles needed to redeem this product.
    pub required_miles: u64,
}

/// Totals derived from a ledger. Recomputed wholesale, never patched.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct AggregateState {
    /// Sum of all grant quantities, `None` while the ledger is unknown.
    pub total_active_miles: Option<u64>,
    /// Soonest expiration that is not yet in the past.
    pub next_expiration: Option<DateTime<Utc>>,
}

/// Wallet connection lifecycle.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

impl ConnectionState {
    /// Readiness: true only once a session is fully established.
    pub fn is_ready(&self) -> bool {
        matches!(self, ConnectionState::Connected)
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ConnectionState::Disconnected => "disconnected",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Connected => "connected",
        };
        f.write_str(s)
    }
}

/// Per-product redeemability. Holds an entry for every catalog product,
/// in catalog order.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Default)]
pub struct EligibilityVector {
    entries: Vec<(ProductId, bool)>,
}

impl EligibilityVector {
    pub(crate) fn from_entries(entries: Vec<(ProductId, bool)>) -> Self {
        Self { entries }
    }

    /// Eligibility of `id`; `false` for ids not in the catalog.
    pub fn is_eligible(&self, id: ProductId) -> bool {
        self.get(id).unwrap_or(false)
    }

    pub fn get(&self, id: ProductId) -> Option<bool> {
        self.entries.iter().find(|(pid, _)| *pid == id).map(|(_, e)| *e)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn eligible_count(&self) -> usize {
        self.entries.iter().filter(|(_, e)| *e).count()
    }

    /// Entries in the order of the catalog they were computed from.
    pub fn iter(&self) -> impl Iterator<Item = (ProductId, bool)> + '_ {
        self.entries.iter().copied()
    }
}
