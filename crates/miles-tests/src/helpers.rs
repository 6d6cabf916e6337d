//! Shared test helpers: scripted collaborators and fixture builders.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use parking_lot::Mutex;
use tokio::sync::broadcast;

use miles_core::catalog::Catalog;
use miles_core::error::{ConnectionError, LedgerFetchError};
use miles_core::traits::{Clock, LedgerSource, WalletProvider};
use miles_core::types::{
    AccountId, MileGrant, Network, Product, ProductId, WalletEvent, WalletSession,
};
use miles_session::SessionState;

/// Fixed reference instant used across the suite.
pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 8, 30, 0).unwrap()
}

/// Grant expiring `offset_days` after [`t0`] (negative = already expired).
pub fn grant(quantity: u64, offset_days: i64) -> MileGrant {
    MileGrant::new(quantity, t0() + Duration::days(offset_days))
}

pub fn product(id: u32, required_miles: u64) -> Product {
    Product {
        id: ProductId(id),
        title: format!("product {id}"),
        image: format!("img/product-{id}.svg"),
        required_miles,
    }
}

/// Catalog from `(id, required_miles)` pairs.
pub fn catalog(entries: &[(u32, u64)]) -> Catalog {
    Catalog::new(entries.iter().map(|(id, req)| product(*id, *req)).collect()).unwrap()
}

/// Wallet provider answering connects from a script.
///
/// Once the script is exhausted every connect succeeds with
/// [`ScriptedWallet::ACCOUNT`].
pub struct ScriptedWallet {
    outcomes: Mutex<VecDeque<Result<WalletSession, ConnectionError>>>,
    connects: Mutex<Vec<Network>>,
    events: broadcast::Sender<WalletEvent>,
}

impl ScriptedWallet {
    pub const ACCOUNT: &'static str = "tz1milestestaccount";

    pub fn new() -> Self {
        let (events, _) = broadcast::channel(8);
        Self {
            outcomes: Mutex::new(VecDeque::new()),
            connects: Mutex::new(Vec::new()),
            events,
        }
    }

    pub fn push_outcome(&self, outcome: Result<WalletSession, ConnectionError>) {
        self.outcomes.lock().push_back(outcome);
    }

    /// Networks passed to `connect`, in call order.
    pub fn connect_calls(&self) -> Vec<Network> {
        self.connects.lock().clone()
    }

    /// Broadcast a session loss to subscribers.
    pub fn emit_session_lost(&self, reason: &str) {
        let _ = self.events.send(WalletEvent::SessionLost {
            reason: reason.to_string(),
        });
    }
}

impl Default for ScriptedWallet {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WalletProvider for ScriptedWallet {
    async fn connect(&self, network: Network) -> Result<WalletSession, ConnectionError> {
        self.connects.lock().push(network);
        self.outcomes.lock().pop_front().unwrap_or_else(|| {
            Ok(WalletSession {
                account: AccountId::new(Self::ACCOUNT),
                network,
            })
        })
    }

    fn subscribe(&self) -> broadcast::Receiver<WalletEvent> {
        self.events.subscribe()
    }
}

/// Ledger source answering fetches from a script.
///
/// Once the script is exhausted every fetch fails as unavailable.
#[derive(Default)]
pub struct ScriptedLedger {
    responses: Mutex<VecDeque<Result<Vec<MileGrant>, LedgerFetchError>>>,
    fetches: Mutex<Vec<AccountId>>,
}

impl ScriptedLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_response(&self, response: Result<Vec<MileGrant>, LedgerFetchError>) {
        self.responses.lock().push_back(response);
    }

    pub fn fetch_calls(&self) -> Vec<AccountId> {
        self.fetches.lock().clone()
    }
}

#[async_trait]
impl LedgerSource for ScriptedLedger {
    async fn fetch_ledger(&self, account: &AccountId) -> Result<Vec<MileGrant>, LedgerFetchError> {
        self.fetches.lock().push(account.clone());
        self.responses
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(LedgerFetchError::Unavailable("script exhausted".into())))
    }
}

/// Clock that only moves when told to.
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn at(now: DateTime<Utc>) -> Self {
        Self { now: Mutex::new(now) }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock();
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock()
    }
}

/// A session wired to scripted collaborators, with handles to each.
pub struct Harness {
    pub session: SessionState,
    pub wallet: Arc<ScriptedWallet>,
    pub ledger: Arc<ScriptedLedger>,
    pub clock: Arc<ManualClock>,
}

impl Harness {
    pub fn new(catalog: Catalog) -> Self {
        let wallet = Arc::new(ScriptedWallet::new());
        let ledger = Arc::new(ScriptedLedger::new());
        let clock = Arc::new(ManualClock::at(t0()));
        let session = SessionState::new(
            Arc::clone(&wallet) as Arc<dyn WalletProvider>,
            Arc::clone(&ledger) as Arc<dyn LedgerSource>,
            Arc::clone(&clock) as Arc<dyn Clock>,
            catalog,
        );
        Self {
            session,
            wallet,
            ledger,
            clock,
        }
    }
}
