//! Session orchestration.
//!
//! [`SessionState`] is the aggregate root: it owns the connection controller,
//! the current ledger, and everything derived from it. Derived state
//! (aggregates and eligibility) is only ever rebuilt by
//! [`SessionState::handle_ledger_update`], which every other entry point
//! funnels into.
//!
//! Disconnecting keeps the last known ledger and aggregates for display;
//! eligibility still drops to all-false because readiness is false.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use miles_core::aggregate;
use miles_core::catalog::Catalog;
use miles_core::eligibility::compute_eligibility;
use miles_core::error::{ConnectionError, LedgerFetchError};
use miles_core::traits::{Clock, LedgerSource, WalletProvider};
use miles_core::types::{
    AggregateState, ConnectionState, EligibilityVector, MilesLedger, Network, WalletEvent,
    WalletSession,
};

use crate::connection::ConnectionController;

/// Read-only view handed to the presentation layer.
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub connection: ConnectionState,
    pub ledger: MilesLedger,
    pub aggregate: AggregateState,
    pub eligibility: EligibilityVector,
    pub detail_view_open: bool,
}

impl SessionSnapshot {
    pub fn total_active_miles(&self) -> Option<u64> {
        self.aggregate.total_active_miles
    }

    pub fn next_expiration(&self) -> Option<DateTime<Utc>> {
        self.aggregate.next_expiration
    }
}

/// Single-session state holder.
///
/// Created with an unknown ledger, a disconnected wallet, and the detail
/// view closed. All mutation goes through `&mut self` methods.
pub struct SessionState {
    controller: ConnectionController,
    ledger_source: Arc<dyn LedgerSource>,
    clock: Arc<dyn Clock>,
    catalog: Catalog,
    ledger: MilesLedger,
    aggregate: AggregateState,
    eligibility: EligibilityVector,
    detail_view_open: bool,
    /// Controller readiness as of the last sync; gates eligibility.
    ready: bool,
}

impl SessionState {
    pub fn new(
        provider: Arc<dyn WalletProvider>,
        ledger_source: Arc<dyn LedgerSource>,
        clock: Arc<dyn Clock>,
        catalog: Catalog,
    ) -> Self {
        let eligibility = compute_eligibility(false, None, catalog.products());
        Self {
            controller: ConnectionController::new(provider),
            ledger_source,
            clock,
            catalog,
            ledger: MilesLedger::Unknown,
            aggregate: AggregateState::default(),
            eligibility,
            detail_view_open: false,
            ready: false,
        }
    }

    // --- accessors ---

    pub fn connection_state(&self) -> ConnectionState {
        self.controller.state()
    }

    pub fn is_ready(&self) -> bool {
        self.controller.is_ready()
    }

    pub fn wallet_session(&self) -> Option<&WalletSession> {
        self.controller.session()
    }

    pub fn controller(&self) -> &ConnectionController {
        &self.controller
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn ledger(&self) -> &MilesLedger {
        &self.ledger
    }

    pub fn aggregate(&self) -> &AggregateState {
        &self.aggregate
    }

    pub fn eligibility(&self) -> &EligibilityVector {
        &self.eligibility
    }

    pub fn detail_view_open(&self) -> bool {
        self.detail_view_open
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            connection: self.connection_state(),
            ledger: self.ledger.clone(),
            aggregate: self.aggregate,
            eligibility: self.eligibility.clone(),
            detail_view_open: self.detail_view_open,
        }
    }

    // --- operations ---

    /// Connect the wallet on `network`.
    ///
    /// Every successful connect fetches the ledger for the account it
    /// returned, so switching accounts while connected is picked up. A
    /// connect failure is returned to the caller and only re-derives state
    /// if readiness was lost.
    pub async fn request_connect(&mut self, network: Network) -> Result<(), ConnectionError> {
        match self.controller.request_connect(network).await {
            Ok(_) => {
                self.ready = true;
                self.refresh_ledger().await;
                Ok(())
            }
            Err(e) => {
                self.on_connection_change().await;
                Err(e)
            }
        }
    }

    /// Explicit user disconnect.
    pub async fn disconnect(&mut self) -> Result<(), ConnectionError> {
        let result = self.controller.disconnect().await;
        self.on_connection_change().await;
        result
    }

    /// Apply an event reported by the wallet provider.
    pub async fn handle_wallet_event(&mut self, event: WalletEvent) {
        match event {
            WalletEvent::SessionLost { reason } => {
                self.controller.session_lost(&reason);
                self.on_connection_change().await;
            }
        }
    }

    /// Process wallet events until the provider's channel closes.
    pub async fn run(&mut self, mut events: broadcast::Receiver<WalletEvent>) {
        loop {
            match events.recv().await {
                Ok(event) => self.handle_wallet_event(event).await,
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    warn!("wallet event stream lagged by {n} events");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    debug!("wallet event stream closed");
                    break;
                }
            }
        }
    }

    /// Sync with the controller's readiness.
    ///
    /// Becoming ready fetches a fresh ledger for the connected account.
    /// Losing readiness keeps the current ledger and re-derives eligibility,
    /// which is then all-false. No change in readiness is a no-op.
    pub async fn on_connection_change(&mut self) {
        let ready = self.controller.is_ready();
        let was_ready = std::mem::replace(&mut self.ready, ready);

        if ready && !was_ready {
            self.refresh_ledger().await;
        } else if !ready && was_ready {
            self.handle_ledger_update(self.ledger.clone());
        }
    }

    /// Store `ledger` and rebuild aggregates and eligibility from it.
    pub fn handle_ledger_update(&mut self, ledger: MilesLedger) {
        let now = self.clock.now();
        self.aggregate = aggregate::aggregate(&ledger, now);
        self.eligibility = compute_eligibility(
            self.ready,
            self.aggregate.total_active_miles,
            self.catalog.products(),
        );
        self.ledger = ledger;
        debug!(
            grants = self.ledger.len(),
            total = ?self.aggregate.total_active_miles,
            next_expiration = ?self.aggregate.next_expiration,
            eligible = self.eligibility.eligible_count(),
            "session recomputed"
        );
    }

    /// Open or close the ledger detail view.
    pub fn toggle_detail_view(&mut self, open: bool) {
        self.detail_view_open = open;
    }

    /// Fetch the ledger and push it through `handle_ledger_update`. A source
    /// failure leaves the ledger unknown.
    async fn refresh_ledger(&mut self) {
        let ledger = match self.fetch_ledger().await {
            Ok(ledger) => ledger,
            Err(e) => {
                warn!("ledger fetch failed: {e}");
                MilesLedger::Unknown
            }
        };
        self.handle_ledger_update(ledger);
    }

    async fn fetch_ledger(&self) -> Result<MilesLedger, LedgerFetchError> {
        let session = self.controller.session().ok_or(LedgerFetchError::NotConnected)?;
        let grants = self.ledger_source.fetch_ledger(&session.account).await?;
        info!(account = %session.account, grants = grants.len(), "ledger fetched");
        Ok(MilesLedger::known(grants))
    }
}
