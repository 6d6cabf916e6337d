//! Wallet connection lifecycle.
//!
//! [`ConnectionController`] owns the `Disconnected → Connecting → Connected`
//! state machine. The current state is published on a `watch` channel so
//! observers can follow readiness without polling.

use std::sync::Arc;

use tokio::sync::{broadcast, watch};
use tracing::{debug, info, warn};

use miles_core::error::ConnectionError;
use miles_core::traits::WalletProvider;
use miles_core::types::{ConnectionState, Network, WalletEvent, WalletSession};

/// Drives a [`WalletProvider`] and tracks the resulting connection state.
pub struct ConnectionController {
    provider: Arc<dyn WalletProvider>,
    state_tx: watch::Sender<ConnectionState>,
    session: Option<WalletSession>,
}

impl ConnectionController {
    /// Create a controller in the `Disconnected` state.
    pub fn new(provider: Arc<dyn WalletProvider>) -> Self {
        let (state_tx, _) = watch::channel(ConnectionState::Disconnected);
        Self {
            provider,
            state_tx,
            session: None,
        }
    }

    pub fn state(&self) -> ConnectionState {
        *self.state_tx.borrow()
    }

    /// True iff the state is `Connected`.
    pub fn is_ready(&self) -> bool {
        self.state().is_ready()
    }

    /// The established session, if connected.
    pub fn session(&self) -> Option<&WalletSession> {
        self.session.as_ref()
    }

    /// Follow state changes.
    pub fn subscribe(&self) -> watch::Receiver<ConnectionState> {
        self.state_tx.subscribe()
    }

    /// Provider-side events (session loss).
    pub fn wallet_events(&self) -> broadcast::Receiver<WalletEvent> {
        self.provider.subscribe()
    }

    /// Connect to `network`.
    ///
    /// The state is `Connecting` while the provider is pending. On failure the
    /// state reverts to `Disconnected` and the error is returned unchanged.
    pub async fn request_connect(
        &mut self,
        network: Network,
    ) -> Result<WalletSession, ConnectionError> {
        info!(%network, "wallet connect requested");
        self.session = None;
        self.set_state(ConnectionState::Connecting);

        match self.provider.connect(network).await {
            Ok(session) => {
                info!(account = %session.account, network = %session.network, "wallet connected");
                self.session = Some(session.clone());
                self.set_state(ConnectionState::Connected);
                Ok(session)
            }
            Err(e) => {
                warn!(%network, "wallet connect failed: {e}");
                self.set_state(ConnectionState::Disconnected);
                Err(e)
            }
        }
    }

    /// Explicit user disconnect.
    ///
    /// The local state always ends `Disconnected`; a provider error is
    /// logged and returned after the transition.
    pub async fn disconnect(&mut self) -> Result<(), ConnectionError> {
        let result = self.provider.disconnect().await;
        if let Err(e) = &result {
            warn!("wallet provider disconnect failed: {e}");
        }
        self.session = None;
        self.set_state(ConnectionState::Disconnected);
        info!("wallet disconnected");
        result
    }

    /// The provider reported that the session is gone.
    pub fn session_lost(&mut self, reason: &str) {
        if self.session.take().is_some() {
            warn!(reason, "wallet session lost");
        } else {
            debug!(reason, "session loss reported while not connected");
        }
        self.set_state(ConnectionState::Disconnected);
    }

    fn set_state(&self, state: ConnectionState) {
        self.state_tx.send_if_modified(|current| {
            if *current == state {
                false
            } else {
                debug!(from = %current, to = %state, "connection state");
                *current = state;
                true
            }
        });
    }
}
