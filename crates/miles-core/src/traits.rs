//! Trait interfaces for the collaborators around the core.
//!
//! - [`WalletProvider`] — wallet connect/disconnect transport
//! - [`LedgerSource`] — fetches a user's mile grants
//! - [`Clock`] — current instant, for expiration checks

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::broadcast;

use crate::error::{ConnectionError, LedgerFetchError};
use crate::types::{AccountId, MileGrant, Network, WalletEvent, WalletSession};

/// Wallet connection transport.
///
/// Implementations talk to the actual wallet (browser extension, hardware
/// signer, local key file). The core only sees sessions and errors.
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Establish a session on `network`.
    ///
    /// May suspend indefinitely while the user confirms in the wallet.
    async fn connect(&self, network: Network) -> Result<WalletSession, ConnectionError>;

    /// Tear down the current session.
    ///
    /// Default implementation does nothing.
    async fn disconnect(&self) -> Result<(), ConnectionError> {
        Ok(())
    }

    /// Subscribe to provider-side events such as session loss.
    fn subscribe(&self) -> broadcast::Receiver<WalletEvent>;
}

/// Source of ledger snapshots.
#[async_trait]
pub trait LedgerSource: Send + Sync {
    /// Fetch every grant held by `account`.
    async fn fetch_ledger(&self, account: &AccountId) -> Result<Vec<MileGrant>, LedgerFetchError>;
}

/// Source of the current instant.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
