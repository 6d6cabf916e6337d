//! Local collaborators for running a session without a browser wallet.
//!
//! [`LocalWallet`] answers connects for a fixed account on a fixed set of
//! networks. [`JsonFileLedger`] reads grants from a JSON file on each fetch.

use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::sync::broadcast;
use tracing::debug;

use miles_core::constants::WALLET_EVENT_CAPACITY;
use miles_core::error::{ConnectionError, LedgerFetchError};
use miles_core::traits::{LedgerSource, WalletProvider};
use miles_core::types::{AccountId, MileGrant, Network, WalletEvent, WalletSession};

pub struct LocalWallet {
    account: AccountId,
    networks: Vec<Network>,
    events: broadcast::Sender<WalletEvent>,
}

impl LocalWallet {
    pub fn new(account: AccountId, networks: Vec<Network>) -> Self {
        let (events, _) = broadcast::channel(WALLET_EVENT_CAPACITY);
        Self {
            account,
            networks,
            events,
        }
    }
}

#[async_trait]
impl WalletProvider for LocalWallet {
    async fn connect(&self, network: Network) -> Result<WalletSession, ConnectionError> {
        if !self.networks.contains(&network) {
            return Err(ConnectionError::UnsupportedNetwork(network));
        }
        Ok(WalletSession {
            account: self.account.clone(),
            network,
        })
    }

    fn subscribe(&self) -> broadcast::Receiver<WalletEvent> {
        self.events.subscribe()
    }
}

/// Ledger file contents: one list for everyone, or one list per account.
#[derive(Deserialize)]
#[serde(untagged)]
enum LedgerFile {
    Shared(Vec<MileGrant>),
    PerAccount(HashMap<String, Vec<MileGrant>>),
}

pub struct JsonFileLedger {
    path: PathBuf,
}

impl JsonFileLedger {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

#[async_trait]
impl LedgerSource for JsonFileLedger {
    async fn fetch_ledger(&self, account: &AccountId) -> Result<Vec<MileGrant>, LedgerFetchError> {
        let body = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| LedgerFetchError::Unavailable(format!("{}: {e}", self.path.display())))?;
        let file: LedgerFile =
            serde_json::from_str(&body).map_err(|e| LedgerFetchError::Malformed(e.to_string()))?;
        debug!(path = %self.path.display(), "ledger file parsed");

        Ok(match file {
            LedgerFile::Shared(grants) => grants,
            // An account without an entry holds no miles.
            LedgerFile::PerAccount(mut by_account) => {
                by_account.remove(account.as_str()).unwrap_or_default()
            }
        })
    }
}
