//! Error types for Miles.
use thiserror::Error;

use crate::types::{Network, ProductId};

/// A wallet connect attempt failed. The controller is back in `Disconnected`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConnectionError {
    #[error("wallet provider unreachable: {0}")] ProviderUnreachable(String),
    #[error("connection rejected: {0}")] Rejected(String),
    #[error("unsupported network: {0}")] UnsupportedNetwork(Network),
}

/// The ledger source could not produce a snapshot. The ledger stays unknown.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerFetchError {
    #[error("no wallet session")] NotConnected,
    #[error("ledger unavailable: {0}")] Unavailable(String),
    #[error("malformed ledger: {0}")] Malformed(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("duplicate product id: {0}")] DuplicateProduct(ProductId),
    #[error("product {0} has an empty title")] EmptyTitle(ProductId),
}

#[derive(Error, Debug)]
pub enum MilesError {
    #[error(transparent)] Connection(#[from] ConnectionError),
    #[error(transparent)] LedgerFetch(#[from] LedgerFetchError),
    #[error(transparent)] Catalog(#[from] CatalogError),
    #[error("config: {0}")] Config(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_unsupported_network() {
        let e = ConnectionError::UnsupportedNetwork(Network::Mainnet);
        assert_eq!(e.to_string(), "unsupported network: mainnet");
    }

    #[test]
    fn display_duplicate_product() {
        let e = CatalogError::DuplicateProduct(ProductId(7));
        assert_eq!(e.to_string(), "duplicate product id: 7");
    }

    #[test]
    fn miles_error_is_transparent() {
        let e: MilesError = LedgerFetchError::NotConnected.into();
        assert_eq!(e.to_string(), "no wallet session");
        assert!(matches!(e, MilesError::LedgerFetch(LedgerFetchError::NotConnected)));
    }

    #[test]
    fn config_error_carries_message() {
        let e = MilesError::Config("missing field `title`".into());
        assert_eq!(e.to_string(), "config: missing field `title`");
    }
}
