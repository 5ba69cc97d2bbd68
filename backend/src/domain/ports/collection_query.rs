//! Driving port for the collection proxy endpoint.
//!
//! The HTTP handler depends on this port only, so handler tests can swap in a
//! deterministic implementation without an indexer.

use async_trait::async_trait;

use crate::domain::{Error, IndexedNft, WalletAddress};

/// Domain use-case port listing a wallet's NFTs within the configured
/// collection.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CollectionQuery: Send + Sync {
    async fn owned_in_collection(&self, owner: &WalletAddress) -> Result<Vec<IndexedNft>, Error>;
}
