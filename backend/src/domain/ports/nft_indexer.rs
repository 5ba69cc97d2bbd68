//! Driven port for the third-party NFT indexing API.

use async_trait::async_trait;

use crate::domain::{Chain, IndexedNft, WalletAddress};

use super::define_port_error;

define_port_error! {
    /// Errors surfaced while calling the indexer.
    pub enum NftIndexerError {
        /// Client could not be constructed.
        Configuration { message: String } => "indexer client misconfigured: {message}",
        Transport { message: String } => "indexer transport failed: {message}",
        /// The indexer rejected the API key.
        Unauthorized { message: String } => "indexer rejected credentials: {message}",
        Status { status: u16, message: String } =>
            "indexer returned {status}: {message}",
        Decode { message: String } => "indexer response decode failed: {message}",
    }
}

/// Port listing every NFT a wallet holds on a chain.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NftIndexer: Send + Sync {
    async fn wallet_nfts(
        &self,
        owner: &WalletAddress,
        chain: Chain,
    ) -> Result<Vec<IndexedNft>, NftIndexerError>;
}

/// Indexer returning a fixed listing for any wallet.
#[derive(Debug, Default, Clone)]
pub struct FixtureNftIndexer {
    listing: Vec<IndexedNft>,
}

impl FixtureNftIndexer {
    pub fn new(listing: Vec<IndexedNft>) -> Self {
        Self { listing }
    }
}

#[async_trait]
impl NftIndexer for FixtureNftIndexer {
    async fn wallet_nfts(
        &self,
        _owner: &WalletAddress,
        _chain: Chain,
    ) -> Result<Vec<IndexedNft>, NftIndexerError> {
        Ok(self.listing.clone())
    }
}
