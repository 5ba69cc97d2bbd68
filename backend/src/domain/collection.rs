//! Collection filtering behind `POST /api/collection`.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::domain::ports::{CollectionQuery, NftIndexer, NftIndexerError};
use crate::domain::{Chain, ContractAddress, Error, IndexedNft, WalletAddress};

/// Lists a wallet's NFTs on one chain and keeps those minted by the
/// configured contract.
pub struct CollectionService<I> {
    indexer: Arc<I>,
    contract: ContractAddress,
    chain: Chain,
}

impl<I> CollectionService<I> {
    pub fn new(indexer: Arc<I>, contract: ContractAddress, chain: Chain) -> Self {
        Self {
            indexer,
            contract,
            chain,
        }
    }

    fn map_indexer_error(error: NftIndexerError) -> Error {
        match error {
            NftIndexerError::Transport { message } => {
                Error::service_unavailable(format!("indexer unavailable: {message}"))
            }
            NftIndexerError::Status { status, message } if status >= 500 => {
                Error::service_unavailable(format!("indexer returned {status}: {message}"))
            }
            other => Error::internal(other.to_string()),
        }
    }
}

#[async_trait]
impl<I> CollectionQuery for CollectionService<I>
where
    I: NftIndexer,
{
    async fn owned_in_collection(&self, owner: &WalletAddress) -> Result<Vec<IndexedNft>, Error> {
        let listing = self
            .indexer
            .wallet_nfts(owner, self.chain)
            .await
            .map_err(Self::map_indexer_error)?;
        let total = listing.len();
        let owned: Vec<_> = listing
            .into_iter()
            .filter(|nft| self.contract.matches(&nft.token_address))
            .collect();
        debug!(owner = %owner, total, kept = owned.len(), "filtered wallet listing");
        Ok(owned)
    }
}
