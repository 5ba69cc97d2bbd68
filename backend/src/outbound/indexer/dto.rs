//! Wire shapes for the indexer's wallet listing.

use serde::Deserialize;

use crate::domain::IndexedNft;

/// First page of `GET /{address}/nft`. The cursor is ignored.
#[derive(Debug, Deserialize)]
pub(super) struct WalletNftsPageDto {
    #[serde(default)]
    pub(super) result: Vec<IndexedNft>,
}
