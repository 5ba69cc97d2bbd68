//! NFT indexing API adapter.

mod dto;
mod moralis;

pub use moralis::{DEFAULT_INDEXER_BASE_URL, MoralisIndexer};
