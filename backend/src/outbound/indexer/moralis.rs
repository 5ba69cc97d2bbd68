//! Reqwest-backed adapter for the Moralis EVM API.
//!
//! The HTTP client is created on first use and memoised for the lifetime of
//! the adapter, which the server holds for the lifetime of the process.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use tokio::sync::OnceCell;
use tracing::{debug, info};
use zeroize::Zeroizing;

use super::dto::WalletNftsPageDto;
use crate::domain::ports::{NftIndexer, NftIndexerError};
use crate::domain::{Chain, IndexedNft, WalletAddress};
use crate::outbound::http_support::{build_client, status_message};

/// Public Moralis EVM endpoint.
pub const DEFAULT_INDEXER_BASE_URL: &str = "https://deep-index.moralis.io/api/v2.2/";

const API_KEY_HEADER: &str = "X-API-Key";

/// Indexer adapter listing a wallet's NFTs through `GET /{address}/nft`.
pub struct MoralisIndexer {
    base_url: Url,
    api_key: Zeroizing<String>,
    timeout: Option<Duration>,
    client: OnceCell<Client>,
}

impl MoralisIndexer {
    /// Create an adapter. No network activity happens until the first query.
    pub fn new(base_url: Url, api_key: impl Into<String>, timeout: Option<Duration>) -> Self {
        Self {
            base_url: with_trailing_slash(base_url),
            api_key: Zeroizing::new(api_key.into()),
            timeout,
            client: OnceCell::new(),
        }
    }

    async fn client(&self) -> Result<&Client, NftIndexerError> {
        self.client
            .get_or_try_init(|| async {
                info!(base_url = %self.base_url, "initialising indexer client");
                build_client(self.timeout)
                    .map_err(|error| NftIndexerError::configuration(error.to_string()))
            })
            .await
    }

    fn listing_url(&self, owner: &WalletAddress, chain: Chain) -> Result<Url, NftIndexerError> {
        let mut url = self
            .base_url
            .join(&format!("{owner}/nft"))
            .map_err(|error| NftIndexerError::configuration(error.to_string()))?;
        url.query_pairs_mut()
            .append_pair("chain", chain.as_str())
            .append_pair("format", "decimal");
        Ok(url)
    }
}

fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

#[async_trait]
impl NftIndexer for MoralisIndexer {
    async fn wallet_nfts(
        &self,
        owner: &WalletAddress,
        chain: Chain,
    ) -> Result<Vec<IndexedNft>, NftIndexerError> {
        let url = self.listing_url(owner, chain)?;
        let client = self.client().await?;
        debug!(owner = %owner, chain = %chain, "querying indexer");
        let response = client
            .get(url)
            .header(API_KEY_HEADER, self.api_key.as_str())
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|error| NftIndexerError::transport(error.to_string()))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|error| NftIndexerError::transport(error.to_string()))?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }
        parse_listing(body.as_ref())
    }
}

fn parse_listing(body: &[u8]) -> Result<Vec<IndexedNft>, NftIndexerError> {
    let page: WalletNftsPageDto = serde_json::from_slice(body).map_err(|error| {
        NftIndexerError::decode(format!("invalid wallet listing payload: {error}"))
    })?;
    Ok(page.result)
}

fn map_status_error(status: StatusCode, body: &[u8]) -> NftIndexerError {
    let message = status_message(status, body);
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => NftIndexerError::unauthorized(message),
        _ => NftIndexerError::status(status.as_u16(), message),
    }
}
