//! Fetches token metadata documents over HTTP.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};

use crate::domain::Nft;
use crate::domain::ports::{MetadataSource, MetadataSourceError};
use crate::outbound::http_support::{build_client, status_message};

/// Metadata source issuing one `GET` per token URI, with no retry.
pub struct HttpMetadataSource {
    client: Client,
}

impl HttpMetadataSource {
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(timeout: Option<Duration>) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_client(timeout)?,
        })
    }
}

#[async_trait]
impl MetadataSource for HttpMetadataSource {
    async fn fetch(&self, token_uri: &str) -> Result<Nft, MetadataSourceError> {
        let url = Url::parse(token_uri).map_err(|error| {
            MetadataSourceError::transport(format!("invalid metadata URI `{token_uri}`: {error}"))
        })?;
        let response = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|error| MetadataSourceError::transport(error.to_string()))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|error| MetadataSourceError::transport(error.to_string()))?;
        if !status.is_success() {
            return Err(MetadataSourceError::status(
                status.as_u16(),
                status_message(status, body.as_ref()),
            ));
        }
        decode_metadata(body.as_ref())
    }
}

fn decode_metadata(body: &[u8]) -> Result<Nft, MetadataSourceError> {
    serde_json::from_slice(body)
        .map_err(|error| MetadataSourceError::decode(format!("invalid metadata document: {error}")))
}
