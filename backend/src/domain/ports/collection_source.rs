//! Driven port for the collection proxy as seen from the dashboard client.

use async_trait::async_trait;

use crate::domain::{NftToken, WalletAddress};

use super::define_port_error;

define_port_error! {
    /// Errors surfaced while calling the collection proxy.
    pub enum CollectionSourceError {
        /// Network transport failed before receiving a response.
        Transport { message: String } => "collection request failed: {message}",
        /// Proxy answered with a non-success status.
        Status { status: u16, message: String } =>
            "collection request returned {status}: {message}",
        /// Response body could not be decoded.
        Decode { message: String } => "collection response decode failed: {message}",
    }
}

/// Port returning the token references a wallet holds in the collection.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CollectionSource: Send + Sync {
    async fn fetch_tokens(&self, owner: &WalletAddress)
    -> Result<Vec<NftToken>, CollectionSourceError>;
}
