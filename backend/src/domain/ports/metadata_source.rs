//! Driven port resolving a token URI into its metadata document.

use async_trait::async_trait;

use crate::domain::Nft;

use super::define_port_error;

define_port_error! {
    /// Errors surfaced while fetching token metadata.
    pub enum MetadataSourceError {
        /// The token reference carried no URI.
        MissingUri { token_id: String } => "token {token_id} has no metadata URI",
        Transport { message: String } => "metadata request failed: {message}",
        Status { status: u16, message: String } =>
            "metadata request returned {status}: {message}",
        Decode { message: String } => "metadata decode failed: {message}",
    }
}

/// Port for resolving token metadata documents.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MetadataSource: Send + Sync {
    /// Fetch the document at `token_uri` with no retry.
    async fn fetch(&self, token_uri: &str) -> Result<Nft, MetadataSourceError>;
}
