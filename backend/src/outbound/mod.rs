//! Outbound adapters implementing domain ports.
//!
//! - **indexer**: NFT indexing API used by the collection proxy
//! - **proxy_client** and **metadata_http**: the dashboard's asset sources
//! - **persistence**: Diesel/PostgreSQL user directory
//! - **postgrest**: user directory over the hosted REST gateway
//! - **session_file**: file-backed session marker for the command-line client
//!
//! Adapters translate between domain types and wire representations and hold
//! no business rules.

pub(crate) mod http_support;
pub mod indexer;
pub mod metadata_http;
pub mod persistence;
pub mod postgrest;
pub mod proxy_client;
pub mod session_file;

pub use indexer::{DEFAULT_INDEXER_BASE_URL, MoralisIndexer};
pub use metadata_http::HttpMetadataSource;
pub use persistence::{DbPool, DieselUserDirectory, PoolConfig};
pub use postgrest::PostgrestUserDirectory;
pub use proxy_client::HttpCollectionSource;
pub use session_file::FileSessionStorage;
