//! HTTP server configuration object.

use std::net::SocketAddr;
use std::sync::Arc;

use parallel_connect::domain::ports::CollectionQuery;

/// Configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) collection: Arc<dyn CollectionQuery>,
}

impl ServerConfig {
    /// Construct a configuration serving `collection` on `bind_addr`.
    #[must_use]
    pub fn new(bind_addr: SocketAddr, collection: Arc<dyn CollectionQuery>) -> Self {
        Self {
            bind_addr,
            collection,
        }
    }
}
