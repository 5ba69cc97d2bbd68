//! Shared HTTP adapter state.
//!
//! Handlers accept this state via `actix_web::web::Data` so they only depend
//! on domain ports and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::CollectionQuery;

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub collection: Arc<dyn CollectionQuery>,
}

impl HttpState {
    pub fn new(collection: Arc<dyn CollectionQuery>) -> Self {
        Self { collection }
    }
}
