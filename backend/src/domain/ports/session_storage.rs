//! Driven port for the tab-scoped session marker.
//!
//! The marker is a single `echelon_id` string. Its absence means the user is
//! signed out.

use std::sync::{Mutex, PoisonError};

use crate::domain::EchelonId;

use super::define_port_error;

/// Storage key holding the session marker.
pub const SESSION_MARKER_KEY: &str = "echelon_id";

define_port_error! {
    /// Errors raised while reading or writing the session marker.
    pub enum SessionStorageError {
        /// Backing store could not be read or written.
        Io { message: String } => "session storage failed: {message}",
    }
}

/// Port for the persisted session marker.
#[cfg_attr(test, mockall::automock)]
pub trait SessionStorage: Send + Sync {
    /// Read the marker. Blank values are reported as absent.
    fn echelon_id(&self) -> Result<Option<EchelonId>, SessionStorageError>;

    fn persist(&self, echelon_id: &EchelonId) -> Result<(), SessionStorageError>;

    /// Remove every stored value.
    fn clear(&self) -> Result<(), SessionStorageError>;
}

/// Process-lifetime session storage.
#[derive(Debug, Default)]
pub struct InMemorySessionStorage {
    marker: Mutex<Option<EchelonId>>,
}

impl InMemorySessionStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStorage for InMemorySessionStorage {
    fn echelon_id(&self) -> Result<Option<EchelonId>, SessionStorageError> {
        Ok(self
            .marker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    fn persist(&self, echelon_id: &EchelonId) -> Result<(), SessionStorageError> {
        *self.marker.lock().unwrap_or_else(PoisonError::into_inner) = Some(echelon_id.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionStorageError> {
        *self.marker.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}
