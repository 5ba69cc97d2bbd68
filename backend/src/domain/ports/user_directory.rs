//! Driven port for the hosted user directory (`parallel_users`).
//!
//! Adapters translate these calls into exact-match filters against the
//! backing store. Lookups return every matching row so callers can apply the
//! "first row wins" rule themselves.

use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use crate::domain::{
    CurrentUser, EchelonId, EmailAddress, NewUserRecord, SignInCredentials, WalletAddress,
};

use super::define_port_error;

define_port_error! {
    /// Errors raised by user directory adapters.
    pub enum UserDirectoryError {
        /// Directory could not be reached or the handshake failed.
        Connection { message: String } => "user directory connection failed: {message}",
        /// Query failed during execution.
        Query { message: String } => "user directory query failed: {message}",
        /// The directory refused a write, for example a unique violation.
        Rejected { message: String } => "{message}",
    }
}

/// Port for reading and inserting registered users.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Establish an anonymous session with the directory before querying.
    async fn sign_in_anonymously(&self) -> Result<(), UserDirectoryError>;

    /// Rows whose `echelon_id` equals the marker.
    async fn find_by_echelon_id(
        &self,
        echelon_id: &EchelonId,
    ) -> Result<Vec<CurrentUser>, UserDirectoryError>;

    /// Echelon ids of rows where `echelon_id = identifier OR email = identifier`.
    async fn find_by_identifier(&self, identifier: &str)
    -> Result<Vec<EchelonId>, UserDirectoryError>;

    /// Echelon ids of rows matching the identifier on either column together
    /// with the password.
    async fn find_by_credentials(
        &self,
        credentials: &SignInCredentials,
    ) -> Result<Vec<EchelonId>, UserDirectoryError>;

    /// Echelon ids of rows registered to the wallet.
    async fn find_by_wallet(
        &self,
        wallet: &WalletAddress,
    ) -> Result<Vec<EchelonId>, UserDirectoryError>;

    async fn echelon_id_exists(&self, echelon_id: &EchelonId) -> Result<bool, UserDirectoryError>;

    async fn email_exists(&self, email: &EmailAddress) -> Result<bool, UserDirectoryError>;

    async fn wallet_exists(&self, wallet: &WalletAddress) -> Result<bool, UserDirectoryError>;

    /// Insert a new row. Unique violations surface as
    /// [`UserDirectoryError::Rejected`] with the backend's message.
    async fn insert(&self, record: &NewUserRecord) -> Result<(), UserDirectoryError>;
}

#[derive(Debug, Clone)]
struct StoredUser {
    id: i64,
    echelon_id: EchelonId,
    name: String,
    email: String,
    password: String,
    wallet_address: String,
}

impl StoredUser {
    fn to_current_user(&self) -> CurrentUser {
        CurrentUser::new(
            self.id,
            self.name.clone(),
            self.email.clone(),
            self.echelon_id.clone(),
            self.wallet_address.clone(),
        )
    }

    fn matches_identifier(&self, identifier: &str) -> bool {
        self.echelon_id.as_ref() == identifier || self.email == identifier
    }
}

#[derive(Debug, Default)]
struct DirectoryState {
    rows: Vec<StoredUser>,
    failure: Option<UserDirectoryError>,
    handshakes: usize,
}

/// In-memory directory used by tests and local demos.
///
/// Rows live for the lifetime of the value. [`InMemoryUserDirectory::fail_with`]
/// makes every subsequent call return the supplied error.
#[derive(Debug, Default)]
pub struct InMemoryUserDirectory {
    state: Mutex<DirectoryState>,
}

impl InMemoryUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a row directly, bypassing uniqueness checks.
    pub fn with_user(
        self,
        echelon_id: &str,
        name: &str,
        email: &str,
        password: &str,
        wallet_address: &str,
    ) -> Self {
        {
            let mut state = self.lock();
            let id = next_id(&state.rows);
            if let Ok(echelon_id) = EchelonId::new(echelon_id) {
                state.rows.push(StoredUser {
                    id,
                    echelon_id,
                    name: name.to_owned(),
                    email: email.to_owned(),
                    password: password.to_owned(),
                    wallet_address: wallet_address.to_owned(),
                });
            }
        }
        self
    }

    /// Make subsequent calls fail with `error`; `None` restores normal service.
    pub fn fail_with(&self, error: Option<UserDirectoryError>) {
        self.lock().failure = error;
    }

    /// Number of rows currently stored.
    pub fn len(&self) -> usize {
        self.lock().rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of anonymous handshakes performed.
    pub fn handshakes(&self) -> usize {
        self.lock().handshakes
    }

    fn lock(&self) -> MutexGuard<'_, DirectoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn guard(&self) -> Result<MutexGuard<'_, DirectoryState>, UserDirectoryError> {
        let state = self.lock();
        match &state.failure {
            Some(error) => Err(error.clone()),
            None => Ok(state),
        }
    }
}

fn next_id(rows: &[StoredUser]) -> i64 {
    rows.iter().map(|row| row.id).max().unwrap_or(0) + 1
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn sign_in_anonymously(&self) -> Result<(), UserDirectoryError> {
        let mut state = self.guard()?;
        state.handshakes += 1;
        Ok(())
    }

    async fn find_by_echelon_id(
        &self,
        echelon_id: &EchelonId,
    ) -> Result<Vec<CurrentUser>, UserDirectoryError> {
        let state = self.guard()?;
        Ok(state
            .rows
            .iter()
            .filter(|row| &row.echelon_id == echelon_id)
            .map(StoredUser::to_current_user)
            .collect())
    }

    async fn find_by_identifier(
        &self,
        identifier: &str,
    ) -> Result<Vec<EchelonId>, UserDirectoryError> {
        let state = self.guard()?;
        Ok(state
            .rows
            .iter()
            .filter(|row| row.matches_identifier(identifier))
            .map(|row| row.echelon_id.clone())
            .collect())
    }

    async fn find_by_credentials(
        &self,
        credentials: &SignInCredentials,
    ) -> Result<Vec<EchelonId>, UserDirectoryError> {
        let state = self.guard()?;
        Ok(state
            .rows
            .iter()
            .filter(|row| {
                row.matches_identifier(credentials.identifier())
                    && row.password == credentials.password()
            })
            .map(|row| row.echelon_id.clone())
            .collect())
    }

    async fn find_by_wallet(
        &self,
        wallet: &WalletAddress,
    ) -> Result<Vec<EchelonId>, UserDirectoryError> {
        let state = self.guard()?;
        Ok(state
            .rows
            .iter()
            .filter(|row| row.wallet_address == wallet.as_ref())
            .map(|row| row.echelon_id.clone())
            .collect())
    }

    async fn echelon_id_exists(&self, echelon_id: &EchelonId) -> Result<bool, UserDirectoryError> {
        let state = self.guard()?;
        Ok(state.rows.iter().any(|row| &row.echelon_id == echelon_id))
    }

    async fn email_exists(&self, email: &EmailAddress) -> Result<bool, UserDirectoryError> {
        let state = self.guard()?;
        Ok(state.rows.iter().any(|row| row.email == email.as_ref()))
    }

    async fn wallet_exists(&self, wallet: &WalletAddress) -> Result<bool, UserDirectoryError> {
        let state = self.guard()?;
        Ok(state
            .rows
            .iter()
            .any(|row| row.wallet_address == wallet.as_ref()))
    }

    async fn insert(&self, record: &NewUserRecord) -> Result<(), UserDirectoryError> {
        let mut state = self.guard()?;
        if state
            .rows
            .iter()
            .any(|row| &row.echelon_id == record.echelon_id())
        {
            return Err(UserDirectoryError::rejected(
                "duplicate key value violates unique constraint \"parallel_users_echelon_id_key\"",
            ));
        }
        let id = next_id(&state.rows);
        state.rows.push(StoredUser {
            id,
            echelon_id: record.echelon_id().clone(),
            name: record.name().to_owned(),
            email: record.email().as_ref().to_owned(),
            password: record.password().to_owned(),
            wallet_address: record.wallet_address().as_ref().to_owned(),
        });
        Ok(())
    }
}
