//! Identity resolution: session resume, sign-in, registration and sign-out.
//!
//! Lookup misses are ordinary outcomes, not errors. Only upstream failures
//! and unrecoverable validation are returned as [`Error`].

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::domain::ports::{
    Notice, Notifier, SessionStorage, SessionStorageError, UserDirectory, UserDirectoryError,
};
use crate::domain::{
    AppStore, CurrentUser, EchelonId, EmailAddress, Error, IdentityValidationError,
    RegistrationFieldError, RegistrationForm, RegistrationInput, RegistrationValidationError,
    SessionPhase, SignInCredentials, WalletAddress,
};

const FILL_THE_FORM: &str = "Please fill the form.";
const USER_DOES_NOT_EXIST: &str = "User doesn't exist.";
const INCORRECT_PASSWORD: &str = "Incorrect password.";
const WALLET_NOT_FOUND: &str = "Wallet not found.";
const WALLET_NOT_CONNECTED: &str = "There was a problem";
const WALLET_ALREADY_REGISTERED: &str = "Wallet already exists, Try Signing In instead";
const USER_SAVED: &str = "User Saved!";

/// Navigation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Landing,
    SignIn,
    Dashboard,
}

impl Route {
    pub fn path(self) -> &'static str {
        match self {
            Self::Landing => "/",
            Self::SignIn => "/sign-in",
            Self::Dashboard => "/dashboard",
        }
    }
}

/// Result of mounting the dashboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DashboardMount {
    /// No session marker; leave the dashboard.
    Redirect(Route),
    /// Marker present. `user` is `None` when no row matched or the lookup
    /// failed.
    Ready { user: Option<CurrentUser> },
}

/// Result of a credential sign-in attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignInOutcome {
    SignedIn {
        echelon_id: EchelonId,
        navigate_to: Route,
    },
    /// No row matches the identifier; the caller should offer sign-up.
    UnknownUser,
    IncorrectPassword,
}

impl SignInOutcome {
    /// Whether the "needs sign-up" prompt should be shown.
    pub fn needs_sign_up(&self) -> bool {
        matches!(self, Self::UnknownUser)
    }
}

/// Result of a wallet sign-in attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalletSignInOutcome {
    SignedIn {
        echelon_id: EchelonId,
        navigate_to: Route,
    },
    WalletNotFound,
}

/// Result of a registration attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationOutcome {
    Registered {
        echelon_id: EchelonId,
        navigate_to: Route,
    },
    /// Validation or uniqueness failures, in form order. Nothing was inserted.
    Rejected(Vec<RegistrationFieldError>),
    WalletNotConnected,
    WalletAlreadyRegistered,
}

/// Identity resolution service.
///
/// Holds the user directory, the session marker store and the shared
/// [`AppStore`].
pub struct IdentityService<D, S, N> {
    directory: Arc<D>,
    sessions: Arc<S>,
    notifier: Arc<N>,
    store: Arc<AppStore>,
}

impl<D, S, N> Clone for IdentityService<D, S, N> {
    fn clone(&self) -> Self {
        Self {
            directory: Arc::clone(&self.directory),
            sessions: Arc::clone(&self.sessions),
            notifier: Arc::clone(&self.notifier),
            store: Arc::clone(&self.store),
        }
    }
}

impl<D, S, N> IdentityService<D, S, N> {
    pub fn new(directory: Arc<D>, sessions: Arc<S>, notifier: Arc<N>, store: Arc<AppStore>) -> Self {
        Self {
            directory,
            sessions,
            notifier,
            store,
        }
    }

    pub fn store(&self) -> &Arc<AppStore> {
        &self.store
    }
}

impl<D, S, N> IdentityService<D, S, N>
where
    D: UserDirectory,
    S: SessionStorage,
    N: Notifier,
{
    fn map_directory_error(error: UserDirectoryError) -> Error {
        match error {
            UserDirectoryError::Connection { message } => {
                Error::service_unavailable(format!("user directory unavailable: {message}"))
            }
            UserDirectoryError::Query { message } => Error::internal(message),
            UserDirectoryError::Rejected { message } => Error::conflict(message),
        }
    }

    fn map_session_error(error: SessionStorageError) -> Error {
        Error::internal(error.to_string())
    }

    fn fail_authentication(&self, message: &str) {
        self.notifier.notify(Notice::error(message));
        self.store.set_phase(SessionPhase::Unauthenticated);
    }

    fn complete_authentication(&self, echelon_id: &EchelonId) -> Result<Route, Error> {
        self.sessions
            .persist(echelon_id)
            .map_err(Self::map_session_error)?;
        self.store.set_phase(SessionPhase::Authenticated);
        info!(echelon_id = %echelon_id, "session established");
        Ok(Route::Dashboard)
    }

    /// Resolve the current user from the persisted marker.
    pub async fn resume_session(&self) -> Result<DashboardMount, Error> {
        let Some(echelon_id) = self.sessions.echelon_id().map_err(Self::map_session_error)? else {
            debug!("no session marker; redirecting to landing");
            self.store.set_phase(SessionPhase::Unauthenticated);
            return Ok(DashboardMount::Redirect(Route::Landing));
        };

        let lookup = async {
            self.directory.sign_in_anonymously().await?;
            self.directory.find_by_echelon_id(&echelon_id).await
        };
        let user = match lookup.await {
            Ok(rows) => rows.into_iter().next(),
            Err(error) => {
                warn!(%error, echelon_id = %echelon_id, "current user lookup failed");
                None
            }
        };

        if user.is_some() {
            self.store.set_phase(SessionPhase::Authenticated);
        }
        self.store.set_current_user(user.clone());
        Ok(DashboardMount::Ready { user })
    }

    /// Sign in with an echelon id or email plus password.
    pub async fn sign_in(&self, identifier: &str, password: &str) -> Result<SignInOutcome, Error> {
        let credentials = match SignInCredentials::try_from_parts(identifier, password) {
            Ok(credentials) => credentials,
            Err(error) => {
                debug!(%error, "sign-in form incomplete");
                self.notifier.notify(Notice::error(FILL_THE_FORM));
                return Err(Error::invalid_request(FILL_THE_FORM));
            }
        };
        self.store.set_phase(SessionPhase::Authenticating);

        let lookups = async {
            self.directory.sign_in_anonymously().await?;
            tokio::try_join!(
                self.directory.find_by_identifier(credentials.identifier()),
                self.directory.find_by_credentials(&credentials),
            )
        };
        let (by_identifier, by_credentials) = match lookups.await {
            Ok(rows) => rows,
            Err(error) => {
                let error = Self::map_directory_error(error);
                self.fail_authentication(error.message());
                return Err(error);
            }
        };

        if by_identifier.is_empty() {
            self.fail_authentication(USER_DOES_NOT_EXIST);
            return Ok(SignInOutcome::UnknownUser);
        }
        let Some(echelon_id) = by_credentials.into_iter().next() else {
            self.fail_authentication(INCORRECT_PASSWORD);
            return Ok(SignInOutcome::IncorrectPassword);
        };

        let navigate_to = self.complete_authentication(&echelon_id)?;
        Ok(SignInOutcome::SignedIn {
            echelon_id,
            navigate_to,
        })
    }

    /// Sign in with a connected wallet. Lookup errors count as a miss.
    pub async fn sign_in_with_wallet(
        &self,
        wallet: &WalletAddress,
    ) -> Result<WalletSignInOutcome, Error> {
        self.store.set_phase(SessionPhase::Authenticating);
        let rows = match self.directory.find_by_wallet(wallet).await {
            Ok(rows) => rows,
            Err(error) => {
                warn!(%error, wallet = %wallet, "wallet lookup failed");
                Vec::new()
            }
        };
        let Some(echelon_id) = rows.into_iter().next() else {
            self.fail_authentication(WALLET_NOT_FOUND);
            return Ok(WalletSignInOutcome::WalletNotFound);
        };
        let navigate_to = self.complete_authentication(&echelon_id)?;
        Ok(WalletSignInOutcome::SignedIn {
            echelon_id,
            navigate_to,
        })
    }

    /// Check that an echelon id is well-formed and not yet taken.
    pub async fn validate_echelon_id(&self, value: &str) -> Result<(), RegistrationFieldError> {
        let echelon_id =
            EchelonId::new(value).map_err(|_| RegistrationValidationError::MissingEchelonId)?;
        self.check_echelon_id(&echelon_id).await
    }

    /// Check that an email is well-formed and not yet taken.
    pub async fn validate_email(&self, value: &str) -> Result<(), RegistrationFieldError> {
        let email = EmailAddress::new(value).map_err(|error| match error {
            IdentityValidationError::EmptyEmail => RegistrationValidationError::MissingEmail,
            _ => RegistrationValidationError::InvalidEmail,
        })?;
        self.check_email(&email).await
    }

    async fn check_echelon_id(&self, echelon_id: &EchelonId) -> Result<(), RegistrationFieldError> {
        match self.directory.echelon_id_exists(echelon_id).await {
            Ok(false) => Ok(()),
            Ok(true) => Err(RegistrationFieldError::EchelonIdTaken),
            Err(error) => {
                warn!(%error, "echelon id uniqueness check failed");
                Err(RegistrationFieldError::Lookup { field: "Echelon ID" })
            }
        }
    }

    async fn check_email(&self, email: &EmailAddress) -> Result<(), RegistrationFieldError> {
        match self.directory.email_exists(email).await {
            Ok(false) => Ok(()),
            Ok(true) => Err(RegistrationFieldError::EmailTaken),
            Err(error) => {
                warn!(%error, "email uniqueness check failed");
                Err(RegistrationFieldError::Lookup { field: "Email" })
            }
        }
    }

    /// Whether the wallet already owns a row. Lookup errors count as `false`.
    pub async fn wallet_registered(&self, wallet: &WalletAddress) -> bool {
        match self.directory.wallet_exists(wallet).await {
            Ok(exists) => exists,
            Err(error) => {
                warn!(%error, wallet = %wallet, "wallet registration check failed");
                false
            }
        }
    }

    /// Register a new user bound to the connected wallet.
    pub async fn register(&self, input: RegistrationInput) -> Result<RegistrationOutcome, Error> {
        let form = match RegistrationForm::try_from_input(input) {
            Ok(form) => form,
            Err(error) => return Ok(RegistrationOutcome::Rejected(vec![error.into()])),
        };

        let Some(wallet) = self.store.wallet_address() else {
            self.notifier.notify(Notice::error(WALLET_NOT_CONNECTED));
            return Ok(RegistrationOutcome::WalletNotConnected);
        };
        if self.wallet_registered(&wallet).await {
            self.notifier.notify(Notice::error(WALLET_ALREADY_REGISTERED));
            return Ok(RegistrationOutcome::WalletAlreadyRegistered);
        }

        let (echelon_check, email_check) = tokio::join!(
            self.check_echelon_id(form.echelon_id()),
            self.check_email(form.email()),
        );
        let failures: Vec<_> = [echelon_check.err(), email_check.err()]
            .into_iter()
            .flatten()
            .collect();
        if !failures.is_empty() {
            return Ok(RegistrationOutcome::Rejected(failures));
        }

        let record = form.into_record(wallet);
        let insert = async {
            self.directory.sign_in_anonymously().await?;
            self.directory.insert(&record).await
        };
        if let Err(error) = insert.await {
            let error = Self::map_directory_error(error);
            self.notifier.notify(Notice::error(error.message()));
            return Err(error);
        }

        let echelon_id = record.echelon_id().clone();
        let navigate_to = self.complete_authentication(&echelon_id)?;
        self.notifier.notify(Notice::success(USER_SAVED));
        Ok(RegistrationOutcome::Registered {
            echelon_id,
            navigate_to,
        })
    }

    /// Clear the marker, the user, the gallery and the wallet.
    ///
    /// Store setters run even when the marker store fails; the failure is
    /// reported afterwards.
    pub fn sign_out(&self) -> Result<Route, Error> {
        let cleared = self.sessions.clear();
        self.store.set_current_user(None);
        self.store.set_nft_list(Vec::new());
        self.store.disconnect_wallet();
        self.store.set_phase(SessionPhase::Unauthenticated);
        cleared.map_err(Self::map_session_error)?;
        info!("signed out");
        Ok(Route::Landing)
    }
}

#[cfg(test)]
#[path = "identity_tests.rs"]
mod tests;
