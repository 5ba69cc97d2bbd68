//! Domain primitives, services and ports.
//!
//! Purpose: hold the dashboard's business rules independent of transport.
//! Identity resolution and asset acquisition drive the shared [`AppStore`];
//! collection filtering backs the proxy endpoint.
//!
//! Public surface:
//! - Error / ErrorCode: transport agnostic failure payload.
//! - AppStore: observable client state.
//! - IdentityService, AssetAcquisition, CollectionService: the use-cases.

pub mod app_store;
pub mod assets;
pub mod auth;
pub mod collection;
pub mod error;
pub mod identity;
pub mod nft;
pub mod ports;
pub mod registration;
pub mod trace_id;
pub mod user;

pub use self::app_store::{AppSnapshot, AppStore, SessionPhase, WalletConnection};
pub use self::assets::{AcquisitionError, AcquisitionOutcome, AssetAcquisition};
pub use self::auth::{SignInCredentials, SignInValidationError};
pub use self::collection::CollectionService;
pub use self::error::{Error, ErrorCode, ErrorValidationError, TRACE_ID_HEADER};
pub use self::identity::{
    DashboardMount, IdentityService, RegistrationOutcome, Route, SignInOutcome,
    WalletSignInOutcome,
};
pub use self::nft::{
    Attribute, Chain, CollectionConfigError, ContractAddress, IndexedNft, Nft, NftMetadata,
    NftToken,
};
pub use self::registration::{
    NewUserRecord, RegistrationFieldError, RegistrationForm, RegistrationInput,
    RegistrationValidationError,
};
pub use self::trace_id::TraceId;
pub use self::user::{CurrentUser, EchelonId, EmailAddress, IdentityValidationError, WalletAddress};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use parallel_connect::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::not_found("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
