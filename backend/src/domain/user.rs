//! Registered identities and the value types that key them.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Validation errors returned by the identity value constructors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdentityValidationError {
    #[error("echelon id must not be empty")]
    EmptyEchelonId,
    #[error("email address must not be empty")]
    EmptyEmail,
    #[error("email address is not valid")]
    InvalidEmail,
    #[error("wallet address must be 0x followed by hexadecimal digits")]
    InvalidWalletAddress,
}

/// Unique user-chosen handle. Doubles as the session marker value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EchelonId(String);

impl EchelonId {
    /// Validate and construct an [`EchelonId`], trimming surrounding whitespace.
    ///
    /// # Examples
    /// ```
    /// use parallel_connect::domain::EchelonId;
    ///
    /// let id = EchelonId::new("  pilot-7 ").unwrap();
    /// assert_eq!(id.as_ref(), "pilot-7");
    /// ```
    pub fn new(value: impl AsRef<str>) -> Result<Self, IdentityValidationError> {
        let trimmed = value.as_ref().trim();
        if trimmed.is_empty() {
            return Err(IdentityValidationError::EmptyEchelonId);
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for EchelonId {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for EchelonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<EchelonId> for String {
    fn from(value: EchelonId) -> Self {
        value.0
    }
}

impl TryFrom<String> for EchelonId {
    type Error = IdentityValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

fn email_regex() -> &'static Regex {
    static EMAIL_RE: OnceLock<Regex> = OnceLock::new();
    EMAIL_RE.get_or_init(|| match Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$") {
        Ok(regex) => regex,
        Err(error) => panic!("email regex failed to compile: {error}"),
    })
}

/// Syntactically valid email address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Validate and construct an [`EmailAddress`].
    pub fn new(value: impl AsRef<str>) -> Result<Self, IdentityValidationError> {
        let trimmed = value.as_ref().trim();
        if trimmed.is_empty() {
            return Err(IdentityValidationError::EmptyEmail);
        }
        if !email_regex().is_match(trimmed) {
            return Err(IdentityValidationError::InvalidEmail);
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for EmailAddress {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.0
    }
}

impl TryFrom<String> for EmailAddress {
    type Error = IdentityValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Address of a connected wallet.
///
/// The original casing is preserved because user rows store whatever the
/// wallet reported. Comparisons against contracts are done case-insensitively
/// elsewhere.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct WalletAddress(String);

impl WalletAddress {
    /// Validate and construct a [`WalletAddress`].
    ///
    /// # Examples
    /// ```
    /// use parallel_connect::domain::WalletAddress;
    ///
    /// assert!(WalletAddress::new("0xABC").is_ok());
    /// assert!(WalletAddress::new("ABC").is_err());
    /// ```
    pub fn new(value: impl AsRef<str>) -> Result<Self, IdentityValidationError> {
        let trimmed = value.as_ref().trim();
        let digits = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .ok_or(IdentityValidationError::InvalidWalletAddress)?;
        if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(IdentityValidationError::InvalidWalletAddress);
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for WalletAddress {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for WalletAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<WalletAddress> for String {
    fn from(value: WalletAddress) -> Self {
        value.0
    }
}

impl TryFrom<String> for WalletAddress {
    type Error = IdentityValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// A registered identity as held by the application store.
///
/// Rows are replaced wholesale and never patched field by field, so the type
/// exposes accessors only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentUser {
    id: i64,
    name: String,
    email: String,
    echelon_id: EchelonId,
    wallet_address: String,
}

impl CurrentUser {
    /// Build a user from a directory row.
    pub fn new(
        id: i64,
        name: impl Into<String>,
        email: impl Into<String>,
        echelon_id: EchelonId,
        wallet_address: impl Into<String>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            email: email.into(),
            echelon_id,
            wallet_address: wallet_address.into(),
        }
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    pub fn email(&self) -> &str {
        self.email.as_str()
    }

    pub fn echelon_id(&self) -> &EchelonId {
        &self.echelon_id
    }

    /// Wallet address recorded at registration. May be empty for legacy rows.
    pub fn wallet_address(&self) -> &str {
        self.wallet_address.as_str()
    }
}
