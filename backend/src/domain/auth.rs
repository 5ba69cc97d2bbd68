//! Sign-in credentials.
//!
//! The identifier may be either an echelon id or an email address; the user
//! directory decides which column matches.

use zeroize::Zeroizing;

/// Domain error returned when sign-in fields are missing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SignInValidationError {
    /// Identifier was missing or blank once trimmed.
    #[error("identifier must not be empty")]
    EmptyIdentifier,
    /// Password was blank.
    #[error("password must not be empty")]
    EmptyPassword,
}

/// Validated sign-in credentials.
///
/// ## Invariants
/// - `identifier` is trimmed and must not be empty after trimming.
/// - `password` must be non-empty but keeps caller-provided whitespace, since
///   the directory compares it verbatim.
///
/// # Examples
/// ```
/// use parallel_connect::domain::SignInCredentials;
///
/// let creds = SignInCredentials::try_from_parts("pilot@example.com", "pw").unwrap();
/// assert_eq!(creds.identifier(), "pilot@example.com");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignInCredentials {
    identifier: String,
    password: Zeroizing<String>,
}

impl SignInCredentials {
    /// Construct credentials from raw identifier/password inputs.
    pub fn try_from_parts(identifier: &str, password: &str) -> Result<Self, SignInValidationError> {
        let normalized = identifier.trim();
        if normalized.is_empty() {
            return Err(SignInValidationError::EmptyIdentifier);
        }

        if password.is_empty() {
            return Err(SignInValidationError::EmptyPassword);
        }

        Ok(Self {
            identifier: normalized.to_owned(),
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Echelon id or email as typed by the user.
    pub fn identifier(&self) -> &str {
        self.identifier.as_str()
    }

    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", "pw", SignInValidationError::EmptyIdentifier)]
    #[case("   ", "pw", SignInValidationError::EmptyIdentifier)]
    #[case("pilot", "", SignInValidationError::EmptyPassword)]
    fn invalid_credentials(
        #[case] identifier: &str,
        #[case] password: &str,
        #[case] expected: SignInValidationError,
    ) {
        let err = SignInCredentials::try_from_parts(identifier, password)
            .expect_err("invalid inputs must fail");
        assert_eq!(err, expected);
    }

    #[rstest]
    #[case("  pilot  ", "secret")]
    #[case("pilot@example.com", " spaced pw ")]
    fn valid_credentials_trim_identifier(#[case] identifier: &str, #[case] password: &str) {
        let creds = SignInCredentials::try_from_parts(identifier, password)
            .expect("valid inputs should succeed");
        assert_eq!(creds.identifier(), identifier.trim());
        assert_eq!(creds.password(), password);
    }
}
