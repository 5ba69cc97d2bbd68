//! Sign-up form validation and the record persisted for a new user.

use zeroize::Zeroizing;

use super::{EchelonId, EmailAddress, IdentityValidationError, WalletAddress};

/// Raw sign-up form values as typed by the user.
#[derive(Debug, Clone, Default)]
pub struct RegistrationInput {
    pub echelon_id: String,
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Field-level validation failure for the sign-up form.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistrationValidationError {
    #[error("Enter an Echelon ID")]
    MissingEchelonId,
    #[error("'name' is required")]
    MissingName,
    #[error("Please input your email!")]
    MissingEmail,
    #[error("The input is not valid email!")]
    InvalidEmail,
    #[error("'password' is required")]
    MissingPassword,
}

impl RegistrationValidationError {
    /// Form field the error belongs to.
    pub fn field(&self) -> &'static str {
        match self {
            Self::MissingEchelonId => "echelon_id",
            Self::MissingName => "name",
            Self::MissingEmail | Self::InvalidEmail => "email",
            Self::MissingPassword => "password",
        }
    }
}

/// Validated sign-up form. Uniqueness is checked separately against the
/// directory.
///
/// # Examples
/// ```
/// use parallel_connect::domain::{RegistrationForm, RegistrationInput};
///
/// let form = RegistrationForm::try_from_input(RegistrationInput {
///     echelon_id: "pilot".into(),
///     name: "Pilot".into(),
///     email: "pilot@example.com".into(),
///     password: "pw".into(),
/// })
/// .unwrap();
/// assert_eq!(form.echelon_id().as_ref(), "pilot");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationForm {
    echelon_id: EchelonId,
    name: String,
    email: EmailAddress,
    password: Zeroizing<String>,
}

impl RegistrationForm {
    /// Validate every field, reporting the first failure in form order.
    pub fn try_from_input(input: RegistrationInput) -> Result<Self, RegistrationValidationError> {
        let echelon_id = EchelonId::new(&input.echelon_id)
            .map_err(|_| RegistrationValidationError::MissingEchelonId)?;

        let name = input.name.trim();
        if name.is_empty() {
            return Err(RegistrationValidationError::MissingName);
        }

        let email = EmailAddress::new(&input.email).map_err(|err| match err {
            IdentityValidationError::EmptyEmail => RegistrationValidationError::MissingEmail,
            _ => RegistrationValidationError::InvalidEmail,
        })?;

        if input.password.is_empty() {
            return Err(RegistrationValidationError::MissingPassword);
        }

        Ok(Self {
            echelon_id,
            name: name.to_owned(),
            email,
            password: Zeroizing::new(input.password),
        })
    }

    pub fn echelon_id(&self) -> &EchelonId {
        &self.echelon_id
    }

    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    pub fn password(&self) -> &str {
        self.password.as_str()
    }

    /// Bind the form to the wallet that will own the new row.
    pub fn into_record(self, wallet_address: WalletAddress) -> NewUserRecord {
        NewUserRecord {
            form: self,
            wallet_address,
        }
    }
}

/// Row inserted into the user directory on successful registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUserRecord {
    form: RegistrationForm,
    wallet_address: WalletAddress,
}

impl NewUserRecord {
    pub fn echelon_id(&self) -> &EchelonId {
        self.form.echelon_id()
    }

    pub fn name(&self) -> &str {
        self.form.name()
    }

    pub fn email(&self) -> &EmailAddress {
        self.form.email()
    }

    pub fn password(&self) -> &str {
        self.form.password()
    }

    pub fn wallet_address(&self) -> &WalletAddress {
        &self.wallet_address
    }
}

/// Outcome of an asynchronous uniqueness check on a single form field.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistrationFieldError {
    #[error("The entered Echelon ID already exists.")]
    EchelonIdTaken,
    #[error("The entered Email already exists.")]
    EmailTaken,
    /// The directory could not answer; `field` names the value being checked.
    #[error("An error occurred while validating the {field}")]
    Lookup { field: &'static str },
    #[error(transparent)]
    Invalid(#[from] RegistrationValidationError),
}
