use garde::Validate;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{AppError, Result};

/// Login credentials. The password is wiped from memory on drop.
#[derive(Clone, Validate, Zeroize, ZeroizeOnDrop)]
pub struct Credentials {
    /// The user's RUT, as typed in the login form.
    #[garde(length(min = 3, max = 20))]
    pub rut: String,
    #[garde(length(min = 1, max = 128))]
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("rut", &self.rut)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    pub fn new(rut: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            rut: rut.into(),
            password: password.into(),
        }
    }
}

/// Validates login credentials before any network call.
///
/// # Arguments
///
/// * `credentials` - The credentials to validate.
///
/// # Returns
///
/// A `Result<()>` indicating whether the credentials are well formed.
pub fn validate_credentials(credentials: &Credentials) -> Result<()> {
    credentials
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;
    validate_rut(&credentials.rut)
}

/// Validates a RUT's character set (digits, dots, hyphen, check digit).
pub fn validate_rut(rut: &str) -> Result<()> {
    let ok = rut
        .chars()
        .all(|c| c.is_ascii_digit() || c == '.' || c == '-' || c == 'k' || c == 'K');
    if !ok {
        return Err(AppError::Validation(
            "RUT may only contain digits, dots, a hyphen, and a check digit".to_string(),
        ));
    }
    Ok(())
}

/// Validates the comment attached to a reject decision. Blank or
/// whitespace-only comments are refused locally; no network call is made.
pub fn validate_reject_comment(comment: &str) -> Result<()> {
    if comment.trim().is_empty() {
        return Err(AppError::MissingComment);
    }
    Ok(())
}
