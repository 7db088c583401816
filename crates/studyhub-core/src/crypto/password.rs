//! Password and username validation.
//!
//! Enforces minimum security requirements before any hashing or key
//! derivation runs.

use crate::error::{HubError, Result};

/// Minimum password length in characters.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Maximum username length in characters.
const MAX_USERNAME_LENGTH: usize = 64;

/// Validate a password meets minimum security requirements.
///
/// # Requirements
///
/// - At least 8 characters long
/// - Not empty or only whitespace
///
/// # Arguments
///
/// * `password` - The password to validate
///
/// # Returns
///
/// Returns `Ok(())` if valid, or `HubError::InvalidInput` with explanation.
///
/// # Examples
///
/// ```
/// use studyhub_core::crypto::validate_password;
///
/// assert!(validate_password("my-secure-password-123").is_ok());
/// assert!(validate_password("short").is_err());
/// ```
pub fn validate_password(password: &str) -> Result<()> {
    // Check empty/whitespace
    if password.trim().is_empty() {
        return Err(HubError::InvalidInput(
            "Password cannot be empty".to_string(),
        ));
    }

    // Check minimum length
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(HubError::InvalidInput(format!(
            "Password must be at least {} characters (got {})",
            MIN_PASSWORD_LENGTH,
            password.len()
        )));
    }

    Ok(())
}

/// Validate a username is usable as a credential-record key.
///
/// # Requirements
///
/// - Not empty or only whitespace
/// - At most 64 characters long
/// - No control characters
///
/// # Arguments
///
/// * `username` - The username to validate
///
/// # Returns
///
/// Returns `Ok(())` if valid, or `HubError::InvalidInput` with explanation.
pub fn validate_username(username: &str) -> Result<()> {
    // Check empty/whitespace
    if username.trim().is_empty() {
        return Err(HubError::InvalidInput(
            "Username cannot be empty".to_string(),
        ));
    }

    // Check maximum length
    if username.chars().count() > MAX_USERNAME_LENGTH {
        return Err(HubError::InvalidInput(format!(
            "Username must be at most {} characters",
            MAX_USERNAME_LENGTH
        )));
    }

    // Check control characters
    if username.chars().any(|c| c.is_control()) {
        return Err(HubError::InvalidInput(
            "Username cannot contain control characters".to_string(),
        ));
    }

    Ok(())
}
