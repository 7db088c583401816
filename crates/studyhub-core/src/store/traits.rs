//! Credential store trait definition.
//!
//! The `CredentialStore` trait defines the interface the authentication
//! service talks to. This abstraction keeps the core logic independent of
//! the backing database.

use super::types::{CredentialRecord, NewCredentialRecord};
use crate::error::Result;

/// Storage interface for per-user credential records.
///
/// All implementations must ensure:
/// - Writes are atomic: a failed operation leaves the record unchanged
/// - The username is a unique key
/// - Credential replacement swaps verifier, salt, and envelope together,
///   never one of them alone
pub trait CredentialStore: Send + Sync {
    /// Fetch a credential record by username.
    ///
    /// # Returns
    ///
    /// Returns `Ok(Some(record))` if found, `Ok(None)` if not found.
    fn fetch(&self, username: &str) -> Result<Option<CredentialRecord>>;

    /// Insert a new credential record.
    ///
    /// # Errors
    ///
    /// Returns `HubError::DuplicateUsername` if the username is taken.
    fn insert(&self, record: &NewCredentialRecord) -> Result<()>;

    /// Replace the credential material for an existing user.
    ///
    /// Verifier, verifier salt, and key envelope are replaced in a single
    /// atomic write. The consent flag and creation timestamp are untouched.
    ///
    /// # Errors
    ///
    /// Returns `HubError::UserNotFound` if the user does not exist.
    fn replace_credentials(&self, record: &NewCredentialRecord) -> Result<()>;

    /// Record the user's choice about platform-assisted unlock.
    ///
    /// # Errors
    ///
    /// Returns `HubError::UserNotFound` if the user does not exist.
    fn set_consent_unlock(&self, username: &str, enabled: bool) -> Result<()>;
}
