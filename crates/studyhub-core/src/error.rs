//! Error types for Study Hub core operations.
//!
//! This module defines the error hierarchy for all core operations.
//! Errors are descriptive at the core level; the application layer maps
//! them to user-facing messages.
//!
//! `UserNotFound` and `InvalidCredentials` are distinct variants so callers
//! can log and test them separately, but they share one display message:
//! a login failure must read the same whether the username or the password
//! was wrong, or an attacker could enumerate registered usernames.

use thiserror::Error;

/// Result type alias for Study Hub operations.
pub type Result<T> = std::result::Result<T, HubError>;

/// Core error type for Study Hub operations.
#[derive(Debug, Error)]
pub enum HubError {
    /// Registration attempted with a username that already exists
    #[error("Username already exists")]
    DuplicateUsername,

    /// No credential record for the given username
    #[error("Invalid username or password")]
    UserNotFound,

    /// Password verification failed
    #[error("Invalid username or password")]
    InvalidCredentials,

    /// Envelope unwrap or payload decrypt failed; deliberately silent on
    /// whether the key was wrong or the data was corrupt
    #[error("Decryption failed")]
    DecryptionFailed,

    /// Hashing or key derivation could not obtain required resources
    #[error("Resource exhaustion: {0}")]
    ResourceExhaustion(String),

    /// Encryption or key-handling error
    #[error("Encryption error: {0}")]
    Crypto(String),

    /// Storage backend error (generic)
    #[error("Storage error: {0}")]
    Storage(String),

    /// SQLite-specific storage error
    #[error("SQLite error: {source}")]
    Sqlite {
        #[from]
        source: rusqlite::Error,
    },

    /// Invalid user input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
