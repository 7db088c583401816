//! Core data types for the credential store.
//!
//! A credential record holds everything needed to authenticate a user and
//! unlock their data key. None of it is secret on its own: the verifier
//! resists offline guessing and the key envelope is sealed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A stored per-user credential record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialRecord {
    /// Unique username (primary key)
    pub username: String,

    /// PHC-format Argon2id password verifier
    pub verifier: String,

    /// Random salt folded into the verifier
    pub verifier_salt: Vec<u8>,

    /// Serialized key envelope: KDF salt plus the wrapped data key
    pub key_envelope: Vec<u8>,

    /// Whether the user opted in to platform-assisted unlock
    pub consent_unlock: bool,

    /// When this record was created
    pub created_at: DateTime<Utc>,

    /// Last modification timestamp
    pub updated_at: DateTime<Utc>,
}

/// Builder for creating or replacing credential material.
///
/// Timestamps and the consent flag are managed by the storage layer.
#[derive(Debug, Clone)]
pub struct NewCredentialRecord {
    /// Unique username
    pub username: String,

    /// PHC-format Argon2id password verifier
    pub verifier: String,

    /// Random salt folded into the verifier
    pub verifier_salt: Vec<u8>,

    /// Serialized key envelope
    pub key_envelope: Vec<u8>,
}
