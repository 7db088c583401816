//! Authentication and session orchestration.
//!
//! Ties the credential hasher, the wrapping-key KDF, and the envelope
//! layer together over a [`CredentialStore`]:
//!
//! - **Register**: generate a data key, wrap it under a password-derived
//!   key, hash the password, persist one credential record
//! - **Login**: verify the password, then derive and use the wrapping key
//!   to unwrap the data key into an in-memory [`Session`]
//! - **Rotate**: rewrap the same data key under a new password without
//!   touching any encrypted payload
//!
//! A locked state has no value of its own: holding a [`Session`] is what
//! "unlocked" means, and dropping it zeroizes the data key.
//!
//! Log lines at this layer carry usernames only, never passwords, keys,
//! or verifier material.

use secrecy::SecretString;
use tracing::{debug, info, warn};

use crate::config::SecurityConfig;
use crate::crypto::envelope::{
    decrypt_payload, encrypt_payload, rewrap, unwrap_data_key, wrap_data_key, DataKey, KeyEnvelope,
};
use crate::crypto::hasher::CredentialHasher;
use crate::crypto::kdf::{derive_wrapping_key, generate_kdf_salt};
use crate::crypto::password::{validate_password, validate_username};
use crate::error::{HubError, Result};
use crate::store::traits::CredentialStore;
use crate::store::types::NewCredentialRecord;

/// Orchestrates registration, login, and password rotation over a
/// credential store.
pub struct AuthService<S: CredentialStore> {
    store: S,
    hasher: CredentialHasher,
    config: SecurityConfig,
}

impl<S: CredentialStore> AuthService<S> {
    /// Create a service with production cost parameters and no pepper.
    pub fn new(store: S) -> Self {
        Self::with_config(store, SecurityConfig::default())
    }

    /// Create a service with explicit cost parameters.
    pub fn with_config(store: S, config: SecurityConfig) -> Self {
        Self {
            store,
            hasher: CredentialHasher::new(config.clone()),
            config,
        }
    }

    /// Create a service that folds a pepper into every password hash.
    pub fn with_pepper(store: S, config: SecurityConfig, pepper: SecretString) -> Self {
        Self {
            store,
            hasher: CredentialHasher::with_pepper(config.clone(), pepper),
            config,
        }
    }

    /// Register a new user and return their unlocked session.
    ///
    /// Generates a fresh data key, wraps it under a key derived from the
    /// password, and persists the credential record in one atomic insert.
    ///
    /// # Errors
    ///
    /// Returns `HubError::InvalidInput` for an unusable username or
    /// password, and `HubError::DuplicateUsername` if the name is taken.
    pub fn register(&self, username: &str, password: &str) -> Result<Session> {
        validate_username(username)?;
        validate_password(password)?;

        // Cheap existence check before paying for key derivation. The
        // store's transactional insert below remains the authority.
        if self.store.fetch(username)?.is_some() {
            return Err(HubError::DuplicateUsername);
        }

        let data_key = DataKey::generate()?;
        let kdf_salt = generate_kdf_salt()?;
        let wrapping_key = derive_wrapping_key(password, &kdf_salt, self.config.kdf_iterations)?;
        let wrapped_key = wrap_data_key(&data_key, &wrapping_key)?;

        let hashed = self.hasher.hash(password)?;
        let envelope = KeyEnvelope {
            kdf_salt,
            wrapped_key,
        };

        self.store.insert(&NewCredentialRecord {
            username: username.to_string(),
            verifier: hashed.verifier,
            verifier_salt: hashed.salt,
            key_envelope: envelope.to_bytes(),
        })?;

        info!(username = %username, "created new user");

        Ok(Session {
            username: username.to_string(),
            data_key,
            consent_unlock: false,
        })
    }

    /// Authenticate a user and unlock their session.
    ///
    /// # Errors
    ///
    /// Returns `HubError::UserNotFound` for an unknown username and
    /// `HubError::InvalidCredentials` for a wrong password. Both display
    /// the same message, so callers can surface either directly without
    /// confirming which usernames exist. A record whose key envelope no
    /// longer unwraps yields `HubError::DecryptionFailed`.
    pub fn authenticate(&self, username: &str, password: &str) -> Result<Session> {
        let Some(record) = self.store.fetch(username)? else {
            warn!(username = %username, "failed login attempt");
            return Err(HubError::UserNotFound);
        };

        if !self
            .hasher
            .verify(&record.verifier, &record.verifier_salt, password)?
        {
            warn!(username = %username, "failed login attempt");
            return Err(HubError::InvalidCredentials);
        }

        let envelope = KeyEnvelope::from_bytes(&record.key_envelope)?;
        let wrapping_key =
            derive_wrapping_key(password, &envelope.kdf_salt, self.config.kdf_iterations)?;
        let data_key = unwrap_data_key(&envelope.wrapped_key, &wrapping_key)?;

        debug!(username = %username, "session unlocked");

        Ok(Session {
            username: record.username,
            data_key,
            consent_unlock: record.consent_unlock,
        })
    }

    /// Change a user's password.
    ///
    /// The data key is rewrapped under the new password, so every payload
    /// encrypted before the rotation stays decryptable. Verifier, salts,
    /// and envelope are replaced in one atomic write; a failure partway
    /// leaves the old credentials fully in effect.
    ///
    /// # Errors
    ///
    /// Returns `HubError::InvalidCredentials` if `current_password` is
    /// wrong and `HubError::InvalidInput` if the new password is unusable.
    pub fn rotate_password(
        &self,
        username: &str,
        current_password: &str,
        new_password: &str,
    ) -> Result<()> {
        validate_password(new_password)?;

        let Some(record) = self.store.fetch(username)? else {
            warn!(username = %username, "failed password rotation");
            return Err(HubError::UserNotFound);
        };

        if !self
            .hasher
            .verify(&record.verifier, &record.verifier_salt, current_password)?
        {
            warn!(username = %username, "failed password rotation");
            return Err(HubError::InvalidCredentials);
        }

        let envelope = KeyEnvelope::from_bytes(&record.key_envelope)?;
        let old_wrapping_key =
            derive_wrapping_key(current_password, &envelope.kdf_salt, self.config.kdf_iterations)?;

        let new_kdf_salt = generate_kdf_salt()?;
        let new_wrapping_key =
            derive_wrapping_key(new_password, &new_kdf_salt, self.config.kdf_iterations)?;
        let rewrapped = rewrap(&envelope.wrapped_key, &old_wrapping_key, &new_wrapping_key)?;

        let hashed = self.hasher.hash(new_password)?;
        let new_envelope = KeyEnvelope {
            kdf_salt: new_kdf_salt,
            wrapped_key: rewrapped,
        };

        self.store.replace_credentials(&NewCredentialRecord {
            username: username.to_string(),
            verifier: hashed.verifier,
            verifier_salt: hashed.salt,
            key_envelope: new_envelope.to_bytes(),
        })?;

        info!(username = %username, "password rotated");

        Ok(())
    }

    /// Record whether the user wants platform-assisted unlock.
    ///
    /// The flag is advisory UI state. It grants no access by itself and
    /// changes nothing about how keys are derived.
    pub fn set_consent_unlock(&self, username: &str, enabled: bool) -> Result<()> {
        self.store.set_consent_unlock(username, enabled)?;
        info!(username = %username, enabled, "consent unlock updated");
        Ok(())
    }
}

/// An unlocked session: the authenticated username plus the live data key.
///
/// Sessions are the only way to reach the data key. Dropping (or
/// explicitly locking) a session zeroizes the key, returning the user to
/// the locked state.
pub struct Session {
    username: String,
    data_key: DataKey,
    consent_unlock: bool,
}

impl Session {
    /// The authenticated username.
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Whether the user opted in to platform-assisted unlock.
    pub fn consent_unlock(&self) -> bool {
        self.consent_unlock
    }

    /// Encrypt a payload under this session's data key.
    pub fn encrypt_payload(&self, plaintext: &[u8]) -> Result<Vec<u8>> {
        encrypt_payload(&self.data_key, plaintext)
    }

    /// Decrypt a payload encrypted under this session's data key.
    ///
    /// # Errors
    ///
    /// Returns `HubError::DecryptionFailed` if the blob was tampered with
    /// or belongs to a different user's key.
    pub fn decrypt_payload(&self, blob: &[u8]) -> Result<Vec<u8>> {
        decrypt_payload(&self.data_key, blob)
    }

    /// Lock the session, zeroizing the data key.
    ///
    /// Dropping the session has the same effect; this method just makes
    /// the intent explicit at call sites.
    pub fn lock(self) {
        drop(self);
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("username", &self.username)
            .field("data_key", &"[REDACTED]")
            .field("consent_unlock", &self.consent_unlock)
            .finish()
    }
}
