//! Envelope encryption with ChaCha20-Poly1305.
//!
//! Each user owns one random data-encryption key (DEK). Payloads are
//! encrypted under the DEK; the DEK itself is stored only wrapped under a
//! password-derived wrapping key. Changing the password rewraps the DEK
//! and leaves every stored payload untouched.
//!
//! Sealed blobs are laid out as `nonce (12) || ciphertext+tag (16)`. The
//! persisted key envelope prepends the KDF salt: `kdf_salt (16) || blob`.

use chacha20poly1305::aead::{Aead, KeyInit};
use chacha20poly1305::{ChaCha20Poly1305, Nonce};
use rand::rngs::OsRng;
use rand::RngCore;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::crypto::kdf::{WrappingKey, KDF_SALT_LEN};
use crate::error::{HubError, Result};

/// Length of the data-encryption key in bytes.
pub const DATA_KEY_LEN: usize = 32;

/// Length of the ChaCha20-Poly1305 nonce in bytes.
const NONCE_LEN: usize = 12;

/// Length of the Poly1305 authentication tag in bytes.
const TAG_LEN: usize = 16;

/// The per-user data-encryption key.
///
/// Generated once at registration from the system CSPRNG and never
/// persisted in the clear. Zeroized on drop.
#[derive(Clone, ZeroizeOnDrop)]
pub struct DataKey {
    /// The raw key bytes (zeroized on drop)
    key: [u8; DATA_KEY_LEN],
}

impl DataKey {
    /// Generate a fresh random data-encryption key.
    pub fn generate() -> Result<Self> {
        let mut key = [0u8; DATA_KEY_LEN];
        OsRng
            .try_fill_bytes(&mut key)
            .map_err(|e| HubError::Crypto(format!("Failed to generate key: {}", e)))?;
        Ok(Self { key })
    }

    /// Create a DataKey from raw bytes.
    pub(crate) fn from_bytes(bytes: [u8; DATA_KEY_LEN]) -> Self {
        Self { key: bytes }
    }

    /// Get a reference to the raw key bytes.
    ///
    /// # Security
    ///
    /// Avoid storing or logging this value. Use only for immediate
    /// encryption operations.
    pub fn as_bytes(&self) -> &[u8; DATA_KEY_LEN] {
        &self.key
    }
}

impl std::fmt::Debug for DataKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataKey")
            .field("key", &"[REDACTED]")
            .finish()
    }
}

/// Encrypt plaintext under a key with a fresh random nonce.
///
/// Returns `nonce || ciphertext+tag`.
fn seal(key: &[u8; DATA_KEY_LEN], plaintext: &[u8]) -> Result<Vec<u8>> {
    let cipher = ChaCha20Poly1305::new_from_slice(key)
        .map_err(|e| HubError::Crypto(format!("Failed to initialize cipher: {}", e)))?;

    // Fresh nonce per seal. Nonce reuse under one key would break the AEAD.
    let mut nonce_bytes = [0u8; NONCE_LEN];
    OsRng
        .try_fill_bytes(&mut nonce_bytes)
        .map_err(|e| HubError::Crypto(format!("Failed to generate nonce: {}", e)))?;

    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&nonce_bytes), plaintext)
        .map_err(|_| HubError::Crypto("Encryption failed".to_string()))?;

    let mut blob = Vec::with_capacity(NONCE_LEN + ciphertext.len());
    blob.extend_from_slice(&nonce_bytes);
    blob.extend_from_slice(&ciphertext);
    Ok(blob)
}

/// Decrypt a sealed blob. Any tampering, truncation, or wrong key yields
/// `HubError::DecryptionFailed` with no further detail.
fn open(key: &[u8; DATA_KEY_LEN], blob: &[u8]) -> Result<Vec<u8>> {
    if blob.len() < NONCE_LEN + TAG_LEN {
        return Err(HubError::DecryptionFailed);
    }

    let (nonce_bytes, ciphertext) = blob.split_at(NONCE_LEN);
    let cipher = ChaCha20Poly1305::new_from_slice(key)
        .map_err(|e| HubError::Crypto(format!("Failed to initialize cipher: {}", e)))?;

    cipher
        .decrypt(Nonce::from_slice(nonce_bytes), ciphertext)
        .map_err(|_| HubError::DecryptionFailed)
}

/// Wrap a data key under a wrapping key.
pub fn wrap_data_key(data_key: &DataKey, wrapping_key: &WrappingKey) -> Result<Vec<u8>> {
    seal(wrapping_key.as_bytes(), data_key.as_bytes())
}

/// Unwrap a data key.
///
/// # Errors
///
/// Returns `HubError::DecryptionFailed` if the wrapping key is wrong or
/// the wrapped blob has been tampered with.
pub fn unwrap_data_key(wrapped: &[u8], wrapping_key: &WrappingKey) -> Result<DataKey> {
    let mut plaintext = open(wrapping_key.as_bytes(), wrapped)?;
    let result = <[u8; DATA_KEY_LEN]>::try_from(plaintext.as_slice())
        .map(DataKey::from_bytes)
        .map_err(|_| HubError::DecryptionFailed);
    plaintext.zeroize();
    result
}

/// Encrypt a payload under the data key.
pub fn encrypt_payload(data_key: &DataKey, plaintext: &[u8]) -> Result<Vec<u8>> {
    seal(data_key.as_bytes(), plaintext)
}

/// Decrypt a payload.
///
/// # Errors
///
/// Returns `HubError::DecryptionFailed` on tampering or a wrong key.
pub fn decrypt_payload(data_key: &DataKey, blob: &[u8]) -> Result<Vec<u8>> {
    open(data_key.as_bytes(), blob)
}

/// Re-wrap a data key under a new wrapping key.
///
/// The data key itself never changes, so existing payload ciphertexts
/// remain decryptable after a password rotation.
pub fn rewrap(wrapped: &[u8], old: &WrappingKey, new: &WrappingKey) -> Result<Vec<u8>> {
    let data_key = unwrap_data_key(wrapped, old)?;
    wrap_data_key(&data_key, new)
}

/// The persisted form of a wrapped data key: the KDF salt followed by the
/// sealed key blob.
///
/// Storing the salt beside the wrapped key keeps unlocking self-contained.
/// Nothing in the envelope is secret on its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyEnvelope {
    /// Salt for deriving the wrapping key from the password
    pub kdf_salt: [u8; KDF_SALT_LEN],

    /// The data key sealed under the wrapping key
    pub wrapped_key: Vec<u8>,
}

impl KeyEnvelope {
    /// Serialize as `kdf_salt || wrapped_key`.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(KDF_SALT_LEN + self.wrapped_key.len());
        bytes.extend_from_slice(&self.kdf_salt);
        bytes.extend_from_slice(&self.wrapped_key);
        bytes
    }

    /// Parse a stored envelope.
    ///
    /// # Errors
    ///
    /// Returns `HubError::DecryptionFailed` if the blob is too short to
    /// contain a salt and a sealed key.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < KDF_SALT_LEN + NONCE_LEN + TAG_LEN {
            return Err(HubError::DecryptionFailed);
        }

        let (salt, wrapped) = bytes.split_at(KDF_SALT_LEN);
        let kdf_salt: [u8; KDF_SALT_LEN] =
            salt.try_into().map_err(|_| HubError::DecryptionFailed)?;

        Ok(Self {
            kdf_salt,
            wrapped_key: wrapped.to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::kdf::derive_wrapping_key;

    fn test_wrapping_key(password: &str) -> WrappingKey {
        let salt = [9u8; KDF_SALT_LEN];
        derive_wrapping_key(password, &salt, 1_000).unwrap()
    }

    #[test]
    fn test_wrap_unwrap_round_trip() {
        let data_key = DataKey::generate().unwrap();
        let wrapping_key = test_wrapping_key("test-password");

        let wrapped = wrap_data_key(&data_key, &wrapping_key).unwrap();
        let unwrapped = unwrap_data_key(&wrapped, &wrapping_key).unwrap();

        assert_eq!(data_key.as_bytes(), unwrapped.as_bytes());
    }

    #[test]
    fn test_unwrap_with_wrong_key_fails() {
        let data_key = DataKey::generate().unwrap();
        let wrapped = wrap_data_key(&data_key, &test_wrapping_key("right-password")).unwrap();

        let result = unwrap_data_key(&wrapped, &test_wrapping_key("wrong-password"));
        assert!(matches!(result, Err(HubError::DecryptionFailed)));
    }

    #[test]
    fn test_payload_round_trip() {
        let data_key = DataKey::generate().unwrap();
        let plaintext = b"What is the capital of France?";

        let blob = encrypt_payload(&data_key, plaintext).unwrap();
        let decrypted = decrypt_payload(&data_key, &blob).unwrap();

        assert_eq!(decrypted, plaintext);
        // Blob carries the nonce and the tag
        assert_eq!(blob.len(), plaintext.len() + NONCE_LEN + TAG_LEN);
    }

    #[test]
    fn test_empty_payload_round_trip() {
        let data_key = DataKey::generate().unwrap();

        let blob = encrypt_payload(&data_key, b"").unwrap();
        let decrypted = decrypt_payload(&data_key, &blob).unwrap();

        assert!(decrypted.is_empty());
    }

    #[test]
    fn test_tampered_payload_fails() {
        let data_key = DataKey::generate().unwrap();
        let mut blob = encrypt_payload(&data_key, b"do not tamper").unwrap();

        blob[NONCE_LEN] ^= 0x01;

        let result = decrypt_payload(&data_key, &blob);
        assert!(matches!(result, Err(HubError::DecryptionFailed)));
    }

    #[test]
    fn test_truncated_blob_fails() {
        let data_key = DataKey::generate().unwrap();

        let result = decrypt_payload(&data_key, &[0u8; NONCE_LEN + TAG_LEN - 1]);
        assert!(matches!(result, Err(HubError::DecryptionFailed)));
    }

    #[test]
    fn test_wraps_are_randomized() {
        let data_key = DataKey::generate().unwrap();
        let wrapping_key = test_wrapping_key("test-password");

        let first = wrap_data_key(&data_key, &wrapping_key).unwrap();
        let second = wrap_data_key(&data_key, &wrapping_key).unwrap();

        // Fresh nonce per wrap
        assert_ne!(first, second);
    }

    #[test]
    fn test_rewrap_preserves_data_key() {
        let data_key = DataKey::generate().unwrap();
        let old_key = test_wrapping_key("old-password");
        let new_key = test_wrapping_key("new-password");

        let wrapped = wrap_data_key(&data_key, &old_key).unwrap();
        let rewrapped = rewrap(&wrapped, &old_key, &new_key).unwrap();

        // Same data key under the new wrapping key
        let unwrapped = unwrap_data_key(&rewrapped, &new_key).unwrap();
        assert_eq!(data_key.as_bytes(), unwrapped.as_bytes());

        // Old wrapping key no longer opens the rewrapped blob
        let result = unwrap_data_key(&rewrapped, &old_key);
        assert!(matches!(result, Err(HubError::DecryptionFailed)));
    }

    #[test]
    fn test_envelope_round_trip() {
        let data_key = DataKey::generate().unwrap();
        let wrapping_key = test_wrapping_key("test-password");

        let envelope = KeyEnvelope {
            kdf_salt: [5u8; KDF_SALT_LEN],
            wrapped_key: wrap_data_key(&data_key, &wrapping_key).unwrap(),
        };

        let bytes = envelope.to_bytes();
        assert_eq!(&bytes[..KDF_SALT_LEN], &envelope.kdf_salt);

        let parsed = KeyEnvelope::from_bytes(&bytes).unwrap();
        assert_eq!(parsed, envelope);
    }

    #[test]
    fn test_envelope_too_short_rejected() {
        let result = KeyEnvelope::from_bytes(&[0u8; KDF_SALT_LEN]);
        assert!(matches!(result, Err(HubError::DecryptionFailed)));
    }

    #[test]
    fn test_data_key_debug_redacts() {
        let data_key = DataKey::generate().unwrap();

        let debug_output = format!("{:?}", data_key);
        assert!(debug_output.contains("REDACTED"));

        let key_hex = hex::encode(&data_key.as_bytes()[..4]);
        assert!(!debug_output.contains(&key_hex));
    }
}
