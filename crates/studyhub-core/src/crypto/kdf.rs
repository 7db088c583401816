//! Wrapping-key derivation using PBKDF2-HMAC-SHA256.
//!
//! The wrapping key is derived from the password with a salt that is
//! independent of the verifier salt, so the stored verifier and the
//! key-wrapping path never share derivation inputs. The key exists only
//! in memory, for the duration of a wrap or unwrap.

use hmac::Hmac;
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::Sha256;
use zeroize::ZeroizeOnDrop;

use crate::error::{HubError, Result};

/// Length of the derived wrapping key in bytes (256-bit ChaCha20 key).
pub const WRAPPING_KEY_LEN: usize = 32;

/// Length of the KDF salt in bytes.
pub const KDF_SALT_LEN: usize = 16;

/// A key derived from the password, used only to wrap and unwrap the
/// data-encryption key.
///
/// Never persisted and never cached across operations. Zeroized on drop.
#[derive(Clone, ZeroizeOnDrop)]
pub struct WrappingKey {
    /// The raw key bytes (zeroized on drop)
    key: [u8; WRAPPING_KEY_LEN],
}

impl WrappingKey {
    /// Create a WrappingKey from raw bytes.
    pub(crate) fn from_bytes(bytes: [u8; WRAPPING_KEY_LEN]) -> Self {
        Self { key: bytes }
    }

    /// Get a reference to the raw key bytes.
    ///
    /// # Security
    ///
    /// Avoid storing or logging this value. Use only for immediate wrap
    /// and unwrap operations.
    pub fn as_bytes(&self) -> &[u8; WRAPPING_KEY_LEN] {
        &self.key
    }
}

impl std::fmt::Debug for WrappingKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WrappingKey")
            .field("key", &"[REDACTED]")
            .finish()
    }
}

/// Derive a wrapping key from a password using PBKDF2-HMAC-SHA256.
///
/// # Arguments
///
/// * `password` - The password to derive from
/// * `salt` - Random salt, independent of the verifier salt
/// * `iterations` - PBKDF2 round count
///
/// # Security
///
/// - Same password + salt always produces the same key (deterministic)
/// - A fresh salt on every password change produces an unrelated key
///
/// # Errors
///
/// Returns `HubError::InvalidInput` if `iterations` is zero.
pub fn derive_wrapping_key(
    password: &str,
    salt: &[u8; KDF_SALT_LEN],
    iterations: u32,
) -> Result<WrappingKey> {
    if iterations == 0 {
        return Err(HubError::InvalidInput(
            "KDF iterations must be non-zero".to_string(),
        ));
    }

    let mut key_bytes = [0u8; WRAPPING_KEY_LEN];
    pbkdf2::pbkdf2::<Hmac<Sha256>>(password.as_bytes(), salt, iterations, &mut key_bytes)
        .map_err(|e| HubError::Crypto(format!("Key derivation failed: {}", e)))?;

    Ok(WrappingKey::from_bytes(key_bytes))
}

/// Generate a fresh random KDF salt.
pub fn generate_kdf_salt() -> Result<[u8; KDF_SALT_LEN]> {
    let mut salt = [0u8; KDF_SALT_LEN];
    OsRng
        .try_fill_bytes(&mut salt)
        .map_err(|e| HubError::Crypto(format!("Failed to generate salt: {}", e)))?;
    Ok(salt)
}
