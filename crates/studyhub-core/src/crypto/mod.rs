//! Cryptographic operations for Study Hub.
//!
//! This module provides credential hashing, key derivation, and envelope
//! encryption using well-audited libraries:
//! - **Argon2id**: Memory-hard password verifiers
//! - **PBKDF2-HMAC-SHA256**: Wrapping-key derivation
//! - **ChaCha20-Poly1305**: Authenticated encryption for keys and payloads
//!
//! ## Security Model
//!
//! - The password verifier authenticates only; it never derives key material
//! - The verifier salt and the KDF salt are independent random values
//! - The data-encryption key is random, stored only wrapped, and survives
//!   password changes via rewrapping
//! - Key material is zeroized from memory on drop
//! - No plaintext passwords stored
//!
//! ## Threat Model
//!
//! We defend against:
//! - Theft of the credential store and encrypted payloads at rest
//! - Offline brute-force attacks on the password
//!
//! We do NOT defend against:
//! - Compromised OS / keylogger
//! - Access to an unlocked session / memory

pub mod envelope;
pub mod hasher;
pub mod kdf;
pub mod password;

pub use envelope::{
    decrypt_payload, encrypt_payload, rewrap, unwrap_data_key, wrap_data_key, DataKey,
    KeyEnvelope, DATA_KEY_LEN,
};
pub use hasher::{CredentialHasher, HashedPassword};
pub use kdf::{derive_wrapping_key, generate_kdf_salt, WrappingKey, KDF_SALT_LEN};
pub use password::{validate_password, validate_username};
