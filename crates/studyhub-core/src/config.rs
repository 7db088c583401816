//! Security cost parameters for hashing and key derivation.
//!
//! One `SecurityConfig` drives both password-facing primitives: the
//! Argon2id credential hasher and the PBKDF2 wrapping-key derivation.
//! Costs are configuration, never user input, so derivation cost stays
//! predictable and cannot be downgraded by a tampered record.

use argon2::Params;

use crate::error::{HubError, Result};

/// Cost parameters for the credential hasher and the wrapping-key KDF.
///
/// The defaults are the production values; they make a single hash or
/// derivation take tens to hundreds of milliseconds on commodity hardware.
/// That latency is the defense against offline guessing -- callers on a UI
/// thread should dispatch to a background worker rather than lower the costs.
/// Tests construct cheaper configs inline.
#[derive(Debug, Clone)]
pub struct SecurityConfig {
    /// Argon2id iteration count (time cost)
    pub hash_time_cost: u32,

    /// Argon2id memory cost in KiB
    pub hash_memory_kib: u32,

    /// Argon2id lane count (parallelism)
    pub hash_parallelism: u32,

    /// Length of the Argon2id output in bytes
    pub hash_output_len: usize,

    /// Length of the random per-user verifier salt in bytes (minimum 16)
    pub verifier_salt_len: usize,

    /// PBKDF2-HMAC-SHA256 iteration count for wrapping-key derivation
    pub kdf_iterations: u32,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            hash_time_cost: 3,
            hash_memory_kib: 32 * 1024,
            hash_parallelism: 2,
            hash_output_len: 32,
            verifier_salt_len: 16,
            kdf_iterations: 390_000,
        }
    }
}

impl SecurityConfig {
    /// Convert the Argon2id costs into validated `argon2::Params`.
    ///
    /// # Errors
    ///
    /// Returns `HubError::InvalidInput` if the costs are outside the ranges
    /// the algorithm accepts (for example zero memory or a too-short output).
    pub fn argon2_params(&self) -> Result<Params> {
        Params::new(
            self.hash_memory_kib,
            self.hash_time_cost,
            self.hash_parallelism,
            Some(self.hash_output_len),
        )
        .map_err(|e| HubError::InvalidInput(format!("Invalid Argon2 parameters: {}", e)))
    }
}
