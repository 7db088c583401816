//! Credential hashing using Argon2id.
//!
//! Produces and checks PHC-format password verifiers. A verifier gates
//! authentication only. It is never used to derive encryption keys, so a
//! stolen credential table yields nothing that decrypts user data.

use argon2::password_hash::{Output, PasswordHash, PasswordHasher, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};
use rand::rngs::OsRng;
use rand::RngCore;
use secrecy::{ExposeSecret, SecretString};
use subtle::ConstantTimeEq;

use crate::config::SecurityConfig;
use crate::error::{HubError, Result};

/// Minimum verifier salt length in bytes.
const MIN_SALT_LENGTH: usize = 16;

/// A freshly hashed password: the PHC verifier string plus the raw salt
/// that was folded into it.
///
/// Both parts are stored with the credential record. The salt is kept as a
/// separate column so verification recomputes against stored bytes rather
/// than trusting whatever a (possibly tampered) verifier string embeds.
#[derive(Debug, Clone)]
pub struct HashedPassword {
    /// PHC-format Argon2id verifier, including algorithm and cost parameters
    pub verifier: String,

    /// The random salt used for this verifier
    pub salt: Vec<u8>,
}

/// Hashes and verifies passwords with Argon2id.
///
/// Costs come from [`SecurityConfig`]. An optional pepper (a secret held
/// outside the credential store) can be folded into every hash; verifiers
/// produced with a pepper only verify on a hasher holding the same pepper.
pub struct CredentialHasher {
    config: SecurityConfig,
    pepper: Option<SecretString>,
}

impl CredentialHasher {
    /// Create a hasher with the given cost parameters and no pepper.
    pub fn new(config: SecurityConfig) -> Self {
        Self {
            config,
            pepper: None,
        }
    }

    /// Create a hasher that folds a pepper into every hash.
    ///
    /// # Security
    ///
    /// The pepper must be stored outside the credential database (for
    /// example in an OS keychain). Losing it invalidates every verifier
    /// produced with it.
    pub fn with_pepper(config: SecurityConfig, pepper: SecretString) -> Self {
        Self {
            config,
            pepper: Some(pepper),
        }
    }

    /// Hash a password with a fresh random salt.
    ///
    /// # Returns
    ///
    /// Returns the PHC verifier string and the raw salt bytes.
    ///
    /// # Errors
    ///
    /// Returns `HubError::ResourceExhaustion` if the hash cannot be computed
    /// (for example the memory cost cannot be allocated), and
    /// `HubError::Crypto` if the system random source fails.
    pub fn hash(&self, password: &str) -> Result<HashedPassword> {
        if self.config.verifier_salt_len < MIN_SALT_LENGTH {
            return Err(HubError::InvalidInput(format!(
                "Verifier salt must be at least {} bytes",
                MIN_SALT_LENGTH
            )));
        }

        let mut salt = vec![0u8; self.config.verifier_salt_len];
        OsRng
            .try_fill_bytes(&mut salt)
            .map_err(|e| HubError::Crypto(format!("Failed to generate salt: {}", e)))?;

        let salt_string = SaltString::encode_b64(&salt)
            .map_err(|e| HubError::Crypto(format!("Failed to encode salt: {}", e)))?;

        let params = self.config.argon2_params()?;
        let verifier = self
            .argon2(params)?
            .hash_password(password.as_bytes(), salt_string.as_salt())
            .map_err(|e| HubError::ResourceExhaustion(format!("Password hashing failed: {}", e)))?
            .to_string();

        Ok(HashedPassword { verifier, salt })
    }

    /// Check a candidate password against a stored verifier and salt.
    ///
    /// The candidate is re-hashed with the algorithm, version, and costs
    /// recorded in the verifier string but with the separately stored salt,
    /// then compared to the stored output in constant time.
    ///
    /// # Returns
    ///
    /// Returns `Ok(true)` on a match and `Ok(false)` on any mismatch,
    /// including an unparseable or truncated verifier. Malformed verifiers
    /// fail closed but still pay for a full-cost dummy hash, so a corrupted
    /// record is not distinguishable from a wrong password by timing.
    ///
    /// # Errors
    ///
    /// Returns `HubError::ResourceExhaustion` only if the hash itself cannot
    /// be computed. Mismatches are never errors.
    pub fn verify(&self, verifier: &str, salt: &[u8], candidate: &str) -> Result<bool> {
        let Some((algorithm, version, params, expected)) = parse_verifier(verifier) else {
            self.burn(candidate)?;
            return Ok(false);
        };

        let salt_string = match SaltString::encode_b64(salt) {
            Ok(s) => s,
            Err(_) => {
                self.burn(candidate)?;
                return Ok(false);
            }
        };

        let computed = self
            .argon2(params.clone())?
            .hash_password_customized(
                candidate.as_bytes(),
                Some(algorithm.ident()),
                version.map(u32::from),
                params,
                salt_string.as_salt(),
            )
            .map_err(|e| HubError::ResourceExhaustion(format!("Password hashing failed: {}", e)))?;

        let Some(actual) = computed.hash else {
            return Ok(false);
        };

        Ok(actual.as_bytes().ct_eq(expected.as_bytes()).into())
    }

    /// Build an Argon2id instance, folding in the pepper when one is set.
    fn argon2(&self, params: Params) -> Result<Argon2<'_>> {
        match &self.pepper {
            Some(pepper) => Argon2::new_with_secret(
                pepper.expose_secret().as_bytes(),
                Algorithm::Argon2id,
                Version::V0x13,
                params,
            )
            .map_err(|e| HubError::Crypto(format!("Failed to initialize hasher: {}", e))),
            None => Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params)),
        }
    }

    /// Hash the candidate against a fixed salt and discard the result.
    ///
    /// Keeps the rejected-before-hashing paths as slow as a real mismatch.
    fn burn(&self, candidate: &str) -> Result<()> {
        const DUMMY_SALT: [u8; MIN_SALT_LENGTH] = [0x42; MIN_SALT_LENGTH];

        let salt_string = SaltString::encode_b64(&DUMMY_SALT)
            .map_err(|e| HubError::Crypto(format!("Failed to encode salt: {}", e)))?;
        let params = self.config.argon2_params()?;
        self.argon2(params)?
            .hash_password(candidate.as_bytes(), salt_string.as_salt())
            .map_err(|e| HubError::ResourceExhaustion(format!("Password hashing failed: {}", e)))?;
        Ok(())
    }
}

impl std::fmt::Debug for CredentialHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialHasher")
            .field("config", &self.config)
            .field("pepper", &self.pepper.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// Decode the algorithm, version, costs, and expected output from a stored
/// verifier string. Returns `None` on any malformation.
fn parse_verifier(verifier: &str) -> Option<(Algorithm, Option<Version>, Params, Output)> {
    let parsed = PasswordHash::new(verifier).ok()?;
    let algorithm = Algorithm::try_from(parsed.algorithm).ok()?;
    let version = match parsed.version {
        Some(v) => Some(Version::try_from(v).ok()?),
        None => None,
    };
    let params = Params::try_from(&parsed).ok()?;
    let expected = parsed.hash?;
    Some((algorithm, version, params, expected))
}
