//! Platform consent prompts for convenience unlock.
//!
//! Some platforms can show a biometric or PIN prompt (for example Windows
//! Hello) before the app re-unlocks a remembered session. The prompt is
//! advisory: it gates UI convenience only and plays no part in key
//! derivation, so a platform without one loses nothing cryptographically.

/// A platform facility that can ask the user to confirm their presence.
pub trait ConsentVerifier: Send + Sync {
    /// Whether the facility is usable on this machine right now.
    fn is_available(&self) -> bool;

    /// Prompt the user, returning `true` only on explicit approval.
    ///
    /// Implementations must treat cancellation, timeout, or any platform
    /// error as a refusal.
    fn request_consent(&self, reason: &str) -> bool;
}

/// The always-unavailable verifier for platforms without a consent prompt.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsentUnavailable;

impl ConsentVerifier for ConsentUnavailable {
    fn is_available(&self) -> bool {
        false
    }

    fn request_consent(&self, _reason: &str) -> bool {
        false
    }
}
