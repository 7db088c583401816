//! Credential storage for Study Hub.
//!
//! This module defines the `CredentialStore` trait and the record types
//! the authentication service works with.
//!
//! ## Architecture
//!
//! The store is backend-agnostic: the default backend is plain SQLite,
//! and the trait keeps room for platform keychains or remote stores.
//!
//! ## Security
//!
//! Stored rows contain no decryptable secrets. The verifier is a
//! memory-hard hash and the key envelope is sealed under a key the store
//! never sees.

pub mod sqlite;
pub mod traits;
pub mod types;

// Re-export public types
pub use sqlite::SqliteCredentialStore;
pub use traits::CredentialStore;
pub use types::{CredentialRecord, NewCredentialRecord};
