//! # Study Hub Core
//!
//! Core library for Study Hub - a local-first flashcard app with per-user
//! encrypted storage.
//!
//! This crate provides authentication, envelope encryption, and review
//! scheduling independent of any UI layer.
//!
//! ## Architecture
//!
//! - **crypto**: Credential hashing, key derivation, envelope encryption
//! - **auth**: Registration, login, password rotation, sessions
//! - **store**: Credential record persistence (SQLite)
//! - **scheduler**: SM-2 spaced-repetition scheduling
//! - **consent**: Optional platform consent prompts for convenience unlock
//!
//! ## Security Model
//!
//! Each user owns one random data-encryption key. Payloads are sealed
//! under that key; the key itself is stored only wrapped under a
//! password-derived key. The password verifier and the wrapping key use
//! independent derivations, so the stored verifier can never decrypt
//! anything. See the `crypto` module docs for the threat model.

pub mod auth;
pub mod config;
pub mod consent;
pub mod crypto;
pub mod error;
pub mod scheduler;
pub mod store;

pub use auth::{AuthService, Session};
pub use config::SecurityConfig;
pub use consent::{ConsentUnavailable, ConsentVerifier};
pub use error::{HubError, Result};
pub use scheduler::{next_interval, NextReview, ReviewEntry};
pub use store::{CredentialStore, SqliteCredentialStore};

/// Core version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
