//! Cryptographic primitives for ZeroVault.
//!
//! This module provides:
//! - Argon2id password-based key derivation (`kdf`)
//! - AES-256-GCM envelope encryption for vault items (`envelope`)
//! - Zeroizing secret wrappers and the password verifier (`keys`)

pub mod envelope;
pub mod kdf;
pub mod keys;

// Re-export the most commonly used items so callers can write:
//   use zerovault::crypto::{encrypt, decrypt, generate_salt, ...};
pub use envelope::{decrypt, encrypt, open_from_string, seal_to_string};
pub use kdf::{derive, derive_default, generate_salt, Argon2Params, KEY_LEN, SALT_LEN};
pub use keys::{MasterSecret, PasswordVerifier, VaultKey};
