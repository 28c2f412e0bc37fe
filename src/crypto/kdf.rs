//! Password-based key derivation using Argon2id.
//!
//! Argon2id is a memory-hard KDF that protects against brute-force and
//! GPU-based attacks.  Every user has two salts (one for the login
//! verifier, one for the vault encryption key) so the two derivations
//! are fully independent (see `crypto::keys`).
//!
//! Determinism is the whole point: the same (password, salt, params)
//! always yields the same 32 bytes, which is what lets a client log in
//! without ever persisting a key.

use argon2::{Algorithm, Argon2, Params, Version};
use rand::RngCore;

use crate::errors::{Result, VaultError};

/// Length of a per-user salt in bytes (128 bits).
pub const SALT_LEN: usize = 16;

/// Length of the derived key in bytes (256 bits, for AES-256).
pub const KEY_LEN: usize = 32;

/// Minimum safe memory cost in KiB (8 MB).
const MIN_MEMORY_KIB: u32 = 8_192;

/// Configurable Argon2id parameters.
///
/// These map 1:1 to the fields in `Settings` so callers can pass
/// whatever the operator configured in `zerovault.toml`.
#[derive(Debug, Clone, Copy)]
pub struct Argon2Params {
    /// Memory cost in KiB (default: 65 536 = 64 MB).
    pub memory_kib: u32,
    /// Number of iterations (default: 3).
    pub iterations: u32,
    /// Parallelism lanes (default: 4).
    pub parallelism: u32,
}

impl Default for Argon2Params {
    fn default() -> Self {
        Self {
            memory_kib: 65_536,
            iterations: 3,
            parallelism: 4,
        }
    }
}

/// Derive 32 bytes of secret material from a password and salt.
///
/// The same password + salt + params will always produce the same
/// output.  An empty password or a salt of the wrong length is a
/// precondition violation; the derivation never substitutes a default.
/// Enforces minimum Argon2 parameters to prevent dangerously weak KDF
/// settings.
pub fn derive(password: &[u8], salt: &[u8], argon2_params: &Argon2Params) -> Result<[u8; KEY_LEN]> {
    if password.is_empty() {
        return Err(VaultError::PreconditionViolation(
            "password must not be empty".into(),
        ));
    }
    if salt.len() != SALT_LEN {
        return Err(VaultError::PreconditionViolation(format!(
            "salt must be exactly {SALT_LEN} bytes (got {})",
            salt.len()
        )));
    }
    if argon2_params.memory_kib < MIN_MEMORY_KIB {
        return Err(VaultError::KeyDerivationFailed(format!(
            "Argon2 memory_kib must be at least {MIN_MEMORY_KIB} (got {})",
            argon2_params.memory_kib
        )));
    }
    if argon2_params.iterations < 1 {
        return Err(VaultError::KeyDerivationFailed(
            "Argon2 iterations must be at least 1".into(),
        ));
    }
    if argon2_params.parallelism < 1 {
        return Err(VaultError::KeyDerivationFailed(
            "Argon2 parallelism must be at least 1".into(),
        ));
    }

    let params = Params::new(
        argon2_params.memory_kib,
        argon2_params.iterations,
        argon2_params.parallelism,
        Some(KEY_LEN),
    )
    .map_err(|e| VaultError::KeyDerivationFailed(format!("invalid Argon2 params: {e}")))?;

    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    let mut key = [0u8; KEY_LEN];
    argon2
        .hash_password_into(password, salt, &mut key)
        .map_err(|e| VaultError::KeyDerivationFailed(format!("Argon2id hashing failed: {e}")))?;

    Ok(key)
}

/// Derive with the default Argon2id parameters (64 MB, 3 iterations, 4 lanes).
pub fn derive_default(password: &[u8], salt: &[u8]) -> Result<[u8; KEY_LEN]> {
    derive(password, salt, &Argon2Params::default())
}

/// Generate a cryptographically random 16-byte salt.
///
/// Salts are generated once per user at registration and never
/// regenerated, since regeneration would invalidate the user's ability to
/// re-derive their existing vault key.
pub fn generate_salt() -> [u8; SALT_LEN] {
    let mut salt = [0u8; SALT_LEN];
    rand::rngs::OsRng.fill_bytes(&mut salt);
    salt
}
