//! Secret key material and the password verifier.
//!
//! Two independent Argon2id derivations happen per user:
//!
//! - (password, master_password_salt) -> [`MasterSecret`], from which
//!   the [`PasswordVerifier`] sent to the server is computed.
//! - (password, encryption_key_salt)  -> [`VaultKey`], which never
//!   leaves the client and encrypts every vault item.
//!
//! Compromise of the server-stored verifier therefore yields nothing
//! usable against the vault ciphertexts.  Both wrappers zero their
//! memory on drop and implement no serde traits, so they cannot end up
//! in a wire record by accident.

use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use zeroize::Zeroize;

use super::kdf::{self, Argon2Params, KEY_LEN};
use crate::errors::Result;

/// The secret derived from (password, master_password_salt).
///
/// Ephemeral, client-memory only.  Its sole purpose is to produce the
/// verifier; it is never transmitted or serialized.
#[derive(Zeroize)]
#[zeroize(drop)]
pub struct MasterSecret {
    bytes: [u8; KEY_LEN],
}

impl MasterSecret {
    /// Derive the master secret from a password and the user's
    /// master-password salt.
    pub fn derive(password: &[u8], salt: &[u8], params: &Argon2Params) -> Result<Self> {
        Ok(Self {
            bytes: kdf::derive(password, salt, params)?,
        })
    }

    /// Compute the one-way verifier that substitutes for the password
    /// on the wire.  SHA-256 over the secret bytes: the server can
    /// store and compare it, but cannot recover the master secret.
    pub fn verifier(&self) -> PasswordVerifier {
        let digest = Sha256::digest(self.bytes);
        PasswordVerifier(hex_encode(&digest))
    }
}

/// The secret derived from (password, encryption_key_salt).
///
/// Retained client-side for the lifetime of a session and handed to the
/// envelope cipher for every item operation.  Never sent to the server.
#[derive(Zeroize)]
#[zeroize(drop)]
pub struct VaultKey {
    bytes: [u8; KEY_LEN],
}

impl VaultKey {
    /// Derive the vault key from a password and the user's
    /// encryption-key salt.
    pub fn derive(password: &[u8], salt: &[u8], params: &Argon2Params) -> Result<Self> {
        Ok(Self {
            bytes: kdf::derive(password, salt, params)?,
        })
    }

    /// Access the raw key bytes (to pass to the envelope cipher).
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.bytes
    }
}

/// The hex-encoded one-way value transmitted in place of the password.
///
/// Stored server-side and compared byte-for-byte (constant time)
/// against the copy supplied at login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordVerifier(String);

impl PasswordVerifier {
    /// Wrap a verifier received over the wire.
    pub fn from_wire(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// A freshly random verifier of the real shape and length.
    ///
    /// Used to burn a comparison when the looked-up account does not
    /// exist, so the absent arm costs the same as the mismatch arm.
    pub fn decoy() -> Self {
        use rand::RngCore;
        let mut bytes = [0u8; 32];
        rand::rngs::OsRng.fill_bytes(&mut bytes);
        Self(hex_encode(&bytes))
    }

    /// The wire representation.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Constant-time equality against another verifier.
    ///
    /// Length differences short-circuit, which is fine: verifier length
    /// is public (it is fixed by the hash function).
    pub fn ct_eq(&self, other: &PasswordVerifier) -> bool {
        let (a, b) = (self.0.as_bytes(), other.0.as_bytes());
        a.len() == b.len() && bool::from(a.ct_eq(b))
    }
}

fn hex_encode(bytes: &[u8]) -> String {
    use std::fmt::Write;
    let mut out = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        // Writing to a String cannot fail.
        let _ = write!(out, "{b:02x}");
    }
    out
}
