use thiserror::Error;

/// All errors that can occur in ZeroVault.
///
/// The auth-facing variants are deliberately information-poor: a failed
/// login, a forged token, and a vault access against someone else's item
/// all collapse to generic messages so the error surface cannot be used
/// to probe which accounts or items exist.
#[derive(Debug, Error)]
pub enum VaultError {
    // --- Crypto errors ---
    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("Decryption failed — wrong key or corrupted data")]
    DecryptionFailed,

    #[error("Key derivation failed: {0}")]
    KeyDerivationFailed(String),

    /// A caller-side input was malformed (empty password, wrong-length
    /// salt, bad base64). Local to the client; never sent over the wire.
    #[error("Precondition violation: {0}")]
    PreconditionViolation(String),

    // --- Auth errors ---
    /// Bad credential, unknown account, or invalid/expired token.
    /// One variant for all causes, on purpose.
    #[error("Authentication failed")]
    AuthFailure,

    /// Ownership mismatch or missing resource on a vault operation.
    /// Conflates not-found and forbidden for enumeration resistance.
    #[error("Access to this resource is denied")]
    AccessDenied,

    #[error("An account with this email already exists")]
    Conflict,

    // --- Storage errors ---
    #[error("Storage error: {0}")]
    Storage(String),

    // --- Config errors ---
    #[error("Config file error: {0}")]
    ConfigError(String),

    // --- Serialization errors ---
    #[error("Serialization error: {0}")]
    SerializationError(String),

    // --- IO errors ---
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for ZeroVault results.
pub type Result<T> = std::result::Result<T, VaultError>;
