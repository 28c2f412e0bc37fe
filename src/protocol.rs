//! Tagged wire records for every protocol operation.
//!
//! One explicit request/response pair per operation, serialized as
//! camelCase JSON to match the HTTP surface.  Inbound records are
//! validated here, at the boundary, before anything reaches the core:
//! a record that passes `validate` carries a well-formed email and
//! decodable fixed-length salts.
//!
//! Salts and ciphertexts travel as base64 strings; the server stores
//! ciphertext strings verbatim and never decodes them.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::crypto::kdf::SALT_LEN;
use crate::errors::{Result, VaultError};

/// Upper bound on email length (RFC 5321 path limit).
const MAX_EMAIL_LEN: usize = 254;

// ---------------------------------------------------------------------------
// Salt exchange
// ---------------------------------------------------------------------------

/// Step 1 of login: the client asks for the salts bound to an email.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetSaltsRequest {
    pub email: String,
}

impl GetSaltsRequest {
    pub fn validate(&self) -> Result<()> {
        validate_email(&self.email)
    }
}

/// The per-user salt pair.  Returned for every email; unknown accounts
/// get decoy salts of identical shape, so this response never reveals
/// whether the account exists.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaltsResponse {
    pub master_password_salt: String,
    pub encryption_key_salt: String,
}

impl SaltsResponse {
    /// Build a response from raw salt bytes.
    pub fn from_bytes(master_password_salt: &[u8], encryption_key_salt: &[u8]) -> Self {
        Self {
            master_password_salt: BASE64.encode(master_password_salt),
            encryption_key_salt: BASE64.encode(encryption_key_salt),
        }
    }

    /// Decode the master-password salt back to fixed-length bytes.
    pub fn master_password_salt_bytes(&self) -> Result<[u8; SALT_LEN]> {
        decode_salt(&self.master_password_salt)
    }

    /// Decode the encryption-key salt back to fixed-length bytes.
    pub fn encryption_key_salt_bytes(&self) -> Result<[u8; SALT_LEN]> {
        decode_salt(&self.encryption_key_salt)
    }
}

// ---------------------------------------------------------------------------
// Registration
// ---------------------------------------------------------------------------

/// One atomic registration: identity, verifier, both salts, and any
/// pre-encrypted initial items.  Either all of it commits or none.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    /// The client-derived verifier.  The server never sees the password.
    pub master_password_hash: String,
    pub master_password_salt: String,
    pub encryption_key_salt: String,
    /// Items encrypted client-side before the account exists.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub initial_items: Vec<CreateItemRequest>,
}

impl RegisterRequest {
    pub fn validate(&self) -> Result<()> {
        validate_email(&self.email)?;
        if self.master_password_hash.is_empty() {
            return Err(VaultError::PreconditionViolation(
                "masterPasswordHash must not be empty".into(),
            ));
        }
        decode_salt(&self.master_password_salt)?;
        decode_salt(&self.encryption_key_salt)?;
        for item in &self.initial_items {
            item.validate()?;
        }
        Ok(())
    }

    /// Decode the master-password salt back to fixed-length bytes.
    pub fn master_password_salt_bytes(&self) -> Result<[u8; SALT_LEN]> {
        decode_salt(&self.master_password_salt)
    }

    /// Decode the encryption-key salt back to fixed-length bytes.
    pub fn encryption_key_salt_bytes(&self) -> Result<[u8; SALT_LEN]> {
        decode_salt(&self.encryption_key_salt)
    }
}

/// The created identity record.  No verifier or salt is echoed back.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub id: Uuid,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Login
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub master_password_hash: String,
}

impl LoginRequest {
    pub fn validate(&self) -> Result<()> {
        validate_email(&self.email)?;
        if self.master_password_hash.is_empty() {
            return Err(VaultError::PreconditionViolation(
                "masterPasswordHash must not be empty".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub access_token: String,
}

// ---------------------------------------------------------------------------
// Vault items
// ---------------------------------------------------------------------------

/// An opaque, client-encrypted blob to persist.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateItemRequest {
    pub encrypted_data: String,
}

impl CreateItemRequest {
    pub fn validate(&self) -> Result<()> {
        if self.encrypted_data.is_empty() {
            return Err(VaultError::PreconditionViolation(
                "encryptedData must not be empty".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkCreateRequest {
    pub items: Vec<CreateItemRequest>,
}

/// Outcome of one item within a bulk create.
///
/// Bulk creation is not atomic across items, so the response lists each
/// item's fate instead of a single opaque count, so callers can reconcile
/// partial failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkItemResult {
    pub index: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkCreateResponse {
    /// How many items actually persisted.
    pub created: usize,
    pub results: Vec<BulkItemResult>,
}

/// A stored vault item as returned to its owner.  `encrypted_data` is
/// the exact string the client submitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VaultItemRecord {
    pub id: Uuid,
    pub encrypted_data: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Validation helpers
// ---------------------------------------------------------------------------

/// Minimal structural email check: something@something, sane length.
///
/// Deliverability is not this layer's problem; this only rejects inputs
/// that cannot possibly be an address.
pub fn validate_email(email: &str) -> Result<()> {
    if email.is_empty() {
        return Err(VaultError::PreconditionViolation(
            "email must not be empty".into(),
        ));
    }
    if email.len() > MAX_EMAIL_LEN {
        return Err(VaultError::PreconditionViolation(format!(
            "email cannot exceed {MAX_EMAIL_LEN} characters"
        )));
    }
    let Some(at) = email.find('@') else {
        return Err(VaultError::PreconditionViolation(
            "email must contain '@'".into(),
        ));
    };
    if at == 0 || at == email.len() - 1 {
        return Err(VaultError::PreconditionViolation(
            "email must have text on both sides of '@'".into(),
        ));
    }
    Ok(())
}

/// Decode a base64 salt string and check it is exactly `SALT_LEN` bytes.
pub fn decode_salt(encoded: &str) -> Result<[u8; SALT_LEN]> {
    let bytes = BASE64
        .decode(encoded)
        .map_err(|e| VaultError::PreconditionViolation(format!("salt is not valid base64: {e}")))?;
    bytes.as_slice().try_into().map_err(|_| {
        VaultError::PreconditionViolation(format!(
            "salt must be exactly {SALT_LEN} bytes (got {})",
            bytes.len()
        ))
    })
}
