//! Signed, time-bounded session tokens.
//!
//! A token is `base64url(claims JSON) . base64url(HMAC-SHA256 tag)`.
//! The MAC key is derived from the operator-supplied server secret via
//! HKDF-SHA256, so secrets of any length are acceptable input.  Tokens
//! are stateless: nothing is persisted server-side, the claims carry
//! everything.
//!
//! Verification rejects forged, malformed, and expired tokens through
//! the single `AuthFailure` error, so callers cannot tell which condition
//! occurred.

use base64::engine::general_purpose::URL_SAFE_NO_PAD as BASE64URL;
use base64::Engine;
use chrono::Utc;
use hkdf::Hkdf;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use uuid::Uuid;
use zeroize::Zeroize;

use crate::errors::{Result, VaultError};

type HmacSha256 = Hmac<Sha256>;

/// Length of the derived MAC key (256 bits).
const MAC_KEY_LEN: usize = 32;

/// The claim set embedded in every session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// The authenticated user's id.
    pub sub: Uuid,
    pub email: String,
    /// Issuance time (unix seconds).
    pub iat: i64,
    /// Expiry time (unix seconds).
    pub exp: i64,
}

/// Issues and verifies session tokens under one server secret.
pub struct TokenSigner {
    mac_key: [u8; MAC_KEY_LEN],
    ttl_secs: u64,
}

impl Drop for TokenSigner {
    fn drop(&mut self) {
        self.mac_key.zeroize();
    }
}

impl TokenSigner {
    /// Build a signer from the server secret and a token lifetime.
    ///
    /// The secret must be non-empty; HKDF stretches it to a uniform
    /// 32-byte MAC key.
    pub fn new(server_secret: &[u8], ttl_secs: u64) -> Result<Self> {
        if server_secret.is_empty() {
            return Err(VaultError::PreconditionViolation(
                "server secret must not be empty".into(),
            ));
        }

        let hk = Hkdf::<Sha256>::new(None, server_secret);
        let mut mac_key = [0u8; MAC_KEY_LEN];
        hk.expand(b"zerovault-session-token", &mut mac_key)
            .map_err(|e| VaultError::KeyDerivationFailed(format!("HKDF expand failed: {e}")))?;

        Ok(Self { mac_key, ttl_secs })
    }

    /// Sign a claim set for the given user, valid from now until
    /// now + ttl.
    pub fn issue(&self, user_id: Uuid, email: &str) -> Result<String> {
        let iat = Utc::now().timestamp();
        let claims = Claims {
            sub: user_id,
            email: email.to_string(),
            iat,
            exp: iat + self.ttl_secs as i64,
        };

        let payload = serde_json::to_vec(&claims)
            .map_err(|e| VaultError::SerializationError(format!("claims: {e}")))?;
        let encoded_payload = BASE64URL.encode(&payload);

        let tag = self.mac(encoded_payload.as_bytes())?;
        Ok(format!("{encoded_payload}.{}", BASE64URL.encode(tag)))
    }

    /// Check signature and expiry, returning the claims on success.
    ///
    /// Every rejection is the same `AuthFailure`: a forged token and an
    /// expired one are indistinguishable to the caller.
    pub fn verify(&self, token: &str) -> Result<Claims> {
        let (encoded_payload, encoded_tag) =
            token.split_once('.').ok_or(VaultError::AuthFailure)?;

        let tag = BASE64URL
            .decode(encoded_tag)
            .map_err(|_| VaultError::AuthFailure)?;

        // Constant-time MAC verification before the payload is trusted.
        let mut mac = HmacSha256::new_from_slice(&self.mac_key)
            .map_err(|_| VaultError::AuthFailure)?;
        mac.update(encoded_payload.as_bytes());
        mac.verify_slice(&tag).map_err(|_| VaultError::AuthFailure)?;

        let payload = BASE64URL
            .decode(encoded_payload)
            .map_err(|_| VaultError::AuthFailure)?;
        let claims: Claims =
            serde_json::from_slice(&payload).map_err(|_| VaultError::AuthFailure)?;

        if Utc::now().timestamp() >= claims.exp {
            return Err(VaultError::AuthFailure);
        }

        Ok(claims)
    }

    fn mac(&self, data: &[u8]) -> Result<Vec<u8>> {
        let mut mac = HmacSha256::new_from_slice(&self.mac_key)
            .map_err(|e| VaultError::KeyDerivationFailed(format!("invalid MAC key: {e}")))?;
        mac.update(data);
        Ok(mac.finalize().into_bytes().to_vec())
    }
}
