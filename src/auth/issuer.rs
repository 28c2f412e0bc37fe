//! Server-side credential issuance: salt exchange, registration, login.
//!
//! Anti-enumeration is the governing constraint in this module.  Every
//! response an unauthenticated caller can provoke (salts for an
//! unknown email, a login against a missing account, a login with a
//! wrong verifier) has the same shape and comparable cost as the real
//! thing.

use std::sync::Arc;

use crate::crypto::kdf::{generate_salt, SALT_LEN};
use crate::crypto::keys::PasswordVerifier;
use crate::errors::{Result, VaultError};
use crate::protocol::{
    GetSaltsRequest, LoginRequest, LoginResponse, RegisterRequest, SaltsResponse, UserRecord,
};
use crate::storage::{NewUser, Repository};

use super::token::{Claims, TokenSigner};

/// Where a salt pair came from.  Both arms flow through the single
/// [`SaltSource::into_response`] path so they cannot diverge in shape.
enum SaltSource {
    /// The salts stored at registration: same bytes on every call.
    Stored([u8; SALT_LEN], [u8; SALT_LEN]),
    /// Freshly random decoys for an account that does not exist:
    /// different bytes on every call, same generator and length.
    Decoy([u8; SALT_LEN], [u8; SALT_LEN]),
}

impl SaltSource {
    fn into_response(self) -> SaltsResponse {
        let (master_password_salt, encryption_key_salt) = match self {
            SaltSource::Stored(mp, ek) | SaltSource::Decoy(mp, ek) => (mp, ek),
        };
        SaltsResponse::from_bytes(&master_password_salt, &encryption_key_salt)
    }
}

/// The server half of the authentication protocol.
pub struct CredentialIssuer<R: Repository> {
    repo: Arc<R>,
    signer: TokenSigner,
}

impl<R: Repository> CredentialIssuer<R> {
    pub fn new(repo: Arc<R>, signer: TokenSigner) -> Self {
        Self { repo, signer }
    }

    /// Return the salt pair for an email: stored salts for a known
    /// account, fresh decoys otherwise.  Always succeeds for a
    /// well-formed request; the response never reveals which arm ran.
    pub fn get_salts(&self, req: &GetSaltsRequest) -> Result<SaltsResponse> {
        req.validate()?;

        let source = match self.repo.find_user_by_email(&req.email)? {
            Some(user) => SaltSource::Stored(user.master_password_salt, user.encryption_key_salt),
            None => SaltSource::Decoy(generate_salt(), generate_salt()),
        };

        Ok(source.into_response())
    }

    /// Create the account: verifier, both salts, and any pre-encrypted
    /// initial items commit as one unit.  Duplicate email is a
    /// `Conflict`.
    pub fn register(&self, req: &RegisterRequest) -> Result<UserRecord> {
        req.validate()?;

        let new_user = NewUser {
            email: req.email.clone(),
            master_password_hash: req.master_password_hash.clone(),
            master_password_salt: req.master_password_salt_bytes()?,
            encryption_key_salt: req.encryption_key_salt_bytes()?,
        };
        let initial_items: Vec<String> = req
            .initial_items
            .iter()
            .map(|item| item.encrypted_data.clone())
            .collect();

        let stored = self.repo.create_user(new_user, &initial_items)?;

        Ok(UserRecord {
            id: stored.id,
            email: stored.email,
            created_at: stored.created_at,
        })
    }

    /// Exchange a verifier for a session token.
    ///
    /// Unknown email and wrong verifier produce the identical
    /// `AuthFailure`; the absent arm still performs a constant-time
    /// comparison (against a random decoy) so the two arms cost about
    /// the same.
    pub fn login(&self, req: &LoginRequest) -> Result<LoginResponse> {
        req.validate().map_err(|_| VaultError::AuthFailure)?;

        let user = self.repo.find_user_by_email(&req.email)?;
        let supplied = PasswordVerifier::from_wire(req.master_password_hash.clone());

        let verified = match &user {
            Some(u) => supplied.ct_eq(&PasswordVerifier::from_wire(u.master_password_hash.clone())),
            None => {
                let _ = supplied.ct_eq(&PasswordVerifier::decoy());
                false
            }
        };

        let Some(user) = user.filter(|_| verified) else {
            return Err(VaultError::AuthFailure);
        };

        let access_token = self.signer.issue(user.id, &user.email)?;
        Ok(LoginResponse { access_token })
    }

    /// Validate a bearer token and return its claims.
    pub fn verify_token(&self, token: &str) -> Result<Claims> {
        self.signer.verify(token)
    }
}
