//! The per-attempt login state machine.
//!
//! `Idle -> SaltsRequested -> SaltsReceived -> VerifierDerived ->
//! TokenRequested -> Authenticated | Failed`
//!
//! Each step consumes the previous step's output; calling a step out of
//! order is a precondition violation.  Any failure moves the attempt to
//! `Failed` and drops every piece of derived material, so a later retry
//! starts from scratch with a fresh derivation, never from cached
//! secrets.

use crate::crypto::kdf::Argon2Params;
use crate::crypto::keys::{MasterSecret, PasswordVerifier, VaultKey};
use crate::errors::{Result, VaultError};
use crate::protocol::{GetSaltsRequest, LoginRequest, SaltsResponse};

use super::session::Session;
use super::transport::Transport;

/// Observable state of a login attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginState {
    Idle,
    SaltsRequested,
    SaltsReceived,
    VerifierDerived,
    TokenRequested,
    Authenticated,
    Failed,
}

/// One login attempt against a transport.
pub struct LoginFlow<'t, T: Transport> {
    transport: &'t T,
    email: String,
    params: Argon2Params,
    state: LoginState,
    salts: Option<SaltsResponse>,
    verifier: Option<PasswordVerifier>,
    vault_key: Option<VaultKey>,
    access_token: Option<String>,
}

impl<'t, T: Transport> LoginFlow<'t, T> {
    pub fn new(transport: &'t T, email: &str, params: Argon2Params) -> Self {
        Self {
            transport,
            email: email.to_string(),
            params,
            state: LoginState::Idle,
            salts: None,
            verifier: None,
            vault_key: None,
            access_token: None,
        }
    }

    pub fn state(&self) -> LoginState {
        self.state
    }

    /// Step 1: fetch the salt pair for this email.
    ///
    /// The response is identical in shape whether or not the account
    /// exists, so this step never branches on existence.
    pub fn request_salts(&mut self) -> Result<()> {
        self.expect(LoginState::Idle)?;
        self.state = LoginState::SaltsRequested;

        let req = GetSaltsRequest {
            email: self.email.clone(),
        };
        let salts = self.fallible(|flow| flow.transport.get_salts(&req))?;

        self.salts = Some(salts);
        self.state = LoginState::SaltsReceived;
        Ok(())
    }

    /// Step 2: run both independent derivations locally.
    ///
    /// The verifier is what will be sent; the vault key never leaves
    /// this struct (and later, the session).
    pub fn derive_keys(&mut self, password: &[u8]) -> Result<()> {
        self.expect(LoginState::SaltsReceived)?;

        let salts = self.salts.as_ref().ok_or_else(|| {
            VaultError::PreconditionViolation("no salts held for this attempt".into())
        })?;
        let mp_salt = salts.master_password_salt_bytes()?;
        let ek_salt = salts.encryption_key_salt_bytes()?;
        let params = self.params;

        let derived = self.fallible(|_| {
            let master = MasterSecret::derive(password, &mp_salt, &params)?;
            let vault_key = VaultKey::derive(password, &ek_salt, &params)?;
            Ok((master.verifier(), vault_key))
        })?;

        let (verifier, vault_key) = derived;
        self.verifier = Some(verifier);
        self.vault_key = Some(vault_key);
        self.state = LoginState::VerifierDerived;
        Ok(())
    }

    /// Step 3: exchange the verifier for a session token.
    pub fn exchange(&mut self) -> Result<()> {
        self.expect(LoginState::VerifierDerived)?;

        let verifier = self.verifier.take().ok_or_else(|| {
            VaultError::PreconditionViolation("no verifier held for this attempt".into())
        })?;
        self.state = LoginState::TokenRequested;

        let req = LoginRequest {
            email: self.email.clone(),
            master_password_hash: verifier.as_str().to_string(),
        };
        let response = self.fallible(|flow| flow.transport.login(&req))?;

        self.access_token = Some(response.access_token);
        self.state = LoginState::Authenticated;
        Ok(())
    }

    /// Consume an authenticated attempt into a live session.
    pub fn into_session(mut self) -> Result<Session<'t, T>> {
        self.expect(LoginState::Authenticated)?;

        let vault_key = self.vault_key.take().ok_or_else(|| {
            VaultError::PreconditionViolation("no vault key held for this attempt".into())
        })?;
        let access_token = self.access_token.take().ok_or_else(|| {
            VaultError::PreconditionViolation("no token held for this attempt".into())
        })?;

        Ok(Session::new(self.transport, access_token, vault_key))
    }

    fn expect(&self, state: LoginState) -> Result<()> {
        if self.state != state {
            return Err(VaultError::PreconditionViolation(format!(
                "login step called in state {:?}, expected {state:?}",
                self.state
            )));
        }
        Ok(())
    }

    /// Run a step; on error, fail the attempt and discard all derived
    /// material (dropping the key wrappers zeroizes them).
    fn fallible<U>(&mut self, step: impl FnOnce(&Self) -> Result<U>) -> Result<U> {
        match step(self) {
            Ok(value) => Ok(value),
            Err(e) => {
                self.state = LoginState::Failed;
                self.salts = None;
                self.verifier = None;
                self.vault_key = None;
                self.access_token = None;
                Err(e)
            }
        }
    }
}
