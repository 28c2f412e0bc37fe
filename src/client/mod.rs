//! The client half of the protocol.
//!
//! Everything secret happens on this side of the [`Transport`]
//! boundary: salt generation, both key derivations, and all item
//! encryption.  The transport only ever carries the verifier, salts,
//! tokens, and ciphertext.

pub mod derive;
pub mod flow;
pub mod session;
pub mod transport;

pub use flow::{LoginFlow, LoginState};
pub use session::{DecryptedItem, Session};
pub use transport::Transport;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

use crate::crypto::envelope;
use crate::crypto::kdf::{generate_salt, Argon2Params};
use crate::crypto::keys::{MasterSecret, VaultKey};
use crate::errors::Result;
use crate::protocol::{validate_email, CreateItemRequest, RegisterRequest, UserRecord};

/// Client entry point: registration and login against one transport.
pub struct Client<'t, T: Transport> {
    transport: &'t T,
    params: Argon2Params,
}

impl<'t, T: Transport> Client<'t, T> {
    pub fn new(transport: &'t T, params: Argon2Params) -> Self {
        Self { transport, params }
    }

    /// Register a new account.
    ///
    /// Generates the salt pair, runs both derivations, pre-encrypts any
    /// initial plaintexts under the fresh vault key, and submits the
    /// whole thing as one atomic request.  If anything fails, the
    /// derived secrets are dropped (zeroized) and nothing partial has
    /// been persisted anywhere.
    pub fn register(
        &self,
        email: &str,
        password: &[u8],
        initial_plaintexts: &[&[u8]],
    ) -> Result<UserRecord> {
        validate_email(email)?;

        // Salts are created exactly once, here, and become immutable
        // server-side state.
        let master_password_salt = generate_salt();
        let encryption_key_salt = generate_salt();

        let master = MasterSecret::derive(password, &master_password_salt, &self.params)?;
        let vault_key = VaultKey::derive(password, &encryption_key_salt, &self.params)?;

        let mut initial_items = Vec::with_capacity(initial_plaintexts.len());
        for plaintext in initial_plaintexts {
            initial_items.push(CreateItemRequest {
                encrypted_data: envelope::seal_to_string(vault_key.as_bytes(), plaintext)?,
            });
        }

        let req = RegisterRequest {
            email: email.to_string(),
            master_password_hash: master.verifier().as_str().to_string(),
            master_password_salt: BASE64.encode(master_password_salt),
            encryption_key_salt: BASE64.encode(encryption_key_salt),
            initial_items,
        };

        self.transport.register(&req)
    }

    /// Log in, driving the full state machine in one call.
    ///
    /// Fails with whatever step failed; all derived material from the
    /// attempt is discarded on the way out.
    pub fn login(&self, email: &str, password: &[u8]) -> Result<Session<'t, T>> {
        let mut flow = LoginFlow::new(self.transport, email, self.params);
        flow.request_salts()?;
        flow.derive_keys(password)?;
        flow.exchange()?;
        flow.into_session()
    }

    /// Begin a stepwise login attempt (for callers that drive the
    /// state machine themselves, e.g. to derive off-thread).
    pub fn begin_login(&self, email: &str) -> LoginFlow<'t, T> {
        LoginFlow::new(self.transport, email, self.params)
    }
}
