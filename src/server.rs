//! In-process server composition.
//!
//! Wires the credential issuer, the vault store, and bearer-token
//! verification into the full operation table the HTTP layer exposes.
//! HTTP framing itself lives outside this crate; a router only has to
//! deserialize a request record, call the matching method, and
//! serialize the result.
//!
//! `VaultServer` also implements the client-side [`Transport`] trait,
//! so the whole protocol can be driven end-to-end in one process.

use std::sync::Arc;

use uuid::Uuid;

use crate::auth::{Claims, CredentialIssuer, TokenSigner};
use crate::client::Transport;
use crate::config::Settings;
use crate::errors::Result;
use crate::protocol::{
    BulkCreateRequest, BulkCreateResponse, CreateItemRequest, GetSaltsRequest, LoginRequest,
    LoginResponse, RegisterRequest, SaltsResponse, UserRecord, VaultItemRecord,
};
use crate::storage::{MemoryRepository, Repository};
use crate::store::VaultStore;

/// Issuer + store behind one authenticated surface.
pub struct VaultServer<R: Repository> {
    issuer: CredentialIssuer<R>,
    vault: VaultStore<R>,
}

impl VaultServer<MemoryRepository> {
    /// A fully in-memory server: the composition used in tests and
    /// single-process deployments.
    pub fn in_memory(server_secret: &[u8], settings: &Settings) -> Result<Self> {
        Self::new(Arc::new(MemoryRepository::new()), server_secret, settings)
    }
}

impl<R: Repository> VaultServer<R> {
    pub fn new(repo: Arc<R>, server_secret: &[u8], settings: &Settings) -> Result<Self> {
        let signer = TokenSigner::new(server_secret, settings.token_ttl_secs)?;
        Ok(Self {
            issuer: CredentialIssuer::new(Arc::clone(&repo), signer),
            vault: VaultStore::new(repo),
        })
    }

    /// Check the bearer token guarding every vault operation.
    fn authenticate(&self, token: &str) -> Result<Claims> {
        self.issuer.verify_token(token)
    }
}

impl<R: Repository> Transport for VaultServer<R> {
    fn get_salts(&self, req: &GetSaltsRequest) -> Result<SaltsResponse> {
        self.issuer.get_salts(req)
    }

    fn register(&self, req: &RegisterRequest) -> Result<UserRecord> {
        self.issuer.register(req)
    }

    fn login(&self, req: &LoginRequest) -> Result<LoginResponse> {
        self.issuer.login(req)
    }

    fn create_item(&self, token: &str, req: &CreateItemRequest) -> Result<VaultItemRecord> {
        let claims = self.authenticate(token)?;
        self.vault.create(claims.sub, req)
    }

    fn create_bulk(&self, token: &str, req: &BulkCreateRequest) -> Result<BulkCreateResponse> {
        let claims = self.authenticate(token)?;
        self.vault.create_bulk(claims.sub, req)
    }

    fn list_items(&self, token: &str) -> Result<Vec<VaultItemRecord>> {
        let claims = self.authenticate(token)?;
        self.vault.list_all(claims.sub)
    }

    fn delete_item(&self, token: &str, item_id: Uuid) -> Result<VaultItemRecord> {
        let claims = self.authenticate(token)?;
        self.vault.remove(claims.sub, item_id)
    }
}
