//! The authenticated client session.
//!
//! Holds exactly two things: the bearer token and the vault key.  Both
//! are scoped to this object (there is no process-wide auth state)
//! and `logout` (or a plain drop) clears them, zeroizing the key.
//!
//! All encryption and decryption happens here, on the client.  The
//! transport only ever sees ciphertext strings.

use uuid::Uuid;

use crate::crypto::envelope;
use crate::crypto::keys::VaultKey;
use crate::errors::Result;
use crate::protocol::{
    BulkCreateRequest, BulkCreateResponse, CreateItemRequest, VaultItemRecord,
};

use super::transport::Transport;

/// A decrypted vault item as seen by the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecryptedItem {
    pub id: Uuid,
    pub plaintext: Vec<u8>,
}

pub struct Session<'t, T: Transport> {
    transport: &'t T,
    access_token: String,
    vault_key: VaultKey,
}

impl<'t, T: Transport> Session<'t, T> {
    pub(super) fn new(transport: &'t T, access_token: String, vault_key: VaultKey) -> Self {
        Self {
            transport,
            access_token,
            vault_key,
        }
    }

    /// The bearer token sent on every request.
    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    /// Encrypt a plaintext under the vault key and store it.
    pub fn create_item(&self, plaintext: &[u8]) -> Result<VaultItemRecord> {
        let encrypted_data = envelope::seal_to_string(self.vault_key.as_bytes(), plaintext)?;
        self.transport
            .create_item(&self.access_token, &CreateItemRequest { encrypted_data })
    }

    /// Encrypt and store a batch of plaintexts; the response reports
    /// each item's outcome.
    pub fn create_items(&self, plaintexts: &[&[u8]]) -> Result<BulkCreateResponse> {
        let mut items = Vec::with_capacity(plaintexts.len());
        for plaintext in plaintexts {
            items.push(CreateItemRequest {
                encrypted_data: envelope::seal_to_string(self.vault_key.as_bytes(), plaintext)?,
            });
        }
        self.transport
            .create_bulk(&self.access_token, &BulkCreateRequest { items })
    }

    /// Fetch this user's item records, ciphertext untouched.
    pub fn list_records(&self) -> Result<Vec<VaultItemRecord>> {
        self.transport.list_items(&self.access_token)
    }

    /// Fetch and locally decrypt all of this user's items.
    pub fn list_decrypted(&self) -> Result<Vec<DecryptedItem>> {
        let records = self.list_records()?;
        let mut items = Vec::with_capacity(records.len());
        for record in records {
            let plaintext =
                envelope::open_from_string(self.vault_key.as_bytes(), &record.encrypted_data)?;
            items.push(DecryptedItem {
                id: record.id,
                plaintext,
            });
        }
        Ok(items)
    }

    /// Delete one of this user's items.
    pub fn delete_item(&self, item_id: Uuid) -> Result<VaultItemRecord> {
        self.transport.delete_item(&self.access_token, item_id)
    }

    /// End the session.  Consumes self; the vault key is zeroized on
    /// drop and the token is forgotten.
    pub fn logout(self) {}
}
