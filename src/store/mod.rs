//! Server-side CRUD over opaque encrypted vault items.
//!
//! The store never interprets a blob: `encrypted_data` strings are
//! persisted and returned verbatim.  Ownership is enforced on every
//! access, and a denial never says whether the item existed: deleting
//! someone else's item and deleting a nonexistent id are the same
//! `AccessDenied`.

use std::sync::Arc;

use uuid::Uuid;

use crate::errors::{Result, VaultError};
use crate::protocol::{
    BulkCreateRequest, BulkCreateResponse, BulkItemResult, CreateItemRequest, VaultItemRecord,
};
use crate::storage::{Repository, StoredItem};

/// The server half of vault item persistence.
pub struct VaultStore<R: Repository> {
    repo: Arc<R>,
}

impl<R: Repository> VaultStore<R> {
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    /// Persist one opaque blob for `user_id`.
    pub fn create(&self, user_id: Uuid, req: &CreateItemRequest) -> Result<VaultItemRecord> {
        req.validate()?;
        let item = self.repo.insert_item(user_id, &req.encrypted_data)?;
        Ok(to_record(item))
    }

    /// Persist a batch of blobs for `user_id`.
    ///
    /// Not atomic across items: each item succeeds or fails on its own,
    /// and the response reports every outcome so callers can reconcile
    /// a partial failure.
    pub fn create_bulk(&self, user_id: Uuid, req: &BulkCreateRequest) -> Result<BulkCreateResponse> {
        let mut results = Vec::with_capacity(req.items.len());
        let mut created = 0;

        for (index, item) in req.items.iter().enumerate() {
            let outcome = item
                .validate()
                .and_then(|()| self.repo.insert_item(user_id, &item.encrypted_data));
            results.push(match outcome {
                Ok(stored) => {
                    created += 1;
                    BulkItemResult {
                        index,
                        item_id: Some(stored.id),
                        error: None,
                    }
                }
                Err(e) => BulkItemResult {
                    index,
                    item_id: None,
                    error: Some(e.to_string()),
                },
            });
        }

        Ok(BulkCreateResponse { created, results })
    }

    /// All items owned by `user_id`, and never anyone else's, whatever the
    /// input.
    pub fn list_all(&self, user_id: Uuid) -> Result<Vec<VaultItemRecord>> {
        let items = self.repo.items_for(user_id)?;
        Ok(items.into_iter().map(to_record).collect())
    }

    /// Delete an item after verifying ownership.
    ///
    /// Missing item and wrong owner both yield `AccessDenied` so a
    /// caller cannot learn whether an id exists that belongs to someone
    /// else.
    pub fn remove(&self, user_id: Uuid, item_id: Uuid) -> Result<VaultItemRecord> {
        let item = self.repo.find_item(item_id)?;
        match item {
            Some(item) if item.owner_id == user_id => {
                // The row may vanish between fetch and delete; the
                // denial stays the same either way.
                let deleted = self
                    .repo
                    .delete_item(item_id)?
                    .ok_or(VaultError::AccessDenied)?;
                Ok(to_record(deleted))
            }
            Some(_) | None => Err(VaultError::AccessDenied),
        }
    }
}

fn to_record(item: StoredItem) -> VaultItemRecord {
    VaultItemRecord {
        id: item.id,
        encrypted_data: item.encrypted_data,
        created_at: item.created_at,
        updated_at: item.updated_at,
    }
}
