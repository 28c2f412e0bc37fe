//! In-memory repository backed by a single `RwLock`.
//!
//! One lock over both tables is what makes `create_user` atomic: the
//! user row and its initial items land under the same write guard, so
//! a failed registration can never leave a half-created account.

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::Utc;
use uuid::Uuid;

use super::{NewUser, Repository, StoredItem, StoredUser};
use crate::errors::{Result, VaultError};

#[derive(Default)]
struct Inner {
    users: HashMap<Uuid, StoredUser>,
    /// email -> user id (emails are the unique lookup key).
    email_index: HashMap<String, Uuid>,
    items: HashMap<Uuid, StoredItem>,
}

/// Reference [`Repository`] implementation.
#[derive(Default)]
pub struct MemoryRepository {
    inner: RwLock<Inner>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, Inner>> {
        self.inner
            .read()
            .map_err(|_| VaultError::Storage("repository lock poisoned".into()))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, Inner>> {
        self.inner
            .write()
            .map_err(|_| VaultError::Storage("repository lock poisoned".into()))
    }
}

impl Repository for MemoryRepository {
    fn create_user(&self, user: NewUser, initial_items: &[String]) -> Result<StoredUser> {
        let mut inner = self.write()?;

        if inner.email_index.contains_key(&user.email) {
            return Err(VaultError::Conflict);
        }

        let now = Utc::now();
        let stored = StoredUser {
            id: Uuid::new_v4(),
            email: user.email,
            master_password_hash: user.master_password_hash,
            master_password_salt: user.master_password_salt,
            encryption_key_salt: user.encryption_key_salt,
            created_at: now,
        };

        // Same guard for user and items: all-or-nothing.
        inner.email_index.insert(stored.email.clone(), stored.id);
        inner.users.insert(stored.id, stored.clone());
        for encrypted_data in initial_items {
            let item = StoredItem {
                id: Uuid::new_v4(),
                owner_id: stored.id,
                encrypted_data: encrypted_data.clone(),
                created_at: now,
                updated_at: now,
            };
            inner.items.insert(item.id, item);
        }

        Ok(stored)
    }

    fn find_user_by_email(&self, email: &str) -> Result<Option<StoredUser>> {
        let inner = self.read()?;
        Ok(inner
            .email_index
            .get(email)
            .and_then(|id| inner.users.get(id))
            .cloned())
    }

    fn insert_item(&self, owner_id: Uuid, encrypted_data: &str) -> Result<StoredItem> {
        let mut inner = self.write()?;
        let now = Utc::now();
        let item = StoredItem {
            id: Uuid::new_v4(),
            owner_id,
            encrypted_data: encrypted_data.to_string(),
            created_at: now,
            updated_at: now,
        };
        inner.items.insert(item.id, item.clone());
        Ok(item)
    }

    fn items_for(&self, owner_id: Uuid) -> Result<Vec<StoredItem>> {
        let inner = self.read()?;
        let mut items: Vec<StoredItem> = inner
            .items
            .values()
            .filter(|item| item.owner_id == owner_id)
            .cloned()
            .collect();
        items.sort_by_key(|item| item.created_at);
        Ok(items)
    }

    fn find_item(&self, id: Uuid) -> Result<Option<StoredItem>> {
        let inner = self.read()?;
        Ok(inner.items.get(&id).cloned())
    }

    fn delete_item(&self, id: Uuid) -> Result<Option<StoredItem>> {
        let mut inner = self.write()?;
        Ok(inner.items.remove(&id))
    }
}
