//! Persistence collaborator interface.
//!
//! The core talks to storage through the [`Repository`] trait: plain
//! create/find/delete-by-id-and-owner operations over user and vault
//! item records.  A relational backend would implement this against its
//! schema; [`MemoryRepository`] is the in-process reference
//! implementation used by the server composition and the tests.
//!
//! Stored records hold ciphertext strings exactly as submitted.  No
//! plaintext and no key material ever reaches this layer.

mod memory;

pub use memory::MemoryRepository;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::crypto::kdf::SALT_LEN;
use crate::errors::Result;

/// A user row: identity, verifier, and the immutable salt pair.
#[derive(Debug, Clone)]
pub struct StoredUser {
    pub id: Uuid,
    pub email: String,
    /// The client-derived verifier (hex).  Not the password, and not
    /// usable to decrypt anything.
    pub master_password_hash: String,
    pub master_password_salt: [u8; SALT_LEN],
    pub encryption_key_salt: [u8; SALT_LEN],
    pub created_at: DateTime<Utc>,
}

/// A vault item row: an opaque ciphertext string owned by one user.
#[derive(Debug, Clone)]
pub struct StoredItem {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub encrypted_data: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The fields needed to create a user.  Ids and timestamps are assigned
/// by the repository.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub master_password_hash: String,
    pub master_password_salt: [u8; SALT_LEN],
    pub encryption_key_salt: [u8; SALT_LEN],
}

/// Storage operations the core depends on.
///
/// Implementations must make `create_user` atomic: the user row and all
/// `initial_items` commit together or not at all.
pub trait Repository: Send + Sync {
    /// Create a user plus any initial vault items in one unit.
    /// Fails with `Conflict` if the email is already registered.
    fn create_user(&self, user: NewUser, initial_items: &[String]) -> Result<StoredUser>;

    /// Look up a user by email (the unique key).
    fn find_user_by_email(&self, email: &str) -> Result<Option<StoredUser>>;

    /// Persist one opaque item blob for `owner_id`.
    fn insert_item(&self, owner_id: Uuid, encrypted_data: &str) -> Result<StoredItem>;

    /// All items owned by `owner_id`, oldest first.
    fn items_for(&self, owner_id: Uuid) -> Result<Vec<StoredItem>>;

    /// Fetch an item by id regardless of owner.  Ownership is the
    /// caller's check; storage does not decide access.
    fn find_item(&self, id: Uuid) -> Result<Option<StoredItem>>;

    /// Delete an item by id, returning the deleted row if it existed.
    fn delete_item(&self, id: Uuid) -> Result<Option<StoredItem>>;
}
