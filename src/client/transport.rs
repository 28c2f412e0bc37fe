//! The boundary the client speaks through.
//!
//! One method per wire operation from the protocol table.  An HTTP
//! implementation maps each call onto its route and carries the bearer
//! token as a header; [`crate::server::VaultServer`] implements it
//! directly for in-process use.

use uuid::Uuid;

use crate::errors::Result;
use crate::protocol::{
    BulkCreateRequest, BulkCreateResponse, CreateItemRequest, GetSaltsRequest, LoginRequest,
    LoginResponse, RegisterRequest, SaltsResponse, UserRecord, VaultItemRecord,
};

pub trait Transport {
    fn get_salts(&self, req: &GetSaltsRequest) -> Result<SaltsResponse>;
    fn register(&self, req: &RegisterRequest) -> Result<UserRecord>;
    fn login(&self, req: &LoginRequest) -> Result<LoginResponse>;
    fn create_item(&self, token: &str, req: &CreateItemRequest) -> Result<VaultItemRecord>;
    fn create_bulk(&self, token: &str, req: &BulkCreateRequest) -> Result<BulkCreateResponse>;
    fn list_items(&self, token: &str) -> Result<Vec<VaultItemRecord>>;
    fn delete_item(&self, token: &str, item_id: Uuid) -> Result<VaultItemRecord>;
}
