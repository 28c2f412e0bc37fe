//! ZeroVault: the core of a zero-knowledge password vault.
//!
//! The server never sees the master password or any plaintext.  A user
//! registers with two random salts and a one-way verifier; the vault
//! key derived from the second salt stays on the client and encrypts
//! every item before it crosses the wire.  The server stores opaque
//! blobs, enforces ownership, and issues signed session tokens, and
//! can do nothing else with what it holds.
//!
//! Layering, leaf-first:
//! - [`crypto`]: Argon2id derivation and AES-256-GCM envelopes, with zeroizing
//!   key wrappers.
//! - [`protocol`]: tagged wire records, validated at the boundary.
//! - [`storage`]: the persistence collaborator trait + in-memory impl.
//! - [`auth`] / [`store`]: the server half, credential issuance and
//!   opaque item CRUD.
//! - [`server`]: issuer + store + token checks as one surface.
//! - [`client`]: the login state machine, the authenticated session,
//!   and cancellable off-thread derivation.

pub mod auth;
pub mod client;
pub mod config;
pub mod crypto;
pub mod errors;
pub mod protocol;
pub mod server;
pub mod storage;
pub mod store;

pub use client::Client;
pub use config::Settings;
pub use errors::{Result, VaultError};
pub use server::VaultServer;
