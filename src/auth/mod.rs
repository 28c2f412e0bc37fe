//! Server-side authentication: credential issuance and session tokens.

pub mod issuer;
pub mod token;

pub use issuer::CredentialIssuer;
pub use token::{Claims, TokenSigner};
