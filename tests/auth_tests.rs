//! Integration tests for the server-side auth half: salt exchange,
//! registration, login, and session tokens.
//!
//! The issuer only ever compares verifier strings, so these tests use
//! short synthetic verifiers instead of running Argon2 — the real
//! derivation path is covered by the crypto and end-to-end tests.

use std::sync::Arc;

use uuid::Uuid;
use zerovault::auth::{CredentialIssuer, TokenSigner};
use zerovault::protocol::{GetSaltsRequest, LoginRequest, RegisterRequest, SaltsResponse};
use zerovault::storage::{MemoryRepository, Repository};
use zerovault::VaultError;

fn issuer() -> CredentialIssuer<MemoryRepository> {
    issuer_with_ttl(3_600)
}

fn issuer_with_ttl(ttl_secs: u64) -> CredentialIssuer<MemoryRepository> {
    let repo = Arc::new(MemoryRepository::new());
    let signer = TokenSigner::new(b"test-server-secret", ttl_secs).expect("signer");
    CredentialIssuer::new(repo, signer)
}

/// A registration request with synthetic salts and verifier.
fn register_request(email: &str, verifier: &str) -> RegisterRequest {
    let salts = SaltsResponse::from_bytes(&[1u8; 16], &[2u8; 16]);
    RegisterRequest {
        email: email.to_string(),
        master_password_hash: verifier.to_string(),
        master_password_salt: salts.master_password_salt,
        encryption_key_salt: salts.encryption_key_salt,
        initial_items: Vec::new(),
    }
}

fn salts_for(issuer: &CredentialIssuer<MemoryRepository>, email: &str) -> SaltsResponse {
    issuer
        .get_salts(&GetSaltsRequest {
            email: email.to_string(),
        })
        .expect("get_salts always succeeds for well-formed email")
}

// ---------------------------------------------------------------------------
// Salt exchange and enumeration resistance
// ---------------------------------------------------------------------------

#[test]
fn stored_salts_are_stable_across_calls() {
    let issuer = issuer();
    issuer
        .register(&register_request("alice@example.com", "v1"))
        .expect("register");

    let first = salts_for(&issuer, "alice@example.com");
    let second = salts_for(&issuer, "alice@example.com");

    assert_eq!(first.master_password_salt, second.master_password_salt);
    assert_eq!(first.encryption_key_salt, second.encryption_key_salt);
}

#[test]
fn unknown_email_gets_decoy_salts_of_identical_shape() {
    let issuer = issuer();
    issuer
        .register(&register_request("alice@example.com", "v1"))
        .expect("register");

    let real = salts_for(&issuer, "alice@example.com");
    let decoy = salts_for(&issuer, "nobody@example.com");

    // Byte-length equality: the response shape cannot reveal which arm ran.
    assert_eq!(
        real.master_password_salt_bytes().unwrap().len(),
        decoy.master_password_salt_bytes().unwrap().len()
    );
    assert_eq!(
        real.encryption_key_salt_bytes().unwrap().len(),
        decoy.encryption_key_salt_bytes().unwrap().len()
    );
}

#[test]
fn decoy_salts_are_fresh_on_every_call() {
    let issuer = issuer();

    let first = salts_for(&issuer, "ghost@example.com");
    let second = salts_for(&issuer, "ghost@example.com");

    assert_ne!(
        first.master_password_salt, second.master_password_salt,
        "decoy salts must not repeat"
    );
    assert_ne!(first.encryption_key_salt, second.encryption_key_salt);
}

// ---------------------------------------------------------------------------
// Registration
// ---------------------------------------------------------------------------

#[test]
fn register_returns_identity_without_secrets() {
    let issuer = issuer();
    let record = issuer
        .register(&register_request("alice@example.com", "v1"))
        .expect("register");

    assert_eq!(record.email, "alice@example.com");
    // Only id, email, created_at exist on the record — nothing secret
    // to assert absent; serialize and check the field set instead.
    let json = serde_json::to_value(&record).expect("serialize");
    let keys: Vec<&str> = json.as_object().unwrap().keys().map(|k| k.as_str()).collect();
    assert_eq!(keys.len(), 3);
    assert!(json.get("masterPasswordHash").is_none());
}

#[test]
fn duplicate_email_is_a_conflict() {
    let issuer = issuer();
    issuer
        .register(&register_request("alice@example.com", "v1"))
        .expect("first register");

    let result = issuer.register(&register_request("alice@example.com", "v2"));
    assert!(matches!(result, Err(VaultError::Conflict)));
}

#[test]
fn register_rejects_malformed_salt() {
    let issuer = issuer();
    let mut req = register_request("alice@example.com", "v1");
    req.master_password_salt = "short".to_string();

    let result = issuer.register(&req);
    assert!(matches!(result, Err(VaultError::PreconditionViolation(_))));
}

// ---------------------------------------------------------------------------
// Login
// ---------------------------------------------------------------------------

#[test]
fn login_with_correct_verifier_yields_verifiable_token() {
    let issuer = issuer();
    let record = issuer
        .register(&register_request("alice@example.com", "the-verifier"))
        .expect("register");

    let response = issuer
        .login(&LoginRequest {
            email: "alice@example.com".to_string(),
            master_password_hash: "the-verifier".to_string(),
        })
        .expect("login");

    let claims = issuer
        .verify_token(&response.access_token)
        .expect("token verifies");
    assert_eq!(claims.sub, record.id);
    assert_eq!(claims.email, "alice@example.com");
    assert!(claims.exp > claims.iat);
}

#[test]
fn wrong_verifier_and_unknown_email_fail_identically() {
    let issuer = issuer();
    issuer
        .register(&register_request("alice@example.com", "the-verifier"))
        .expect("register");

    let wrong_password = issuer.login(&LoginRequest {
        email: "alice@example.com".to_string(),
        master_password_hash: "not-the-verifier".to_string(),
    });
    let unknown_account = issuer.login(&LoginRequest {
        email: "nobody@example.com".to_string(),
        master_password_hash: "the-verifier".to_string(),
    });

    assert!(matches!(wrong_password, Err(VaultError::AuthFailure)));
    assert!(matches!(unknown_account, Err(VaultError::AuthFailure)));
}

#[test]
fn login_with_empty_credential_is_a_generic_auth_failure() {
    let issuer = issuer();
    let result = issuer.login(&LoginRequest {
        email: "alice@example.com".to_string(),
        master_password_hash: String::new(),
    });
    assert!(matches!(result, Err(VaultError::AuthFailure)));
}

// ---------------------------------------------------------------------------
// Session tokens
// ---------------------------------------------------------------------------

#[test]
fn token_roundtrip_preserves_claims() {
    let signer = TokenSigner::new(b"secret", 60).expect("signer");
    let user_id = Uuid::new_v4();

    let token = signer.issue(user_id, "alice@example.com").expect("issue");
    let claims = signer.verify(&token).expect("verify");

    assert_eq!(claims.sub, user_id);
    assert_eq!(claims.email, "alice@example.com");
}

#[test]
fn expired_token_is_rejected() {
    // ttl 0: exp == iat, so the token is dead on arrival.
    let signer = TokenSigner::new(b"secret", 0).expect("signer");
    let token = signer.issue(Uuid::new_v4(), "a@b.c").expect("issue");

    let result = signer.verify(&token);
    assert!(matches!(result, Err(VaultError::AuthFailure)));
}

#[test]
fn tampered_token_is_rejected() {
    let signer = TokenSigner::new(b"secret", 60).expect("signer");
    let token = signer.issue(Uuid::new_v4(), "a@b.c").expect("issue");

    // Flip a character in the payload half.
    let mut chars: Vec<char> = token.chars().collect();
    chars[2] = if chars[2] == 'A' { 'B' } else { 'A' };
    let tampered: String = chars.into_iter().collect();

    let result = signer.verify(&tampered);
    assert!(matches!(result, Err(VaultError::AuthFailure)));
}

#[test]
fn token_signed_under_another_secret_is_rejected() {
    let signer = TokenSigner::new(b"secret-one", 60).expect("signer 1");
    let other = TokenSigner::new(b"secret-two", 60).expect("signer 2");

    let token = signer.issue(Uuid::new_v4(), "a@b.c").expect("issue");
    assert!(matches!(other.verify(&token), Err(VaultError::AuthFailure)));
}

#[test]
fn malformed_token_is_rejected() {
    let signer = TokenSigner::new(b"secret", 60).expect("signer");
    for garbage in ["", "no-dot-here", "a.b.c.d", "!!!.???"] {
        assert!(
            matches!(signer.verify(garbage), Err(VaultError::AuthFailure)),
            "token {garbage:?} should be rejected"
        );
    }
}

// ---------------------------------------------------------------------------
// Registration atomicity at the storage boundary
// ---------------------------------------------------------------------------

#[test]
fn failed_registration_leaves_no_partial_account() {
    let repo = Arc::new(MemoryRepository::new());
    let signer = TokenSigner::new(b"secret", 60).expect("signer");
    let issuer = CredentialIssuer::new(Arc::clone(&repo), signer);

    // Invalid salt: the request is rejected at the boundary.
    let mut req = register_request("alice@example.com", "v1");
    req.encryption_key_salt = "AAAA".to_string();
    assert!(issuer.register(&req).is_err());

    // No user row exists afterwards.
    let user = repo
        .find_user_by_email("alice@example.com")
        .expect("lookup works");
    assert!(user.is_none(), "failed registration must not persist a user");
}
