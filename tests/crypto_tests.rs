//! Integration tests for the ZeroVault crypto module.

use std::collections::HashSet;

use zerovault::crypto::envelope::{self, NONCE_LEN};
use zerovault::crypto::keys::{MasterSecret, PasswordVerifier, VaultKey};
use zerovault::crypto::{decrypt, derive, encrypt, generate_salt, Argon2Params, SALT_LEN};
use zerovault::VaultError;

/// Floor-respecting Argon2 params so tests stay fast.
fn fast_params() -> Argon2Params {
    Argon2Params {
        memory_kib: 8_192,
        iterations: 1,
        parallelism: 1,
    }
}

// ---------------------------------------------------------------------------
// Envelope encryption round-trip
// ---------------------------------------------------------------------------

#[test]
fn encrypt_decrypt_roundtrip() {
    let key = [0xABu8; 32];
    let plaintext = b"{\"site\":\"example.com\",\"password\":\"hunter2\"}";

    let ciphertext = encrypt(&key, plaintext).expect("encrypt should succeed");

    // Ciphertext must be longer than plaintext (12-byte nonce + 16-byte tag).
    assert!(ciphertext.len() > plaintext.len());

    let recovered = decrypt(&key, &ciphertext).expect("decrypt should succeed");
    assert_eq!(recovered, plaintext);
}

#[test]
fn encrypt_produces_different_ciphertext_each_time() {
    let key = [0xCDu8; 32];
    let plaintext = b"same input";

    let ct1 = encrypt(&key, plaintext).expect("encrypt 1");
    let ct2 = encrypt(&key, plaintext).expect("encrypt 2");

    // Because each call generates a new random nonce, the output must differ.
    assert_ne!(ct1, ct2, "two encryptions of the same plaintext must differ");
}

#[test]
fn nonces_never_repeat_under_one_key() {
    let key = [0x42u8; 32];
    let mut seen = HashSet::new();

    for _ in 0..512 {
        let ct = encrypt(&key, b"x").expect("encrypt");
        let nonce: [u8; NONCE_LEN] = ct[..NONCE_LEN].try_into().unwrap();
        assert!(seen.insert(nonce), "nonce reused under the same key");
    }
}

#[test]
fn decrypt_with_wrong_key_fails() {
    let key = [0x11u8; 32];
    let wrong_key = [0x22u8; 32];

    let ciphertext = encrypt(&key, b"secret").expect("encrypt");
    let result = decrypt(&wrong_key, &ciphertext);

    assert!(matches!(result, Err(VaultError::DecryptionFailed)));
}

#[test]
fn decrypt_with_truncated_data_fails() {
    // Anything shorter than 12 bytes (nonce length) should fail.
    let key = [0xAAu8; 32];
    let result = decrypt(&key, &[0u8; 5]);
    assert!(matches!(result, Err(VaultError::DecryptionFailed)));
}

#[test]
fn any_single_bit_flip_breaks_decryption() {
    let key = [0xBBu8; 32];
    let plaintext = b"integrity matters";
    let ciphertext = encrypt(&key, plaintext).expect("encrypt");

    // Flip one bit at every position: nonce, ciphertext body, and tag.
    for pos in 0..ciphertext.len() {
        for bit in 0..8 {
            let mut tampered = ciphertext.clone();
            tampered[pos] ^= 1 << bit;

            let result = decrypt(&key, &tampered);
            assert!(
                matches!(result, Err(VaultError::DecryptionFailed)),
                "bit {bit} of byte {pos} flipped but decryption did not fail"
            );
        }
    }
}

#[test]
fn seal_open_string_roundtrip() {
    let key = [0x33u8; 32];
    let plaintext = b"travels through JSON";

    let encoded = envelope::seal_to_string(&key, plaintext).expect("seal");
    // Transport-safe: plain ASCII base64.
    assert!(encoded.is_ascii());

    let recovered = envelope::open_from_string(&key, &encoded).expect("open");
    assert_eq!(recovered, plaintext);
}

#[test]
fn open_rejects_invalid_base64_as_decrypt_failure() {
    let key = [0x44u8; 32];
    let result = envelope::open_from_string(&key, "not base64 at all!!!");
    assert!(matches!(result, Err(VaultError::DecryptionFailed)));
}

// ---------------------------------------------------------------------------
// Key derivation (Argon2id)
// ---------------------------------------------------------------------------

#[test]
fn derive_same_inputs_same_output() {
    let password = b"my-secure-passphrase";
    let salt = generate_salt();

    let key1 = derive(password, &salt, &fast_params()).expect("derive 1");
    let key2 = derive(password, &salt, &fast_params()).expect("derive 2");

    assert_eq!(key1, key2, "same password + salt must produce the same key");
}

#[test]
fn derive_different_salts_different_keys() {
    let password = b"same-password";
    let salt1 = generate_salt();
    let salt2 = generate_salt();

    let key1 = derive(password, &salt1, &fast_params()).expect("derive 1");
    let key2 = derive(password, &salt2, &fast_params()).expect("derive 2");

    assert_ne!(key1, key2, "different salts must produce different keys");
}

#[test]
fn derive_different_passwords_different_keys() {
    let salt = generate_salt();

    let key1 = derive(b"password-one", &salt, &fast_params()).expect("derive 1");
    let key2 = derive(b"password-two", &salt, &fast_params()).expect("derive 2");

    assert_ne!(key1, key2, "different passwords must produce different keys");
}

#[test]
fn derive_rejects_empty_password() {
    let salt = generate_salt();
    let result = derive(b"", &salt, &fast_params());
    assert!(matches!(result, Err(VaultError::PreconditionViolation(_))));
}

#[test]
fn derive_rejects_wrong_length_salt() {
    let result = derive(b"password", &[0u8; SALT_LEN - 1], &fast_params());
    assert!(matches!(result, Err(VaultError::PreconditionViolation(_))));

    let result = derive(b"password", &[0u8; SALT_LEN + 4], &fast_params());
    assert!(matches!(result, Err(VaultError::PreconditionViolation(_))));
}

#[test]
fn derive_rejects_weak_memory_cost() {
    let salt = generate_salt();
    let weak = Argon2Params {
        memory_kib: 64,
        iterations: 1,
        parallelism: 1,
    };
    let result = derive(b"password", &salt, &weak);
    assert!(matches!(result, Err(VaultError::KeyDerivationFailed(_))));
}

#[test]
fn generated_salts_are_unique() {
    let mut seen = HashSet::new();
    for _ in 0..64 {
        assert!(seen.insert(generate_salt()), "generate_salt repeated itself");
    }
}

// ---------------------------------------------------------------------------
// Master secret, vault key, verifier
// ---------------------------------------------------------------------------

#[test]
fn verifier_is_deterministic_for_same_inputs() {
    let salt = generate_salt();
    let m1 = MasterSecret::derive(b"pw", &salt, &fast_params()).expect("derive 1");
    let m2 = MasterSecret::derive(b"pw", &salt, &fast_params()).expect("derive 2");

    assert!(m1.verifier().ct_eq(&m2.verifier()));
}

#[test]
fn verifier_differs_across_passwords() {
    let salt = generate_salt();
    let m1 = MasterSecret::derive(b"pw-one", &salt, &fast_params()).expect("derive 1");
    let m2 = MasterSecret::derive(b"pw-two", &salt, &fast_params()).expect("derive 2");

    assert!(!m1.verifier().ct_eq(&m2.verifier()));
}

#[test]
fn vault_key_and_verifier_paths_are_independent() {
    // Same password, two salts: the key encrypting items shares nothing
    // observable with the verifier sent to the server.
    let mp_salt = generate_salt();
    let ek_salt = generate_salt();

    let master = MasterSecret::derive(b"pw", &mp_salt, &fast_params()).expect("master");
    let vault_key = VaultKey::derive(b"pw", &ek_salt, &fast_params()).expect("vault key");

    let fake = PasswordVerifier::from_wire(hex(vault_key.as_bytes()));
    assert!(!master.verifier().ct_eq(&fake));
}

#[test]
fn decoy_verifiers_are_fresh_and_well_shaped() {
    let d1 = PasswordVerifier::decoy();
    let d2 = PasswordVerifier::decoy();
    assert_eq!(d1.as_str().len(), 64); // hex of 32 bytes
    assert!(!d1.ct_eq(&d2));
}

// ---------------------------------------------------------------------------
// Background derivation
// ---------------------------------------------------------------------------

#[test]
fn background_derivation_matches_direct_derivation() {
    let salt = generate_salt();
    let direct = derive(b"pw", &salt, &fast_params()).expect("direct");

    let task = zerovault::client::derive::spawn(b"pw".to_vec(), salt, fast_params());
    let background = task
        .join()
        .expect("not cancelled")
        .expect("derivation succeeds");

    assert_eq!(direct, background);
}

#[test]
fn cancelled_derivation_discards_its_result() {
    let salt = generate_salt();
    let task = zerovault::client::derive::spawn(b"pw".to_vec(), salt, fast_params());
    task.cancel();
    assert!(task.is_cancelled());
    assert!(task.join().is_none(), "cancelled result must be discarded");
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}
