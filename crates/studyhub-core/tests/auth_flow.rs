use std::path::Path;

use serde_json::json;
use tempfile::tempdir;

use studyhub_core::store::{CredentialStore, NewCredentialRecord, SqliteCredentialStore};
use studyhub_core::{AuthService, HubError, SecurityConfig};

/// Cheap cost parameters so the suite stays fast.
fn test_config() -> SecurityConfig {
    SecurityConfig {
        hash_time_cost: 1,
        hash_memory_kib: 1024,
        hash_parallelism: 1,
        hash_output_len: 32,
        verifier_salt_len: 16,
        kdf_iterations: 1_000,
    }
}

/// Open a service over a file-backed store, as the app would on launch.
fn open_service(path: &Path) -> AuthService<SqliteCredentialStore> {
    let store = SqliteCredentialStore::open(path).expect("open store should succeed");
    AuthService::with_config(store, test_config())
}

#[test]
fn test_register_restart_login_decrypt_round_trip() {
    let dir = tempdir().expect("temp dir should be created");
    let db_path = dir.path().join("credentials.db");

    let card = json!({
        "front": "What is the capital of France?",
        "back": "Paris",
    });
    let plaintext = serde_json::to_vec(&card).expect("serialize should succeed");

    let blob = {
        let service = open_service(&db_path);
        let session = service
            .register("alice", "correct-horse-battery")
            .expect("register should succeed");
        let blob = session
            .encrypt_payload(&plaintext)
            .expect("encrypt should succeed");
        session.lock();
        blob
    };

    // Fresh service over the same file simulates an app restart
    let service = open_service(&db_path);
    let session = service
        .authenticate("alice", "correct-horse-battery")
        .expect("authenticate should succeed");

    let decrypted = session
        .decrypt_payload(&blob)
        .expect("decrypt should succeed");
    let restored: serde_json::Value =
        serde_json::from_slice(&decrypted).expect("deserialize should succeed");
    assert_eq!(restored, card);
}

#[test]
fn test_password_rotation_preserves_old_payloads() {
    let dir = tempdir().expect("temp dir should be created");
    let db_path = dir.path().join("credentials.db");

    let blob = {
        let service = open_service(&db_path);
        let session = service
            .register("alice", "correct-horse-battery")
            .expect("register should succeed");
        session
            .encrypt_payload(b"sealed before rotation")
            .expect("encrypt should succeed")
    };

    {
        let service = open_service(&db_path);
        service
            .rotate_password("alice", "correct-horse-battery", "fresh-stable-genius")
            .expect("rotate should succeed");
    }

    let service = open_service(&db_path);

    let result = service.authenticate("alice", "correct-horse-battery");
    assert!(matches!(result, Err(HubError::InvalidCredentials)));

    let session = service
        .authenticate("alice", "fresh-stable-genius")
        .expect("authenticate with new password should succeed");
    let decrypted = session
        .decrypt_payload(&blob)
        .expect("decrypt should succeed");
    assert_eq!(decrypted, b"sealed before rotation");
}

#[test]
fn test_duplicate_username_rejected() {
    let dir = tempdir().expect("temp dir should be created");
    let db_path = dir.path().join("credentials.db");

    let service = open_service(&db_path);
    service
        .register("alice", "correct-horse-battery")
        .expect("register should succeed");

    let result = service.register("alice", "completely-different");
    assert!(matches!(result, Err(HubError::DuplicateUsername)));
}

#[test]
fn test_auth_failures_are_indistinguishable() {
    let dir = tempdir().expect("temp dir should be created");
    let db_path = dir.path().join("credentials.db");

    let service = open_service(&db_path);
    service
        .register("alice", "correct-horse-battery")
        .expect("register should succeed");

    let unknown_user = service
        .authenticate("nobody", "correct-horse-battery")
        .expect_err("unknown user should fail");
    let wrong_password = service
        .authenticate("alice", "wrong-horse-battery")
        .expect_err("wrong password should fail");

    // Distinct variants for callers, one message for humans
    assert!(matches!(unknown_user, HubError::UserNotFound));
    assert!(matches!(wrong_password, HubError::InvalidCredentials));
    assert_eq!(unknown_user.to_string(), wrong_password.to_string());
}

#[test]
fn test_tampered_payload_fails_decryption() {
    let dir = tempdir().expect("temp dir should be created");
    let db_path = dir.path().join("credentials.db");

    let service = open_service(&db_path);
    let session = service
        .register("alice", "correct-horse-battery")
        .expect("register should succeed");
    let blob = session
        .encrypt_payload(b"authenticated payload")
        .expect("encrypt should succeed");

    // Nonce, ciphertext body, and tag are all covered
    for index in [0, blob.len() / 2, blob.len() - 1] {
        let mut tampered = blob.clone();
        tampered[index] ^= 0x01;

        let result = session.decrypt_payload(&tampered);
        assert!(
            matches!(result, Err(HubError::DecryptionFailed)),
            "byte {} flip should fail decryption",
            index
        );
    }
}

#[test]
fn test_tampered_key_envelope_blocks_login() {
    let dir = tempdir().expect("temp dir should be created");
    let db_path = dir.path().join("credentials.db");

    {
        let service = open_service(&db_path);
        service
            .register("alice", "correct-horse-battery")
            .expect("register should succeed");
    }

    // Corrupt the stored envelope directly through the store
    let store = SqliteCredentialStore::open(&db_path).expect("open store should succeed");
    let record = store
        .fetch("alice")
        .expect("fetch should succeed")
        .expect("record should exist");
    let mut envelope = record.key_envelope.clone();
    let last = envelope.len() - 1;
    envelope[last] ^= 0x01;
    store
        .replace_credentials(&NewCredentialRecord {
            username: record.username.clone(),
            verifier: record.verifier.clone(),
            verifier_salt: record.verifier_salt.clone(),
            key_envelope: envelope,
        })
        .expect("replace should succeed");

    // Password still verifies but the data key can no longer be unwrapped
    let service = open_service(&db_path);
    let result = service.authenticate("alice", "correct-horse-battery");
    assert!(matches!(result, Err(HubError::DecryptionFailed)));
}
