/*
[INPUT]:  File-backed storage in a temporary directory
[OUTPUT]: Test results for persist-then-restore behaviour
[POS]:    Integration tests - session persistence across restarts
[UPDATE]: When storage format or restore semantics change
*/

mod common;

use std::sync::Arc;

use common::{HOUR_NS, KeyFailingStorage, delegated_identity, temp_dir};
use delegate_bridge_core::auth::delegation::now_nanos;
use delegate_bridge_core::auth::{
    KEY_STORAGE_DELEGATION, KEY_STORAGE_KEY, MockLoginService, restore_session, store_identity,
};
use delegate_bridge_core::{
    Chain, ChainSignatureLogin, Delegation, FileStorage, IdentityStore, KeyValueStorage,
    LoginDetails, MockWallet, PreparedMessage, RestoreOutcome, ServiceResponse, SignedDelegation,
    Status,
};
use tokio_test::assert_ok;

#[tokio::test]
async fn test_store_then_restore_reproduces_canonical_chain() {
    let dir = temp_dir();
    let identity = delegated_identity(HOUR_NS);
    let original_json = assert_ok!(identity.chain().to_json());

    let storage = FileStorage::new(&dir);
    assert_ok!(store_identity(&storage, identity.session_key(), identity.chain()).await);

    // Simulated restart: fresh storage handle and store
    let reloaded = FileStorage::new(&dir);
    let store = IdentityStore::new();
    assert_eq!(restore_session(&reloaded, &store).await, RestoreOutcome::Restored);

    let restored = store.identity().expect("identity restored");
    let restored = restored.as_delegated().expect("delegated identity");
    assert_eq!(assert_ok!(restored.chain().to_json()), original_json);
    assert_eq!(
        restored.session_key().public_key_der(),
        identity.session_key().public_key_der()
    );
    assert_eq!(
        assert_ok!(reloaded.get(KEY_STORAGE_DELEGATION).await),
        Some(original_json)
    );

    std::fs::remove_dir_all(dir).unwrap();
}

#[tokio::test]
async fn test_restore_without_directory_is_idle() {
    let storage = FileStorage::new(temp_dir());
    let store = IdentityStore::new();

    assert_eq!(restore_session(&storage, &store).await, RestoreOutcome::NoSession);
    assert_eq!(store.status(), Status::Idle);
    assert!(store.identity().is_none());
    assert!(store.error().is_none());
}

#[tokio::test]
async fn test_chain_login_survives_restart() {
    let dir = temp_dir();
    let storage = Arc::new(FileStorage::new(&dir));
    let store = IdentityStore::new();

    let pipeline = ChainSignatureLogin::new(
        store.clone(),
        MockWallet::new(Chain::Ethereum, "0xabc", b"sig1"),
        MockLoginService::new(
            ServiceResponse::Ok(PreparedMessage {
                message: b"challenge".to_vec(),
                message_id: "msg-1".to_string(),
            }),
            ServiceResponse::Ok(LoginDetails {
                session_id: "sess-1".to_string(),
                authority_public_key: vec![0x42; 44],
            }),
            ServiceResponse::Ok(SignedDelegation {
                delegation: Delegation::new(vec![0x01; 44], now_nanos() + HOUR_NS, Some(vec![])),
                signature: vec![0x02; 64],
            }),
        ),
        storage.clone(),
    );
    let identity = assert_ok!(pipeline.login().await);
    let committed = identity.as_delegated().expect("delegated").chain().clone();

    let restarted = IdentityStore::new();
    assert_eq!(
        restore_session(&FileStorage::new(&dir), &restarted).await,
        RestoreOutcome::Restored
    );
    assert_eq!(restarted.status(), Status::Success);
    let restored = restarted.identity().expect("restored identity");
    assert_eq!(restored.as_delegated().map(|d| d.chain().clone()), Some(committed));

    std::fs::remove_dir_all(dir).unwrap();
}

#[tokio::test]
async fn test_failed_chain_write_keeps_previous_session() {
    let storage = KeyFailingStorage::new(KEY_STORAGE_DELEGATION);
    let first = delegated_identity(HOUR_NS);
    assert_ok!(store_identity(&storage.inner, first.session_key(), first.chain()).await);
    let first_key_json = assert_ok!(storage.get(KEY_STORAGE_KEY).await);

    let second = delegated_identity(HOUR_NS);
    let err = store_identity(&storage, second.session_key(), second.chain())
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Failed to persist delegation chain: disk full");
    assert_eq!(assert_ok!(storage.get(KEY_STORAGE_KEY).await), first_key_json);

    let store = IdentityStore::new();
    assert_eq!(restore_session(&storage, &store).await, RestoreOutcome::Restored);
    let restored = store.identity().expect("restored identity");
    let restored = restored.as_delegated().expect("delegated identity");
    assert_eq!(
        restored.session_key().public_key_der(),
        first.session_key().public_key_der()
    );
    assert_eq!(restored.chain(), first.chain());
}

#[tokio::test]
async fn test_failed_first_chain_write_leaves_no_session() {
    let storage = KeyFailingStorage::new(KEY_STORAGE_DELEGATION);
    let identity = delegated_identity(HOUR_NS);

    assert!(
        store_identity(&storage, identity.session_key(), identity.chain())
            .await
            .is_err()
    );
    assert_eq!(assert_ok!(storage.get(KEY_STORAGE_KEY).await), None);

    let store = IdentityStore::new();
    assert_eq!(restore_session(&storage, &store).await, RestoreOutcome::NoSession);
    assert_eq!(store.status(), Status::Idle);
    assert!(store.error().is_none());
}
