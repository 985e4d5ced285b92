/*
[INPUT]:  Test configuration and mock server requirements
[OUTPUT]: Shared test utilities, fakes, and fixtures
[POS]:    Test infrastructure - shared across all test modules
[UPDATE]: When adding new test patterns or fixtures
*/

//! Common test utilities for delegate-bridge-core tests

#![allow(dead_code)]

use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use delegate_bridge_core::auth::delegation::now_nanos;
use delegate_bridge_core::auth::{
    AuthClient, AuthClientFactory, ProviderLoginOptions, Reloader,
};
use delegate_bridge_core::{
    DelegatedIdentity, Delegation, DelegationChain, Identity, IdentityError, IdentityStore,
    KeyValueStorage, MemoryStorage, Result, SessionKey, SignedDelegation, Status,
};
use uuid::Uuid;
use wiremock::MockServer;

pub const HOUR_NS: u64 = 3_600_000_000_000;

/// Setup a mock HTTP server for testing
pub async fn setup_mock_server() -> MockServer {
    MockServer::start().await
}

pub fn temp_dir() -> PathBuf {
    let mut path = std::env::temp_dir();
    path.push(format!("delegate-bridge-test-{}", Uuid::new_v4()));
    path
}

/// Delegated identity whose single link expires `ttl_ns` from now
pub fn delegated_identity(ttl_ns: u64) -> DelegatedIdentity {
    let session = Arc::new(SessionKey::generate_ed25519());
    let chain = DelegationChain::single(
        vec![0x11; 44],
        SignedDelegation {
            delegation: Delegation::new(session.public_key_der(), now_nanos() + ttl_ns, None),
            signature: vec![0x22; 64],
        },
    );
    DelegatedIdentity::new(session, chain)
}

pub fn chain_of(identity: Option<Identity>) -> Option<DelegationChain> {
    identity.and_then(|identity| identity.as_delegated().map(|d| d.chain().clone()))
}

/// Storage that accepts reads but fails every write
#[derive(Debug, Default)]
pub struct FailingStorage {
    inner: MemoryStorage,
}

#[async_trait]
impl KeyValueStorage for FailingStorage {
    async fn get(&self, key: &str) -> io::Result<Option<String>> {
        self.inner.get(key).await
    }

    async fn set(&self, _key: &str, _value: &str) -> io::Result<()> {
        Err(io::Error::other("disk full"))
    }

    async fn remove(&self, key: &str) -> io::Result<()> {
        self.inner.remove(key).await
    }
}

/// Storage that fails writes to a single key and passes everything else through
#[derive(Debug, Default)]
pub struct KeyFailingStorage {
    pub inner: MemoryStorage,
    failing_key: &'static str,
}

impl KeyFailingStorage {
    pub fn new(failing_key: &'static str) -> Self {
        Self {
            inner: MemoryStorage::new(),
            failing_key,
        }
    }
}

#[async_trait]
impl KeyValueStorage for KeyFailingStorage {
    async fn get(&self, key: &str) -> io::Result<Option<String>> {
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str) -> io::Result<()> {
        if key == self.failing_key {
            return Err(io::Error::other("disk full"));
        }
        self.inner.set(key, value).await
    }

    async fn remove(&self, key: &str) -> io::Result<()> {
        self.inner.remove(key).await
    }
}

/// Behaviour shared by every client a [`FakeFactory`] creates
#[derive(Default)]
pub struct FakeProvider {
    pub login_calls: AtomicUsize,
    pub logout_calls: AtomicUsize,
    pub login_error: Mutex<Option<String>>,
    pub logout_error: Mutex<Option<String>>,
    pub identity: Mutex<Option<Identity>>,
}

pub struct FakeAuthClient {
    provider: Arc<FakeProvider>,
}

#[async_trait]
impl AuthClient for FakeAuthClient {
    async fn login(&self, _options: ProviderLoginOptions) -> Result<()> {
        self.provider.login_calls.fetch_add(1, Ordering::SeqCst);
        match self.provider.login_error.lock().unwrap().clone() {
            Some(message) => Err(IdentityError::Provider(message)),
            None => Ok(()),
        }
    }

    fn identity(&self) -> Identity {
        self.provider
            .identity
            .lock()
            .unwrap()
            .clone()
            .unwrap_or(Identity::Anonymous)
    }

    async fn logout(&self) -> Result<()> {
        self.provider.logout_calls.fetch_add(1, Ordering::SeqCst);
        match self.provider.logout_error.lock().unwrap().clone() {
            Some(message) => Err(IdentityError::Provider(message)),
            None => Ok(()),
        }
    }
}

pub struct FakeFactory {
    pub provider: Arc<FakeProvider>,
    pub created: AtomicUsize,
}

impl FakeFactory {
    pub fn new(provider: Arc<FakeProvider>) -> Self {
        Self {
            provider,
            created: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl AuthClientFactory for FakeFactory {
    async fn create(&self) -> Result<Arc<dyn AuthClient>> {
        self.created.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(FakeAuthClient {
            provider: self.provider.clone(),
        }))
    }
}

/// Records each reload together with the store status at that moment
pub struct RecordingReloader {
    store: IdentityStore,
    pub statuses: Mutex<Vec<Status>>,
}

impl RecordingReloader {
    pub fn new(store: IdentityStore) -> Self {
        Self {
            store,
            statuses: Mutex::new(Vec::new()),
        }
    }

    pub fn reloads(&self) -> Vec<Status> {
        self.statuses.lock().unwrap().clone()
    }
}

impl Reloader for RecordingReloader {
    fn reload(&self) {
        self.statuses.lock().unwrap().push(self.store.status());
    }
}
