/*
[INPUT]:  Signer extension, storage backend, target list and TTL
[OUTPUT]: Persisted delegated identity committed to the store
[POS]:    Auth layer - browser-extension (local signer) login strategy
[UPDATE]: When the extension delegation request changes
*/

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{Instrument, debug, info, info_span, warn};
use uuid::Uuid;

use crate::http::{IdentityError, Result};
use crate::types::encoding::{hex_bytes, opt_hex_list};
use crate::types::{DelegationChain, DelegationRequest, SignedDelegation, Status};

use super::delegation::EXTENSION_MAX_TIME_TO_LIVE_NS;
use super::storage::store_identity;
use super::{DelegatedIdentity, Identity, IdentityStore, KeyValueStorage, SessionKey, StatePatch};

/// Delegation granted by the extension for the requested session key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtensionGrant {
    #[serde(rename = "publicKey", with = "hex_bytes")]
    pub public_key: Vec<u8>,
    pub delegations: Vec<SignedDelegation>,
}

/// Signer extension able to grant delegations without a remote round trip.
#[async_trait]
pub trait ExtensionSigner: Send + Sync {
    /// Check the extension is present and ask the user for permission
    async fn connect(&self) -> Result<()>;

    async fn request_delegation(&self, request: &DelegationRequest) -> Result<ExtensionGrant>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtensionLoginConfig {
    /// `None` or an empty list grants access to every target
    #[serde(default, with = "opt_hex_list")]
    pub targets: Option<Vec<Vec<u8>>>,
    #[serde(default = "default_extension_ttl")]
    pub max_time_to_live_ns: u64,
}

fn default_extension_ttl() -> u64 {
    EXTENSION_MAX_TIME_TO_LIVE_NS
}

impl Default for ExtensionLoginConfig {
    fn default() -> Self {
        Self {
            targets: None,
            max_time_to_live_ns: default_extension_ttl(),
        }
    }
}

/// Extension login. Like the chain pipeline it does not guard against
/// concurrent calls on the same store.
pub struct ExtensionLogin<E> {
    store: IdentityStore,
    extension: E,
    storage: Arc<dyn KeyValueStorage>,
    config: ExtensionLoginConfig,
}

impl<E: ExtensionSigner> ExtensionLogin<E> {
    pub fn new(
        store: IdentityStore,
        extension: E,
        storage: Arc<dyn KeyValueStorage>,
        config: ExtensionLoginConfig,
    ) -> Self {
        Self {
            store,
            extension,
            storage,
            config,
        }
    }

    pub fn extension(&self) -> &E {
        &self.extension
    }

    pub async fn login(&self) -> Result<Identity> {
        let span = info_span!("extension_login", attempt_id = %Uuid::new_v4());
        match self.run().instrument(span).await {
            Ok(identity) => Ok(identity),
            Err(e) => {
                warn!(error = %e, "extension login failed");
                self.store.set_error(e.to_string());
                Err(e)
            }
        }
    }

    async fn run(&self) -> Result<Identity> {
        self.store.set_state(
            StatePatch::new()
                .status(Status::Connecting)
                .error(None),
        );
        let session = Arc::new(SessionKey::generate_ecdsa());
        self.extension.connect().await?;

        self.store.set_status(Status::Delegating);
        let request = DelegationRequest {
            session_public_key: session.public_key_der(),
            targets: self.config.targets.clone(),
            max_time_to_live_ns: self.config.max_time_to_live_ns,
        };
        let grant = self.extension.request_delegation(&request).await?;
        if grant.delegations.is_empty() {
            return Err(IdentityError::InvalidResponse(
                "extension granted no delegations".to_string(),
            ));
        }
        debug!(links = grant.delegations.len(), "extension granted delegation");

        let chain = DelegationChain::from_delegations(grant.public_key, grant.delegations);
        let identity = DelegatedIdentity::new(session, chain);

        store_identity(self.storage.as_ref(), identity.session_key(), identity.chain()).await?;

        let identity = Identity::Delegated(identity);
        self.store.set_identity(identity.clone());
        info!("extension login succeeded");
        Ok(identity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use crate::auth::MemoryStorage;
    use crate::auth::delegation::now_nanos;
    use crate::auth::storage::load_session;
    use crate::types::Delegation;

    #[derive(Default)]
    struct FakeExtension {
        absent: bool,
        requests: Mutex<Vec<DelegationRequest>>,
    }

    #[async_trait]
    impl ExtensionSigner for FakeExtension {
        async fn connect(&self) -> Result<()> {
            if self.absent {
                return Err(IdentityError::Wallet("extension not installed".to_string()));
            }
            Ok(())
        }

        async fn request_delegation(&self, request: &DelegationRequest) -> Result<ExtensionGrant> {
            self.requests.lock().unwrap().push(request.clone());
            Ok(ExtensionGrant {
                public_key: vec![0xee; 44],
                delegations: vec![SignedDelegation {
                    delegation: Delegation::new(
                        request.session_public_key.clone(),
                        now_nanos() + request.max_time_to_live_ns,
                        request.targets.clone(),
                    ),
                    signature: vec![3; 64],
                }],
            })
        }
    }

    #[tokio::test]
    async fn test_extension_login_persists_and_commits() {
        let store = IdentityStore::new();
        let storage = Arc::new(MemoryStorage::new());
        let login = ExtensionLogin::new(
            store.clone(),
            FakeExtension::default(),
            storage.clone(),
            ExtensionLoginConfig::default(),
        );

        let identity = login.login().await.unwrap();
        assert!(identity.is_authenticated());
        assert_eq!(store.status(), Status::Success);

        let request = login.extension().requests.lock().unwrap()[0].clone();
        assert_eq!(request.targets, None);
        assert_eq!(request.max_time_to_live_ns, 8 * 3_600_000_000_000);
        assert_eq!(request.session_public_key.len(), 91);

        let (session, chain) = load_session(storage.as_ref()).await.unwrap().unwrap();
        assert_eq!(session.public_key_der(), request.session_public_key);
        assert_eq!(chain.public_key, vec![0xee; 44]);
    }

    #[tokio::test]
    async fn test_extension_missing_sets_error() {
        let store = IdentityStore::new();
        let storage = Arc::new(MemoryStorage::new());
        let login = ExtensionLogin::new(
            store.clone(),
            FakeExtension {
                absent: true,
                ..Default::default()
            },
            storage.clone(),
            ExtensionLoginConfig {
                targets: Some(vec![]),
                max_time_to_live_ns: 1_000,
            },
        );

        let err = login.login().await.unwrap_err();
        assert_eq!(err.to_string(), "Wallet error: extension not installed");
        assert_eq!(store.status(), Status::Error);
        assert!(store.identity().is_none());
        assert!(load_session(storage.as_ref()).await.unwrap().is_none());
    }
}
