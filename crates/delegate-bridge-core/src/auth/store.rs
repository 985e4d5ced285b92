/*
[INPUT]:  Status transitions, identities and errors from login strategies
[OUTPUT]: Current identity snapshot and change notifications for consumers
[POS]:    Auth layer - single mutable identity record with publish/subscribe
[UPDATE]: When store fields or mutation operations change
*/

use std::fmt;
use std::sync::Arc;

use tokio::sync::watch;
use tracing::debug;

use crate::http::Result;
use crate::types::Status;

use super::{AuthClient, Identity, ProviderAuth};

/// Point-in-time view of the identity record.
#[derive(Clone)]
pub struct IdentitySnapshot {
    pub status: Status,
    pub identity: Option<Identity>,
    pub error: Option<String>,
    pub auth_client: Option<Arc<dyn AuthClient>>,
    pub provider_mounted: bool,
}

impl Default for IdentitySnapshot {
    fn default() -> Self {
        Self {
            status: Status::Initializing,
            identity: None,
            error: None,
            auth_client: None,
            provider_mounted: false,
        }
    }
}

impl fmt::Debug for IdentitySnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdentitySnapshot")
            .field("status", &self.status)
            .field("identity", &self.identity)
            .field("error", &self.error)
            .field("auth_client", &self.auth_client.is_some())
            .field("provider_mounted", &self.provider_mounted)
            .finish()
    }
}

/// Partial update merged by [`IdentityStore::set_state`].
///
/// Unset fields are left as they are; `Some(None)` clears an optional field.
#[derive(Default, Clone)]
pub struct StatePatch {
    pub status: Option<Status>,
    pub identity: Option<Option<Identity>>,
    pub error: Option<Option<String>>,
    pub auth_client: Option<Option<Arc<dyn AuthClient>>>,
    pub provider_mounted: Option<bool>,
}

impl StatePatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(mut self, status: Status) -> Self {
        self.status = Some(status);
        self
    }

    pub fn identity(mut self, identity: Option<Identity>) -> Self {
        self.identity = Some(identity);
        self
    }

    pub fn error(mut self, error: Option<String>) -> Self {
        self.error = Some(error);
        self
    }

    pub fn auth_client(mut self, client: Option<Arc<dyn AuthClient>>) -> Self {
        self.auth_client = Some(client);
        self
    }

    pub fn provider_mounted(mut self, mounted: bool) -> Self {
        self.provider_mounted = Some(mounted);
        self
    }
}

/// Shared handle to the identity record.
///
/// Cloning yields another handle to the same record. All mutation goes through
/// the four `set_*` operations, each of which notifies subscribers.
#[derive(Clone)]
pub struct IdentityStore {
    state: Arc<watch::Sender<IdentitySnapshot>>,
}

impl IdentityStore {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(IdentitySnapshot::default());
        Self {
            state: Arc::new(tx),
        }
    }

    pub fn snapshot(&self) -> IdentitySnapshot {
        self.state.borrow().clone()
    }

    pub fn status(&self) -> Status {
        self.state.borrow().status
    }

    pub fn identity(&self) -> Option<Identity> {
        self.state.borrow().identity.clone()
    }

    pub fn error(&self) -> Option<String> {
        self.state.borrow().error.clone()
    }

    pub fn auth_client(&self) -> Option<Arc<dyn AuthClient>> {
        self.state.borrow().auth_client.clone()
    }

    pub fn is_provider_mounted(&self) -> bool {
        self.state.borrow().provider_mounted
    }

    /// Receiver that always holds the latest snapshot.
    pub fn subscribe(&self) -> watch::Receiver<IdentitySnapshot> {
        self.state.subscribe()
    }

    /// Merge the set fields of `patch` into the record.
    pub fn set_state(&self, patch: StatePatch) {
        self.state.send_modify(|state| {
            if let Some(status) = patch.status {
                state.status = status;
            }
            if let Some(identity) = patch.identity {
                state.identity = identity;
            }
            if let Some(error) = patch.error {
                state.error = error;
            }
            if let Some(client) = patch.auth_client {
                state.auth_client = client;
            }
            if let Some(mounted) = patch.provider_mounted {
                state.provider_mounted = mounted;
            }
        });
    }

    pub fn set_identity(&self, identity: Identity) {
        debug!("identity committed");
        self.state.send_modify(|state| {
            state.identity = Some(identity);
            state.status = Status::Success;
            state.error = None;
        });
    }

    /// Record a failure. A previously committed identity is kept.
    pub fn set_error(&self, message: impl Into<String>) {
        let message = message.into();
        debug!(error = %message, "identity store error");
        self.state.send_modify(|state| {
            state.status = Status::Error;
            state.error = Some(message);
        });
    }

    pub fn set_status(&self, status: Status) {
        debug!(%status, "status transition");
        self.state.send_modify(|state| state.status = status);
    }
}

impl Default for IdentityStore {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for IdentityStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdentityStore")
            .field("state", &*self.state.borrow())
            .finish()
    }
}

/// Read-only projection handed to consumers, plus logout.
#[derive(Clone)]
pub struct IdentityContext {
    store: IdentityStore,
    provider: ProviderAuth,
}

impl IdentityContext {
    pub fn new(provider: ProviderAuth) -> Self {
        Self {
            store: provider.store().clone(),
            provider,
        }
    }

    pub fn identity(&self) -> Option<Identity> {
        self.store.identity()
    }

    pub fn status(&self) -> Status {
        self.store.status()
    }

    pub fn error(&self) -> Option<String> {
        self.store.error()
    }

    pub fn subscribe(&self) -> watch::Receiver<IdentitySnapshot> {
        self.store.subscribe()
    }

    pub async fn clear(&self) -> Result<()> {
        self.provider.clear().await
    }
}
