/*
[INPUT]:  Auth client factory, reload hook, storage backend, login configuration
[OUTPUT]: Initialized provider client, provider-hosted login and logout
[POS]:    Auth layer - provider client lifecycle and provider-hosted strategy
[UPDATE]: When provider login options or logout recovery change
*/

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{Instrument, error, info, info_span};
use url::Url;
use uuid::Uuid;

use crate::http::{IdentityError, Result};
use crate::types::Status;

use super::delegation::DEFAULT_MAX_TIME_TO_LIVE_NS;
use super::storage::clear_session;
use super::{Identity, IdentityStore, KeyValueStorage, StatePatch};

pub const DEFAULT_IDENTITY_PROVIDER: &str = "https://identity.ic0.app/#authorize";
pub const DEFAULT_WINDOW_WIDTH: u32 = 500;
pub const DEFAULT_WINDOW_HEIGHT: u32 = 705;

const LOGIN_FAILED_FALLBACK: &str = "Login failed";

/// Client for a provider-hosted identity service.
///
/// `login` resolves once the provider flow completes; there are no completion
/// callbacks to override.
#[async_trait]
pub trait AuthClient: Send + Sync {
    async fn login(&self, options: ProviderLoginOptions) -> Result<()>;

    /// Identity currently held by the client (anonymous before login).
    fn identity(&self) -> Identity;

    async fn logout(&self) -> Result<()>;
}

#[async_trait]
pub trait AuthClientFactory: Send + Sync {
    async fn create(&self) -> Result<Arc<dyn AuthClient>>;
}

/// Last-resort recovery once in-memory auth state can no longer be trusted.
pub trait Reloader: Send + Sync {
    fn reload(&self);
}

/// Popup window size and optional placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowGeometry {
    pub width: u32,
    pub height: u32,
    pub left: Option<u32>,
    pub top: Option<u32>,
}

impl WindowGeometry {
    /// Default-sized window centred on a screen of the given size.
    pub fn centered(screen_width: u32, screen_height: u32) -> Self {
        Self {
            width: DEFAULT_WINDOW_WIDTH,
            height: DEFAULT_WINDOW_HEIGHT,
            left: Some(screen_width.saturating_sub(DEFAULT_WINDOW_WIDTH) / 2),
            top: Some(screen_height.saturating_sub(DEFAULT_WINDOW_HEIGHT) / 2),
        }
    }

    pub fn to_window_features(&self) -> String {
        let mut features = format!(
            "toolbar=0,location=0,menubar=0,width={},height={}",
            self.width, self.height
        );
        if let Some(left) = self.left {
            features.push_str(&format!(",left={left}"));
        }
        if let Some(top) = self.top {
            features.push_str(&format!(",top={top}"));
        }
        features
    }
}

impl Default for WindowGeometry {
    fn default() -> Self {
        Self {
            width: DEFAULT_WINDOW_WIDTH,
            height: DEFAULT_WINDOW_HEIGHT,
            left: None,
            top: None,
        }
    }
}

/// Caller overrides for the provider login; unset fields use the defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderLoginConfig {
    #[serde(default)]
    pub identity_provider: Option<Url>,
    #[serde(default)]
    pub max_time_to_live_ns: Option<u64>,
    #[serde(default)]
    pub window: Option<WindowGeometry>,
}

/// Fully resolved options handed to [`AuthClient::login`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderLoginOptions {
    pub identity_provider: Url,
    pub max_time_to_live_ns: u64,
    pub window_features: String,
}

impl ProviderLoginConfig {
    pub fn resolve(&self) -> Result<ProviderLoginOptions> {
        let identity_provider = match &self.identity_provider {
            Some(url) => url.clone(),
            None => Url::parse(DEFAULT_IDENTITY_PROVIDER)?,
        };
        Ok(ProviderLoginOptions {
            identity_provider,
            max_time_to_live_ns: self.max_time_to_live_ns.unwrap_or(DEFAULT_MAX_TIME_TO_LIVE_NS),
            window_features: self.window.unwrap_or_default().to_window_features(),
        })
    }
}

/// Owns the provider client lifecycle for one identity store.
#[derive(Clone)]
pub struct ProviderAuth {
    store: IdentityStore,
    factory: Arc<dyn AuthClientFactory>,
    reloader: Arc<dyn Reloader>,
    storage: Arc<dyn KeyValueStorage>,
}

impl ProviderAuth {
    pub fn new(
        store: IdentityStore,
        factory: Arc<dyn AuthClientFactory>,
        reloader: Arc<dyn Reloader>,
        storage: Arc<dyn KeyValueStorage>,
    ) -> Self {
        Self {
            store,
            factory,
            reloader,
            storage,
        }
    }

    pub fn store(&self) -> &IdentityStore {
        &self.store
    }

    /// Mark the provider integration as mounted
    pub fn mount(&self) {
        self.store.set_state(StatePatch::new().provider_mounted(true));
    }

    pub fn unmount(&self) {
        self.store.set_state(StatePatch::new().provider_mounted(false));
    }

    /// Return the current client, creating one only if none exists.
    pub async fn ensure_initialized(&self) -> Result<Arc<dyn AuthClient>> {
        if let Some(client) = self.store.auth_client() {
            return Ok(client);
        }
        self.create_auth_client().await
    }

    /// Create a fresh client and make it the current one.
    pub async fn create_auth_client(&self) -> Result<Arc<dyn AuthClient>> {
        let client = self.factory.create().await?;
        let mut patch = StatePatch::new().auth_client(Some(client.clone()));
        if self.store.status() == Status::Initializing {
            patch = patch.status(Status::Idle);
        }
        self.store.set_state(patch);
        Ok(client)
    }

    /// Provider-hosted login.
    ///
    /// Preconditions are checked before anything is awaited; a failed check
    /// only records the error.
    pub async fn login(&self, config: &ProviderLoginConfig) -> Result<Identity> {
        let client = match self.check_login_preconditions() {
            Ok(client) => client,
            Err(e) => {
                self.store.set_error(e.to_string());
                return Err(e);
            }
        };
        let options = match config.resolve() {
            Ok(options) => options,
            Err(e) => {
                self.store.set_error(e.to_string());
                return Err(e);
            }
        };

        self.store.set_state(
            StatePatch::new()
                .status(Status::Authenticating)
                .error(None),
        );

        let span = info_span!("provider_login", attempt_id = %Uuid::new_v4());
        match client.login(options).instrument(span).await {
            Ok(()) => {
                let identity = client.identity();
                self.store.set_identity(identity.clone());
                info!("provider login succeeded");
                Ok(identity)
            }
            Err(e) => {
                let message = match e.to_string() {
                    message if message.trim().is_empty() => LOGIN_FAILED_FALLBACK.to_string(),
                    message => message,
                };
                self.store.set_error(message.clone());
                Err(IdentityError::Provider(message))
            }
        }
    }

    fn check_login_preconditions(&self) -> Result<Arc<dyn AuthClient>> {
        let snapshot = self.store.snapshot();
        if !snapshot.provider_mounted {
            return Err(IdentityError::ProviderNotMounted);
        }
        let client = snapshot
            .auth_client
            .ok_or(IdentityError::ClientNotInitialized)?;
        if snapshot
            .identity
            .as_ref()
            .is_some_and(Identity::is_authenticated)
        {
            return Err(IdentityError::AlreadyAuthenticated);
        }
        Ok(client)
    }

    /// Log out, drop persisted session material and start over with a fresh client.
    ///
    /// If logging out fails the error is recorded and the reloader is invoked once.
    pub async fn clear(&self) -> Result<()> {
        let Some(client) = self.store.auth_client() else {
            let e = IdentityError::ClientNotInitialized;
            self.store.set_error(e.to_string());
            return Err(e);
        };

        if let Err(e) = self.logout(client.as_ref()).await {
            error!(error = %e, "logout failed, reloading");
            self.store.set_error(e.to_string());
            self.reloader.reload();
            return Err(e);
        }

        let fresh = match self.factory.create().await {
            Ok(fresh) => fresh,
            Err(e) => {
                self.store.set_error(e.to_string());
                return Err(e);
            }
        };
        self.store.set_state(
            StatePatch::new()
                .auth_client(Some(fresh))
                .identity(None)
                .status(Status::Idle)
                .error(None),
        );
        info!("logged out");
        Ok(())
    }

    async fn logout(&self, client: &dyn AuthClient) -> Result<()> {
        client
            .logout()
            .await
            .map_err(|e| IdentityError::Logout(e.to_string()))?;
        clear_session(self.storage.as_ref())
            .await
            .map_err(|e| IdentityError::Logout(e.to_string()))
    }
}

impl fmt::Debug for ProviderAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderAuth")
            .field("store", &self.store)
            .finish_non_exhaustive()
    }
}
