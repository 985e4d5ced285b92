/*
[INPUT]:  Application config, storage backend, wallet private key
[OUTPUT]: Restored/committed session state and printable status reports
[POS]:    Session layer - process-level consumer of the identity core
[UPDATE]: When CLI commands or report fields change
*/

use std::sync::Arc;

use anyhow::{Context, Result, bail};
use chrono::{DateTime, Utc};
use delegate_bridge_core::auth::{clear_session, restore_session};
use delegate_bridge_core::{
    Chain, ChainSignatureLogin, EvmWallet, Identity, IdentityStore, KeyValueStorage,
    RestoreOutcome, ServiceClient, SolanaWallet, Status,
};
use serde::Serialize;
use tracing::info;

use crate::config::AppConfig;

/// Summary of the current session printed by the CLI
#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    pub status: Status,
    pub authority_public_key: Option<String>,
    pub session_public_key: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub error: Option<String>,
}

impl StatusReport {
    pub fn from_store(store: &IdentityStore) -> Self {
        let snapshot = store.snapshot();
        let delegated = snapshot.identity.as_ref().and_then(Identity::as_delegated);
        Self {
            status: snapshot.status,
            authority_public_key: delegated.map(|d| hex::encode(d.public_key())),
            session_public_key: delegated.map(|d| hex::encode(d.session_key().public_key_der())),
            expires_at: delegated
                .and_then(|d| d.chain().expiration())
                .map(|nanos| DateTime::<Utc>::from_timestamp_nanos(nanos.min(i64::MAX as u64) as i64)),
            error: snapshot.error,
        }
    }
}

/// Restore-on-load: seed a fresh store from persisted session material
pub async fn restore(storage: &dyn KeyValueStorage) -> (IdentityStore, RestoreOutcome) {
    let store = IdentityStore::new();
    let outcome = restore_session(storage, &store).await;
    (store, outcome)
}

/// Sign in with a locally held wallet key for the configured chain
pub async fn login_with_key(
    config: &AppConfig,
    chain: Chain,
    private_key: &str,
    storage: Arc<dyn KeyValueStorage>,
) -> Result<IdentityStore> {
    let (store, _) = restore(storage.as_ref()).await;
    let service = ServiceClient::with_config(config.client_config(), &config.service_url, chain)
        .context("build service client")?;

    match chain {
        Chain::Ethereum => {
            let wallet = EvmWallet::new(private_key).context("load ethereum key")?;
            info!(address = wallet.address(), "signing in");
            ChainSignatureLogin::new(store.clone(), wallet, service, storage)
                .login()
                .await
                .context("ethereum login")?;
        }
        Chain::Solana => {
            let wallet = SolanaWallet::new(private_key).context("load solana key")?;
            info!(address = wallet.address(), "signing in");
            ChainSignatureLogin::new(store.clone(), wallet, service, storage)
                .login()
                .await
                .context("solana login")?;
        }
        Chain::Arweave => bail!("{chain} sign-in needs an external wallet, not a local key"),
    }

    Ok(store)
}

/// Drop the persisted session and report the resulting state
pub async fn logout(storage: &dyn KeyValueStorage) -> Result<StatusReport> {
    clear_session(storage).await.context("clear persisted session")?;
    let (store, _) = restore(storage).await;
    info!("session cleared");
    Ok(StatusReport::from_store(&store))
}

#[cfg(test)]
mod tests {
    use super::*;
    use delegate_bridge_core::auth::delegation::now_nanos;
    use delegate_bridge_core::auth::store_identity;
    use delegate_bridge_core::{Delegation, DelegationChain, MemoryStorage, SessionKey, SignedDelegation};
    use tokio_test::assert_ok;

    async fn seeded_storage(expiration: u64) -> MemoryStorage {
        let storage = MemoryStorage::new();
        let session = SessionKey::generate_ed25519();
        let chain = DelegationChain::single(
            vec![0xab; 4],
            SignedDelegation {
                delegation: Delegation::new(session.public_key_der(), expiration, None),
                signature: vec![1; 64],
            },
        );
        assert_ok!(store_identity(&storage, &session, &chain).await);
        storage
    }

    #[tokio::test]
    async fn test_restore_reports_active_session() {
        let expiration = now_nanos() + 3_600_000_000_000;
        let storage = seeded_storage(expiration).await;

        let (store, outcome) = restore(&storage).await;
        assert_eq!(outcome, RestoreOutcome::Restored);

        let report = StatusReport::from_store(&store);
        assert_eq!(report.status, Status::Success);
        assert_eq!(report.authority_public_key.as_deref(), Some("abababab"));
        assert!(report.expires_at.is_some_and(|at| at > Utc::now()));
    }

    #[tokio::test]
    async fn test_login_with_key_rejects_arweave() {
        let config: AppConfig = serde_yaml::from_str("service_url: http://127.0.0.1:9\n").unwrap();
        let storage: Arc<dyn KeyValueStorage> = Arc::new(MemoryStorage::new());

        let err = login_with_key(&config, Chain::Arweave, "unused", storage)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("arweave sign-in needs an external wallet"));
    }

    #[tokio::test]
    async fn test_logout_clears_session() {
        let storage = seeded_storage(now_nanos() + 3_600_000_000_000).await;

        let report = assert_ok!(logout(&storage).await);
        assert_eq!(report.status, Status::Idle);
        assert!(report.authority_public_key.is_none());
        assert!(report.error.is_none());
    }
}
