/*
[INPUT]:  Chain wallet, remote login service, storage backend, identity store
[OUTPUT]: Persisted delegated identity committed to the store
[POS]:    Auth layer - shared sign-in-with-chain pipeline
[UPDATE]: When pipeline stages or their ordering change
*/

use std::sync::Arc;

use tracing::{Instrument, debug, info, info_span, warn};
use uuid::Uuid;

use crate::http::{IdentityError, Result};
use crate::types::{
    DelegationChain, LoginDetails, LoginRequest, PreparedMessage, SignedDelegation, Status,
};

use super::delegation::{now_nanos, unrestricted_delegation};
use super::storage::store_identity;
use super::{
    DelegatedIdentity, EvmWallet, Identity, IdentityStore, KeyValueStorage, LoginService,
    SessionKey, SolanaWallet, StatePatch, WalletConnector,
};

/// Sign-in pipeline shared by every chain wallet.
///
/// Callers must not run two `login` calls on the same store concurrently.
pub struct ChainSignatureLogin<W, S> {
    store: IdentityStore,
    wallet: W,
    service: S,
    storage: Arc<dyn KeyValueStorage>,
}

pub type EthereumLogin<S> = ChainSignatureLogin<EvmWallet, S>;
pub type SolanaLogin<S> = ChainSignatureLogin<SolanaWallet, S>;

impl<W, S> ChainSignatureLogin<W, S>
where
    W: WalletConnector,
    S: LoginService,
{
    pub fn new(store: IdentityStore, wallet: W, service: S, storage: Arc<dyn KeyValueStorage>) -> Self {
        Self {
            store,
            wallet,
            service,
            storage,
        }
    }

    pub fn wallet(&self) -> &W {
        &self.wallet
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    /// Step 1: ask the wallet for its address
    pub async fn connect_wallet(&self) -> Result<String> {
        self.store.set_status(Status::Connecting);
        self.wallet.connect().await
    }

    /// Step 2: obtain a single-use challenge for the address
    pub async fn prepare_message(&self, address: &str) -> Result<PreparedMessage> {
        self.store.set_status(Status::Preparing);
        self.service
            .prepare_message(address)
            .await
            .map_err(|e| IdentityError::PrepareLogin(e.to_string()))?
            .into_result()
            .map_err(IdentityError::PrepareLogin)
    }

    /// Step 3: have the wallet sign the exact challenge bytes
    pub async fn sign_message(&self, message: &[u8]) -> Result<Vec<u8>> {
        self.store.set_status(Status::Signing);
        self.wallet.sign_message(message).await
    }

    /// Step 4: exchange the proof for a session
    pub async fn authenticate(&self, request: &LoginRequest) -> Result<LoginDetails> {
        self.store.set_status(Status::Authenticating);
        self.service
            .login(request)
            .await
            .map_err(|e| IdentityError::Login(e.to_string()))?
            .into_result()
            .map_err(IdentityError::Login)
    }

    /// Step 5: fetch the delegation issued for the session
    pub async fn get_delegation(&self, session_id: &str) -> Result<SignedDelegation> {
        self.store.set_status(Status::Delegating);
        self.service
            .get_delegation(session_id)
            .await
            .map_err(|e| IdentityError::GetDelegation(e.to_string()))?
            .into_result()
            .map_err(IdentityError::GetDelegation)
    }

    /// Complete authentication flow
    ///
    /// 1. Connect wallet
    /// 2. Prepare challenge
    /// 3. Sign challenge
    /// 4. Authenticate with the service
    /// 5. Fetch delegation
    /// 6. Build identity
    /// 7. Persist, then commit to the store
    ///
    /// On failure the store ends in `Status::Error` and its identity is untouched.
    pub async fn login(&self) -> Result<Identity> {
        let span = info_span!(
            "chain_login",
            attempt_id = %Uuid::new_v4(),
            chain = %self.wallet.chain()
        );

        match self.run_pipeline().instrument(span).await {
            Ok(identity) => Ok(identity),
            Err(e) => {
                warn!(error = %e, chain = %self.wallet.chain(), "chain login failed");
                self.store.set_error(e.to_string());
                Err(e)
            }
        }
    }

    async fn run_pipeline(&self) -> Result<Identity> {
        self.store.set_state(StatePatch::new().error(None));
        let session = Arc::new(SessionKey::generate_ed25519());

        let address = self.connect_wallet().await?;
        debug!(%address, "wallet connected");

        let prepared = self.prepare_message(&address).await?;
        debug!(message_id = %prepared.message_id, "challenge prepared");

        let signature = self.sign_message(&prepared.message).await?;

        let request = LoginRequest {
            signature,
            message_id: prepared.message_id,
            session_public_key: session.public_key_der(),
        };
        let details = self.authenticate(&request).await?;
        debug!(session_id = %details.session_id, "proof accepted");

        let signed = self.get_delegation(&details.session_id).await?;
        check_issued_delegation(&signed, &request.session_public_key)?;

        let identity = create_identity(session, &signed, details.authority_public_key);

        store_identity(self.storage.as_ref(), identity.session_key(), identity.chain()).await?;

        let identity = Identity::Delegated(identity);
        self.store.set_identity(identity.clone());
        info!(%address, "chain login succeeded");
        Ok(identity)
    }
}

/// The issued delegation must name this attempt's session key and still be live.
fn check_issued_delegation(signed: &SignedDelegation, session_public_key: &[u8]) -> Result<()> {
    if signed.delegation.pubkey != session_public_key {
        return Err(IdentityError::GetDelegation(
            "delegation issued for a different session key".to_string(),
        ));
    }
    if signed.delegation.expiration <= now_nanos() {
        return Err(IdentityError::GetDelegation("delegation already expired".to_string()));
    }
    Ok(())
}

/// Step 6: build a one-link chain rooted at the authority key.
///
/// Pure construction; the issued delegation is rebuilt without target
/// restriction so the session is valid for all targets.
pub fn create_identity(
    session: Arc<SessionKey>,
    signed: &SignedDelegation,
    authority_public_key: Vec<u8>,
) -> DelegatedIdentity {
    let chain = DelegationChain::single(authority_public_key, unrestricted_delegation(signed));
    DelegatedIdentity::new(session, chain)
}
