/*
[INPUT]:  Wallets, signer extensions, provider clients, remote service, storage
[OUTPUT]: Delegated identities, identity store state and persisted sessions
[POS]:    Auth layer - identity state machine and login strategies
[UPDATE]: When login strategies or session handling change
*/

pub mod chain;
pub mod delegation;
pub mod evm_wallet;
pub mod extension;
pub mod identity;
pub mod provider;
pub mod service;
pub mod session_key;
pub mod solana_wallet;
pub mod storage;
pub mod store;
pub mod wallet;

pub use chain::{ChainSignatureLogin, EthereumLogin, SolanaLogin, create_identity};
pub use evm_wallet::EvmWallet;
pub use extension::{ExtensionGrant, ExtensionLogin, ExtensionLoginConfig, ExtensionSigner};
pub use identity::{DelegatedIdentity, DelegatedSignature, Identity};
pub use provider::{
    AuthClient, AuthClientFactory, ProviderAuth, ProviderLoginConfig, ProviderLoginOptions,
    Reloader, WindowGeometry,
};
pub use service::{LoginService, MockLoginService};
pub use session_key::{KeyAlgorithm, SessionKey};
pub use solana_wallet::SolanaWallet;
pub use storage::{
    FileStorage, KEY_STORAGE_DELEGATION, KEY_STORAGE_KEY, KeyValueStorage, MemoryStorage,
    RestoreOutcome, clear_session, load_session, restore_session, store_identity,
};
pub use store::{IdentityContext, IdentitySnapshot, IdentityStore, StatePatch};
pub use wallet::{MockWallet, WalletConnector};
