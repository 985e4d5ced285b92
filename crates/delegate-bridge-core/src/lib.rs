/*
[INPUT]:  Crate modules and public type definitions
[OUTPUT]: Public delegate-bridge crate surface
[POS]:    Crate root - module wiring
[UPDATE]: When public modules or exports change
*/

pub mod auth;
pub mod http;
pub mod types;

// Re-export commonly used types from auth
pub use auth::{
    AuthClient,
    AuthClientFactory,
    ChainSignatureLogin,
    DelegatedIdentity,
    EvmWallet,
    ExtensionLogin,
    ExtensionSigner,
    FileStorage,
    Identity,
    IdentityContext,
    IdentityStore,
    KeyValueStorage,
    LoginService,
    MemoryStorage,
    MockWallet,
    ProviderAuth,
    ProviderLoginConfig,
    Reloader,
    RestoreOutcome,
    SessionKey,
    SolanaWallet,
    WalletConnector,
};

// Re-export commonly used types from http
pub use http::{
    ClientConfig,
    IdentityError,
    Result,
    ServiceClient,
};

// Re-export all types
pub use types::*;
