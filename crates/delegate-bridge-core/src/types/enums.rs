/*
[INPUT]:  Login progress and wallet chain identifiers
[OUTPUT]: Typed Rust enums with serialization support
[POS]:    Data layer - shared enums
[UPDATE]: When login stages or supported chains change
*/

use std::fmt;

use serde::{Deserialize, Serialize};

/// Authoritative progress marker for the current login attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Initializing,
    Idle,
    Connecting,
    Preparing,
    Signing,
    Authenticating,
    Delegating,
    Success,
    Error,
}

impl Status {
    /// True while a login attempt is between its first and last stage.
    pub fn is_in_progress(self) -> bool {
        matches!(
            self,
            Status::Connecting
                | Status::Preparing
                | Status::Signing
                | Status::Authenticating
                | Status::Delegating
        )
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            Status::Initializing => "initializing",
            Status::Idle => "idle",
            Status::Connecting => "connecting",
            Status::Preparing => "preparing",
            Status::Signing => "signing",
            Status::Authenticating => "authenticating",
            Status::Delegating => "delegating",
            Status::Success => "success",
            Status::Error => "error",
        };
        f.write_str(value)
    }
}

/// External chains with a sign-in-with-chain login.
///
/// Ethereum and Solana have local-key wallets in this crate. Arweave
/// sign-in runs through a caller-supplied `WalletConnector`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Chain {
    Ethereum,
    Solana,
    Arweave,
}

impl Chain {
    pub fn as_str(self) -> &'static str {
        match self {
            Chain::Ethereum => "ethereum",
            Chain::Solana => "solana",
            Chain::Arweave => "arweave",
        }
    }
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
