/*
[INPUT]:  Wallet addresses, signatures and session public keys
[OUTPUT]: Typed request bodies for the remote login service
[POS]:    Data layer - request types for sign-in-with-chain calls
[UPDATE]: When remote service request schema changes
*/

use serde::{Deserialize, Serialize};

use super::encoding::{hex_bytes, opt_hex_list};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrepareMessageRequest {
    pub address: String,
}

/// Proof submitted to the service in exchange for a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRequest {
    #[serde(with = "hex_bytes")]
    pub signature: Vec<u8>,
    pub message_id: String,
    #[serde(with = "hex_bytes")]
    pub session_public_key: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetDelegationRequest {
    pub session_id: String,
}

/// Permission request sent to a signer extension.
///
/// `targets` of `None` asks for a delegation valid for every target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelegationRequest {
    #[serde(with = "hex_bytes")]
    pub session_public_key: Vec<u8>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "opt_hex_list"
    )]
    pub targets: Option<Vec<Vec<u8>>>,
    pub max_time_to_live_ns: u64,
}
