/*
[INPUT]:  Delegation data issued by a remote service or signer extension
[OUTPUT]: Typed delegation structs with canonical JSON serialization
[POS]:    Data layer - delegation chain model
[UPDATE]: When the canonical chain JSON format changes
*/

use serde::{Deserialize, Serialize};

use super::encoding::{hex_bytes, hex_u64, opt_hex_list};

/// Statement that `pubkey` may act for the signer until `expiration`.
///
/// `targets` of `None` or `Some(vec![])` both mean the delegation is valid for
/// every target; the distinction is kept so serialization round-trips exactly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delegation {
    #[serde(with = "hex_u64")]
    pub expiration: u64,
    #[serde(with = "hex_bytes")]
    pub pubkey: Vec<u8>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "opt_hex_list"
    )]
    pub targets: Option<Vec<Vec<u8>>>,
}

impl Delegation {
    pub fn new(pubkey: Vec<u8>, expiration: u64, targets: Option<Vec<Vec<u8>>>) -> Self {
        Self {
            expiration,
            pubkey,
            targets,
        }
    }

    /// True when no target restriction applies.
    pub fn is_unrestricted(&self) -> bool {
        self.targets.as_ref().is_none_or(|targets| targets.is_empty())
    }
}

/// A delegation together with the authority's signature over it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedDelegation {
    pub delegation: Delegation,
    #[serde(with = "hex_bytes")]
    pub signature: Vec<u8>,
}

/// Ordered links from an authority public key down to a session key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelegationChain {
    pub delegations: Vec<SignedDelegation>,
    #[serde(rename = "publicKey", with = "hex_bytes")]
    pub public_key: Vec<u8>,
}

impl DelegationChain {
    /// Canonical JSON form used for persistence.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Public key the chain delegates to in its final link.
    pub fn session_public_key(&self) -> Option<&[u8]> {
        self.delegations
            .last()
            .map(|signed| signed.delegation.pubkey.as_slice())
    }
}
