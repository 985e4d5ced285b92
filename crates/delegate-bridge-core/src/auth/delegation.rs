/*
[INPUT]:  Issued delegation data, authority public key, current time
[OUTPUT]: Delegation chains and validity decisions
[POS]:    Auth layer - delegation chain construction and expiration checks
[UPDATE]: When chain construction rules or validity semantics change
*/

use chrono::Utc;

use crate::types::{Delegation, DelegationChain, SignedDelegation};

/// Default lifetime of a provider-hosted delegation (1 hour).
pub const DEFAULT_MAX_TIME_TO_LIVE_NS: u64 = 60 * 60 * 1_000_000_000;

/// Default lifetime requested from a signer extension (8 hours).
pub const EXTENSION_MAX_TIME_TO_LIVE_NS: u64 = 8 * DEFAULT_MAX_TIME_TO_LIVE_NS;

/// Current wall-clock time in nanoseconds since the Unix epoch.
pub fn now_nanos() -> u64 {
    Utc::now()
        .timestamp_nanos_opt()
        .map_or(u64::MAX, |nanos| nanos.max(0) as u64)
}

impl DelegationChain {
    /// Assemble a chain from already-signed links rooted at `public_key`.
    pub fn from_delegations(public_key: Vec<u8>, delegations: Vec<SignedDelegation>) -> Self {
        Self {
            delegations,
            public_key,
        }
    }

    /// Single-link chain rooted at `authority_public_key`.
    pub fn single(authority_public_key: Vec<u8>, signed: SignedDelegation) -> Self {
        Self::from_delegations(authority_public_key, vec![signed])
    }

    /// A chain is usable only if it has links and none has expired.
    pub fn is_valid_at(&self, now_ns: u64) -> bool {
        !self.delegations.is_empty()
            && self
                .delegations
                .iter()
                .all(|signed| signed.delegation.expiration > now_ns)
    }

    pub fn is_valid(&self) -> bool {
        self.is_valid_at(now_nanos())
    }

    /// Earliest expiration across all links.
    pub fn expiration(&self) -> Option<u64> {
        self.delegations
            .iter()
            .map(|signed| signed.delegation.expiration)
            .min()
    }
}

/// Rebuild the service-issued delegation without any target restriction.
///
/// The issued targets are dropped on purpose: the session is valid for all targets.
pub fn unrestricted_delegation(issued: &SignedDelegation) -> SignedDelegation {
    SignedDelegation {
        delegation: Delegation::new(
            issued.delegation.pubkey.clone(),
            issued.delegation.expiration,
            None,
        ),
        signature: issued.signature.clone(),
    }
}
