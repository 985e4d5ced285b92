/*
[INPUT]:  Session key and delegation chain
[OUTPUT]: Identity usable to sign remote calls on behalf of the chain root
[POS]:    Auth layer - delegated identity model
[UPDATE]: When the signed envelope or identity kinds change
*/

use std::sync::Arc;

use serde::Serialize;

use crate::types::{DelegationChain, SignedDelegation, encoding::hex_bytes};

use super::SessionKey;

/// Signature envelope attached to an authorised remote call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DelegatedSignature {
    #[serde(with = "hex_bytes")]
    pub public_key: Vec<u8>,
    #[serde(with = "hex_bytes")]
    pub signature: Vec<u8>,
    pub delegations: Vec<SignedDelegation>,
}

/// Session key paired with the chain that authorises it.
#[derive(Debug, Clone)]
pub struct DelegatedIdentity {
    session: Arc<SessionKey>,
    chain: DelegationChain,
}

impl DelegatedIdentity {
    pub fn new(session: Arc<SessionKey>, chain: DelegationChain) -> Self {
        Self { session, chain }
    }

    pub fn session_key(&self) -> &SessionKey {
        &self.session
    }

    pub fn chain(&self) -> &DelegationChain {
        &self.chain
    }

    /// Root authority key; remote services see calls as coming from this key.
    pub fn public_key(&self) -> &[u8] {
        &self.chain.public_key
    }

    pub fn is_valid(&self) -> bool {
        self.chain.is_valid()
    }

    /// Sign with the session key and attach the delegation links.
    pub fn sign(&self, blob: &[u8]) -> DelegatedSignature {
        DelegatedSignature {
            public_key: self.chain.public_key.clone(),
            signature: self.session.sign(blob),
            delegations: self.chain.delegations.clone(),
        }
    }
}

/// Identity as seen by consumers of the store.
#[derive(Debug, Clone)]
pub enum Identity {
    Anonymous,
    Delegated(DelegatedIdentity),
}

impl Identity {
    pub fn is_anonymous(&self) -> bool {
        matches!(self, Identity::Anonymous)
    }

    pub fn as_delegated(&self) -> Option<&DelegatedIdentity> {
        match self {
            Identity::Delegated(identity) => Some(identity),
            Identity::Anonymous => None,
        }
    }

    /// Non-anonymous and backed by an unexpired chain.
    pub fn is_authenticated(&self) -> bool {
        self.as_delegated().is_some_and(DelegatedIdentity::is_valid)
    }
}

impl From<DelegatedIdentity> for Identity {
    fn from(identity: DelegatedIdentity) -> Self {
        Identity::Delegated(identity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::delegation::now_nanos;
    use crate::types::Delegation;

    fn identity(expiration: u64) -> DelegatedIdentity {
        let session = Arc::new(SessionKey::generate_ed25519());
        let chain = DelegationChain::single(
            vec![0xaa; 44],
            SignedDelegation {
                delegation: Delegation::new(session.public_key_der(), expiration, None),
                signature: vec![1; 64],
            },
        );
        DelegatedIdentity::new(session, chain)
    }

    #[test]
    fn test_sign_uses_session_key_and_root_public_key() {
        let identity = identity(now_nanos() + 1_000_000_000);
        let envelope = identity.sign(b"request");

        assert_eq!(envelope.public_key, vec![0xaa; 44]);
        assert_eq!(envelope.delegations.len(), 1);
        assert!(identity.session_key().verify(b"request", &envelope.signature));
    }

    #[test]
    fn test_authenticated_requires_valid_delegation() {
        assert!(!Identity::Anonymous.is_authenticated());
        assert!(Identity::from(identity(now_nanos() + 1_000_000_000)).is_authenticated());
        assert!(!Identity::from(identity(1)).is_authenticated());
    }
}
