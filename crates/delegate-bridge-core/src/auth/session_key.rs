/*
[INPUT]:  Optional serialized key material, message bytes
[OUTPUT]: Ephemeral session keypairs, DER public keys and signatures
[POS]:    Auth layer - session key generation and (de)serialization
[UPDATE]: When adding key algorithms or changing the persisted key format
*/

use std::fmt;

use base64::{Engine as _, engine::general_purpose::STANDARD};
use ed25519_dalek::{Signer as _, Verifier as _};
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};

use crate::http::{IdentityError, Result};

/// SubjectPublicKeyInfo prefix for a raw 32-byte Ed25519 key.
const ED25519_DER_PREFIX: [u8; 12] = [
    0x30, 0x2a, 0x30, 0x05, 0x06, 0x03, 0x2b, 0x65, 0x70, 0x03, 0x21, 0x00,
];

/// SubjectPublicKeyInfo prefix for an uncompressed 65-byte P-256 point.
const P256_DER_PREFIX: [u8; 26] = [
    0x30, 0x59, 0x30, 0x13, 0x06, 0x07, 0x2a, 0x86, 0x48, 0xce, 0x3d, 0x02, 0x01, 0x06, 0x08, 0x2a,
    0x86, 0x48, 0xce, 0x3d, 0x03, 0x01, 0x07, 0x03, 0x42, 0x00,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAlgorithm {
    Ed25519,
    EcdsaP256,
}

/// Ephemeral keypair generated for a single login attempt.
///
/// The secret never leaves the process except through [`SessionKey::to_json`].
#[derive(Clone)]
pub enum SessionKey {
    Ed25519(ed25519_dalek::SigningKey),
    EcdsaP256(p256::ecdsa::SigningKey),
}

/// Persisted layouts: raw exported JSON array for Ed25519, key-pair object for ECDSA.
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum StoredSessionKey {
    Ed25519(String, String),
    KeyPair {
        #[serde(rename = "publicKey")]
        public_key: String,
        #[serde(rename = "privateKey")]
        private_key: String,
    },
}

impl SessionKey {
    pub fn generate(algorithm: KeyAlgorithm) -> Self {
        match algorithm {
            KeyAlgorithm::Ed25519 => Self::generate_ed25519(),
            KeyAlgorithm::EcdsaP256 => Self::generate_ecdsa(),
        }
    }

    pub fn generate_ed25519() -> Self {
        SessionKey::Ed25519(ed25519_dalek::SigningKey::generate(&mut OsRng))
    }

    pub fn generate_ecdsa() -> Self {
        SessionKey::EcdsaP256(p256::ecdsa::SigningKey::random(&mut OsRng))
    }

    /// Create an Ed25519 key from existing secret bytes (32 bytes)
    pub fn from_ed25519_secret(bytes: &[u8; 32]) -> Self {
        SessionKey::Ed25519(ed25519_dalek::SigningKey::from_bytes(bytes))
    }

    pub fn algorithm(&self) -> KeyAlgorithm {
        match self {
            SessionKey::Ed25519(_) => KeyAlgorithm::Ed25519,
            SessionKey::EcdsaP256(_) => KeyAlgorithm::EcdsaP256,
        }
    }

    /// Raw public key: 32 bytes for Ed25519, uncompressed SEC1 point for P-256.
    pub fn raw_public_key(&self) -> Vec<u8> {
        match self {
            SessionKey::Ed25519(key) => key.verifying_key().to_bytes().to_vec(),
            SessionKey::EcdsaP256(key) => key
                .verifying_key()
                .to_encoded_point(false)
                .as_bytes()
                .to_vec(),
        }
    }

    /// DER-encoded SubjectPublicKeyInfo, the form carried in delegations.
    pub fn public_key_der(&self) -> Vec<u8> {
        let prefix: &[u8] = match self {
            SessionKey::Ed25519(_) => &ED25519_DER_PREFIX,
            SessionKey::EcdsaP256(_) => &P256_DER_PREFIX,
        };
        let mut der = prefix.to_vec();
        der.extend_from_slice(&self.raw_public_key());
        der
    }

    pub fn sign(&self, message: &[u8]) -> Vec<u8> {
        match self {
            SessionKey::Ed25519(key) => key.sign(message).to_bytes().to_vec(),
            SessionKey::EcdsaP256(key) => {
                let signature: p256::ecdsa::Signature = key.sign(message);
                signature.to_bytes().to_vec()
            }
        }
    }

    pub fn verify(&self, message: &[u8], signature: &[u8]) -> bool {
        match self {
            SessionKey::Ed25519(key) => ed25519_dalek::Signature::from_slice(signature)
                .is_ok_and(|sig| key.verifying_key().verify(message, &sig).is_ok()),
            SessionKey::EcdsaP256(key) => p256::ecdsa::Signature::from_slice(signature)
                .is_ok_and(|sig| key.verifying_key().verify(message, &sig).is_ok()),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        let stored = match self {
            SessionKey::Ed25519(key) => StoredSessionKey::Ed25519(
                hex::encode(self.public_key_der()),
                hex::encode(key.to_bytes()),
            ),
            SessionKey::EcdsaP256(key) => StoredSessionKey::KeyPair {
                public_key: STANDARD.encode(self.raw_public_key()),
                private_key: STANDARD.encode(key.to_bytes()),
            },
        };
        serde_json::to_string(&stored)
    }

    /// Parse persisted key material and check the stored public half matches.
    pub fn from_json(json: &str) -> Result<Self> {
        let stored: StoredSessionKey = serde_json::from_str(json)?;
        let (key, expected_public) = match stored {
            StoredSessionKey::Ed25519(public_hex, secret_hex) => {
                let secret = hex::decode(secret_hex.trim())
                    .map_err(|e| IdentityError::InvalidKey(format!("Invalid Ed25519 secret hex: {e}")))?;
                let secret: [u8; 32] = secret.as_slice().try_into().map_err(|_| {
                    IdentityError::InvalidKey(format!(
                        "Invalid Ed25519 secret length: expected 32 bytes, got {}",
                        secret.len()
                    ))
                })?;
                let public = hex::decode(public_hex.trim())
                    .map_err(|e| IdentityError::InvalidKey(format!("Invalid Ed25519 public hex: {e}")))?;
                (Self::from_ed25519_secret(&secret), public)
            }
            StoredSessionKey::KeyPair {
                public_key,
                private_key,
            } => {
                let secret = STANDARD
                    .decode(private_key.trim())
                    .map_err(|e| IdentityError::InvalidKey(format!("Invalid private key base64: {e}")))?;
                let signing_key = p256::ecdsa::SigningKey::from_slice(&secret)
                    .map_err(|e| IdentityError::InvalidKey(format!("Invalid P-256 private key: {e}")))?;
                let public = STANDARD
                    .decode(public_key.trim())
                    .map_err(|e| IdentityError::InvalidKey(format!("Invalid public key base64: {e}")))?;
                (SessionKey::EcdsaP256(signing_key), public)
            }
        };

        let derived = match key.algorithm() {
            KeyAlgorithm::Ed25519 => key.public_key_der(),
            KeyAlgorithm::EcdsaP256 => key.raw_public_key(),
        };
        if derived != expected_public {
            return Err(IdentityError::InvalidKey(
                "Stored public key does not match private key".to_string(),
            ));
        }

        Ok(key)
    }
}

impl fmt::Debug for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionKey")
            .field("algorithm", &self.algorithm())
            .field("public_key", &hex::encode(self.public_key_der()))
            .finish()
    }
}
