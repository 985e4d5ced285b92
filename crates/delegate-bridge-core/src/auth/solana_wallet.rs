/*
[INPUT]:  Solana private key (base58) and challenge bytes
[OUTPUT]: Raw Ed25519 signatures and base58 wallet address
[POS]:    Auth layer - Solana wallet implementation
[UPDATE]: When Solana key formats or SDK version changes
*/

use async_trait::async_trait;
use solana_keypair::Keypair;
use solana_signer::Signer;

use crate::auth::WalletConnector;
use crate::http::{IdentityError, Result};
use crate::types::Chain;

/// Locally held Solana key acting as a sign-in wallet
pub struct SolanaWallet {
    keypair: Keypair,
    address: String,
}

impl SolanaWallet {
    /// Create a new Solana wallet from a base58-encoded private key
    /// Supports 64-byte keypair or 32-byte seed
    pub fn new(private_key_base58: &str) -> Result<Self> {
        let bytes = bs58::decode(private_key_base58.trim())
            .into_vec()
            .map_err(|e| IdentityError::InvalidKey(format!("Invalid base58 private key: {e}")))?;

        let keypair = match bytes.len() {
            64 => Keypair::try_from(bytes.as_slice())
                .map_err(|e| IdentityError::InvalidKey(format!("Invalid keypair bytes: {e}")))?,
            32 => {
                let mut seed = [0u8; 32];
                seed.copy_from_slice(&bytes);
                Keypair::new_from_array(seed)
            }
            len => {
                return Err(IdentityError::InvalidKey(format!(
                    "Invalid private key length: expected 32 or 64 bytes, got {len}"
                )));
            }
        };

        let address = keypair.pubkey().to_string();

        Ok(Self { keypair, address })
    }

    pub fn address(&self) -> &str {
        &self.address
    }
}

#[async_trait]
impl WalletConnector for SolanaWallet {
    fn chain(&self) -> Chain {
        Chain::Solana
    }

    async fn connect(&self) -> Result<String> {
        Ok(self.address.clone())
    }

    async fn sign_message(&self, message: &[u8]) -> Result<Vec<u8>> {
        let signature = self.keypair.sign_message(message);
        Ok(signature.as_ref().to_vec())
    }
}
