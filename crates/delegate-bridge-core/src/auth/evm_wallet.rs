/*
[INPUT]:  EVM private key (hex string)
[OUTPUT]: Signed challenges and wallet address for EVM chains
[POS]:    Auth layer - EVM wallet implementation
[UPDATE]: When signing logic or EVM address formatting changes
*/

use std::str::FromStr;

use alloy_signer::Signer;
use alloy_signer_local::PrivateKeySigner;
use async_trait::async_trait;

use crate::auth::WalletConnector;
use crate::http::{IdentityError, Result};
use crate::types::Chain;

/// Locally held Ethereum key acting as a sign-in wallet
pub struct EvmWallet {
    signer: PrivateKeySigner,
    address: String,
}

impl EvmWallet {
    /// Create a new EVM wallet from a hex-encoded private key
    ///
    /// Supports both "0x"-prefixed and non-prefixed hex strings.
    pub fn new(private_key_hex: &str) -> Result<Self> {
        let private_key_hex = private_key_hex.trim();
        let private_key_hex = private_key_hex.strip_prefix("0x").unwrap_or(private_key_hex);
        let signer = PrivateKeySigner::from_str(private_key_hex)
            .map_err(|e| IdentityError::InvalidKey(format!("Invalid EVM private key: {e}")))?;

        let address = signer.address().to_checksum(None);

        Ok(Self { signer, address })
    }

    pub fn address(&self) -> &str {
        &self.address
    }
}

#[async_trait]
impl WalletConnector for EvmWallet {
    fn chain(&self) -> Chain {
        Chain::Ethereum
    }

    async fn connect(&self) -> Result<String> {
        Ok(self.address.clone())
    }

    /// EIP-191 personal-sign over the challenge; returns [r, s, v].
    async fn sign_message(&self, message: &[u8]) -> Result<Vec<u8>> {
        let signature = self
            .signer
            .sign_message(message)
            .await
            .map_err(|e| IdentityError::Wallet(format!("Failed to sign EVM message: {e}")))?;

        Ok(signature.as_bytes().to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    #[tokio::test]
    async fn test_evm_wallet() {
        let wallet = EvmWallet::new(TEST_KEY).unwrap();

        assert_eq!(wallet.chain(), Chain::Ethereum);
        assert_eq!(
            wallet.connect().await.unwrap(),
            "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266"
        );

        let signature = wallet.sign_message(b"hello").await.unwrap();
        assert_eq!(signature.len(), 65);
    }

    #[test]
    fn test_evm_wallet_no_prefix() {
        let wallet = EvmWallet::new(TEST_KEY.trim_start_matches("0x")).unwrap();
        assert_eq!(wallet.address(), "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266");
    }

    #[test]
    fn test_evm_wallet_invalid_key() {
        assert!(matches!(
            EvmWallet::new("0xnothex"),
            Err(IdentityError::InvalidKey(_))
        ));
    }
}
