/*
[INPUT]:  Challenge bytes to sign
[OUTPUT]: Wallet address and raw signature bytes
[POS]:    Auth layer - per-chain wallet capability abstraction
[UPDATE]: When adding new wallet types or changing signature format
*/

use async_trait::async_trait;

use crate::http::{IdentityError, Result};
use crate::types::Chain;

/// Capabilities a chain wallet must provide to the sign-in pipeline.
///
/// The trait is async so browser-bridged and hardware wallets fit behind it.
/// A user rejecting a prompt surfaces as an `Err` from the call.
#[async_trait]
pub trait WalletConnector: Send + Sync {
    /// Get the blockchain chain type
    fn chain(&self) -> Chain;

    /// Request the wallet's address, prompting the user if needed
    async fn connect(&self) -> Result<String>;

    /// Sign the exact challenge bytes and return the raw signature
    async fn sign_message(&self, message: &[u8]) -> Result<Vec<u8>>;
}

/// Mock wallet for testing
#[derive(Debug, Clone)]
pub struct MockWallet {
    chain: Chain,
    address: String,
    signature: Vec<u8>,
    connect_error: Option<String>,
    sign_error: Option<String>,
}

impl MockWallet {
    /// Create a new mock wallet with a predetermined signature
    pub fn new(chain: Chain, address: &str, signature: &[u8]) -> Self {
        Self {
            chain,
            address: address.to_string(),
            signature: signature.to_vec(),
            connect_error: None,
            sign_error: None,
        }
    }

    /// Make `connect` fail with the given message
    pub fn failing_connect(mut self, message: &str) -> Self {
        self.connect_error = Some(message.to_string());
        self
    }

    /// Make `sign_message` fail with the given message
    pub fn failing_sign(mut self, message: &str) -> Self {
        self.sign_error = Some(message.to_string());
        self
    }
}

#[async_trait]
impl WalletConnector for MockWallet {
    fn chain(&self) -> Chain {
        self.chain
    }

    async fn connect(&self) -> Result<String> {
        match &self.connect_error {
            Some(message) => Err(IdentityError::Wallet(message.clone())),
            None => Ok(self.address.clone()),
        }
    }

    async fn sign_message(&self, _message: &[u8]) -> Result<Vec<u8>> {
        match &self.sign_error {
            Some(message) => Err(IdentityError::Wallet(message.clone())),
            None => Ok(self.signature.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_wallet() {
        let wallet = MockWallet::new(Chain::Ethereum, "0x1234567890abcdef", b"sig");

        assert_eq!(wallet.chain(), Chain::Ethereum);
        assert_eq!(wallet.connect().await.unwrap(), "0x1234567890abcdef");
        assert_eq!(wallet.sign_message(b"test message").await.unwrap(), b"sig".to_vec());
    }

    #[tokio::test]
    async fn test_mock_wallet_rejection() {
        let wallet = MockWallet::new(Chain::Solana, "addr", b"sig").failing_sign("User rejected");

        let err = wallet.sign_message(b"challenge").await.unwrap_err();
        assert_eq!(err.to_string(), "Wallet error: User rejected");
    }
}
