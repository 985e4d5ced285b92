/*
[INPUT]:  HTTP configuration (base URL, timeouts), chain selector
[OUTPUT]: Configured reqwest client implementing the remote login service
[POS]:    HTTP layer - core client implementation
[UPDATE]: When adding connection options or changing endpoint layout
*/

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::auth::LoginService;
use crate::http::{IdentityError, Result};
use crate::types::{
    Chain, GetDelegationRequest, LoginDetails, LoginRequest, PrepareMessageRequest,
    PreparedMessage, ServiceResponse, SignedDelegation,
};

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub timeout: Duration,
    pub connect_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

/// Remote sign-in service reached over HTTP
#[derive(Debug, Clone)]
pub struct ServiceClient {
    http_client: Client,
    base_url: Url,
    chain: Chain,
}

impl ServiceClient {
    /// Create a new client with default configuration
    pub fn new(base_url: &str, chain: Chain) -> Result<Self> {
        Self::with_config(ClientConfig::default(), base_url, chain)
    }

    /// Create a new client with custom configuration
    pub fn with_config(config: ClientConfig, base_url: &str, chain: Chain) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .build()?;

        let mut base_url = Url::parse(base_url)?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self {
            http_client,
            base_url,
            chain,
        })
    }

    pub fn chain(&self) -> Chain {
        self.chain
    }

    /// Build full URL for a sign-in operation
    fn endpoint(&self, operation: &str) -> Result<Url> {
        let mut url = self.base_url.join(&format!("v1/siwx/{operation}"))?;
        url.query_pairs_mut().append_pair("chain", self.chain.as_str());
        Ok(url)
    }

    async fn call<B, T>(&self, operation: &str, body: &B) -> Result<ServiceResponse<T>>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.endpoint(operation)?;
        debug!(%url, "calling login service");

        let response = self.http_client.post(url).json(body).send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;

        if !status.is_success() {
            return Err(IdentityError::InvalidResponse(format!(
                "HTTP {status}: {}",
                String::from_utf8_lossy(&bytes)
            )));
        }

        serde_json::from_slice(&bytes).map_err(|e| IdentityError::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl LoginService for ServiceClient {
    /// POST {base}/v1/siwx/prepare_message?chain={chain}
    async fn prepare_message(&self, address: &str) -> Result<ServiceResponse<PreparedMessage>> {
        let body = PrepareMessageRequest {
            address: address.to_string(),
        };
        self.call("prepare_message", &body).await
    }

    /// POST {base}/v1/siwx/login?chain={chain}
    async fn login(&self, request: &LoginRequest) -> Result<ServiceResponse<LoginDetails>> {
        self.call("login", request).await
    }

    /// POST {base}/v1/siwx/get_delegation?chain={chain}
    async fn get_delegation(&self, session_id: &str) -> Result<ServiceResponse<SignedDelegation>> {
        let body = GetDelegationRequest {
            session_id: session_id.to_string(),
        };
        self.call("get_delegation", &body).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_keeps_base_path() {
        let client = ServiceClient::new("http://localhost:8080/api", Chain::Solana).unwrap();
        let url = client.endpoint("login").unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/api/v1/siwx/login?chain=solana");
    }

    #[test]
    fn test_invalid_base_url() {
        let err = ServiceClient::new("not a url", Chain::Ethereum).unwrap_err();
        assert!(matches!(err, IdentityError::UrlParse(_)));
    }
}
