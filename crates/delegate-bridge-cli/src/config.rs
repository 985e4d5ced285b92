/*
[INPUT]:  YAML configuration file
[OUTPUT]: Parsed application configuration
[POS]:    Configuration layer - service endpoint and storage setup
[UPDATE]: When adding new configuration options
*/

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use delegate_bridge_core::{Chain, ClientConfig};
use serde::{Deserialize, Serialize};

/// Top-level configuration for the delegate-bridge CLI
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Base URL of the remote sign-in service
    pub service_url: String,
    /// Directory holding the persisted session; defaults to the user data dir
    #[serde(default)]
    pub storage_dir: Option<PathBuf>,
    /// Chain used for sign-in
    #[serde(default = "default_chain")]
    pub chain: Chain,
    /// Total request timeout in seconds
    #[serde(default)]
    pub timeout_seconds: Option<u64>,
}

fn default_chain() -> Chain {
    Chain::Ethereum
}

impl AppConfig {
    /// Load configuration from YAML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        let config: Self = serde_yaml::from_str(&content).context("parse config yaml")?;
        url::Url::parse(&config.service_url).context("service_url must be a valid URL")?;
        Ok(config)
    }

    pub fn storage_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.storage_dir {
            return Ok(dir.clone());
        }
        dirs::data_dir()
            .map(|dir| dir.join("delegate-bridge"))
            .ok_or_else(|| anyhow!("Could not determine data directory"))
    }

    pub fn client_config(&self) -> ClientConfig {
        let mut config = ClientConfig::default();
        if let Some(seconds) = self.timeout_seconds {
            config.timeout = Duration::from_secs(seconds);
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config: AppConfig =
            serde_yaml::from_str("service_url: https://auth.example.com\n").unwrap();
        assert_eq!(config.chain, Chain::Ethereum);
        assert!(config.storage_dir.is_none());
        assert_eq!(config.client_config().timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_full_config() {
        let yaml = "service_url: http://localhost:8080\nstorage_dir: /tmp/db\nchain: solana\ntimeout_seconds: 5\n";
        let config: AppConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.chain, Chain::Solana);
        assert_eq!(config.storage_dir().unwrap(), PathBuf::from("/tmp/db"));
        assert_eq!(config.client_config().timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_invalid_service_url_is_rejected() {
        let mut path = std::env::temp_dir();
        path.push(format!("delegate-bridge-config-{}.yaml", uuid::Uuid::new_v4()));
        std::fs::write(&path, "service_url: not a url\n").unwrap();

        assert!(AppConfig::from_file(&path).is_err());
        std::fs::remove_file(path).unwrap();
    }
}
