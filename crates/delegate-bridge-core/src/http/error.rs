/*
[INPUT]:  Error sources (preconditions, remote service, wallet, storage, HTTP)
[OUTPUT]: Structured error types with context and classification helpers
[POS]:    Error handling layer - unified error types for entire crate
[UPDATE]: When adding new error sources or improving error messages
*/

use thiserror::Error;

/// Main error type for identity and login operations
#[derive(Error, Debug)]
pub enum IdentityError {
    /// The provider integration component has not been mounted
    #[error("Identity provider is not mounted")]
    ProviderNotMounted,

    /// The provider client must be created before login is attempted
    #[error("Auth client is not initialized")]
    ClientNotInitialized,

    /// A valid delegated identity is already present
    #[error("Already authenticated")]
    AlreadyAuthenticated,

    /// Remote service refused or failed to issue a challenge
    #[error("Failed to prepare login: {0}")]
    PrepareLogin(String),

    /// Remote service rejected the signed proof
    #[error("Failed to login: {0}")]
    Login(String),

    /// Remote service failed to issue the delegation
    #[error("Failed to get delegation: {0}")]
    GetDelegation(String),

    /// Response did not match the expected tagged shape
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Wallet absent, rejected by the user, or failed to sign
    #[error("Wallet error: {0}")]
    Wallet(String),

    /// Persisting or reading session material failed
    #[error("{context}: {source}")]
    Storage {
        context: String,
        #[source]
        source: std::io::Error,
    },

    /// Provider-hosted login flow reported a failure
    #[error("{0}")]
    Provider(String),

    /// Provider client failed to log out
    #[error("Logout failed: {0}")]
    Logout(String),

    /// Key material could not be parsed or generated
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization/deserialization failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// URL parsing failed
    #[error("Invalid URL: {0}")]
    UrlParse(#[from] url::ParseError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl IdentityError {
    /// Check if the error was raised before any login stage started
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            IdentityError::ProviderNotMounted
                | IdentityError::ClientNotInitialized
                | IdentityError::AlreadyAuthenticated
        )
    }

    /// Check if the remote service rejected or garbled a stage
    pub fn is_protocol_error(&self) -> bool {
        matches!(
            self,
            IdentityError::PrepareLogin(_)
                | IdentityError::Login(_)
                | IdentityError::GetDelegation(_)
                | IdentityError::InvalidResponse(_)
        )
    }

    /// Wrap an I/O failure with the operation that caused it
    pub fn storage(context: impl Into<String>, source: std::io::Error) -> Self {
        IdentityError::Storage {
            context: context.into(),
            source,
        }
    }
}

/// Result type alias for identity operations
pub type Result<T> = std::result::Result<T, IdentityError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classification() {
        assert!(IdentityError::AlreadyAuthenticated.is_precondition());
        assert!(IdentityError::ClientNotInitialized.is_precondition());
        assert!(!IdentityError::Wallet("rejected".into()).is_precondition());

        assert!(IdentityError::PrepareLogin("rate limited".into()).is_protocol_error());
        assert!(!IdentityError::ProviderNotMounted.is_protocol_error());
    }

    #[test]
    fn test_stage_error_messages() {
        let err = IdentityError::PrepareLogin("rate limited".to_string());
        assert_eq!(err.to_string(), "Failed to prepare login: rate limited");

        let err = IdentityError::GetDelegation("no such session".to_string());
        assert_eq!(err.to_string(), "Failed to get delegation: no such session");
    }

    #[test]
    fn test_storage_error_keeps_context() {
        let err = IdentityError::storage(
            "Failed to persist delegation chain",
            std::io::Error::other("disk full"),
        );
        assert_eq!(err.to_string(), "Failed to persist delegation chain: disk full");
    }
}
