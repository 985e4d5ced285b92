/*
[INPUT]:  Remote service JSON payloads
[OUTPUT]: Tagged success/error response types
[POS]:    Data layer - response types for sign-in-with-chain calls
[UPDATE]: When remote service response schema changes
*/

use serde::{Deserialize, Serialize};

use super::encoding::hex_bytes;

/// Tagged service result. Anything that does not decode into one of the two
/// variants is rejected when the body is parsed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ServiceResponse<T> {
    Ok(T),
    Err(String),
}

impl<T> ServiceResponse<T> {
    pub fn into_result(self) -> std::result::Result<T, String> {
        match self {
            ServiceResponse::Ok(value) => Ok(value),
            ServiceResponse::Err(message) => Err(message),
        }
    }
}

impl<T> From<std::result::Result<T, String>> for ServiceResponse<T> {
    fn from(result: std::result::Result<T, String>) -> Self {
        match result {
            Ok(value) => ServiceResponse::Ok(value),
            Err(message) => ServiceResponse::Err(message),
        }
    }
}

/// Canonical challenge issued for one (address, nonce) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreparedMessage {
    #[serde(with = "hex_bytes")]
    pub message: Vec<u8>,
    pub message_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginDetails {
    pub session_id: String,
    #[serde(with = "hex_bytes")]
    pub authority_public_key: Vec<u8>,
}
