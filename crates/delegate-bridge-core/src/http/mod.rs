/*
[INPUT]:  HTTP client configuration and remote service endpoints
[OUTPUT]: Typed remote service results and the crate error type
[POS]:    HTTP layer - REST communication with the login service
[UPDATE]: When adding new endpoints or changing client behavior
*/

pub mod client;
pub mod error;

pub use error::{IdentityError, Result};

pub use client::{ClientConfig, ServiceClient};
