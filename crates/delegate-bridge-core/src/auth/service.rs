/*
[INPUT]:  Wallet address, signed proof, session id
[OUTPUT]: Challenge, session details and issued delegations
[POS]:    Auth layer - remote sign-in service abstraction
[UPDATE]: When remote service calls or response shapes change
*/

use std::sync::Mutex;

use async_trait::async_trait;

use crate::http::Result;
use crate::types::{LoginDetails, LoginRequest, PreparedMessage, ServiceResponse, SignedDelegation};

/// Remote service that validates wallet proofs and issues delegations.
///
/// An outer `Err` is a transport or decoding failure; `ServiceResponse::Err`
/// is the service's own refusal.
#[async_trait]
pub trait LoginService: Send + Sync {
    async fn prepare_message(&self, address: &str) -> Result<ServiceResponse<PreparedMessage>>;

    async fn login(&self, request: &LoginRequest) -> Result<ServiceResponse<LoginDetails>>;

    async fn get_delegation(&self, session_id: &str) -> Result<ServiceResponse<SignedDelegation>>;
}

/// Canned service for tests; records every call it receives.
///
/// Like the real service, an issued delegation names the session key from
/// the latest login request. `unbound` keeps the canned `pubkey` instead.
#[derive(Debug)]
pub struct MockLoginService {
    prepare: ServiceResponse<PreparedMessage>,
    login: ServiceResponse<LoginDetails>,
    delegation: ServiceResponse<SignedDelegation>,
    bind_session: bool,
    calls: Mutex<Vec<String>>,
    login_requests: Mutex<Vec<LoginRequest>>,
}

impl MockLoginService {
    pub fn new(
        prepare: ServiceResponse<PreparedMessage>,
        login: ServiceResponse<LoginDetails>,
        delegation: ServiceResponse<SignedDelegation>,
    ) -> Self {
        Self {
            prepare,
            login,
            delegation,
            bind_session: true,
            calls: Mutex::new(Vec::new()),
            login_requests: Mutex::new(Vec::new()),
        }
    }

    pub fn unbound(mut self) -> Self {
        self.bind_session = false;
        self
    }

    /// Names of the calls made so far, in order
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|calls| calls.clone()).unwrap_or_default()
    }

    pub fn login_requests(&self) -> Vec<LoginRequest> {
        self.login_requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }

    fn record(&self, call: String) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }
}

#[async_trait]
impl LoginService for MockLoginService {
    async fn prepare_message(&self, address: &str) -> Result<ServiceResponse<PreparedMessage>> {
        self.record(format!("prepare_message:{address}"));
        Ok(self.prepare.clone())
    }

    async fn login(&self, request: &LoginRequest) -> Result<ServiceResponse<LoginDetails>> {
        self.record(format!("login:{}", request.message_id));
        if let Ok(mut requests) = self.login_requests.lock() {
            requests.push(request.clone());
        }
        Ok(self.login.clone())
    }

    async fn get_delegation(&self, session_id: &str) -> Result<ServiceResponse<SignedDelegation>> {
        self.record(format!("get_delegation:{session_id}"));
        let mut response = self.delegation.clone();
        if let ServiceResponse::Ok(signed) = &mut response {
            if self.bind_session {
                if let Some(request) = self.login_requests().pop() {
                    signed.delegation.pubkey = request.session_public_key;
                }
            }
        }
        Ok(response)
    }
}
