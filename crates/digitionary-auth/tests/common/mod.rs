/*
[INPUT]:  Test configuration and mock server requirements
[OUTPUT]: Shared test utilities, fixtures, and mock helpers
[POS]:    Test infrastructure - shared across all test modules
[UPDATE]: When adding new test patterns or fixtures
*/

//! Common test utilities for digitionary-auth tests

#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Notify;
use digitionary_auth::{
    AuthClient, AuthRequest, ClientConfig, PageContext, SiweAuthenticator, SiweMessage,
    WalletError, WalletProvider, verify_signature,
};
use wiremock::{MockServer, Request, Respond, ResponseTemplate};

/// Well-known development key and its address
pub const TEST_PRIVATE_KEY: &str =
    "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
pub const TEST_ADDRESS: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";

pub const SCENARIO_ADDRESS: &str = "0xAbC123000000000000000000000000000000dEaD";
pub const MOCK_SIGNATURE: &str = "0xmock_signature";

/// Setup a mock HTTP server for testing
pub async fn setup_mock_server() -> MockServer {
    MockServer::start().await
}

pub fn page() -> PageContext {
    PageContext::new("app.example", "https://app.example")
}

pub fn authenticator(base_url: &str, wallet: Option<Arc<dyn WalletProvider>>) -> SiweAuthenticator {
    let client = AuthClient::with_base_url(base_url).unwrap();
    SiweAuthenticator::new(client, wallet, page())
}

/// Client pointed at a port nothing listens on
pub fn unreachable_client() -> AuthClient {
    let config = ClientConfig {
        timeout: std::time::Duration::from_secs(2),
        connect_timeout: std::time::Duration::from_millis(500),
    };
    AuthClient::with_config(config, "http://127.0.0.1:9").unwrap()
}

/// Verifier that accepts a request only if the signature recovers to the
/// address inside the literal message
pub struct SiweVerifier;

impl Respond for SiweVerifier {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let Ok(body) = serde_json::from_slice::<AuthRequest>(&request.body) else {
            return ResponseTemplate::new(400);
        };
        let Ok(message) = body.message.parse::<SiweMessage>() else {
            return ResponseTemplate::new(400);
        };
        match verify_signature(&body.message, &body.signature, message.address()) {
            Ok(true) => ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "success": true,
                "address": message.address(),
            })),
            _ => ResponseTemplate::new(401).set_body_string("Invalid signature"),
        }
    }
}

/// Wallet whose signature prompt never resolves
pub struct PendingWallet;

#[async_trait]
impl WalletProvider for PendingWallet {
    async fn request_account(&self) -> Result<String, WalletError> {
        Ok(SCENARIO_ADDRESS.to_string())
    }

    async fn chain_id(&self) -> Result<u64, WalletError> {
        Ok(1)
    }

    async fn sign_message(&self, _message: &str) -> Result<String, WalletError> {
        std::future::pending().await
    }
}

/// Wallet that signs with `MOCK_SIGNATURE` once `gate` is notified
#[derive(Clone, Default)]
pub struct GatedWallet {
    pub gate: Arc<Notify>,
}

#[async_trait]
impl WalletProvider for GatedWallet {
    async fn request_account(&self) -> Result<String, WalletError> {
        Ok(SCENARIO_ADDRESS.to_string())
    }

    async fn chain_id(&self) -> Result<u64, WalletError> {
        Ok(1)
    }

    async fn sign_message(&self, _message: &str) -> Result<String, WalletError> {
        self.gate.notified().await;
        Ok(MOCK_SIGNATURE.to_string())
    }
}
