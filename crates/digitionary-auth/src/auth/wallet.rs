/*
[INPUT]:  Account, network and signing requests
[OUTPUT]: Wallet addresses, chain ids and signatures
[POS]:    Auth layer - wallet capability abstraction
[UPDATE]: When adding wallet types or changing the capability surface
*/

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use thiserror::Error;

/// Failures reported by a wallet provider
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WalletError {
    #[error("request rejected by user: {0}")]
    Rejected(String),

    #[error("operation unsupported by wallet: {0}")]
    Unsupported(String),

    #[error("wallet provider error: {0}")]
    Provider(String),
}

/// Wallet capability injected by the execution environment
///
/// The trait is async because every call may wait on user interaction
/// (browser extension popups, hardware wallets, remote signers).
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Authorize this site and return the active account address
    async fn request_account(&self) -> Result<String, WalletError>;

    /// Chain id of the active network
    async fn chain_id(&self) -> Result<u64, WalletError>;

    /// EIP-191 `personal_sign` over the exact plaintext, hex-encoded (0x...)
    async fn sign_message(&self, message: &str) -> Result<String, WalletError>;
}

/// Scripted wallet for testing
#[derive(Debug, Clone)]
pub struct MockWallet {
    address: String,
    chain_id: Option<u64>,
    signature: String,
    reject_connection: bool,
    reject_signature: bool,
    sign_requests: Arc<AtomicUsize>,
    last_signed: Arc<Mutex<Option<String>>>,
}

impl MockWallet {
    /// Create a mock wallet returning a predetermined signature
    pub fn new(address: &str, chain_id: u64, signature: &str) -> Self {
        Self {
            address: address.to_string(),
            chain_id: Some(chain_id),
            signature: signature.to_string(),
            reject_connection: false,
            reject_signature: false,
            sign_requests: Arc::new(AtomicUsize::new(0)),
            last_signed: Arc::new(Mutex::new(None)),
        }
    }

    pub fn rejecting_connection(mut self) -> Self {
        self.reject_connection = true;
        self
    }

    pub fn rejecting_signature(mut self) -> Self {
        self.reject_signature = true;
        self
    }

    pub fn without_network(mut self) -> Self {
        self.chain_id = None;
        self
    }

    /// Number of signature prompts shown so far
    pub fn sign_requests(&self) -> usize {
        self.sign_requests.load(Ordering::SeqCst)
    }

    /// Last plaintext passed to `sign_message`
    pub fn last_signed(&self) -> Option<String> {
        self.last_signed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl WalletProvider for MockWallet {
    async fn request_account(&self) -> Result<String, WalletError> {
        if self.reject_connection {
            return Err(WalletError::Rejected("user rejected the request".to_string()));
        }
        Ok(self.address.clone())
    }

    async fn chain_id(&self) -> Result<u64, WalletError> {
        self.chain_id
            .ok_or_else(|| WalletError::Unsupported("no active network".to_string()))
    }

    async fn sign_message(&self, message: &str) -> Result<String, WalletError> {
        self.sign_requests.fetch_add(1, Ordering::SeqCst);
        *self
            .last_signed
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(message.to_string());
        if self.reject_signature {
            return Err(WalletError::Rejected("user denied message signature".to_string()));
        }
        Ok(self.signature.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_wallet() {
        let wallet = MockWallet::new("0x1234567890abcdef", 1, "0xmock_signature");

        assert_eq!(wallet.request_account().await.unwrap(), "0x1234567890abcdef");
        assert_eq!(wallet.chain_id().await.unwrap(), 1);

        let signature = wallet.sign_message("test message").await.unwrap();
        assert_eq!(signature, "0xmock_signature");
        assert_eq!(wallet.sign_requests(), 1);
        assert_eq!(wallet.last_signed().as_deref(), Some("test message"));
    }

    #[tokio::test]
    async fn test_mock_wallet_rejections() {
        let wallet = MockWallet::new("0x12", 1, "0xsig")
            .rejecting_connection()
            .rejecting_signature()
            .without_network();

        assert!(matches!(
            wallet.request_account().await,
            Err(WalletError::Rejected(_))
        ));
        assert!(matches!(
            wallet.chain_id().await,
            Err(WalletError::Unsupported(_))
        ));
        assert!(wallet.sign_message("hi").await.is_err());
        assert_eq!(wallet.sign_requests(), 1);
    }
}
