/*
[INPUT]:  Wallet capability, page context and auth backend client
[OUTPUT]: Authenticated WalletSession or a terminal AuthError
[POS]:    Auth layer - orchestrates the Sign-In-With-Ethereum handshake
[UPDATE]: When handshake steps, message fields or endpoints change
*/

use std::future::Future;
use std::sync::Arc;

use chrono::{Duration, Utc};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::auth::WalletProvider;
use crate::config::AuthConfig;
use crate::http::{AuthClient, AuthError, Result};
use crate::session::WalletSession;
use crate::types::{AuthRequest, SiweMessage, generate_nonce};

/// Statement shown in the wallet prompt
pub const DEFAULT_STATEMENT: &str = "Sign in to Digi-tionary";

/// Where the sign-in request originates: the relying party's host and origin.
///
/// Both must match what the verifier expects, or verification fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageContext {
    /// Host (with port, if any), e.g. `app.example` or `localhost:3000`
    pub domain: String,
    /// Origin, e.g. `https://app.example`
    pub origin: String,
}

impl PageContext {
    pub fn new(domain: impl Into<String>, origin: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            origin: origin.into(),
        }
    }
}

/// Runs the client half of the SIWE handshake
pub struct SiweAuthenticator {
    client: AuthClient,
    wallet: Option<Arc<dyn WalletProvider>>,
    page: PageContext,
    statement: String,
    message_ttl: Option<Duration>,
    resources: Vec<String>,
}

impl SiweAuthenticator {
    /// `wallet` is `None` when the execution context has no wallet capability
    pub fn new(
        client: AuthClient,
        wallet: Option<Arc<dyn WalletProvider>>,
        page: PageContext,
    ) -> Self {
        Self {
            client,
            wallet,
            page,
            statement: DEFAULT_STATEMENT.to_string(),
            message_ttl: None,
            resources: Vec::new(),
        }
    }

    pub fn from_config(config: &AuthConfig, wallet: Option<Arc<dyn WalletProvider>>) -> Result<Self> {
        config.validate()?;
        let client = AuthClient::with_config(config.client_config(), &config.api_base_url)?;
        let mut authenticator = Self::new(client, wallet, config.page_context())
            .with_statement(config.statement.clone())
            .with_resources(config.resources.clone());
        if let Some(ttl) = config.message_ttl() {
            authenticator = authenticator.with_message_ttl(ttl);
        }
        Ok(authenticator)
    }

    pub fn with_statement(mut self, statement: impl Into<String>) -> Self {
        self.statement = statement.into();
        self
    }

    /// Add an `Expiration Time` of now + `ttl` to every message
    pub fn with_message_ttl(mut self, ttl: Duration) -> Self {
        self.message_ttl = Some(ttl);
        self
    }

    pub fn with_resources(mut self, resources: Vec<String>) -> Self {
        self.resources = resources;
        self
    }

    pub fn client(&self) -> &AuthClient {
        &self.client
    }

    pub fn page(&self) -> &PageContext {
        &self.page
    }

    /// Capability probe
    pub fn has_wallet(&self) -> bool {
        self.wallet.is_some()
    }

    /// Build a fresh message for `address` on `chain_id` without signing it
    pub fn prepare_message(&self, address: &str, chain_id: u64) -> Result<SiweMessage> {
        let issued_at = Utc::now();
        let mut builder = SiweMessage::builder()
            .domain(self.page.domain.as_str())
            .address(address)
            .statement(self.statement.as_str())
            .uri(self.page.origin.as_str())
            .chain_id(chain_id)
            .nonce(generate_nonce())
            .issued_at(issued_at)
            .resources(self.resources.iter().cloned());
        if let Some(ttl) = self.message_ttl {
            builder = builder.expiration_time(issued_at + ttl);
        }
        Ok(builder.build()?)
    }

    /// Complete sign-in flow
    ///
    /// 1. Resolve the account
    /// 2. Resolve the chain id
    /// 3. Build and canonicalize the message
    /// 4. Sign it with the wallet
    /// 5. Post `{message, signature}` to the verifier
    ///
    /// Every step races `cancel`; nothing is sent once it fires. No step is retried.
    pub async fn authenticate(&self, cancel: &CancellationToken) -> Result<WalletSession> {
        let Some(wallet) = self.wallet.as_deref() else {
            debug!("no wallet capability in this context");
            return Err(AuthError::WalletUnavailable);
        };

        // Step 1: Account
        debug!("requesting wallet account");
        let address = cancellable(cancel, wallet.request_account())
            .await?
            .map_err(|e| AuthError::WalletConnectionDenied(e.to_string()))?;

        // Step 2: Network
        debug!(address = %address, "resolving chain id");
        let chain_id = cancellable(cancel, wallet.chain_id())
            .await?
            .map_err(|e| AuthError::NetworkUnresolved(e.to_string()))?;
        if chain_id == 0 {
            return Err(AuthError::NetworkUnresolved(
                "chain id must be positive".to_string(),
            ));
        }

        // Step 3: Message
        let message = self.prepare_message(&address, chain_id)?;
        let canonical = message.to_canonical();
        info!(
            address = %message.address(),
            chain_id,
            domain = %message.domain(),
            "requesting siwe signature"
        );

        // Step 4: Signature (waits on the user, unbounded)
        let signature = cancellable(cancel, wallet.sign_message(&canonical))
            .await?
            .map_err(|e| AuthError::SignatureDenied(e.to_string()))?;

        // Step 5: Verification
        let request = AuthRequest::new(canonical, signature);
        cancellable(cancel, self.client.verify_siwe(&request)).await??;

        info!(address = %message.address(), chain_id, "siwe sign-in verified");
        Ok(WalletSession::authenticated(message.address()))
    }

    /// End the backend session
    pub async fn logout(&self) -> Result<()> {
        self.client.logout().await
    }
}

async fn cancellable<F: Future>(cancel: &CancellationToken, future: F) -> Result<F::Output> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(AuthError::Cancelled),
        output = future => Ok(output),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::auth::MockWallet;
    use wiremock::matchers::any;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const ADDRESS: &str = "0xAbC123000000000000000000000000000000dEaD";

    fn page() -> PageContext {
        PageContext::new("app.example", "https://app.example")
    }

    #[test]
    fn test_prepare_message_uses_page_context() {
        let client = AuthClient::with_base_url("https://app.example").unwrap();
        let authenticator = SiweAuthenticator::new(client, None, page())
            .with_message_ttl(Duration::minutes(5))
            .with_resources(vec!["https://app.example/terms".to_string()]);

        let message = authenticator.prepare_message(ADDRESS, 1).unwrap();
        assert_eq!(message.domain(), "app.example");
        assert_eq!(message.uri(), "https://app.example");
        assert_eq!(message.statement(), Some(DEFAULT_STATEMENT));
        assert!(message.expiration_time().is_some());
        assert_eq!(message.resources(), ["https://app.example/terms".to_string()]);
        assert!(!authenticator.has_wallet());
    }

    #[test]
    fn test_prepare_message_generates_fresh_nonce() {
        let client = AuthClient::with_base_url("https://app.example").unwrap();
        let authenticator = SiweAuthenticator::new(client, None, page());
        let first = authenticator.prepare_message(ADDRESS, 1).unwrap();
        let second = authenticator.prepare_message(ADDRESS, 1).unwrap();
        assert_ne!(first.nonce(), second.nonce());
    }

    #[tokio::test]
    async fn test_cancelled_before_signing_sends_nothing() {
        let server = MockServer::start().await;
        Mock::given(any())
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let wallet = MockWallet::new(ADDRESS, 1, "0xsig");
        let client = AuthClient::with_base_url(&server.uri()).unwrap();
        let authenticator =
            SiweAuthenticator::new(client, Some(Arc::new(wallet.clone())), page());

        let cancel = CancellationToken::new();
        cancel.cancel();
        let err = authenticator.authenticate(&cancel).await.unwrap_err();
        assert!(matches!(err, AuthError::Cancelled));
        assert_eq!(wallet.sign_requests(), 0);
    }
}
