/*
[INPUT]:  Error sources (wallet, HTTP, message codec, state machine)
[OUTPUT]: Structured error types with user-facing notices
[POS]:    Error handling layer - unified error types for entire crate
[UPDATE]: When adding new error sources or changing user notices
*/

use reqwest::StatusCode;
use thiserror::Error;

use crate::session::StateError;
use crate::types::MessageError;

/// Main error type for the sign-in flows
#[derive(Error, Debug)]
pub enum AuthError {
    /// No wallet capability in this execution context
    #[error("no wallet capability available")]
    WalletUnavailable,

    /// User rejected the account prompt or the wallet failed to provide one
    #[error("wallet connection denied: {0}")]
    WalletConnectionDenied(String),

    /// Active chain id could not be resolved
    #[error("network unresolved: {0}")]
    NetworkUnresolved(String),

    /// User rejected the signature prompt or the wallet failed to sign
    #[error("signature denied: {0}")]
    SignatureDenied(String),

    /// Verifier answered with a non-2xx status
    #[error("verification rejected (status {status}): {detail}")]
    VerificationRejected { status: u16, detail: String },

    /// Backend could not be reached, or the exchange timed out
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-2xx answer from an endpoint other than the verifier
    #[error("API error (status {status}): {detail}")]
    Api { status: u16, detail: String },

    #[error("invalid SIWE message: {0}")]
    InvalidMessage(#[from] MessageError),

    #[error("invalid signature: {0}")]
    InvalidSignature(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid URL: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("an authentication attempt is already in progress")]
    AlreadyInProgress,

    #[error("authentication attempt cancelled")]
    Cancelled,

    #[error(transparent)]
    InvalidTransition(#[from] StateError),
}

impl AuthError {
    /// Single human-readable notice for the user. Never carries provider detail.
    pub fn user_notice(&self) -> &'static str {
        match self {
            AuthError::WalletUnavailable => {
                "Please install MetaMask or another Web3 wallet"
            }
            AuthError::WalletConnectionDenied(_) => "Wallet connection was not approved",
            AuthError::NetworkUnresolved(_) => "Could not determine the wallet's network",
            AuthError::SignatureDenied(_) => "The sign-in request was not signed",
            AuthError::VerificationRejected { .. } => "Authentication failed",
            AuthError::Transport(_) => "Could not reach the sign-in service",
            AuthError::Api { .. } => "The sign-in service returned an error",
            AuthError::InvalidMessage(_) | AuthError::InvalidSignature(_) => {
                "The wallet returned data that cannot be used to sign in"
            }
            AuthError::Serialization(_) => "The sign-in service sent an unexpected response",
            AuthError::UrlParse(_) | AuthError::Config(_) => "Sign-in is not configured correctly",
            AuthError::AlreadyInProgress => "A sign-in is already in progress",
            AuthError::Cancelled => "Sign-in was cancelled",
            AuthError::InvalidTransition(_) => "Sign-in is not available right now",
        }
    }

    /// True when the user declined a wallet prompt
    pub fn is_user_rejection(&self) -> bool {
        matches!(
            self,
            AuthError::WalletConnectionDenied(_) | AuthError::SignatureDenied(_)
        )
    }

    pub(crate) fn verification_rejected(status: StatusCode, detail: impl Into<String>) -> Self {
        AuthError::VerificationRejected {
            status: status.as_u16(),
            detail: detail.into(),
        }
    }

    pub(crate) fn api_error(status: StatusCode, detail: impl Into<String>) -> Self {
        AuthError::Api {
            status: status.as_u16(),
            detail: detail.into(),
        }
    }
}

/// Result type alias for sign-in operations
pub type Result<T> = std::result::Result<T, AuthError>;
