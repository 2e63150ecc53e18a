/*
[INPUT]:  Crate modules and public type definitions
[OUTPUT]: Public Digi-tionary auth crate surface
[POS]:    Crate root - module wiring
[UPDATE]: When public modules or exports change
*/

pub mod auth;
pub mod config;
pub mod http;
pub mod session;
pub mod types;

// Re-export commonly used types from auth
pub use auth::{
    LocalWallet,
    MockWallet,
    PageContext,
    SiweAuthenticator,
    WalletError,
    WalletProvider,
    recover_address,
    verify_signature,
};

pub use config::AuthConfig;

// Re-export commonly used types from http
pub use http::{AuthClient, AuthError, ClientConfig, Result};

pub use session::{AuthAction, AuthState, LoginController, SsoHandoff, StateError, WalletSession};

// Re-export all types
pub use types::*;

pub use tokio_util::sync::CancellationToken;
