/*
[INPUT]:  Wallet capability, page context and auth backend client
[OUTPUT]: Authenticated wallet sessions and signature checks
[POS]:    Auth layer - Sign-In-With-Ethereum handshake
[UPDATE]: When the sign-in flow or wallet integrations change
*/

pub mod authenticator;
pub mod evm_wallet;
pub mod wallet;

pub use authenticator::{PageContext, SiweAuthenticator};
pub use evm_wallet::{LocalWallet, recover_address, verify_signature};
pub use wallet::{MockWallet, WalletError, WalletProvider};
