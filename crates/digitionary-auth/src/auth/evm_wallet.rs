/*
[INPUT]:  EVM private key (hex string), messages and signatures
[OUTPUT]: EIP-191 signatures and recovered signer addresses
[POS]:    Auth layer - EVM wallet implementation
[UPDATE]: When signing logic or EVM address formatting changes
*/

use std::str::FromStr;

use alloy_primitives::Signature;
use alloy_signer::Signer;
use alloy_signer_local::PrivateKeySigner;
use async_trait::async_trait;

use crate::auth::{WalletError, WalletProvider};
use crate::http::{AuthError, Result};

/// Wallet backed by an in-memory secp256k1 key
pub struct LocalWallet {
    signer: PrivateKeySigner,
    address: String,
    chain_id: u64,
}

impl LocalWallet {
    /// Create a wallet from a hex-encoded private key, reporting `chain_id`
    /// as its active network
    ///
    /// Supports both "0x"-prefixed and non-prefixed hex strings.
    pub fn new(private_key_hex: &str, chain_id: u64) -> Result<Self> {
        let private_key_hex = private_key_hex.trim();
        let private_key_hex = private_key_hex.strip_prefix("0x").unwrap_or(private_key_hex);
        let signer = PrivateKeySigner::from_str(private_key_hex)
            .map_err(|e| AuthError::Config(format!("Invalid EVM private key: {e}")))?;

        let address = signer.address().to_checksum(None);

        Ok(Self {
            signer,
            address,
            chain_id,
        })
    }

    /// EIP-55 checksummed address
    pub fn address(&self) -> &str {
        &self.address
    }
}

impl std::fmt::Debug for LocalWallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalWallet")
            .field("address", &self.address)
            .field("chain_id", &self.chain_id)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl WalletProvider for LocalWallet {
    async fn request_account(&self) -> std::result::Result<String, WalletError> {
        Ok(self.address.clone())
    }

    async fn chain_id(&self) -> std::result::Result<u64, WalletError> {
        if self.chain_id == 0 {
            return Err(WalletError::Unsupported("no active network".to_string()));
        }
        Ok(self.chain_id)
    }

    async fn sign_message(&self, message: &str) -> std::result::Result<String, WalletError> {
        let signature = self
            .signer
            .sign_message(message.as_bytes())
            .await
            .map_err(|e| WalletError::Provider(format!("Failed to sign EVM message: {e}")))?;

        // alloy's Signature as_bytes() returns [r, s, v]
        Ok(format!("0x{}", hex::encode(signature.as_bytes())))
    }
}

/// Recover the EIP-191 signer of `message`, checksummed
pub fn recover_address(message: &str, signature: &str) -> Result<String> {
    let signature = signature.trim();
    let raw = signature.strip_prefix("0x").unwrap_or(signature);
    let bytes = hex::decode(raw)
        .map_err(|e| AuthError::InvalidSignature(format!("signature is not hex: {e}")))?;
    let signature = Signature::from_raw(&bytes)
        .map_err(|e| AuthError::InvalidSignature(e.to_string()))?;
    let address = signature
        .recover_address_from_msg(message.as_bytes())
        .map_err(|e| AuthError::InvalidSignature(e.to_string()))?;
    Ok(address.to_checksum(None))
}

/// True when `signature` over `message` recovers to `expected` (case-insensitive)
pub fn verify_signature(message: &str, signature: &str, expected: &str) -> Result<bool> {
    let recovered = recover_address(message, signature)?;
    Ok(recovered.eq_ignore_ascii_case(expected.trim()))
}
