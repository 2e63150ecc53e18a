/*
[INPUT]:  Canonical SIWE plaintext and wallet signature
[OUTPUT]: Request bodies for the verification endpoint
[POS]:    Data layer - request types
[UPDATE]: When the verifier request schema changes
*/

use serde::{Deserialize, Serialize};

/// Body posted to `/api/auth/siwe`.
///
/// `message` must be the exact string the wallet signed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthRequest {
    pub message: String,
    pub signature: String,
}

impl AuthRequest {
    pub fn new(message: impl Into<String>, signature: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            signature: signature.into(),
        }
    }
}
