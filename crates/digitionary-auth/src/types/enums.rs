/*
[INPUT]:  Supported sign-in paths
[OUTPUT]: Typed Rust enums with serialization support
[POS]:    Data layer - type definitions for sign-in communication
[UPDATE]: When a sign-in path is added or removed
*/

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignInMethod {
    Ethereum,
    Sso,
}

impl fmt::Display for SignInMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignInMethod::Ethereum => f.write_str("ethereum"),
            SignInMethod::Sso => f.write_str("sso"),
        }
    }
}
