/*
[INPUT]:  JSON bodies returned by the auth backend
[OUTPUT]: Typed response structs
[POS]:    Data layer - response types
[UPDATE]: When backend response schemas change
*/

use serde::{Deserialize, Serialize};

/// Body of `GET /api/auth/sso`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SsoRedirect {
    pub redirect_url: String,
}

/// Body of `GET /api/health`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
}

impl HealthStatus {
    pub fn is_ok(&self) -> bool {
        self.status.eq_ignore_ascii_case("ok")
    }
}
