/*
[INPUT]:  Signed sign-in requests and session actions
[OUTPUT]: Verification, logout, SSO handoff and health results
[POS]:    HTTP layer - auth backend endpoints
[UPDATE]: When backend routes or their contracts change
*/

use reqwest::{Method, Url};
use tracing::debug;

use crate::http::client::read_detail;
use crate::http::{AuthClient, AuthError, Result};
use crate::types::{AuthRequest, HealthStatus, SsoRedirect};

pub const SIWE_ENDPOINT: &str = "/api/auth/siwe";
pub const SSO_ENDPOINT: &str = "/api/auth/sso";
pub const LOGOUT_ENDPOINT: &str = "/api/auth/logout";
pub const HEALTH_ENDPOINT: &str = "/api/health";

impl AuthClient {
    /// Submit a signed message to the verifier
    ///
    /// POST /api/auth/siwe. Any 2xx is success; the body is not read.
    pub async fn verify_siwe(&self, request: &AuthRequest) -> Result<()> {
        let builder = self.request(Method::POST, SIWE_ENDPOINT)?.json(request);
        let response = builder.send().await?;
        let status = response.status();
        if status.is_success() {
            debug!(status = status.as_u16(), "siwe verification accepted");
            return Ok(());
        }
        Err(AuthError::verification_rejected(
            status,
            read_detail(response).await,
        ))
    }

    /// End the backend session
    ///
    /// POST /api/auth/logout. The response status is ignored; only transport
    /// failures are reported.
    pub async fn logout(&self) -> Result<()> {
        let builder = self.request(Method::POST, LOGOUT_ENDPOINT)?;
        let response = builder.send().await?;
        debug!(status = response.status().as_u16(), "logout response");
        Ok(())
    }

    /// Navigation target for the redirect-based SSO handoff
    pub fn sso_url(&self) -> Result<Url> {
        self.endpoint_url(SSO_ENDPOINT)
    }

    /// Ask the backend for the provider redirect
    ///
    /// GET /api/auth/sso
    pub async fn resolve_sso_redirect(&self) -> Result<Url> {
        let builder = self.request(Method::GET, SSO_ENDPOINT)?;
        let redirect: SsoRedirect = self.send_json(builder).await?;
        Ok(Url::parse(&redirect.redirect_url)?)
    }

    /// GET /api/health
    pub async fn health(&self) -> Result<HealthStatus> {
        let builder = self.request(Method::GET, HEALTH_ENDPOINT)?;
        self.send_json(builder).await
    }
}
