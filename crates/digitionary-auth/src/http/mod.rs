/*
[INPUT]:  HTTP client configuration and auth endpoints
[OUTPUT]: HTTP responses and typed results
[POS]:    HTTP layer - backend communication
[UPDATE]: When adding endpoints or changing client behavior
*/

pub mod client;
pub mod endpoints;
pub mod error;

pub use client::{AuthClient, ClientConfig};
pub use endpoints::{HEALTH_ENDPOINT, LOGOUT_ENDPOINT, SIWE_ENDPOINT, SSO_ENDPOINT};
pub use error::{AuthError, Result};
