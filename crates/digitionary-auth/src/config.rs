/*
[INPUT]:  YAML configuration file
[OUTPUT]: Parsed sign-in configuration
[POS]:    Configuration layer - backend and page context setup
[UPDATE]: When adding new configuration options
*/

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::auth::PageContext;
use crate::auth::authenticator::DEFAULT_STATEMENT;
use crate::http::{AuthError, ClientConfig, Result};

/// Top-level configuration for the sign-in flows
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct AuthConfig {
    /// Backend serving `/api/auth/*`
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    /// Relying-party host placed in the message header
    #[serde(default = "default_domain")]
    pub domain: String,
    /// Origin placed in the `URI:` line
    #[serde(default = "default_origin")]
    pub origin: String,
    #[serde(default = "default_statement")]
    pub statement: String,
    /// Total HTTP timeout for each backend call
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    /// Adds an `Expiration Time` this many seconds after `Issued At`
    #[serde(default)]
    pub message_ttl_secs: Option<u64>,
    #[serde(default)]
    pub resources: Vec<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            domain: default_domain(),
            origin: default_origin(),
            statement: default_statement(),
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
            message_ttl_secs: None,
            resources: Vec::new(),
        }
    }
}

fn default_api_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_domain() -> String {
    "localhost:3000".to_string()
}

fn default_origin() -> String {
    "http://localhost:3000".to_string()
}

fn default_statement() -> String {
    DEFAULT_STATEMENT.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_connect_timeout_secs() -> u64 {
    10
}

impl AuthConfig {
    /// Load configuration from YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| AuthError::Config(format!("read {}: {e}", path.display())))?;
        Self::from_yaml_str(&content)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(content)
            .map_err(|e| AuthError::Config(format!("invalid YAML configuration: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        Url::parse(&self.api_base_url)
            .map_err(|e| AuthError::Config(format!("api_base_url: {e}")))?;
        Url::parse(&self.origin).map_err(|e| AuthError::Config(format!("origin: {e}")))?;
        if self.domain.trim().is_empty() {
            return Err(AuthError::Config("domain must not be empty".to_string()));
        }
        if self.statement.is_empty() || self.statement.contains('\n') {
            return Err(AuthError::Config(
                "statement must be a single non-empty line".to_string(),
            ));
        }
        if self.timeout_secs == 0 {
            return Err(AuthError::Config("timeout_secs must be positive".to_string()));
        }
        if self.message_ttl_secs == Some(0) {
            return Err(AuthError::Config("message_ttl_secs must be positive".to_string()));
        }
        for resource in &self.resources {
            Url::parse(resource)
                .map_err(|e| AuthError::Config(format!("resource `{resource}`: {e}")))?;
        }
        Ok(())
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            timeout: Duration::from_secs(self.timeout_secs),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
        }
    }

    pub fn page_context(&self) -> PageContext {
        PageContext::new(self.domain.clone(), self.origin.clone())
    }

    pub fn message_ttl(&self) -> Option<chrono::Duration> {
        let secs = i64::try_from(self.message_ttl_secs?).ok()?;
        chrono::Duration::try_seconds(secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_yaml() {
        let config = AuthConfig::from_yaml_str("{}").unwrap();
        assert_eq!(config, AuthConfig::default());
        assert_eq!(config.statement, "Sign in to Digi-tionary");
        assert_eq!(config.client_config().timeout, Duration::from_secs(30));
        assert!(config.message_ttl().is_none());
    }

    #[test]
    fn test_full_yaml() {
        let yaml = r#"
api_base_url: "https://api.app.example"
domain: "app.example"
origin: "https://app.example"
timeout_secs: 5
message_ttl_secs: 600
resources:
  - "https://app.example/terms"
"#;
        let config = AuthConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.page_context(), PageContext::new("app.example", "https://app.example"));
        assert_eq!(config.client_config().timeout, Duration::from_secs(5));
        assert_eq!(config.message_ttl(), Some(chrono::Duration::minutes(10)));
        assert_eq!(config.resources.len(), 1);
    }

    #[test]
    fn test_rejects_invalid_values() {
        assert!(AuthConfig::from_yaml_str("origin: \"not a url\"").is_err());
        assert!(AuthConfig::from_yaml_str("timeout_secs: 0").is_err());
        assert!(AuthConfig::from_yaml_str("statement: \"\"").is_err());
        assert!(AuthConfig::from_yaml_str("timeout_secs: [1]").is_err());
    }

    #[test]
    fn test_from_missing_file() {
        let err = AuthConfig::from_file("/definitely/not/here.yaml").unwrap_err();
        assert!(matches!(err, AuthError::Config(_)));
    }
}
