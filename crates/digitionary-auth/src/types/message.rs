/*
[INPUT]:  Sign-in fields (domain, address, uri, chain id, nonce, timestamps)
[OUTPUT]: Validated SiweMessage and its ERC-4361 plaintext form
[POS]:    Data layer - canonical sign-in message codec
[UPDATE]: When ERC-4361 fields or validation rules change
*/

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use rand::Rng;
use rand::distributions::Alphanumeric;
use thiserror::Error;
use url::Url;

/// Only version defined by ERC-4361
pub const SIWE_VERSION: &str = "1";

const PREAMBLE_SUFFIX: &str = " wants you to sign in with your Ethereum account:";
const URI_TAG: &str = "URI: ";
const VERSION_TAG: &str = "Version: ";
const CHAIN_ID_TAG: &str = "Chain ID: ";
const NONCE_TAG: &str = "Nonce: ";
const ISSUED_AT_TAG: &str = "Issued At: ";
const EXPIRATION_TIME_TAG: &str = "Expiration Time: ";
const NOT_BEFORE_TAG: &str = "Not Before: ";
const REQUEST_ID_TAG: &str = "Request ID: ";
const RESOURCES_TAG: &str = "Resources:";
const RESOURCE_PREFIX: &str = "- ";

const NONCE_LEN: usize = 17;
const MIN_NONCE_LEN: usize = 8;

/// Errors raised while building or parsing a SIWE message
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessageError {
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("invalid {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },

    #[error("malformed message at line {line}: {reason}")]
    Malformed { line: usize, reason: String },
}

impl MessageError {
    fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        MessageError::InvalidField {
            field,
            reason: reason.into(),
        }
    }
}

/// Generate a random alphanumeric nonce
pub fn generate_nonce() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(NONCE_LEN)
        .map(char::from)
        .collect()
}

/// Format a timestamp the way ERC-4361 messages carry it (RFC 3339, UTC, millis)
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// A Sign-In-With-Ethereum message.
///
/// Fields are private: a message is validated when built or parsed and never
/// changes afterwards, so the plaintext produced by [`SiweMessage::to_canonical`]
/// is stable for the lifetime of the value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiweMessage {
    scheme: Option<String>,
    domain: String,
    address: String,
    statement: Option<String>,
    uri: String,
    version: String,
    chain_id: u64,
    nonce: String,
    issued_at: String,
    expiration_time: Option<String>,
    not_before: Option<String>,
    request_id: Option<String>,
    resources: Vec<String>,
}

impl SiweMessage {
    pub fn builder() -> SiweMessageBuilder {
        SiweMessageBuilder::default()
    }

    pub fn scheme(&self) -> Option<&str> {
        self.scheme.as_deref()
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn statement(&self) -> Option<&str> {
        self.statement.as_deref()
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    pub fn nonce(&self) -> &str {
        &self.nonce
    }

    pub fn issued_at(&self) -> &str {
        &self.issued_at
    }

    pub fn expiration_time(&self) -> Option<&str> {
        self.expiration_time.as_deref()
    }

    pub fn not_before(&self) -> Option<&str> {
        self.not_before.as_deref()
    }

    pub fn request_id(&self) -> Option<&str> {
        self.request_id.as_deref()
    }

    pub fn resources(&self) -> &[String] {
        &self.resources
    }

    /// The exact plaintext a wallet signs
    pub fn to_canonical(&self) -> String {
        self.to_string()
    }

    /// True once `now` is at or past the expiration time
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expiration_time
            .as_deref()
            .and_then(parse_timestamp)
            .is_some_and(|expires_at| now >= expires_at)
    }

    /// True when `now` falls inside the not-before / expiration window
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        let started = self
            .not_before
            .as_deref()
            .and_then(parse_timestamp)
            .is_none_or(|not_before| now >= not_before);
        started && !self.is_expired(now)
    }

    fn validate(self) -> Result<Self, MessageError> {
        if let Some(scheme) = &self.scheme {
            validate_scheme(scheme)?;
        }
        validate_domain(&self.domain)?;
        validate_address(&self.address)?;
        if let Some(statement) = &self.statement {
            validate_statement(statement)?;
        }
        validate_uri("uri", &self.uri)?;
        if self.version != SIWE_VERSION {
            return Err(MessageError::invalid(
                "version",
                format!("expected {SIWE_VERSION}, got {}", self.version),
            ));
        }
        if self.chain_id == 0 {
            return Err(MessageError::invalid("chain_id", "must be positive"));
        }
        validate_nonce(&self.nonce)?;
        validate_timestamp("issued_at", &self.issued_at)?;
        if let Some(expiration_time) = &self.expiration_time {
            validate_timestamp("expiration_time", expiration_time)?;
        }
        if let Some(not_before) = &self.not_before {
            validate_timestamp("not_before", not_before)?;
        }
        if let Some(request_id) = &self.request_id {
            if request_id.contains('\n') {
                return Err(MessageError::invalid("request_id", "must be a single line"));
            }
        }
        for resource in &self.resources {
            validate_uri("resources", resource)?;
        }
        Ok(self)
    }
}

impl fmt::Display for SiweMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(scheme) = &self.scheme {
            write!(f, "{scheme}://")?;
        }
        writeln!(f, "{}{PREAMBLE_SUFFIX}", self.domain)?;
        writeln!(f, "{}", self.address)?;
        writeln!(f)?;
        if let Some(statement) = &self.statement {
            writeln!(f, "{statement}")?;
        }
        writeln!(f)?;
        writeln!(f, "{URI_TAG}{}", self.uri)?;
        writeln!(f, "{VERSION_TAG}{}", self.version)?;
        writeln!(f, "{CHAIN_ID_TAG}{}", self.chain_id)?;
        writeln!(f, "{NONCE_TAG}{}", self.nonce)?;
        write!(f, "{ISSUED_AT_TAG}{}", self.issued_at)?;
        if let Some(expiration_time) = &self.expiration_time {
            write!(f, "\n{EXPIRATION_TIME_TAG}{expiration_time}")?;
        }
        if let Some(not_before) = &self.not_before {
            write!(f, "\n{NOT_BEFORE_TAG}{not_before}")?;
        }
        if let Some(request_id) = &self.request_id {
            write!(f, "\n{REQUEST_ID_TAG}{request_id}")?;
        }
        if !self.resources.is_empty() {
            write!(f, "\n{RESOURCES_TAG}")?;
            for resource in &self.resources {
                write!(f, "\n{RESOURCE_PREFIX}{resource}")?;
            }
        }
        Ok(())
    }
}

impl FromStr for SiweMessage {
    type Err = MessageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut lines = Lines::new(s);

        let header = lines.next_required("header")?;
        let authority = header
            .strip_suffix(PREAMBLE_SUFFIX)
            .ok_or_else(|| MessageError::Malformed {
                line: 1,
                reason: "expected `<domain> wants you to sign in with your Ethereum account:`"
                    .to_string(),
            })?;
        let (scheme, domain) = match authority.split_once("://") {
            Some((scheme, domain)) => (Some(scheme.to_string()), domain.to_string()),
            None => (None, authority.to_string()),
        };

        let address = lines.next_required("address")?.to_string();
        lines.expect_blank()?;

        let statement = match lines.next_required("statement")? {
            "" => None,
            statement => {
                lines.expect_blank()?;
                Some(statement.to_string())
            }
        };

        let uri = lines.expect_tag(URI_TAG, "uri")?.to_string();
        let version = lines.expect_tag(VERSION_TAG, "version")?.to_string();
        let chain_id = lines.expect_tag(CHAIN_ID_TAG, "chain_id")?;
        let chain_id = chain_id
            .parse::<u64>()
            .map_err(|e| MessageError::invalid("chain_id", e.to_string()))?;
        let nonce = lines.expect_tag(NONCE_TAG, "nonce")?.to_string();
        let issued_at = lines.expect_tag(ISSUED_AT_TAG, "issued_at")?.to_string();

        let expiration_time = lines.optional_tag(EXPIRATION_TIME_TAG).map(str::to_string);
        let not_before = lines.optional_tag(NOT_BEFORE_TAG).map(str::to_string);
        let request_id = lines.optional_tag(REQUEST_ID_TAG).map(str::to_string);

        let mut resources = Vec::new();
        if lines.peek() == Some(RESOURCES_TAG) {
            lines.advance();
            while let Some(resource) = lines.optional_tag(RESOURCE_PREFIX) {
                resources.push(resource.to_string());
            }
        }

        if lines.peek().is_some() {
            return Err(lines.malformed("unexpected trailing line"));
        }

        SiweMessage {
            scheme,
            domain,
            address,
            statement,
            uri,
            version,
            chain_id,
            nonce,
            issued_at,
            expiration_time,
            not_before,
            request_id,
            resources,
        }
        .validate()
    }
}

struct Lines<'a> {
    lines: Vec<&'a str>,
    pos: usize,
}

impl<'a> Lines<'a> {
    fn new(s: &'a str) -> Self {
        Self {
            lines: s.split('\n').collect(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<&'a str> {
        self.lines.get(self.pos).copied()
    }

    fn advance(&mut self) {
        self.pos += 1;
    }

    fn malformed(&self, reason: impl Into<String>) -> MessageError {
        MessageError::Malformed {
            line: self.pos + 1,
            reason: reason.into(),
        }
    }

    fn next_required(&mut self, field: &'static str) -> Result<&'a str, MessageError> {
        let line = self.peek().ok_or(MessageError::MissingField(field))?;
        self.advance();
        Ok(line)
    }

    fn expect_blank(&mut self) -> Result<(), MessageError> {
        match self.peek() {
            Some("") => {
                self.advance();
                Ok(())
            }
            _ => Err(self.malformed("expected an empty line")),
        }
    }

    fn expect_tag(&mut self, tag: &str, field: &'static str) -> Result<&'a str, MessageError> {
        self.optional_tag(tag).ok_or(MessageError::MissingField(field))
    }

    fn optional_tag(&mut self, tag: &str) -> Option<&'a str> {
        let value = self.peek()?.strip_prefix(tag)?;
        self.advance();
        Some(value)
    }
}

/// Collects message fields; [`SiweMessageBuilder::build`] validates them.
///
/// `version` defaults to `"1"`, `nonce` to a fresh random value and
/// `issued_at` to the current time.
#[derive(Debug, Clone, Default)]
pub struct SiweMessageBuilder {
    scheme: Option<String>,
    domain: Option<String>,
    address: Option<String>,
    statement: Option<String>,
    uri: Option<String>,
    version: Option<String>,
    chain_id: Option<u64>,
    nonce: Option<String>,
    issued_at: Option<String>,
    expiration_time: Option<String>,
    not_before: Option<String>,
    request_id: Option<String>,
    resources: Vec<String>,
}

impl SiweMessageBuilder {
    pub fn scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = Some(scheme.into());
        self
    }

    pub fn domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    pub fn address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    pub fn statement(mut self, statement: impl Into<String>) -> Self {
        self.statement = Some(statement.into());
        self
    }

    pub fn uri(mut self, uri: impl Into<String>) -> Self {
        self.uri = Some(uri.into());
        self
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn chain_id(mut self, chain_id: u64) -> Self {
        self.chain_id = Some(chain_id);
        self
    }

    pub fn nonce(mut self, nonce: impl Into<String>) -> Self {
        self.nonce = Some(nonce.into());
        self
    }

    pub fn issued_at(mut self, issued_at: DateTime<Utc>) -> Self {
        self.issued_at = Some(format_timestamp(issued_at));
        self
    }

    pub fn expiration_time(mut self, expiration_time: DateTime<Utc>) -> Self {
        self.expiration_time = Some(format_timestamp(expiration_time));
        self
    }

    pub fn not_before(mut self, not_before: DateTime<Utc>) -> Self {
        self.not_before = Some(format_timestamp(not_before));
        self
    }

    pub fn request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    pub fn resource(mut self, resource: impl Into<String>) -> Self {
        self.resources.push(resource.into());
        self
    }

    pub fn resources<I, S>(mut self, resources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.resources.extend(resources.into_iter().map(Into::into));
        self
    }

    pub fn build(self) -> Result<SiweMessage, MessageError> {
        SiweMessage {
            scheme: self.scheme,
            domain: self.domain.ok_or(MessageError::MissingField("domain"))?,
            address: self.address.ok_or(MessageError::MissingField("address"))?,
            statement: self.statement,
            uri: self.uri.ok_or(MessageError::MissingField("uri"))?,
            version: self.version.unwrap_or_else(|| SIWE_VERSION.to_string()),
            chain_id: self.chain_id.ok_or(MessageError::MissingField("chain_id"))?,
            nonce: self.nonce.unwrap_or_else(generate_nonce),
            issued_at: self
                .issued_at
                .unwrap_or_else(|| format_timestamp(Utc::now())),
            expiration_time: self.expiration_time,
            not_before: self.not_before,
            request_id: self.request_id,
            resources: self.resources,
        }
        .validate()
    }
}

/// Check the `0x` + 40 hex digit form. EIP-55 checksums are not enforced.
pub fn validate_address(address: &str) -> Result<(), MessageError> {
    let digits = address
        .strip_prefix("0x")
        .ok_or_else(|| MessageError::invalid("address", "must start with 0x"))?;
    if digits.len() != 40 {
        return Err(MessageError::invalid(
            "address",
            format!("expected 40 hex digits, got {}", digits.len()),
        ));
    }
    if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(MessageError::invalid("address", "contains non-hex characters"));
    }
    Ok(())
}

fn validate_scheme(scheme: &str) -> Result<(), MessageError> {
    let mut chars = scheme.chars();
    let starts_alpha = chars.next().is_some_and(|c| c.is_ascii_alphabetic());
    if !starts_alpha || !chars.all(|c| c.is_ascii_alphanumeric() || "+-.".contains(c)) {
        return Err(MessageError::invalid("scheme", format!("`{scheme}` is not a URI scheme")));
    }
    Ok(())
}

fn validate_domain(domain: &str) -> Result<(), MessageError> {
    if domain.is_empty() {
        return Err(MessageError::invalid("domain", "must not be empty"));
    }
    if domain.chars().any(|c| c.is_whitespace() || c == '/') {
        return Err(MessageError::invalid("domain", format!("`{domain}` is not an authority")));
    }
    Ok(())
}

fn validate_statement(statement: &str) -> Result<(), MessageError> {
    if statement.is_empty() {
        return Err(MessageError::invalid("statement", "must not be empty when present"));
    }
    if statement.contains('\n') {
        return Err(MessageError::invalid("statement", "must be a single line"));
    }
    Ok(())
}

fn validate_uri(field: &'static str, uri: &str) -> Result<(), MessageError> {
    Url::parse(uri)
        .map(|_| ())
        .map_err(|e| MessageError::invalid(field, format!("`{uri}`: {e}")))
}

fn validate_nonce(nonce: &str) -> Result<(), MessageError> {
    if nonce.len() < MIN_NONCE_LEN || !nonce.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(MessageError::invalid(
            "nonce",
            format!("expected at least {MIN_NONCE_LEN} alphanumeric characters"),
        ));
    }
    Ok(())
}

fn validate_timestamp(field: &'static str, value: &str) -> Result<(), MessageError> {
    DateTime::parse_from_rfc3339(value)
        .map(|_| ())
        .map_err(|e| MessageError::invalid(field, format!("`{value}`: {e}")))
}

fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|parsed| parsed.with_timezone(&Utc))
}
