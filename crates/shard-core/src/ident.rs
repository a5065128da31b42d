//! Validated identifiers for servers and namespaces.
//!
//! Both follow cluster resource-name rules: lowercase alphanumerics and
//! hyphens only. A `ServerId` is additionally capped at 50 characters and
//! may not start or end with a hyphen, since it is embedded in workload,
//! endpoint, and object-store key names.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use thiserror::Error;

static NAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9-]+$").expect("static pattern"));

/// Maximum length of a server identifier.
pub const SERVER_ID_MAX_LEN: usize = 50;

/// Maximum length of a namespace name.
pub const NAMESPACE_MAX_LEN: usize = 63;

/// Errors produced while parsing identifiers.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum IdentError {
    #[error("server ID must contain only lowercase letters, numbers, and hyphens")]
    ServerIdCharset,

    #[error("server ID must be {SERVER_ID_MAX_LEN} characters or less")]
    ServerIdTooLong,

    #[error("server ID cannot start or end with a hyphen")]
    ServerIdHyphen,

    #[error("namespace must contain only lowercase letters, numbers, and hyphens")]
    NamespaceCharset,

    #[error("namespace must be {NAMESPACE_MAX_LEN} characters or less")]
    NamespaceTooLong,
}

/// A validated server identifier, unique within a namespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ServerId(String);

impl ServerId {
    /// Parse and validate a raw string as a server ID.
    pub fn parse(raw: &str) -> Result<Self, IdentError> {
        if !NAME_PATTERN.is_match(raw) {
            return Err(IdentError::ServerIdCharset);
        }
        if raw.len() > SERVER_ID_MAX_LEN {
            return Err(IdentError::ServerIdTooLong);
        }
        if raw.starts_with('-') || raw.ends_with('-') {
            return Err(IdentError::ServerIdHyphen);
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The label selector matching this server's pods.
    pub fn selector(&self) -> String {
        format!("app={}", self.0)
    }

    /// Conventional name of this server's network endpoint resource.
    pub fn endpoint_name(&self) -> String {
        format!("{}-svc", self.0)
    }
}

impl fmt::Display for ServerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A validated cluster namespace name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Namespace(String);

impl Namespace {
    /// Parse and validate a raw string as a namespace.
    pub fn parse(raw: &str) -> Result<Self, IdentError> {
        if !NAME_PATTERN.is_match(raw) {
            return Err(IdentError::NamespaceCharset);
        }
        if raw.len() > NAMESPACE_MAX_LEN {
            return Err(IdentError::NamespaceTooLong);
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Namespace {
    fn default() -> Self {
        Self("default".to_string())
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_simple_ids() {
        assert!(ServerId::parse("game-1").is_ok());
        assert!(ServerId::parse("a").is_ok());
        assert!(ServerId::parse("srv-00-test").is_ok());
    }

    #[test]
    fn rejects_uppercase_and_underscore() {
        assert_eq!(ServerId::parse("Game_1"), Err(IdentError::ServerIdCharset));
        assert_eq!(ServerId::parse("GAME"), Err(IdentError::ServerIdCharset));
    }

    #[test]
    fn rejects_overlong_id() {
        let raw = "a".repeat(51);
        assert_eq!(ServerId::parse(&raw), Err(IdentError::ServerIdTooLong));
        assert!(ServerId::parse(&"a".repeat(50)).is_ok());
    }

    #[test]
    fn rejects_leading_or_trailing_hyphen() {
        assert_eq!(ServerId::parse("-game"), Err(IdentError::ServerIdHyphen));
        assert_eq!(ServerId::parse("game-"), Err(IdentError::ServerIdHyphen));
    }

    #[test]
    fn rejects_empty_id() {
        assert_eq!(ServerId::parse(""), Err(IdentError::ServerIdCharset));
    }

    #[test]
    fn error_message_names_the_rule() {
        let err = ServerId::parse("Game_1").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("lowercase"));
        assert!(msg.contains("hyphens"));
    }

    #[test]
    fn namespace_default_is_default() {
        assert_eq!(Namespace::default().as_str(), "default");
    }

    #[test]
    fn namespace_length_cap() {
        assert!(Namespace::parse(&"a".repeat(63)).is_ok());
        assert_eq!(
            Namespace::parse(&"a".repeat(64)),
            Err(IdentError::NamespaceTooLong)
        );
    }

    #[test]
    fn selector_and_endpoint_name() {
        let id = ServerId::parse("game-1").unwrap();
        assert_eq!(id.selector(), "app=game-1");
        assert_eq!(id.endpoint_name(), "game-1-svc");
    }
}
