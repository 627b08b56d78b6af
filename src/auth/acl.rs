//! Access control list.
//!
//! # Responsibilities
//! - Parse the consumer → method pattern mapping (JSON)
//! - Validate every pattern up front, at load time
//! - Answer "may this consumer call this method"
//!
//! # Design Decisions
//! - Patterns are parsed into `MethodPattern` once, matching never re-splits
//! - Pattern order is preserved per consumer; the first match wins
//! - Immutable after load, shared via `Arc`

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use serde::Deserialize;

/// Errors raised while loading an ACL.
#[derive(Debug, thiserror::Error)]
pub enum AclError {
    #[error("failed to read ACL file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid ACL JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("consumer {consumer:?} has an invalid pattern: {source}")]
    Pattern {
        consumer: String,
        #[source]
        source: MethodNameError,
    },
}

/// A method name that does not have the `service/method` shape.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("malformed method name {0:?}, expected \"service/method\"")]
pub struct MethodNameError(pub String);

/// A fully qualified method, `service/method`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodName {
    service: String,
    method: String,
}

impl MethodName {
    /// Parse `service/method`, tolerating one leading `/`.
    pub fn parse(full: &str) -> Result<Self, MethodNameError> {
        let trimmed = full.strip_prefix('/').unwrap_or(full);
        let mut parts = trimmed.split('/');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(service), Some(method), None) if !service.is_empty() && !method.is_empty() => {
                Ok(Self {
                    service: service.to_string(),
                    method: method.to_string(),
                })
            }
            _ => Err(MethodNameError(full.to_string())),
        }
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    pub fn method(&self) -> &str {
        &self.method
    }
}

impl fmt::Display for MethodName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.service, self.method)
    }
}

/// One permitted method pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MethodPattern {
    /// `service/method`
    Exact(MethodName),
    /// `service/*`
    Service(String),
}

impl MethodPattern {
    pub fn parse(raw: &str) -> Result<Self, MethodNameError> {
        let name = MethodName::parse(raw)?;
        if name.method == "*" {
            Ok(MethodPattern::Service(name.service))
        } else {
            Ok(MethodPattern::Exact(name))
        }
    }

    pub fn matches(&self, method: &MethodName) -> bool {
        match self {
            MethodPattern::Exact(expected) => expected == method,
            MethodPattern::Service(service) => service == method.service(),
        }
    }
}

#[derive(Deserialize)]
#[serde(transparent)]
struct RawAcl(HashMap<String, Vec<String>>);

/// Consumer → ordered method patterns.
#[derive(Debug, Clone, Default)]
pub struct AccessControlList {
    entries: HashMap<String, Vec<MethodPattern>>,
}

impl AccessControlList {
    /// Parse the JSON form, e.g. `{"alice": ["biz/Check", "admin/*"]}`.
    pub fn from_json(json: &str) -> Result<Self, AclError> {
        let raw: RawAcl = serde_json::from_str(json)?;
        Self::from_entries(raw.0)
    }

    pub fn from_file(path: &Path) -> Result<Self, AclError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn from_entries<I, P>(entries: I) -> Result<Self, AclError>
    where
        I: IntoIterator<Item = (String, P)>,
        P: IntoIterator<Item = String>,
    {
        let mut parsed = HashMap::new();
        for (consumer, patterns) in entries {
            let patterns = patterns
                .into_iter()
                .map(|p| MethodPattern::parse(&p))
                .collect::<Result<Vec<_>, _>>()
                .map_err(|source| AclError::Pattern {
                    consumer: consumer.clone(),
                    source,
                })?;
            parsed.insert(consumer, patterns);
        }
        Ok(Self { entries: parsed })
    }

    /// Patterns of a consumer, `None` if the consumer is unknown.
    pub fn patterns(&self, consumer: &str) -> Option<&[MethodPattern]> {
        self.entries.get(consumer).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_name_parse() {
        let name = MethodName::parse("/biz/Check").unwrap();
        assert_eq!(name.service(), "biz");
        assert_eq!(name.method(), "Check");
        assert_eq!(name.to_string(), "biz/Check");

        assert!(MethodName::parse("biz/Check").is_ok());
        assert!(MethodName::parse("biz").is_err());
        assert!(MethodName::parse("/a/b/c").is_err());
        assert!(MethodName::parse("/biz/").is_err());
        assert!(MethodName::parse("").is_err());
    }

    #[test]
    fn test_pattern_matching() {
        let exact = MethodPattern::parse("biz/Check").unwrap();
        let wildcard = MethodPattern::parse("admin/*").unwrap();
        let check = MethodName::parse("biz/Check").unwrap();
        let add = MethodName::parse("biz/Add").unwrap();
        let logging = MethodName::parse("admin/Logging").unwrap();

        assert!(exact.matches(&check));
        assert!(!exact.matches(&add));
        assert!(wildcard.matches(&logging));
        assert!(!wildcard.matches(&check));
    }

    #[test]
    fn test_from_json() {
        let acl = AccessControlList::from_json(
            r#"{"logger": ["/admin/Logging"], "biz_user": ["/biz/Check", "/biz/Add"], "biz_admin": ["/biz/*"]}"#,
        )
        .unwrap();
        assert_eq!(acl.len(), 3);
        assert_eq!(acl.patterns("biz_user").unwrap().len(), 2);
        assert_eq!(
            acl.patterns("biz_admin").unwrap()[0],
            MethodPattern::Service("biz".to_string())
        );
        assert!(acl.patterns("nobody").is_none());
    }

    #[test]
    fn test_bad_pattern_rejected_at_load() {
        let err = AccessControlList::from_json(r#"{"alice": ["biz"]}"#).unwrap_err();
        assert!(matches!(err, AclError::Pattern { ref consumer, .. } if consumer == "alice"));

        let err = AccessControlList::from_json(r#"{"alice": "biz/Check"}"#).unwrap_err();
        assert!(matches!(err, AclError::Parse(_)));
    }
}
