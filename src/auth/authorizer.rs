//! Per-call authorization against the ACL.

use std::sync::Arc;

use crate::auth::acl::{AccessControlList, MethodName, MethodNameError};

/// Why a call was not let through.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("missing consumer identity")]
    MissingConsumer,
    #[error("unknown consumer {0:?}")]
    UnknownConsumer(String),
    #[error("consumer {consumer:?} may not call {method}")]
    Forbidden { consumer: String, method: String },
    /// The method name itself is malformed. This is a server-side problem,
    /// not a caller one.
    #[error(transparent)]
    MalformedMethod(#[from] MethodNameError),
}

impl AuthError {
    /// `true` for every rejection the caller is responsible for.
    pub fn is_unauthenticated(&self) -> bool {
        !matches!(self, AuthError::MalformedMethod(_))
    }
}

/// A call that passed authorization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizedCall {
    pub consumer: String,
    pub method: MethodName,
}

#[derive(Debug, Clone)]
pub struct Authorizer {
    acl: Arc<AccessControlList>,
}

impl Authorizer {
    pub fn new(acl: Arc<AccessControlList>) -> Self {
        Self { acl }
    }

    /// Check `consumer` against the ACL for `full_method`.
    pub fn authorize(
        &self,
        consumer: Option<&str>,
        full_method: &str,
    ) -> Result<AuthorizedCall, AuthError> {
        let consumer = match consumer {
            Some(c) if !c.is_empty() => c,
            _ => return Err(AuthError::MissingConsumer),
        };

        let patterns = self
            .acl
            .patterns(consumer)
            .ok_or_else(|| AuthError::UnknownConsumer(consumer.to_string()))?;

        let method = MethodName::parse(full_method)?;

        if patterns.iter().any(|p| p.matches(&method)) {
            Ok(AuthorizedCall {
                consumer: consumer.to_string(),
                method,
            })
        } else {
            Err(AuthError::Forbidden {
                consumer: consumer.to_string(),
                method: method.to_string(),
            })
        }
    }
}
