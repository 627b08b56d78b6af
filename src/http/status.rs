//! Call status returned to clients.
//!
//! # Responsibilities
//! - Map internal errors to a small set of call status codes
//! - Render them as JSON with the matching HTTP status
//!
//! # Design Decisions
//! - The message is the error's `Display`, never a debug dump
//! - Status codes mirror the RPC notions (unauthenticated, invalid argument,
//!   internal) rather than HTTP semantics

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::auth::AuthError;
use crate::telemetry::SubscribeError;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RpcStatus {
    #[error("unauthenticated: {0}")]
    Unauthenticated(String),
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("unimplemented: {0}")]
    Unimplemented(String),
    #[error("internal: {0}")]
    Internal(String),
}

#[derive(Serialize)]
struct StatusBody<'a> {
    code: &'static str,
    message: &'a str,
}

impl RpcStatus {
    pub fn code(&self) -> &'static str {
        match self {
            RpcStatus::Unauthenticated(_) => "unauthenticated",
            RpcStatus::InvalidArgument(_) => "invalid_argument",
            RpcStatus::Unimplemented(_) => "unimplemented",
            RpcStatus::Internal(_) => "internal",
        }
    }

    pub fn http_status(&self) -> StatusCode {
        match self {
            RpcStatus::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            RpcStatus::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            RpcStatus::Unimplemented(_) => StatusCode::NOT_FOUND,
            RpcStatus::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> &str {
        match self {
            RpcStatus::Unauthenticated(m)
            | RpcStatus::InvalidArgument(m)
            | RpcStatus::Unimplemented(m)
            | RpcStatus::Internal(m) => m,
        }
    }
}

impl From<AuthError> for RpcStatus {
    fn from(e: AuthError) -> Self {
        if e.is_unauthenticated() {
            RpcStatus::Unauthenticated(e.to_string())
        } else {
            RpcStatus::Internal(e.to_string())
        }
    }
}

impl From<SubscribeError> for RpcStatus {
    fn from(e: SubscribeError) -> Self {
        RpcStatus::InvalidArgument(e.to_string())
    }
}

impl IntoResponse for RpcStatus {
    fn into_response(self) -> Response {
        let body = StatusBody {
            code: self.code(),
            message: self.message(),
        };
        (self.http_status(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::MethodNameError;

    #[test]
    fn test_auth_error_mapping() {
        let status = RpcStatus::from(AuthError::UnknownConsumer("bob".into()));
        assert_eq!(status.http_status(), StatusCode::UNAUTHORIZED);
        assert_eq!(status.code(), "unauthenticated");

        let status = RpcStatus::from(AuthError::MalformedMethod(MethodNameError("x".into())));
        assert_eq!(status.http_status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_subscribe_error_mapping() {
        let status = RpcStatus::from(SubscribeError::NonPositiveInterval(0));
        assert_eq!(status.http_status(), StatusCode::BAD_REQUEST);
        assert_eq!(status.code(), "invalid_argument");
    }
}
