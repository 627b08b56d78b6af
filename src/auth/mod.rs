//! Authorization subsystem.
//!
//! # Data Flow
//! ```text
//! ACL source (JSON)
//!     → acl.rs (parse & validate patterns, immutable list)
//!
//! incoming call
//!     → interceptor.rs (read `consumer` header, peer address)
//!     → authorizer.rs (consumer known? pattern matches?)
//!     → TelemetrySink::record_call (authorized calls only)
//!     → handler
//! ```
//!
//! # Design Decisions
//! - Unary calls and stream setup go through the same middleware, attached
//!   per registered method so unknown paths never reach it
//! - Rejections never reach the telemetry sink
//! - A malformed method name is an internal error for that call only

pub mod acl;
pub mod authorizer;
pub mod interceptor;

pub use acl::{AccessControlList, AclError, MethodName, MethodNameError, MethodPattern};
pub use authorizer::{AuthError, AuthorizedCall, Authorizer};
pub use interceptor::{intercepted, InterceptorState, CONSUMER_HEADER};
