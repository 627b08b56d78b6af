//! HTTP transport for the RPC services.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, connect info, trace layer)
//!     → auth interceptor (authorize, record telemetry)
//!     → biz / admin handlers
//!     → status.rs (errors rendered as call status)
//! ```

pub mod server;
pub mod status;

pub use server::RpcServer;
pub use status::RpcStatus;
