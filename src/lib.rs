//! Authorizing RPC front with live call telemetry.
//!
//! Every call passes an ACL check; authorized calls feed a telemetry hub
//! that backs two admin streams, a live event log and periodic statistics.

pub mod admin;
pub mod auth;
pub mod biz;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod telemetry;

pub use config::ServiceConfig;
pub use http::RpcServer;
pub use lifecycle::Shutdown;
pub use telemetry::TelemetryHub;
