//! Admin service: the Logging and Statistics streams.
//!
//! Both endpoints sit behind the authorization interceptor like any other
//! call; opening a stream is itself a recorded call.

pub mod handlers;
pub mod stream;

use axum::{routing::get, Router};
use std::sync::Arc;

use crate::auth::{intercepted, InterceptorState};
use crate::telemetry::TelemetryHub;
use self::handlers::{logging, statistics, AdminState};

pub use stream::{ChannelSender, StreamError, StreamSender, WsSender};

pub fn setup_admin_router(hub: Arc<TelemetryHub>, interceptor: &InterceptorState) -> Router {
    Router::new()
        .route("/admin/Logging", intercepted(get(logging), interceptor))
        .route("/admin/Statistics", intercepted(get(statistics), interceptor))
        .with_state(AdminState { hub })
}
