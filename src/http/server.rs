//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Build the telemetry hub and authorizer from config
//! - Create the Axum router for the business and admin services
//! - Put the authorization interceptor in front of every registered method
//! - Answer unknown methods with `unimplemented`, outside the interceptor
//! - Serve with connect info (peer address) and graceful shutdown

use axum::{http::Uri, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::admin::setup_admin_router;
use crate::auth::{AccessControlList, Authorizer, InterceptorState};
use crate::biz::setup_biz_router;
use crate::config::ServiceConfig;
use crate::http::status::RpcStatus;
use crate::lifecycle::signals::shutdown_signal;
use crate::telemetry::{TelemetryHub, TelemetrySink};

/// Calls to methods no service implements. Never authorized nor recorded.
async fn unknown_method(uri: Uri) -> RpcStatus {
    RpcStatus::Unimplemented(uri.path().trim_start_matches('/').to_string())
}

/// RPC server hosting the business and admin services.
pub struct RpcServer {
    router: Router,
    hub: Arc<TelemetryHub>,
}

impl RpcServer {
    /// Create a new server with the given configuration and ACL.
    pub fn new(config: ServiceConfig, acl: AccessControlList) -> Self {
        let hub = Arc::new(TelemetryHub::new(&config.telemetry));
        let sink: Arc<dyn TelemetrySink> = hub.clone();
        let interceptor = InterceptorState::new(Authorizer::new(Arc::new(acl)), sink);

        let router = Self::build_router(&interceptor, hub.clone());
        Self { router, hub }
    }

    /// Every registered route, unary or streaming, goes through the
    /// interceptor; the fallback does not.
    fn build_router(interceptor: &InterceptorState, hub: Arc<TelemetryHub>) -> Router {
        Router::new()
            .merge(setup_biz_router(interceptor))
            .merge(setup_admin_router(hub, interceptor))
            .fallback(unknown_method)
            .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
    }

    /// Run the server until Ctrl+C or the shutdown coordinator fires.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "RPC server starting");

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal(shutdown))
            .await?;

        tracing::info!("RPC server stopped");
        Ok(())
    }

    pub fn hub(&self) -> Arc<TelemetryHub> {
        self.hub.clone()
    }

    /// The fully layered router, for in-process use.
    pub fn router(&self) -> Router {
        self.router.clone()
    }
}
