//! Authorization interceptor.
//! Runs in front of every registered unary call and every stream setup.
//! Paths and verbs no service registers never reach it.

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::Request,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::MethodRouter,
};
use std::net::SocketAddr;
use std::sync::Arc;

use crate::auth::authorizer::Authorizer;
use crate::http::status::RpcStatus;
use crate::observability::metrics;
use crate::telemetry::TelemetrySink;

/// Metadata header carrying the caller identity.
pub const CONSUMER_HEADER: &str = "consumer";

/// State required by the interceptor.
#[derive(Clone)]
pub struct InterceptorState {
    pub authorizer: Authorizer,
    pub sink: Arc<dyn TelemetrySink>,
}

impl InterceptorState {
    pub fn new(authorizer: Authorizer, sink: Arc<dyn TelemetrySink>) -> Self {
        Self { authorizer, sink }
    }
}

/// Put the interceptor in front of the methods registered on `route`.
/// The method router's own fallback (405) stays outside it.
pub fn intercepted<S>(route: MethodRouter<S>, state: &InterceptorState) -> MethodRouter<S>
where
    S: Clone + Send + Sync + 'static,
{
    route.route_layer(middleware::from_fn_with_state(
        state.clone(),
        authorize_middleware,
    ))
}

pub async fn authorize_middleware(
    State(state): State<InterceptorState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let consumer = req
        .headers()
        .get(CONSUMER_HEADER)
        .and_then(|v| v.to_str().ok());

    let call = match state.authorizer.authorize(consumer, req.uri().path()) {
        Ok(call) => call,
        Err(e) => {
            if e.is_unauthenticated() {
                tracing::info!(path = %req.uri().path(), reason = %e, "Call rejected");
                metrics::record_call("rejected");
            } else {
                tracing::error!(path = %req.uri().path(), error = %e, "Malformed method name");
                metrics::record_call("error");
            }
            return RpcStatus::from(e).into_response();
        }
    };

    let host = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.to_string())
        .unwrap_or_else(|| "unknown".to_string());

    let method = call.method.to_string();
    tracing::debug!(consumer = %call.consumer, method = %method, host = %host, "Call authorized");
    metrics::record_call("allowed");
    state.sink.record_call(&call.consumer, &method, &host);

    next.run(req).await
}
