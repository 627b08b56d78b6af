//! Admin stream endpoints.
//!
//! Each handler validates its request and registers with the hub before
//! the WebSocket upgrade, then hands the socket to the delivery loop.

use axum::{
    extract::{
        rejection::QueryRejection, ws::rejection::WebSocketUpgradeRejection, Query, State,
        WebSocketUpgrade,
    },
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use crate::admin::stream::{run_log_stream, run_stat_stream, WsSender};
use crate::http::status::RpcStatus;
use crate::telemetry::{SubscribeStatsRequest, TelemetryHub};

/// State shared by the admin handlers.
#[derive(Clone)]
pub struct AdminState {
    pub hub: Arc<TelemetryHub>,
}

/// `admin/Logging`: live stream of authorized calls.
///
/// The subscription is taken before the upgrade completes, so a failed
/// upgrade drops it again.
pub async fn logging(State(state): State<AdminState>, ws: WebSocketUpgrade) -> Response {
    let subscription = state.hub.subscribe_log();

    ws.on_upgrade(move |socket| async move {
        let id = subscription.id();
        let mut sender = WsSender::new(socket);
        match run_log_stream(subscription, &mut sender).await {
            Ok(()) => tracing::debug!(subscriber = %id, "Log stream finished"),
            Err(e) => {
                tracing::warn!(subscriber = %id, error = %e, "Log stream terminated");
                sender.close(&e).await;
            }
        }
    })
}

/// `admin/Statistics`: periodic per-method and per-consumer counts.
pub async fn statistics(
    State(state): State<AdminState>,
    query: Result<Query<SubscribeStatsRequest>, QueryRejection>,
    ws: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
) -> Result<Response, RpcStatus> {
    // Arguments first, then the transport.
    let Query(request) = query.map_err(|e| {
        tracing::info!(error = %e, "Statistics request malformed");
        RpcStatus::InvalidArgument(e.body_text())
    })?;
    let subscription = state.hub.subscribe_stats(request.interval_seconds).map_err(|e| {
        tracing::info!(interval_seconds = request.interval_seconds, error = %e, "Statistics subscription rejected");
        RpcStatus::from(e)
    })?;
    // Dropping the subscription here unregisters it again.
    let ws = match ws {
        Ok(ws) => ws,
        Err(rejection) => return Ok(rejection.into_response()),
    };

    Ok(ws.on_upgrade(move |socket| async move {
        let id = subscription.id();
        let mut sender = WsSender::new(socket);
        match run_stat_stream(subscription, &mut sender).await {
            Ok(()) => tracing::debug!(subscriber = %id, "Statistics stream finished"),
            Err(e) => {
                tracing::warn!(subscriber = %id, error = %e, "Statistics stream terminated");
                sender.close(&e).await;
            }
        }
    }))
}
