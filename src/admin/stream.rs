//! Stream delivery loops for the admin endpoints.
//!
//! # Responsibilities
//! - Drain a log subscription into an output stream
//! - Drive the statistics timer and flush into an output stream
//! - End the stream (and free the subscription) on the first failed write
//!
//! # Design Decisions
//! - The loops are generic over `StreamSender`, the WebSocket is only one
//!   implementation
//! - Every loop also watches `closed()`, so a client that goes away while
//!   nothing is being sent still frees its slot
//! - No retries: a failed write is terminal for that subscriber

use axum::extract::ws::{close_code, CloseFrame, Message, WebSocket};
use serde::Serialize;
use std::future::Future;
use tokio::sync::mpsc;
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::observability::metrics;
use crate::telemetry::{CallEvent, LogSubscription, StatSnapshot, StatSubscription, SubscriberId};

/// Why a stream ended abnormally.
#[derive(Debug, thiserror::Error)]
pub enum StreamError {
    #[error("transport error: {0}")]
    Transport(#[from] axum::Error),
    #[error("failed to encode message: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("client disconnected")]
    Disconnected,
    #[error("subscriber {0} fell behind and was dropped")]
    Lagged(SubscriberId),
    #[error("subscriber {0} is no longer registered")]
    Unregistered(SubscriberId),
}

/// Output side of one server stream.
pub trait StreamSender<T>: Send {
    /// Write one message, waiting on transport backpressure.
    fn send(&mut self, item: &T) -> impl Future<Output = Result<(), StreamError>> + Send;

    /// Resolves once the client side is gone.
    fn closed(&mut self) -> impl Future<Output = ()> + Send;
}

/// JSON text frames over a WebSocket.
pub struct WsSender {
    socket: WebSocket,
}

impl WsSender {
    pub fn new(socket: WebSocket) -> Self {
        Self { socket }
    }

    /// Best-effort close frame; the peer may already be gone.
    pub async fn close(mut self, err: &StreamError) {
        let code = match err {
            StreamError::Lagged(_) => close_code::AGAIN,
            _ => close_code::ERROR,
        };
        let frame = CloseFrame {
            code,
            reason: err.to_string().into(),
        };
        let _ = self.socket.send(Message::Close(Some(frame))).await;
    }
}

impl<T: Serialize + Sync> StreamSender<T> for WsSender {
    async fn send(&mut self, item: &T) -> Result<(), StreamError> {
        let payload = serde_json::to_string(item)?;
        self.socket.send(Message::Text(payload.into())).await?;
        Ok(())
    }

    async fn closed(&mut self) {
        // Inbound frames carry nothing for these streams; read only to
        // notice the close.
        loop {
            match self.socket.recv().await {
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => return,
                Some(Ok(_)) => {}
            }
        }
    }
}

/// In-process output stream backed by a bounded channel.
pub struct ChannelSender<T> {
    tx: mpsc::Sender<T>,
}

impl<T> ChannelSender<T> {
    pub fn new(tx: mpsc::Sender<T>) -> Self {
        Self { tx }
    }
}

impl<T: Clone + Send + Sync> StreamSender<T> for ChannelSender<T> {
    async fn send(&mut self, item: &T) -> Result<(), StreamError> {
        self.tx
            .send(item.clone())
            .await
            .map_err(|_| StreamError::Disconnected)
    }

    async fn closed(&mut self) {
        self.tx.closed().await
    }
}

/// Forward every event of `subscription` until the client leaves or a
/// write fails.
pub async fn run_log_stream<S>(
    mut subscription: LogSubscription,
    sender: &mut S,
) -> Result<(), StreamError>
where
    S: StreamSender<CallEvent>,
{
    let id = subscription.id();
    tracing::info!(subscriber = %id, "Log stream opened");

    loop {
        tokio::select! {
            _ = sender.closed() => {
                tracing::info!(subscriber = %id, "Log stream closed by client");
                return Ok(());
            }
            next = subscription.recv() => {
                let Some(event) = next else {
                    return Err(StreamError::Lagged(id));
                };
                if let Err(e) = sender.send(&event).await {
                    tracing::warn!(subscriber = %id, error = %e, "Log stream write failed");
                    return Err(e);
                }
            }
        }
    }
}

/// Flush `subscription` on its interval until the client leaves or a
/// write fails.
///
/// The first flush happens one full interval after the call.
pub async fn run_stat_stream<S>(
    subscription: StatSubscription,
    sender: &mut S,
) -> Result<(), StreamError>
where
    S: StreamSender<StatSnapshot>,
{
    let id = subscription.id();
    let period = subscription.interval();
    let mut ticker = time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    tracing::info!(subscriber = %id, interval_secs = period.as_secs(), "Statistics stream opened");

    loop {
        tokio::select! {
            _ = sender.closed() => {
                tracing::info!(subscriber = %id, "Statistics stream closed by client");
                return Ok(());
            }
            _ = ticker.tick() => {
                let snapshot = subscription.flush().ok_or(StreamError::Unregistered(id))?;
                metrics::record_stat_flush();
                tracing::debug!(subscriber = %id, calls = snapshot.total(), "Sending statistics");
                if let Err(e) = sender.send(&snapshot).await {
                    tracing::warn!(subscriber = %id, error = %e, "Statistics stream write failed");
                    return Err(e);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TelemetryConfig;
    use crate::telemetry::TelemetryHub;
    use std::sync::Arc;
    use std::time::Duration;

    fn hub() -> Arc<TelemetryHub> {
        Arc::new(TelemetryHub::new(&TelemetryConfig::default()))
    }

    #[tokio::test(start_paused = true)]
    async fn test_stat_windows_scenario() {
        let hub = hub();
        let (tx, mut rx) = mpsc::channel(4);
        let subscription = hub.subscribe_stats(1).unwrap();
        let task = tokio::spawn(async move {
            let mut sender = ChannelSender::new(tx);
            run_stat_stream(subscription, &mut sender).await
        });

        time::sleep(Duration::from_millis(200)).await;
        hub.record("alice", "biz/Check", "h");
        time::sleep(Duration::from_millis(500)).await;
        hub.record("bob", "biz/Add", "h");

        let first = rx.recv().await.unwrap();
        assert_eq!(first.total(), 2);
        assert_eq!(first.by_consumer.get("alice"), Some(&1));
        assert_eq!(first.by_consumer.get("bob"), Some(&1));

        time::sleep(Duration::from_millis(300)).await;
        hub.record("alice", "biz/Test", "h");

        let second = rx.recv().await.unwrap();
        assert_eq!(second.total(), 1);
        assert_eq!(second.by_method.get("biz/Test"), Some(&1));
        assert_eq!(second.by_method.get("biz/Check"), None);

        drop(rx);
        let result = task.await.unwrap();
        assert!(result.is_ok());
        assert_eq!(hub.stat_subscribers(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_window_still_flushes() {
        let hub = hub();
        let (tx, mut rx) = mpsc::channel(4);
        let subscription = hub.subscribe_stats(2).unwrap();
        tokio::spawn(async move {
            let mut sender = ChannelSender::new(tx);
            run_stat_stream(subscription, &mut sender).await
        });

        let start = Instant::now();
        let snapshot = rx.recv().await.unwrap();
        assert_eq!(snapshot.total(), 0);
        assert!(start.elapsed() >= Duration::from_secs(2));
    }

    #[tokio::test]
    async fn test_log_stream_forwards_until_client_leaves() {
        let hub = hub();
        let (tx, mut rx) = mpsc::channel(4);
        let subscription = hub.subscribe_log();
        let task = tokio::spawn(async move {
            let mut sender = ChannelSender::new(tx);
            run_log_stream(subscription, &mut sender).await
        });

        hub.record("alice", "biz/Check", "h");
        let event = rx.recv().await.unwrap();
        assert_eq!(event.method, "biz/Check");

        drop(rx);
        assert!(task.await.unwrap().is_ok());
        assert_eq!(hub.log_subscribers(), 0);
    }

    #[tokio::test]
    async fn test_log_stream_ends_when_evicted() {
        let hub = hub();
        let (tx, _rx) = mpsc::channel(4);
        let subscription = hub.subscribe_log();
        let id = subscription.id();
        hub.unregister(id);

        let mut sender = ChannelSender::new(tx);
        let result = run_log_stream(subscription, &mut sender).await;
        assert!(matches!(result, Err(StreamError::Lagged(got)) if got == id));
    }

    struct FailingSender;

    impl StreamSender<CallEvent> for FailingSender {
        async fn send(&mut self, _item: &CallEvent) -> Result<(), StreamError> {
            Err(StreamError::Disconnected)
        }

        async fn closed(&mut self) {
            std::future::pending::<()>().await
        }
    }

    #[tokio::test]
    async fn test_failed_write_unregisters_only_that_subscriber() {
        let hub = hub();
        let failing = hub.subscribe_log();
        let mut healthy = hub.subscribe_log();

        let task = tokio::spawn(async move { run_log_stream(failing, &mut FailingSender).await });
        hub.record("alice", "biz/Check", "h");

        let result = task.await.unwrap();
        assert!(matches!(result, Err(StreamError::Disconnected)));
        assert_eq!(hub.log_subscribers(), 1);

        hub.record("alice", "biz/Add", "h");
        assert_eq!(healthy.recv().await.unwrap().method, "biz/Check");
        assert_eq!(healthy.recv().await.unwrap().method, "biz/Add");
    }
}
