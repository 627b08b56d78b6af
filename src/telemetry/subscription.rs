//! Subscription handles.
//!
//! A subscription owns its slot in the hub. Dropping it, whether the stream
//! finished, failed, or its task was cancelled, removes the slot.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TryRecvError;

use crate::telemetry::event::{CallEvent, StatSnapshot, SubscriberId};
use crate::telemetry::hub::TelemetryHub;

/// Rejected subscription parameters.
#[derive(Debug, thiserror::Error)]
pub enum SubscribeError {
    #[error("statistics interval must be positive, got {0}")]
    NonPositiveInterval(i64),
    #[error("statistics interval {requested}s exceeds the maximum of {max}s")]
    IntervalTooLong { requested: u64, max: u64 },
}

/// Live event log subscription.
pub struct LogSubscription {
    id: SubscriberId,
    rx: mpsc::Receiver<CallEvent>,
    hub: Arc<TelemetryHub>,
}

impl LogSubscription {
    pub(crate) fn new(id: SubscriberId, rx: mpsc::Receiver<CallEvent>, hub: Arc<TelemetryHub>) -> Self {
        Self { id, rx, hub }
    }

    pub fn id(&self) -> SubscriberId {
        self.id
    }

    /// Next event, or `None` once the hub has dropped this subscriber.
    pub async fn recv(&mut self) -> Option<CallEvent> {
        self.rx.recv().await
    }

    pub fn try_recv(&mut self) -> Option<CallEvent> {
        match self.rx.try_recv() {
            Ok(event) => Some(event),
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }
}

impl Drop for LogSubscription {
    fn drop(&mut self) {
        self.hub.unregister(self.id);
    }
}

/// Periodic statistics subscription.
pub struct StatSubscription {
    id: SubscriberId,
    interval: Duration,
    hub: Arc<TelemetryHub>,
}

impl StatSubscription {
    pub(crate) fn new(id: SubscriberId, interval_secs: u64, hub: Arc<TelemetryHub>) -> Self {
        Self {
            id,
            interval: Duration::from_secs(interval_secs),
            hub,
        }
    }

    pub fn id(&self) -> SubscriberId {
        self.id
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Take the counts since the previous flush and reset them.
    pub fn flush(&self) -> Option<StatSnapshot> {
        self.hub.flush(self.id)
    }
}

impl Drop for StatSubscription {
    fn drop(&mut self) {
        self.hub.unregister(self.id);
    }
}
