//! Shared telemetry state.
//!
//! # Responsibilities
//! - Keep the live log subscribers and statistics accumulators
//! - Turn each authorized call into one `CallEvent` and fan it out
//! - Increment every statistics window for that call
//!
//! # Design Decisions
//! - One mutex guards both arenas and all counters, which gives every
//!   recorded call a total order relative to registration and flushes
//! - Arenas are maps keyed by a never-reused `SubscriberId`; removal
//!   deletes the entry
//! - Broadcast is snapshot-then-dispatch: channels are cloned under the
//!   lock, sends happen after it is released
//! - Sends use `try_send` on a bounded per-subscriber channel; a subscriber
//!   whose buffer is full is evicted rather than waited on

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

use crate::config::TelemetryConfig;
use crate::observability::metrics;
use crate::telemetry::event::{CallEvent, StatSnapshot, SubscriberId};
use crate::telemetry::stats::StatAccumulator;
use crate::telemetry::subscription::{LogSubscription, StatSubscription, SubscribeError};

/// Receiver side of authorized-call reports.
///
/// The interceptor only knows this trait, not the admin surface built on
/// top of the hub.
pub trait TelemetrySink: Send + Sync {
    fn record_call(&self, consumer: &str, method: &str, host: &str);
}

/// What a new subscriber registers as.
pub enum Registration {
    Log(mpsc::Sender<CallEvent>),
    Stats,
}

/// Outcome of one broadcast.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Dispatch {
    /// Log subscribers that accepted the event.
    pub delivered: usize,
    /// Log subscribers removed because they could not take the event.
    pub evicted: Vec<SubscriberId>,
    /// Statistics windows incremented.
    pub counted: usize,
}

#[derive(Default)]
struct HubState {
    loggers: HashMap<SubscriberId, mpsc::Sender<CallEvent>>,
    stats: HashMap<SubscriberId, StatAccumulator>,
}

pub struct TelemetryHub {
    state: Mutex<HubState>,
    next_id: AtomicU64,
    log_buffer: usize,
    max_stat_interval_secs: u64,
}

impl TelemetryHub {
    pub fn new(config: &TelemetryConfig) -> Self {
        Self {
            state: Mutex::new(HubState::default()),
            next_id: AtomicU64::new(1),
            log_buffer: config.log_buffer.max(1),
            max_stat_interval_secs: config.max_stat_interval_secs,
        }
    }

    // Counters stay consistent even if a holder panicked: every mutation
    // under the lock is a single map operation.
    fn lock(&self) -> MutexGuard<'_, HubState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Add a subscriber to the matching arena and return its handle.
    pub fn register(&self, registration: Registration) -> SubscriberId {
        let id = SubscriberId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let (logs, stats) = {
            let mut state = self.lock();
            match registration {
                Registration::Log(tx) => {
                    state.loggers.insert(id, tx);
                }
                Registration::Stats => {
                    state.stats.insert(id, StatAccumulator::new());
                }
            }
            (state.loggers.len(), state.stats.len())
        };

        tracing::debug!(subscriber = %id, log_subscribers = logs, stat_subscribers = stats, "Subscriber registered");
        metrics::set_subscribers(logs, stats);
        id
    }

    /// Remove a subscriber from whichever arena holds it.
    ///
    /// Returns `false` if the handle was already gone.
    pub fn unregister(&self, id: SubscriberId) -> bool {
        let (removed, logs, stats) = {
            let mut state = self.lock();
            let removed = state.loggers.remove(&id).is_some() || state.stats.remove(&id).is_some();
            (removed, state.loggers.len(), state.stats.len())
        };

        if removed {
            tracing::debug!(subscriber = %id, log_subscribers = logs, stat_subscribers = stats, "Subscriber removed");
            metrics::set_subscribers(logs, stats);
        }
        removed
    }

    /// Open a live event log subscription.
    pub fn subscribe_log(self: &Arc<Self>) -> LogSubscription {
        let (tx, rx) = mpsc::channel(self.log_buffer);
        let id = self.register(Registration::Log(tx));
        LogSubscription::new(id, rx, Arc::clone(self))
    }

    /// Open a statistics subscription flushing every `interval_seconds`.
    ///
    /// The interval is validated before anything is registered.
    pub fn subscribe_stats(
        self: &Arc<Self>,
        interval_seconds: i64,
    ) -> Result<StatSubscription, SubscribeError> {
        if interval_seconds <= 0 {
            return Err(SubscribeError::NonPositiveInterval(interval_seconds));
        }
        let secs = interval_seconds as u64;
        if secs > self.max_stat_interval_secs {
            return Err(SubscribeError::IntervalTooLong {
                requested: secs,
                max: self.max_stat_interval_secs,
            });
        }

        let id = self.register(Registration::Stats);
        Ok(StatSubscription::new(id, secs, Arc::clone(self)))
    }

    /// Take and reset the window of one statistics subscriber.
    pub fn flush(&self, id: SubscriberId) -> Option<StatSnapshot> {
        let mut state = self.lock();
        state.stats.get_mut(&id).map(StatAccumulator::flush)
    }

    /// Record one authorized call and fan it out.
    pub fn record(&self, consumer: &str, method: &str, host: &str) -> Dispatch {
        let event = CallEvent::now(consumer, method, host);

        let (targets, counted) = {
            let mut state = self.lock();
            for acc in state.stats.values_mut() {
                acc.increment(consumer, method);
            }
            let targets: Vec<(SubscriberId, mpsc::Sender<CallEvent>)> = state
                .loggers
                .iter()
                .map(|(id, tx)| (*id, tx.clone()))
                .collect();
            (targets, state.stats.len())
        };

        let mut dispatch = Dispatch {
            counted,
            ..Dispatch::default()
        };

        for (id, tx) in targets {
            match tx.try_send(event.clone()) {
                Ok(()) => dispatch.delivered += 1,
                Err(TrySendError::Full(_)) => {
                    tracing::warn!(subscriber = %id, method = %method, "Log subscriber lagging, evicting");
                    metrics::record_dropped_event();
                    if self.unregister(id) {
                        dispatch.evicted.push(id);
                    }
                }
                // Unregistered after the snapshot was taken.
                Err(TrySendError::Closed(_)) => {
                    self.unregister(id);
                }
            }
        }

        tracing::trace!(
            consumer = %consumer,
            method = %method,
            delivered = dispatch.delivered,
            counted = dispatch.counted,
            "Call recorded"
        );
        dispatch
    }

    pub fn log_subscribers(&self) -> usize {
        self.lock().loggers.len()
    }

    pub fn stat_subscribers(&self) -> usize {
        self.lock().stats.len()
    }
}

impl TelemetrySink for TelemetryHub {
    fn record_call(&self, consumer: &str, method: &str, host: &str) {
        self.record(consumer, method, host);
    }
}
