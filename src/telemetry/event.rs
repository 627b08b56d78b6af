//! Wire messages produced by the telemetry hub.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// Stable handle for one registered subscriber.
///
/// Handles are allocated from a monotonic counter and are never reused,
/// so a stale handle can only ever miss, never alias a newer subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriberId(pub(crate) u64);

impl fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

/// Immutable record of one authorized call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallEvent {
    /// Seconds since the Unix epoch.
    pub timestamp: u64,
    pub consumer: String,
    pub method: String,
    pub host: String,
}

impl CallEvent {
    pub fn now(consumer: &str, method: &str, host: &str) -> Self {
        Self {
            timestamp: unix_now(),
            consumer: consumer.to_string(),
            method: method.to_string(),
            host: host.to_string(),
        }
    }
}

/// Aggregated counters for one statistics window.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatSnapshot {
    /// Seconds since the Unix epoch at flush time.
    pub timestamp: u64,
    pub by_method: HashMap<String, u64>,
    pub by_consumer: HashMap<String, u64>,
}

impl StatSnapshot {
    /// Total calls in the window.
    pub fn total(&self) -> u64 {
        self.by_method.values().sum()
    }
}

/// Parameters of a statistics subscription.
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct SubscribeStatsRequest {
    pub interval_seconds: i64,
}

/// Empty message used by unary calls.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Empty {}

pub(crate) fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
