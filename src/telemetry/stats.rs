//! Per-subscriber call counters.
//!
//! # Responsibilities
//! - Count calls by method and by consumer for one statistics window
//! - Hand the window over as a snapshot and start a fresh one
//!
//! # Design Decisions
//! - No interior locking: an accumulator only lives inside the hub state,
//!   so every increment and every flush happens under the hub lock
//! - Flush swaps the maps out instead of clearing them, the snapshot keeps
//!   the allocation and the new window starts empty

use std::collections::HashMap;
use std::mem;

use crate::telemetry::event::{unix_now, StatSnapshot};

#[derive(Debug, Default)]
pub struct StatAccumulator {
    by_method: HashMap<String, u64>,
    by_consumer: HashMap<String, u64>,
}

impl StatAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment(&mut self, consumer: &str, method: &str) {
        *self.by_method.entry(method.to_string()).or_insert(0) += 1;
        *self.by_consumer.entry(consumer.to_string()).or_insert(0) += 1;
    }

    /// Take the current window and reset both counters to empty.
    pub fn flush(&mut self) -> StatSnapshot {
        StatSnapshot {
            timestamp: unix_now(),
            by_method: mem::take(&mut self.by_method),
            by_consumer: mem::take(&mut self.by_consumer),
        }
    }
}
