//! Telemetry subsystem.
//!
//! # Data Flow
//! ```text
//! authorized call
//!     → hub.rs (record: build CallEvent, lock, count, snapshot senders, unlock)
//!         → stats.rs (one accumulator per statistics subscriber)
//!         → per-subscriber bounded channels (log subscribers)
//!     → subscription.rs (handles owned by the admin stream tasks)
//! ```
//!
//! # Design Decisions
//! - The hub is the only shared mutable state; one lock, never held across I/O
//! - Subscriptions are RAII guards, cancellation clears the slot
//! - The interceptor depends on `TelemetrySink`, not on the hub type

pub mod event;
pub mod hub;
pub mod stats;
pub mod subscription;

pub use event::{CallEvent, Empty, StatSnapshot, SubscribeStatsRequest, SubscriberId};
pub use hub::{Dispatch, Registration, TelemetryHub, TelemetrySink};
pub use subscription::{LogSubscription, StatSubscription, SubscribeError};
