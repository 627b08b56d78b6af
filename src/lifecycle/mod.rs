//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (main.rs):
//!     Load config → Validate → Load ACL → Build hub and server → Serve
//!
//! Shutdown (shutdown.rs, signals.rs):
//!     Ctrl+C or Shutdown::trigger → Stop accepting → Drain calls → Exit
//! ```
//!
//! # Design Decisions
//! - Ordered startup: config first, then ACL, then listener
//! - Open streams end with their connections; each drops its own subscription

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
