//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Shutdown (shutdown.rs):
//!     Signal received → Stop accepting → Drain connections → Exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Startup is fail-fast: invalid rewrite rules abort before binding
//! - There is no reload signal; configuration is fixed for the process

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
