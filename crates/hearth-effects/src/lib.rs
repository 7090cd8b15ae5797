//! # Hearth Effects - Production Handlers
//!
//! Stateless implementations of the clock and randomness effects from `hearth-core`, plus
//! tracing subscriber setup for binaries.
//!
//! **Constraint**: NO mock handlers - those belong in `hearth-testkit`.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod logging;
pub mod random;
pub mod time;

pub use logging::init_tracing;
pub use random::RealRandomHandler;
pub use time::RealTimeHandler;
