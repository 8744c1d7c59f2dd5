//! # Pacer
//!
//! Fixed-rate pacing and cooperative cancellation for periodic background
//! loops such as control or telemetry ticks in a simulation.
//!
//! Pacer provides:
//!
//! - **Clocks**: real, scaled and steppable time sources behind one trait
//! - **Cancellation**: a shared write-once token polled at sleep boundaries
//! - **Waiters**: drift-correcting throttles with an independent timeout
//! - **Diagnostics**: preemption and overrun reporting through `tracing`
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pacer::prelude::*;
//! use std::sync::Arc;
//!
//! let clock: Arc<dyn Clock> = Arc::new(RealTimeClock::new());
//! let token = CancellationToken::shared();
//! let action = CancelableAction::new(token.clone());
//!
//! let worker = std::thread::spawn(move || {
//!     let mut waiter = Waiter::new(clock, 0.05)?;
//!     while waiter.sleep(&action) {
//!         // 20 Hz work
//!     }
//!     action.complete();
//!     Ok::<_, WaiterError>(())
//! });
//!
//! token.cancel("shutting down");
//! worker.join().unwrap().unwrap();
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]

pub mod cancellation;
pub mod clock;
pub mod config;
pub mod diagnostics;
pub mod errors;
pub mod observability;
pub mod waiter;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::cancellation::{
        Cancelable, CancelableAction, CancellationToken, CompletionGuard,
    };
    pub use crate::clock::{
        Clock, ClockError, RealTimeClock, ScalableClock, SteppableClock, TimeDelta, TimePoint,
    };
    pub use crate::config::{ClockConfig, ClockKind, PacerConfig, WaiterConfig};
    pub use crate::diagnostics::{
        CollectingDiagnosticSink, DiagnosticSink, LoggingDiagnosticSink, NoOpDiagnosticSink,
        SleepDiagnostic,
    };
    pub use crate::errors::PacerError;
    pub use crate::waiter::{TimeoutMonitor, Waiter, WaiterError};
}
