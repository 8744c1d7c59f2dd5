//! Cooperative cancellation for paced loops.
//!
//! This module provides:
//! - CancellationToken, the shared write-once stop flag
//! - Cancelable, the polling sleep every paced task performs
//! - CancelableAction, the cloneable handle tasks carry
//! - CompletionGuard for signalling task completion on any exit path

mod action;
mod token;

pub use action::{Cancelable, CancelableAction, CompletionGuard, CompletionHook};
pub use token::CancellationToken;
