//! Cancellation-aware sleeping for long-running tasks.

use super::CancellationToken;
use crate::clock::TimeDelta;
use crate::diagnostics::{DiagnosticSink, LoggingDiagnosticSink, SleepDiagnostic};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// A callback run when a task reports completion.
pub type CompletionHook = Arc<dyn Fn() + Send + Sync>;

/// What a sleep request resolves to once cancellation has been checked.
enum SleepPlan {
    Preempted,
    Block(Duration),
    Missed,
}

fn plan_sleep<A>(action: &A, secs: TimeDelta) -> SleepPlan
where
    A: Cancelable + ?Sized,
{
    if action.is_cancelled() {
        action.diagnostics().record(&SleepDiagnostic::Preempted);
        return SleepPlan::Preempted;
    }

    if secs > 0.0 {
        SleepPlan::Block(Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX))
    } else {
        action.diagnostics().record(&SleepDiagnostic::missed(secs));
        SleepPlan::Missed
    }
}

/// A task that sleeps cooperatively against a [`CancellationToken`].
///
/// Cancellation is only checked before and after a sleep, never during one,
/// so a stop request takes effect within at most one sleep duration.
#[async_trait]
pub trait Cancelable: Send + Sync {
    /// Returns the token this task polls.
    fn token(&self) -> &CancellationToken;

    /// Returns where preemption and overrun diagnostics are reported.
    fn diagnostics(&self) -> &dyn DiagnosticSink {
        &LoggingDiagnosticSink
    }

    /// Returns whether cancellation has been requested.
    fn is_cancelled(&self) -> bool {
        self.token().is_cancelled()
    }

    /// Blocks the calling thread for `secs` wall-clock seconds.
    ///
    /// Returns `false` without blocking if cancellation was already
    /// requested. A non-positive `secs` does not block and is reported as a
    /// missed deadline. Otherwise returns whether the task is still live
    /// after the sleep.
    fn sleep(&self, secs: TimeDelta) -> bool {
        match plan_sleep(self, secs) {
            SleepPlan::Preempted => false,
            SleepPlan::Block(duration) => {
                std::thread::sleep(duration);
                !self.is_cancelled()
            }
            SleepPlan::Missed => !self.is_cancelled(),
        }
    }

    /// Like [`sleep`](Self::sleep), but suspends the current tokio task
    /// instead of blocking its thread.
    async fn sleep_async(&self, secs: TimeDelta) -> bool {
        match plan_sleep(self, secs) {
            SleepPlan::Preempted => false,
            SleepPlan::Block(duration) => {
                tokio::time::sleep(duration).await;
                !self.is_cancelled()
            }
            SleepPlan::Missed => !self.is_cancelled(),
        }
    }

    /// Signals that the task body has finished.
    ///
    /// Long-running tasks call this exactly once on exit. Does nothing by default.
    fn complete(&self) {}
}

/// Runs [`Cancelable::complete`] when dropped.
///
/// Holding one for the duration of a task body reports completion on normal
/// return, early return and unwinding alike.
#[must_use = "completion is reported when the guard is dropped"]
pub struct CompletionGuard<'a, A: Cancelable + ?Sized> {
    action: Option<&'a A>,
}

impl<'a, A: Cancelable + ?Sized> CompletionGuard<'a, A> {
    /// Creates a guard for `action`.
    pub fn new(action: &'a A) -> Self {
        Self {
            action: Some(action),
        }
    }

    /// Disarms the guard, preventing completion from being reported.
    pub fn disarm(&mut self) {
        self.action = None;
    }
}

impl<A: Cancelable + ?Sized> Drop for CompletionGuard<'_, A> {
    fn drop(&mut self) {
        if let Some(action) = self.action.take() {
            action.complete();
        }
    }
}

/// A cloneable handle to a shared [`CancellationToken`].
///
/// Clones observe the same token, completion hook and diagnostic sink; they
/// never duplicate the flag. The handle keeps the token alive, so it cannot
/// dangle if the controlling context goes away first.
#[derive(Clone)]
pub struct CancelableAction {
    token: Arc<CancellationToken>,
    on_complete: Option<CompletionHook>,
    sink: Arc<dyn DiagnosticSink>,
}

impl CancelableAction {
    /// Creates an action polling `token`.
    #[must_use]
    pub fn new(token: Arc<CancellationToken>) -> Self {
        Self {
            token,
            on_complete: None,
            sink: Arc::new(LoggingDiagnosticSink),
        }
    }

    /// Sets the hook run by [`Cancelable::complete`].
    #[must_use]
    pub fn with_completion<F>(mut self, hook: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.on_complete = Some(Arc::new(hook));
        self
    }

    /// Sets where diagnostics are reported.
    #[must_use]
    pub fn with_diagnostics(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Returns the shared token.
    #[must_use]
    pub fn shared_token(&self) -> &Arc<CancellationToken> {
        &self.token
    }

    /// Returns whether both actions poll the same token.
    #[must_use]
    pub fn shares_token_with(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.token, &other.token)
    }

    /// Returns a guard that reports completion when dropped.
    pub fn completion_guard(&self) -> CompletionGuard<'_, Self> {
        CompletionGuard::new(self)
    }
}

impl Cancelable for CancelableAction {
    fn token(&self) -> &CancellationToken {
        &self.token
    }

    fn diagnostics(&self) -> &dyn DiagnosticSink {
        self.sink.as_ref()
    }

    fn complete(&self) {
        if let Some(hook) = &self.on_complete {
            hook();
        }
    }
}

impl std::fmt::Debug for CancelableAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CancelableAction")
            .field("token", &self.token)
            .field("has_completion_hook", &self.on_complete.is_some())
            .finish()
    }
}
