//! Request-scoped cancellation and deadline context.
//!
//! One [`RequestCtx`] accompanies a request through the whole pipeline.
//! Cancellation is a signal, not an exception: waiters observe it via
//! [`RequestCtx::cancelled`] and unwind cooperatively. The deadline shrinks
//! every per-call timeout so no task outlives the request budget.

use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Cancellation token plus optional deadline for one request.
#[derive(Debug, Clone, Default)]
pub struct RequestCtx {
    cancel: CancellationToken,
    deadline: Option<Instant>,
}

impl RequestCtx {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            cancel: CancellationToken::new(),
            deadline: Some(deadline),
        }
    }

    /// Install a deadline, keeping the earlier one if both exist.
    pub fn deadline_at(mut self, deadline: Instant) -> Self {
        self.deadline = Some(match self.deadline {
            Some(existing) => existing.min(deadline),
            None => deadline,
        });
        self
    }

    /// Derive a context whose cancellation follows this one.
    ///
    /// Canceling the child never cancels the parent.
    pub fn child(&self) -> RequestCtx {
        RequestCtx {
            cancel: self.cancel.child_token(),
            deadline: self.deadline,
        }
    }

    /// Signal cancellation to every holder of this context and its children.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_canceled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Time left until the deadline; `None` when no deadline is set.
    /// Zero once the deadline has passed.
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|d| d.saturating_duration_since(Instant::now()))
    }

    /// The smaller of `timeout` and the remaining deadline budget.
    pub fn clamp_timeout(&self, timeout: Duration) -> Duration {
        match self.remaining() {
            Some(remaining) => timeout.min(remaining),
            None => timeout,
        }
    }

    /// Resolves when cancellation is signalled. Never resolves otherwise.
    pub async fn cancelled(&self) {
        self.cancel.cancelled().await;
    }
}
