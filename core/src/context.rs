//! Cancellation and deadline propagation for API calls.
//!
//! A `Context` is checked before any request is sent and watched while it is
//! in flight; its remaining time is the request timeout. Children derived
//! with [`Context::with_timeout`] or [`Context::with_deadline`] observe their
//! parent's cancellation, but cancelling a child leaves the parent untouched.

use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;

use crate::error::ApiError;

#[derive(Debug, Clone, Default)]
pub struct Context {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl Context {
    /// A context that is never cancelled and has no deadline.
    pub fn background() -> Self {
        Self::default()
    }

    /// Context driven by an existing token, e.g. a host's shutdown signal.
    pub fn with_token(token: CancellationToken) -> Self {
        Self { token, deadline: None }
    }

    pub fn with_timeout(&self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// Derive a child whose deadline is the earlier of `deadline` and the
    /// parent's.
    pub fn with_deadline(&self, deadline: Instant) -> Self {
        let deadline = match self.deadline {
            Some(parent) if parent < deadline => parent,
            _ => deadline,
        };
        Self {
            token: self.token.child_token(),
            deadline: Some(deadline),
        }
    }

    /// Cancel this context and every context derived from it.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Time left before the deadline; `Some(Duration::ZERO)` once it passed.
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|d| d.saturating_duration_since(Instant::now()))
    }

    /// `Err(InvalidRequest)` if the context is cancelled or expired.
    pub fn check(&self) -> Result<(), ApiError> {
        if self.is_cancelled() {
            return Err(ApiError::InvalidRequest("context cancelled".to_string()));
        }
        if self.remaining() == Some(Duration::ZERO) {
            return Err(ApiError::InvalidRequest("context deadline exceeded".to_string()));
        }
        Ok(())
    }
}
