//! Timeout hook for time-limited hooks.

use courier_core::{CancellationToken, Context, Fault, PostHook, PreHook, Response};
use std::time::Duration;
use tokio::time::timeout;

/// A hook that wraps another hook with a timeout.
///
/// When the inner hook overruns, the stage faults with
/// [`Fault::Timeout`] and the request goes to recovery.
pub struct TimeoutHook<H> {
    inner: H,
    duration: Duration,
}

impl<H> TimeoutHook<H> {
    /// Create a new timeout hook.
    pub fn new(inner: H, duration: Duration) -> Self {
        Self { inner, duration }
    }

    /// The time limit for the inner hook.
    pub fn duration(&self) -> Duration {
        self.duration
    }
}

impl<H: PreHook> PreHook for TimeoutHook<H> {
    async fn before(
        &self,
        ctx: &mut Context,
        cancel: &CancellationToken,
    ) -> Result<Option<Response>, Fault> {
        match timeout(self.duration, self.inner.before(ctx, cancel)).await {
            Ok(result) => result,
            Err(_) => Err(Fault::Timeout(self.duration)),
        }
    }
}

impl<H: PostHook> PostHook for TimeoutHook<H> {
    async fn after(&self, ctx: &mut Context, cancel: &CancellationToken) -> Result<(), Fault> {
        match timeout(self.duration, self.inner.after(ctx, cancel)).await {
            Ok(result) => result,
            Err(_) => Err(Fault::Timeout(self.duration)),
        }
    }
}
