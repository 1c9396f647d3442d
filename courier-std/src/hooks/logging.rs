//! Logging hook for request observation.

use courier_core::{CancellationToken, Context, Fault, PostHook, PreHook, Response};

/// A hook that logs requests and responses without changing them.
///
/// Works as both a pre hook and a post hook. Events are emitted at debug
/// level when the `tracing` feature is enabled.
#[derive(Debug, Clone)]
pub struct LoggingHook {
    name: &'static str,
}

impl LoggingHook {
    /// Create a logging hook whose events carry `name`.
    pub fn new(name: &'static str) -> Self {
        Self { name }
    }

    /// The name attached to every event.
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl Default for LoggingHook {
    fn default() -> Self {
        Self::new("courier")
    }
}

impl PreHook for LoggingHook {
    async fn before(
        &self,
        ctx: &mut Context,
        _cancel: &CancellationToken,
    ) -> Result<Option<Response>, Fault> {
        #[cfg(feature = "tracing")]
        {
            let request = ctx.request();
            tracing::debug!(
                hook = self.name,
                method = %request.method(),
                path = request.path(),
                accept = request.headers().accept().len(),
                "Request received"
            );
        }
        #[cfg(not(feature = "tracing"))]
        {
            let _ = ctx;
        }
        Ok(None)
    }
}

impl PostHook for LoggingHook {
    async fn after(&self, ctx: &mut Context, _cancel: &CancellationToken) -> Result<(), Fault> {
        #[cfg(feature = "tracing")]
        {
            match ctx.response() {
                Some(response) => tracing::debug!(
                    hook = self.name,
                    status = response.status().as_u16(),
                    "Response ready"
                ),
                None => tracing::debug!(hook = self.name, "No response in slot"),
            }
        }
        #[cfg(not(feature = "tracing"))]
        {
            let _ = ctx;
        }
        Ok(())
    }
}
