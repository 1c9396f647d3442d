//! Error types for Courier.
//!
//! This module provides the error types shared by every layer:
//!
//! - [`Fault`] - A failure raised by a pipeline stage (pre hook, invocation, post hook)
//! - [`BuildError`] - Errors while assembling a dispatcher

use std::time::Duration;
use thiserror::Error;

/// A boxed error type for dynamic error handling.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// A failure raised by one stage of the dispatch pipeline.
///
/// Faults are handed to the resolved error hook unchanged. When the error
/// hook declines, the very same value is returned to the dispatch caller,
/// so the original cause is always available for diagnostics.
#[derive(Error, Debug)]
pub enum Fault {
    /// The request's cancellation token fired while a stage was running.
    #[error("request was cancelled")]
    Cancelled,

    /// A stage did not complete within its time limit.
    #[error("stage timed out after {0:?}")]
    Timeout(Duration),

    /// A post hook removed the response from the context.
    #[error("post hook left no response in the context")]
    MissingResponse,

    /// Any other failure raised by a hook or route action.
    #[error(transparent)]
    Custom(BoxError),
}

impl Fault {
    /// Wrap an arbitrary error (or message) as a fault.
    pub fn custom(err: impl Into<BoxError>) -> Self {
        Fault::Custom(err.into())
    }

    /// Whether this fault was caused by cancellation.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Fault::Cancelled)
    }

    /// Attempt to view the wrapped error as a concrete type.
    pub fn downcast_ref<T: std::error::Error + 'static>(&self) -> Option<&T> {
        match self {
            Fault::Custom(err) => err.downcast_ref::<T>(),
            _ => None,
        }
    }
}

impl From<BoxError> for Fault {
    fn from(err: BoxError) -> Self {
        Fault::Custom(err)
    }
}

/// Errors that can occur while building a dispatcher.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildError {
    /// No route resolver was supplied.
    #[error("dispatcher requires a route resolver")]
    MissingResolver,

    /// No route invoker was supplied.
    #[error("dispatcher requires a route invoker")]
    MissingInvoker,
}
