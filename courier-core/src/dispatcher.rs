//! Dispatcher core traits.

use crate::{context::Context, error::Fault, response::Response};
use futures::future::BoxFuture;
use std::future::Future;
use tokio_util::sync::CancellationToken;

/// Turns one inbound request into a response.
///
/// This is the single entry point called by the transport layer, once per
/// request. On success the returned response is also the one left in the
/// context's response slot.
#[diagnostic::on_unimplemented(
    message = "`{Self}` cannot dispatch requests",
    label = "missing `RequestDispatcher` implementation",
    note = "Implement `RequestDispatcher::dispatch` to handle requests."
)]
pub trait RequestDispatcher: Send + Sync {
    /// Dispatch the request held by `ctx`.
    fn dispatch(
        &self,
        ctx: &mut Context,
        cancel: &CancellationToken,
    ) -> impl Future<Output = Result<Response, Fault>> + Send;
}

/// Object-safe version of [`RequestDispatcher`] for dynamic dispatch.
pub trait DynRequestDispatcher: Send + Sync {
    /// Dispatch the request held by `ctx`.
    fn dispatch_dyn<'a>(
        &'a self,
        ctx: &'a mut Context,
        cancel: &'a CancellationToken,
    ) -> BoxFuture<'a, Result<Response, Fault>>;
}

impl<T: RequestDispatcher> DynRequestDispatcher for T {
    fn dispatch_dyn<'a>(
        &'a self,
        ctx: &'a mut Context,
        cancel: &'a CancellationToken,
    ) -> BoxFuture<'a, Result<Response, Fault>> {
        Box::pin(self.dispatch(ctx, cancel))
    }
}
