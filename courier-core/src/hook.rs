//! # Hook Layer
//!
//! Hooks wrap route invocation:
//!
//! - [`PreHook`] runs before the route and may answer the request itself
//!   by returning a response, in which case the route is skipped.
//! - [`PostHook`] runs once a response exists and may inspect or replace
//!   the response held by the context.
//! - [`ErrorHook`] is offered every fault raised by the stages above and
//!   may convert it into a response.
//!
//! The async hooks use native `async fn` for static dispatch. Resolvers
//! hand hooks to the dispatcher as shared trait objects, so each async hook
//! trait has an object-safe twin ([`DynPreHook`], [`DynPostHook`]) that is
//! implemented automatically.

use crate::{context::Context, error::Fault, response::Response};
use futures::future::BoxFuture;
use std::{future::Future, sync::Arc};
use tokio_util::sync::CancellationToken;

/// Runs before the route handler.
///
/// Returning `Ok(Some(response))` short-circuits the request: the route is
/// not invoked and the response goes straight to the post hook.
/// Returning `Ok(None)` lets the request continue.
///
/// # Example
///
/// ```rust,ignore
/// struct RequireToken;
///
/// impl PreHook for RequireToken {
///     async fn before(
///         &self,
///         ctx: &mut Context,
///         _cancel: &CancellationToken,
///     ) -> Result<Option<Response>, Fault> {
///         if ctx.request().headers().get("x-token").is_none() {
///             return Ok(Some(Response::new(StatusCode::UNAUTHORIZED)));
///         }
///         Ok(None)
///     }
/// }
/// ```
#[diagnostic::on_unimplemented(
    message = "`{Self}` does not implement `PreHook`",
    label = "missing `PreHook` implementation",
    note = "Pre hooks must implement `before`."
)]
pub trait PreHook: Send + Sync + 'static {
    /// Called before the route is invoked.
    fn before(
        &self,
        ctx: &mut Context,
        cancel: &CancellationToken,
    ) -> impl Future<Output = Result<Option<Response>, Fault>> + Send;
}

/// Dynamic object-safe version of [`PreHook`].
pub trait DynPreHook: Send + Sync + 'static {
    /// Called before the route is invoked (dynamic dispatch version).
    fn before_dyn<'a>(
        &'a self,
        ctx: &'a mut Context,
        cancel: &'a CancellationToken,
    ) -> BoxFuture<'a, Result<Option<Response>, Fault>>;
}

impl<T: PreHook> DynPreHook for T {
    fn before_dyn<'a>(
        &'a self,
        ctx: &'a mut Context,
        cancel: &'a CancellationToken,
    ) -> BoxFuture<'a, Result<Option<Response>, Fault>> {
        Box::pin(self.before(ctx, cancel))
    }
}

// Allow shared DynPreHook objects to be used where PreHook is expected.
impl PreHook for Arc<dyn DynPreHook> {
    async fn before(
        &self,
        ctx: &mut Context,
        cancel: &CancellationToken,
    ) -> Result<Option<Response>, Fault> {
        // Go through the inner object; the blanket impl also covers the Arc.
        (**self).before_dyn(ctx, cancel).await
    }
}

/// Runs after a response exists, whether it came from a pre hook or from
/// the route.
///
/// Post hooks observe or mutate the response through
/// [`Context::response_mut`] and [`Context::set_response`].
#[diagnostic::on_unimplemented(
    message = "`{Self}` does not implement `PostHook`",
    label = "missing `PostHook` implementation",
    note = "Post hooks must implement `after`."
)]
pub trait PostHook: Send + Sync + 'static {
    /// Called after the response has been produced.
    fn after(
        &self,
        ctx: &mut Context,
        cancel: &CancellationToken,
    ) -> impl Future<Output = Result<(), Fault>> + Send;
}

/// Dynamic object-safe version of [`PostHook`].
pub trait DynPostHook: Send + Sync + 'static {
    /// Called after the response has been produced (dynamic dispatch version).
    fn after_dyn<'a>(
        &'a self,
        ctx: &'a mut Context,
        cancel: &'a CancellationToken,
    ) -> BoxFuture<'a, Result<(), Fault>>;
}

impl<T: PostHook> DynPostHook for T {
    fn after_dyn<'a>(
        &'a self,
        ctx: &'a mut Context,
        cancel: &'a CancellationToken,
    ) -> BoxFuture<'a, Result<(), Fault>> {
        Box::pin(self.after(ctx, cancel))
    }
}

impl PostHook for Arc<dyn DynPostHook> {
    async fn after(&self, ctx: &mut Context, cancel: &CancellationToken) -> Result<(), Fault> {
        (**self).after_dyn(ctx, cancel).await
    }
}

/// Converts a fault into a response.
///
/// Error hooks are synchronous. Returning `None` declines, and the fault
/// propagates to the dispatch caller unchanged.
///
/// Closures of the form `|ctx: &mut Context, fault: &Fault| -> Option<Response>`
/// implement this trait.
#[diagnostic::on_unimplemented(
    message = "`{Self}` does not implement `ErrorHook`",
    label = "missing `ErrorHook` implementation",
    note = "Error hooks must implement `on_error`, or be a closure taking `(&mut Context, &Fault)`."
)]
pub trait ErrorHook: Send + Sync + 'static {
    /// Called with the fault raised by a pipeline stage.
    fn on_error(&self, ctx: &mut Context, fault: &Fault) -> Option<Response>;
}

impl<F> ErrorHook for F
where
    F: Fn(&mut Context, &Fault) -> Option<Response> + Send + Sync + 'static,
{
    fn on_error(&self, ctx: &mut Context, fault: &Fault) -> Option<Response> {
        (self)(ctx, fault)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::Request;
    use http::StatusCode;

    struct Teapot;

    impl PreHook for Teapot {
        async fn before(
            &self,
            _ctx: &mut Context,
            _cancel: &CancellationToken,
        ) -> Result<Option<Response>, Fault> {
            Ok(Some(Response::new(StatusCode::IM_A_TEAPOT)))
        }
    }

    struct Stamp;

    impl PostHook for Stamp {
        async fn after(&self, ctx: &mut Context, _cancel: &CancellationToken) -> Result<(), Fault> {
            if let Some(response) = ctx.response_mut() {
                response.set_status(StatusCode::ACCEPTED);
            }
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_dyn_pre_hook_dispatch() {
        let hook: Arc<dyn DynPreHook> = Arc::new(Teapot);
        let mut ctx = Context::new(Request::get("/"));

        let response = hook
            .before(&mut ctx, &CancellationToken::new())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(response.status(), StatusCode::IM_A_TEAPOT);
    }

    #[tokio::test]
    async fn test_dyn_post_hook_mutates_slot() {
        let hook: Arc<dyn DynPostHook> = Arc::new(Stamp);
        let mut ctx = Context::new(Request::get("/"));
        ctx.set_response(Response::default());

        hook.after(&mut ctx, &CancellationToken::new()).await.unwrap();
        assert_eq!(ctx.response().unwrap().status(), StatusCode::ACCEPTED);
    }

    #[test]
    fn test_closure_error_hook() {
        let hook = |_ctx: &mut Context, fault: &Fault| {
            fault
                .is_cancelled()
                .then(|| Response::new(StatusCode::SERVICE_UNAVAILABLE))
        };
        let mut ctx = Context::new(Request::get("/"));

        assert!(hook.on_error(&mut ctx, &Fault::Cancelled).is_some());
        assert!(hook.on_error(&mut ctx, &Fault::custom("nope")).is_none());
    }
}
