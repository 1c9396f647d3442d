//! # Dispatch Orchestrator
//!
//! [`DefaultDispatcher`] drives one request through a fixed sequence of
//! stages:
//!
//! ```text
//! resolve -> pre hook -> decide -+-> invoke ---+-> post hook -> Completed
//!                                +-(response)--+
//!                 any fault -> recover -> Completed | Faulted
//! ```
//!
//! Each stage is a separate function returning a tagged result, so every
//! transition can be exercised on its own. Stages run strictly one after
//! another for a request; only the suspension points between them yield.
//!
//! # Cancellation
//!
//! Every stage that does work is raced against the request's
//! [`CancellationToken`]. The stage is polled first, so a stage that
//! finishes in the same poll as the cancellation still wins. Losing the
//! race is a [`Fault::Cancelled`], which goes through recovery like any
//! other fault: the error hook may still produce a response.

use crate::negotiation::ExtensionNegotiator;
use courier_core::{
    BuildError, CancellationToken, Context, DynPostHook, DynPreHook, ErrorHook, Fault,
    RequestDispatcher, Resolution, Response, ResponseProcessor, RouteInvoker, RouteResolver,
};
use futures::future::{Either, select};
use std::{fmt, future::Future, pin::pin, sync::Arc};

#[cfg(feature = "tracing")]
use tracing::{Instrument, debug, warn};

/// The pipeline stage a fault originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// The pre hook.
    PreHook,
    /// The route invoker.
    Invoke,
    /// The post hook.
    PostHook,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::PreHook => "pre-hook",
            Stage::Invoke => "invoke",
            Stage::PostHook => "post-hook",
        })
    }
}

/// The terminal state of a pipeline run, before recovery.
#[derive(Debug)]
pub enum Outcome {
    /// The pipeline produced this response.
    Completed(Response),
    /// `stage` raised `fault`.
    Faulted {
        /// Where the fault came from.
        stage: Stage,
        /// The fault, exactly as raised.
        fault: Fault,
    },
}

impl Outcome {
    fn faulted(stage: Stage, fault: Fault) -> Self {
        Outcome::Faulted { stage, fault }
    }
}

/// Run `work` unless `cancel` fires first.
async fn guarded<T, F>(cancel: &CancellationToken, work: F) -> Result<T, Fault>
where
    F: Future<Output = Result<T, Fault>>,
{
    if cancel.is_cancelled() {
        return Err(Fault::Cancelled);
    }

    let work = pin!(work);
    let cancelled = pin!(cancel.cancelled());
    match select(work, cancelled).await {
        Either::Left((result, _)) => result,
        Either::Right(((), _)) => Err(Fault::Cancelled),
    }
}

/// PreHook stage: run the hook, if any, and store its result in the
/// response slot (an absent result empties the slot).
pub async fn run_pre_hook(
    hook: Option<&dyn DynPreHook>,
    ctx: &mut Context,
    cancel: &CancellationToken,
) -> Result<(), Fault> {
    let response = match hook {
        Some(hook) => guarded(cancel, hook.before_dyn(ctx, cancel)).await?,
        None => None,
    };
    ctx.set_response(response);
    Ok(())
}

/// Decide stage: which stage follows the pre hook.
///
/// A response in the slot means the pre hook short-circuited the request.
pub fn decide(ctx: &Context) -> Stage {
    if ctx.response().is_some() {
        Stage::PostHook
    } else {
        Stage::Invoke
    }
}

/// Invoking stage: run the resolved route and store its response.
pub async fn run_invoke<I>(
    invoker: &I,
    resolution: &Resolution,
    ctx: &mut Context,
    cancel: &CancellationToken,
) -> Result<(), Fault>
where
    I: RouteInvoker + ?Sized,
{
    let invocation = invoker.invoke(
        &resolution.route,
        cancel,
        resolution.parameters.clone(),
        ctx,
    );
    let response = guarded(cancel, invocation).await?;
    ctx.set_response(response);
    Ok(())
}

/// PostHook stage: run the hook, if any, then complete with whatever the
/// response slot holds.
pub async fn run_post_hook(
    hook: Option<&dyn DynPostHook>,
    ctx: &mut Context,
    cancel: &CancellationToken,
) -> Outcome {
    if let Some(hook) = hook {
        if let Err(fault) = guarded(cancel, hook.after_dyn(ctx, cancel)).await {
            return Outcome::faulted(Stage::PostHook, fault);
        }
    }

    match ctx.response() {
        Some(response) => Outcome::Completed(response.clone()),
        None => Outcome::faulted(Stage::PostHook, Fault::MissingResponse),
    }
}

/// Recovering stage: offer `fault` to the error hook.
///
/// A response from the hook is stored in the slot and returned. Otherwise
/// the fault is returned unchanged.
pub fn recover(
    ctx: &mut Context,
    on_error: Option<&dyn ErrorHook>,
    stage: Stage,
    fault: Fault,
) -> Result<Response, Fault> {
    match on_error.and_then(|hook| hook.on_error(ctx, &fault)) {
        Some(response) => {
            #[cfg(feature = "tracing")]
            debug!(%stage, %fault, status = %response.status(), "fault recovered by error hook");

            ctx.set_response(response.clone());
            Ok(response)
        }
        None => {
            #[cfg(feature = "tracing")]
            warn!(%stage, %fault, "unrecovered fault");
            #[cfg(not(feature = "tracing"))]
            let _ = stage;

            Err(fault)
        }
    }
}

/// The standard dispatcher: extension-aware resolution, then the hook and
/// invocation pipeline with fault recovery.
///
/// # Example
///
/// ```rust,ignore
/// let dispatcher = DefaultDispatcher::builder()
///     .resolver(table)
///     .invoker(DefaultInvoker)
///     .processor(ExtensionMap::json())
///     .build()?;
///
/// let mut ctx = Context::new(Request::get("/users/7.json"));
/// let response = dispatcher.dispatch(&mut ctx, &CancellationToken::new()).await?;
/// ```
pub struct DefaultDispatcher<R, I> {
    resolver: R,
    invoker: I,
    negotiator: ExtensionNegotiator,
}

impl<R, I> DefaultDispatcher<R, I> {
    /// Create a dispatcher from its collaborators.
    pub fn new(resolver: R, invoker: I, processors: Vec<Arc<dyn ResponseProcessor>>) -> Self {
        Self {
            resolver,
            invoker,
            negotiator: ExtensionNegotiator::new(processors),
        }
    }

    /// Start building a dispatcher.
    pub fn builder() -> DispatcherBuilder<R, I> {
        DispatcherBuilder::new()
    }

    /// The route resolver.
    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    /// The route invoker.
    pub fn invoker(&self) -> &I {
        &self.invoker
    }

    /// The extension negotiator wrapping the response processors.
    pub fn negotiator(&self) -> &ExtensionNegotiator {
        &self.negotiator
    }
}

impl<R, I> DefaultDispatcher<R, I>
where
    R: RouteResolver,
    I: RouteInvoker,
{
    /// Resolving stage.
    pub fn resolve(&self, ctx: &mut Context) -> Resolution {
        self.negotiator.resolve(ctx, &self.resolver)
    }

    /// Run the stages after resolution, stopping at the first fault.
    pub async fn run(
        &self,
        resolution: &Resolution,
        ctx: &mut Context,
        cancel: &CancellationToken,
    ) -> Outcome {
        if let Err(fault) = run_pre_hook(resolution.before.as_deref(), ctx, cancel).await {
            return Outcome::faulted(Stage::PreHook, fault);
        }

        if decide(ctx) == Stage::Invoke {
            #[cfg(feature = "tracing")]
            debug!(route = ?resolution.route, "invoking route");

            if let Err(fault) = run_invoke(&self.invoker, resolution, ctx, cancel).await {
                return Outcome::faulted(Stage::Invoke, fault);
            }
        } else {
            #[cfg(feature = "tracing")]
            debug!("pre hook short-circuited the route");
        }

        run_post_hook(resolution.after.as_deref(), ctx, cancel).await
    }

    async fn dispatch_inner(
        &self,
        ctx: &mut Context,
        cancel: &CancellationToken,
    ) -> Result<Response, Fault> {
        let resolution = self.resolve(ctx);

        match self.run(&resolution, ctx, cancel).await {
            Outcome::Completed(response) => {
                #[cfg(feature = "tracing")]
                debug!(status = %response.status(), "dispatch completed");

                Ok(response)
            }
            Outcome::Faulted { stage, fault } => {
                recover(ctx, resolution.on_error.as_deref(), stage, fault)
            }
        }
    }
}

impl<R, I> RequestDispatcher for DefaultDispatcher<R, I>
where
    R: RouteResolver,
    I: RouteInvoker,
{
    #[cfg(feature = "tracing")]
    async fn dispatch(
        &self,
        ctx: &mut Context,
        cancel: &CancellationToken,
    ) -> Result<Response, Fault> {
        let span = tracing::debug_span!(
            "dispatch",
            method = %ctx.request().method(),
            path = %ctx.request().path()
        );
        self.dispatch_inner(ctx, cancel).instrument(span).await
    }

    #[cfg(not(feature = "tracing"))]
    async fn dispatch(
        &self,
        ctx: &mut Context,
        cancel: &CancellationToken,
    ) -> Result<Response, Fault> {
        self.dispatch_inner(ctx, cancel).await
    }
}

/// Builder for [`DefaultDispatcher`].
pub struct DispatcherBuilder<R, I> {
    resolver: Option<R>,
    invoker: Option<I>,
    processors: Vec<Arc<dyn ResponseProcessor>>,
    extension_negotiation: bool,
}

impl<R, I> DispatcherBuilder<R, I> {
    /// An empty builder with extension negotiation enabled.
    pub fn new() -> Self {
        Self {
            resolver: None,
            invoker: None,
            processors: Vec::new(),
            extension_negotiation: true,
        }
    }

    #[must_use]
    /// Set the route resolver (required).
    pub fn resolver(mut self, resolver: R) -> Self {
        self.resolver = Some(resolver);
        self
    }

    #[must_use]
    /// Set the route invoker (required).
    pub fn invoker(mut self, invoker: I) -> Self {
        self.invoker = Some(invoker);
        self
    }

    /// Register a response processor for extension negotiation.
    #[must_use]
    pub fn processor<P: ResponseProcessor + 'static>(mut self, processor: P) -> Self {
        self.processors.push(Arc::new(processor));
        self
    }

    /// Register an already shared response processor.
    #[must_use]
    pub fn shared_processor(mut self, processor: Arc<dyn ResponseProcessor>) -> Self {
        self.processors.push(processor);
        self
    }

    /// Enable or disable content negotiation by extension (default: on).
    #[must_use]
    pub fn extension_negotiation(mut self, enabled: bool) -> Self {
        self.extension_negotiation = enabled;
        self
    }

    /// Build the dispatcher.
    pub fn build(self) -> Result<DefaultDispatcher<R, I>, BuildError> {
        let resolver = self.resolver.ok_or(BuildError::MissingResolver)?;
        let invoker = self.invoker.ok_or(BuildError::MissingInvoker)?;

        Ok(DefaultDispatcher {
            resolver,
            invoker,
            negotiator: ExtensionNegotiator::new(self.processors)
                .enabled(self.extension_negotiation),
        })
    }
}

impl<R, I> Default for DispatcherBuilder<R, I> {
    fn default() -> Self {
        Self::new()
    }
}
