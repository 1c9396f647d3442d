//! Testing utilities for Courier.
//!
//! Doubles for every collaborator the dispatcher talks to, so pipelines can
//! be exercised without a real router or real handlers.
//!
//! # Features
//!
//! - [`FakeRoute`]: A route that records whether and how it was invoked
//! - [`RecordingResolver`]: A resolver with scripted per-path answers that records every call
//! - [`RecordingPreHook`] / [`RecordingPostHook`]: Hooks that count their calls
//! - [`FailingHook`]: A hook that always faults with a [`TestFailure`]
//! - [`CountingInvoker`]: A [`DefaultInvoker`] that counts invocations
//! - [`Journal`]: A shared log for asserting the order of pipeline stages

use crate::invoker::DefaultInvoker;
use courier_core::{
    CancellationToken, Context, Fault, MediaRange, Parameters, PostHook, PreHook, Resolution,
    Response, Route, RouteInvoker, RouteMatch, RouteResolver,
};
use http::{Method, StatusCode};
use std::{
    collections::HashMap,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
};
use thiserror::Error;

/// The error raised by test doubles that are told to fail.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("{0}")]
pub struct TestFailure(pub &'static str);

// ============================================================================
// Journal
// ============================================================================

/// A shared, ordered log of named events.
///
/// Hand the same journal to several doubles and assert on
/// [`entries`](Self::entries) to check the order in which they ran.
#[derive(Debug, Clone, Default)]
pub struct Journal(Arc<Mutex<Vec<String>>>);

impl Journal {
    /// An empty journal.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry.
    pub fn record(&self, entry: impl Into<String>) {
        self.0.lock().unwrap().push(entry.into());
    }

    /// Get a clone of the recorded entries.
    pub fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

fn note(journal: &Option<(Journal, &'static str)>) {
    if let Some((journal, label)) = journal {
        journal.record(*label);
    }
}

// ============================================================================
// Fake Route
// ============================================================================

#[derive(Clone)]
enum Scripted {
    Respond(Response),
    Fail(&'static str),
}

impl Scripted {
    fn produce(&self) -> Result<Response, Fault> {
        match self {
            Self::Respond(response) => Ok(response.clone()),
            Self::Fail(message) => Err(Fault::custom(TestFailure(*message))),
        }
    }
}

/// A route whose action records each invocation.
///
/// # Example
///
/// ```rust,ignore
/// let fake = FakeRoute::responding(Response::text("ok"));
/// let resolver = RecordingResolver::new()
///     .with_route("/", Resolution::matched(fake.route(), Parameters::new()));
///
/// dispatcher.dispatch(&mut ctx, &cancel).await?;
/// assert!(fake.was_invoked());
/// ```
#[derive(Clone)]
pub struct FakeRoute {
    method: Method,
    pattern: &'static str,
    outcome: Scripted,
    invocations: Arc<Mutex<Vec<Parameters>>>,
    journal: Option<(Journal, &'static str)>,
}

impl FakeRoute {
    /// A `GET /` route that answers with `response`.
    pub fn responding(response: Response) -> Self {
        Self::scripted(Scripted::Respond(response))
    }

    /// A `GET /` route that faults with `TestFailure(message)`.
    pub fn failing(message: &'static str) -> Self {
        Self::scripted(Scripted::Fail(message))
    }

    fn scripted(outcome: Scripted) -> Self {
        Self {
            method: Method::GET,
            pattern: "/",
            outcome,
            invocations: Arc::new(Mutex::new(Vec::new())),
            journal: None,
        }
    }

    /// Change the method and pattern the route is registered under.
    pub fn at(mut self, method: Method, pattern: &'static str) -> Self {
        self.method = method;
        self.pattern = pattern;
        self
    }

    /// Record each invocation in `journal` under `label`.
    pub fn with_journal(mut self, journal: &Journal, label: &'static str) -> Self {
        self.journal = Some((journal.clone(), label));
        self
    }

    /// Build a [`Route`] that reports back to this fake.
    pub fn route(&self) -> Route {
        let fake = self.clone();
        Route::new(self.method.clone(), self.pattern, move |parameters, _cancel| {
            fake.invocations.lock().unwrap().push(parameters);
            note(&fake.journal);
            let result = fake.outcome.produce();
            async move { result }
        })
    }

    /// Whether the route ran at least once.
    pub fn was_invoked(&self) -> bool {
        self.invocation_count() > 0
    }

    /// How many times the route ran.
    pub fn invocation_count(&self) -> usize {
        self.invocations.lock().unwrap().len()
    }

    /// Parameters of the most recent invocation.
    pub fn parameters(&self) -> Option<Parameters> {
        self.invocations.lock().unwrap().last().cloned()
    }
}

// ============================================================================
// Recording Resolver
// ============================================================================

/// What a [`RecordingResolver`] saw when it was called.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverCall {
    /// The request path at the time of the call.
    pub path: String,
    /// The accept list at the time of the call.
    pub accept: Vec<MediaRange>,
}

/// A resolver with scripted answers keyed by exact path.
///
/// Paths without a script resolve to the fallback, which defaults to
/// [`Resolution::not_found`]. Clones share the call log.
#[derive(Clone, Default)]
pub struct RecordingResolver {
    routes: HashMap<String, Resolution>,
    fallback: Option<Resolution>,
    calls: Arc<Mutex<Vec<ResolverCall>>>,
}

impl RecordingResolver {
    /// A resolver with no scripted paths.
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `path` with `resolution`.
    pub fn with_route(mut self, path: impl Into<String>, resolution: Resolution) -> Self {
        self.routes.insert(path.into(), resolution);
        self
    }

    /// Answer unscripted paths with `resolution`.
    pub fn with_fallback(mut self, resolution: Resolution) -> Self {
        self.fallback = Some(resolution);
        self
    }

    /// Get a clone of the recorded calls.
    pub fn calls(&self) -> Vec<ResolverCall> {
        self.calls.lock().unwrap().clone()
    }

    /// The number of recorded calls.
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl RouteResolver for RecordingResolver {
    fn resolve(&self, ctx: &Context) -> Resolution {
        let request = ctx.request();
        self.calls.lock().unwrap().push(ResolverCall {
            path: request.path().to_owned(),
            accept: request.headers().accept().to_vec(),
        });

        self.routes
            .get(request.path())
            .or(self.fallback.as_ref())
            .cloned()
            .unwrap_or_else(Resolution::not_found)
    }
}

// ============================================================================
// Recording Hooks
// ============================================================================

/// A pre hook that counts its calls and optionally short-circuits.
#[derive(Clone, Default)]
pub struct RecordingPreHook {
    response: Option<Response>,
    calls: Arc<AtomicUsize>,
    journal: Option<(Journal, &'static str)>,
}

impl RecordingPreHook {
    /// A hook that observes and lets the request through.
    pub fn new() -> Self {
        Self::default()
    }

    /// A hook that short-circuits with `response`.
    pub fn responding(response: Response) -> Self {
        Self {
            response: Some(response),
            ..Self::default()
        }
    }

    /// Record each call in `journal` under `label`.
    pub fn with_journal(mut self, journal: &Journal, label: &'static str) -> Self {
        self.journal = Some((journal.clone(), label));
        self
    }

    /// How many times this double was called.
    pub fn count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl PreHook for RecordingPreHook {
    async fn before(
        &self,
        _ctx: &mut Context,
        _cancel: &CancellationToken,
    ) -> Result<Option<Response>, Fault> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        note(&self.journal);
        Ok(self.response.clone())
    }
}

#[derive(Clone, Default)]
enum PostAction {
    #[default]
    Observe,
    Replace(Response),
    Clear,
}

/// A post hook that counts its calls and records the status it observed.
#[derive(Clone, Default)]
pub struct RecordingPostHook {
    action: PostAction,
    seen: Arc<Mutex<Vec<Option<StatusCode>>>>,
    journal: Option<(Journal, &'static str)>,
}

impl RecordingPostHook {
    /// A hook that only observes.
    pub fn new() -> Self {
        Self::default()
    }

    /// A hook that replaces the response with `response`.
    pub fn replacing(response: Response) -> Self {
        Self {
            action: PostAction::Replace(response),
            ..Self::default()
        }
    }

    /// A hook that empties the response slot.
    pub fn clearing() -> Self {
        Self {
            action: PostAction::Clear,
            ..Self::default()
        }
    }

    /// Record each call in `journal` under `label`.
    pub fn with_journal(mut self, journal: &Journal, label: &'static str) -> Self {
        self.journal = Some((journal.clone(), label));
        self
    }

    /// How many times this double was called.
    pub fn count(&self) -> usize {
        self.seen.lock().unwrap().len()
    }

    /// The response status present in the slot at each call.
    pub fn seen(&self) -> Vec<Option<StatusCode>> {
        self.seen.lock().unwrap().clone()
    }
}

impl PostHook for RecordingPostHook {
    async fn after(&self, ctx: &mut Context, _cancel: &CancellationToken) -> Result<(), Fault> {
        let status = ctx.response().map(Response::status);
        self.seen.lock().unwrap().push(status);
        note(&self.journal);

        match &self.action {
            PostAction::Observe => {}
            PostAction::Replace(response) => ctx.set_response(response.clone()),
            PostAction::Clear => {
                ctx.take_response();
            }
        }
        Ok(())
    }
}

/// A hook that always faults with `TestFailure(message)`.
#[derive(Clone)]
pub struct FailingHook {
    message: &'static str,
    calls: Arc<AtomicUsize>,
}

impl FailingHook {
    /// A hook failing with `TestFailure(message)`.
    pub fn new(message: &'static str) -> Self {
        Self {
            message,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// How many times this double was called.
    pub fn count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn fail(&self) -> Fault {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Fault::custom(TestFailure(self.message))
    }
}

impl PreHook for FailingHook {
    async fn before(
        &self,
        _ctx: &mut Context,
        _cancel: &CancellationToken,
    ) -> Result<Option<Response>, Fault> {
        Err(self.fail())
    }
}

impl PostHook for FailingHook {
    async fn after(&self, _ctx: &mut Context, _cancel: &CancellationToken) -> Result<(), Fault> {
        Err(self.fail())
    }
}

// ============================================================================
// Counting Invoker
// ============================================================================

/// A [`DefaultInvoker`] that counts how often it is asked to invoke.
#[derive(Debug, Clone, Default)]
pub struct CountingInvoker {
    inner: DefaultInvoker,
    calls: Arc<AtomicUsize>,
}

impl CountingInvoker {
    /// A counting invoker starting at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// How many times this double was called.
    pub fn count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl RouteInvoker for CountingInvoker {
    async fn invoke(
        &self,
        route: &RouteMatch,
        cancel: &CancellationToken,
        parameters: Parameters,
        ctx: &mut Context,
    ) -> Result<Response, Fault> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.invoke(route, cancel, parameters, ctx).await
    }
}
