//! Routes, captured parameters and resolution results.

use crate::{
    error::Fault,
    hook::{DynPostHook, DynPreHook, ErrorHook, PostHook, PreHook},
    response::Response,
};
use futures::{FutureExt, future::BoxFuture};
use http::Method;
use std::{fmt, future::Future, sync::Arc};
use tokio_util::sync::CancellationToken;

/// Named values captured from the request path, in capture order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Parameters(Vec<(String, String)>);

impl Parameters {
    /// An empty parameter list.
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Insert a value, replacing any previous value with the same name.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.0.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = value,
            None => self.0.push((name, value)),
        }
    }

    /// The value captured under `name`, if any.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Iterate over `(name, value)` pairs in capture order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// The number of captured values.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether nothing was captured.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Parameters {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut parameters = Parameters::new();
        for (name, value) in iter {
            parameters.insert(name, value);
        }
        parameters
    }
}

type Action =
    dyn Fn(Parameters, CancellationToken) -> BoxFuture<'static, Result<Response, Fault>> + Send + Sync;

/// A handler bound to a method and a path pattern.
///
/// The action receives the captured parameters and the request's
/// cancellation token. Cloning a route shares its action.
#[derive(Clone)]
pub struct Route {
    method: Method,
    pattern: Arc<str>,
    action: Arc<Action>,
}

impl Route {
    /// Create a route from an async action.
    ///
    /// ```rust,ignore
    /// let route = Route::new(Method::GET, "/users/{id}", |params, _cancel| async move {
    ///     Ok(Response::text(format!("user {}", params.get("id").unwrap_or("?"))))
    /// });
    /// ```
    pub fn new<F, Fut>(method: Method, pattern: impl Into<String>, action: F) -> Self
    where
        F: Fn(Parameters, CancellationToken) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Response, Fault>> + Send + 'static,
    {
        Self {
            method,
            pattern: Arc::from(pattern.into()),
            action: Arc::new(move |parameters, cancel| action(parameters, cancel).boxed()),
        }
    }

    /// The method this route answers.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// The path pattern this route was registered under.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Run the route's action.
    pub fn invoke(
        &self,
        parameters: Parameters,
        cancel: CancellationToken,
    ) -> BoxFuture<'static, Result<Response, Fault>> {
        (self.action)(parameters, cancel)
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("method", &self.method)
            .field("pattern", &self.pattern)
            .finish_non_exhaustive()
    }
}

/// The outcome of matching a request against the known routes.
#[derive(Debug, Clone)]
pub enum RouteMatch {
    /// A route accepts the request.
    Matched(Route),
    /// No route accepts the request.
    NotFound,
}

impl RouteMatch {
    /// Whether no route accepted the request.
    pub fn is_not_found(&self) -> bool {
        matches!(self, RouteMatch::NotFound)
    }

    /// The matched route, if any.
    pub fn route(&self) -> Option<&Route> {
        match self {
            RouteMatch::Matched(route) => Some(route),
            RouteMatch::NotFound => None,
        }
    }
}

/// Everything a resolver hands to the dispatcher for one request.
#[derive(Clone)]
pub struct Resolution {
    /// The matched route, or [`RouteMatch::NotFound`].
    pub route: RouteMatch,
    /// Values captured from the path.
    pub parameters: Parameters,
    /// Runs before the route; may short-circuit it.
    pub before: Option<Arc<dyn DynPreHook>>,
    /// Runs after a response exists.
    pub after: Option<Arc<dyn DynPostHook>>,
    /// Gets the first chance to turn a fault into a response.
    pub on_error: Option<Arc<dyn ErrorHook>>,
}

impl Resolution {
    /// A resolution without hooks.
    pub fn new(route: RouteMatch, parameters: Parameters) -> Self {
        Self {
            route,
            parameters,
            before: None,
            after: None,
            on_error: None,
        }
    }

    /// A resolution for a request no route accepts.
    pub fn not_found() -> Self {
        Self::new(RouteMatch::NotFound, Parameters::new())
    }

    /// A resolution for a matched route.
    pub fn matched(route: Route, parameters: Parameters) -> Self {
        Self::new(RouteMatch::Matched(route), parameters)
    }

    #[must_use]
    /// Attach a pre hook.
    pub fn with_before<H: PreHook>(mut self, hook: H) -> Self {
        self.before = Some(Arc::new(hook));
        self
    }

    #[must_use]
    /// Attach a post hook.
    pub fn with_after<H: PostHook>(mut self, hook: H) -> Self {
        self.after = Some(Arc::new(hook));
        self
    }

    #[must_use]
    /// Attach an error hook.
    pub fn with_on_error<H: ErrorHook>(mut self, hook: H) -> Self {
        self.on_error = Some(Arc::new(hook));
        self
    }
}

impl fmt::Debug for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolution")
            .field("route", &self.route)
            .field("parameters", &self.parameters)
            .field("before", &self.before.is_some())
            .field("after", &self.after.is_some())
            .field("on_error", &self.on_error.is_some())
            .finish()
    }
}
