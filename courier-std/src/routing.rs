//! Matchit-based route table.
//!
//! Provides path parameter and wildcard matching (e.g. `/users/{id}`,
//! `/files/{*path}`), one tree per HTTP method.

use courier_core::{
    Context, DynPostHook, DynPreHook, ErrorHook, Parameters, PostHook, PreHook, Resolution, Route,
    RouteMatch, RouteResolver,
};
use http::Method;
use matchit::{Match, Router as InnerRouter};
use std::{collections::HashMap, sync::Arc};
use thiserror::Error;

/// Errors that can occur while registering routes.
#[derive(Error, Debug)]
pub enum RouteTableError {
    /// The pattern is malformed or conflicts with an existing route.
    #[error("cannot register `{method} {pattern}`: {reason}")]
    Insert {
        /// Method of the rejected route.
        method: Method,
        /// Pattern of the rejected route.
        pattern: String,
        /// Why the router rejected it.
        reason: String,
    },
}

/// A route resolver backed by `matchit`.
///
/// Hooks registered on the table are attached to every resolution it
/// produces, including [`RouteMatch::NotFound`] ones.
///
/// # Example
///
/// ```rust,ignore
/// let mut table = RouteTable::new();
/// table.add(Route::new(Method::GET, "/users/{id}", show_user))?;
/// table.set_on_error(|_ctx: &mut Context, _fault: &Fault| {
///     Some(Response::new(StatusCode::INTERNAL_SERVER_ERROR))
/// });
/// ```
#[derive(Default)]
pub struct RouteTable {
    routers: HashMap<Method, InnerRouter<Route>>,
    len: usize,
    before: Option<Arc<dyn DynPreHook>>,
    after: Option<Arc<dyn DynPostHook>>,
    on_error: Option<Arc<dyn ErrorHook>>,
}

impl RouteTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a route under its method and pattern.
    pub fn add(&mut self, route: Route) -> Result<(), RouteTableError> {
        let method = route.method().clone();
        let pattern = route.pattern().to_owned();

        self.routers
            .entry(method.clone())
            .or_default()
            .insert(pattern.clone(), route)
            .map_err(|e| RouteTableError::Insert {
                method,
                pattern,
                reason: e.to_string(),
            })?;

        self.len += 1;
        Ok(())
    }

    /// Builder-style [`add`](Self::add).
    pub fn with_route(mut self, route: Route) -> Result<Self, RouteTableError> {
        self.add(route)?;
        Ok(self)
    }

    /// Run `hook` before every route in the table.
    pub fn set_before<H: PreHook>(&mut self, hook: H) {
        self.before = Some(Arc::new(hook));
    }

    /// Run `hook` after every response the table resolves.
    pub fn set_after<H: PostHook>(&mut self, hook: H) {
        self.after = Some(Arc::new(hook));
    }

    /// Offer every fault to `hook`.
    pub fn set_on_error<H: ErrorHook>(&mut self, hook: H) {
        self.on_error = Some(Arc::new(hook));
    }

    /// The number of registered routes.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether no route is registered.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl RouteResolver for RouteTable {
    fn resolve(&self, ctx: &Context) -> Resolution {
        let request = ctx.request();
        let matched = self
            .routers
            .get(request.method())
            .and_then(|router| router.at(request.path()).ok());

        let resolution = match matched {
            Some(Match { value, params }) => {
                let parameters: Parameters = params.iter().collect();
                Resolution::matched(value.clone(), parameters)
            }
            None => Resolution::new(RouteMatch::NotFound, Parameters::new()),
        };

        Resolution {
            before: self.before.clone(),
            after: self.after.clone(),
            on_error: self.on_error.clone(),
            ..resolution
        }
    }
}
