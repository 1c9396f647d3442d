//! # Collaborator Layer
//!
//! The dispatcher composes three collaborators it does not implement
//! itself:
//!
//! - [`RouteResolver`] - maps a request to a [`Resolution`]
//! - [`RouteInvoker`] - runs the resolved route
//! - [`ResponseProcessor`] - advertises file extensions it can render, used
//!   for content negotiation by extension
//!
//! All collaborators are shared by concurrent dispatches and must be safe
//! for concurrent read-only use.

use crate::{
    context::Context,
    error::Fault,
    response::Response,
    route::{Parameters, Resolution, RouteMatch},
};
use mime::Mime;
use std::{borrow::Cow, future::Future, sync::Arc};
use tokio_util::sync::CancellationToken;

/// Maps a request to a route and its hooks.
///
/// Resolution never fails: a request no route accepts resolves to
/// [`RouteMatch::NotFound`].
#[diagnostic::on_unimplemented(
    message = "`{Self}` cannot resolve routes",
    label = "missing `RouteResolver` implementation",
    note = "Implement `RouteResolver::resolve` to map a `Context` to a `Resolution`."
)]
pub trait RouteResolver: Send + Sync {
    /// Resolve the request held by `ctx`.
    fn resolve(&self, ctx: &Context) -> Resolution;
}

impl<T: RouteResolver + ?Sized> RouteResolver for Arc<T> {
    fn resolve(&self, ctx: &Context) -> Resolution {
        (**self).resolve(ctx)
    }
}

impl<T: RouteResolver + ?Sized> RouteResolver for &T {
    fn resolve(&self, ctx: &Context) -> Resolution {
        (**self).resolve(ctx)
    }
}

/// Runs a resolved route.
///
/// The invoker decides what a [`RouteMatch::NotFound`] turns into; it is
/// valid input, not an error.
#[diagnostic::on_unimplemented(
    message = "`{Self}` cannot invoke routes",
    label = "missing `RouteInvoker` implementation",
    note = "Implement `RouteInvoker::invoke` to run a `RouteMatch`."
)]
pub trait RouteInvoker: Send + Sync {
    /// Invoke `route` with the captured `parameters`.
    fn invoke(
        &self,
        route: &RouteMatch,
        cancel: &CancellationToken,
        parameters: Parameters,
        ctx: &mut Context,
    ) -> impl Future<Output = Result<Response, Fault>> + Send;
}

impl<T: RouteInvoker> RouteInvoker for Arc<T> {
    fn invoke(
        &self,
        route: &RouteMatch,
        cancel: &CancellationToken,
        parameters: Parameters,
        ctx: &mut Context,
    ) -> impl Future<Output = Result<Response, Fault>> + Send {
        (**self).invoke(route, cancel, parameters, ctx)
    }
}

/// Associates a file extension with the media type it stands for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionMapping {
    extension: Cow<'static, str>,
    media_type: Mime,
}

impl ExtensionMapping {
    /// Create a mapping. The extension is given without the leading dot.
    pub fn new(extension: impl Into<Cow<'static, str>>, media_type: Mime) -> Self {
        Self {
            extension: extension.into(),
            media_type,
        }
    }

    /// The extension, without the leading dot.
    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// The media type the extension stands for.
    pub fn media_type(&self) -> &Mime {
        &self.media_type
    }

    /// Whether this mapping applies to `extension` (ASCII case-insensitive).
    pub fn applies_to(&self, extension: &str) -> bool {
        self.extension.eq_ignore_ascii_case(extension)
    }
}

/// A component able to render responses for some content types.
///
/// Only the extension mappings matter to the dispatcher; the rendering
/// itself happens elsewhere.
pub trait ResponseProcessor: Send + Sync {
    /// The extensions this processor can render, with their media types.
    fn extension_mappings(&self) -> &[ExtensionMapping];
}
