//! # courier-core
//!
//! Core traits and data model for the Courier request dispatch framework.
//!
//! This crate has minimal dependencies and is meant to be imported by
//! resolvers, hooks and processors that don't need the standard
//! implementations in `courier-std`.
//!
//! # Layers
//!
//! ## Data Model
//!
//! [`Request`], [`Response`], [`MediaRange`] and the per-request
//! [`Context`] with its single response slot.
//!
//! ## Routes ([`Route`], [`RouteMatch`], [`Resolution`])
//!
//! A route is an async action bound to a method and a path pattern. The
//! absence of a match is the [`RouteMatch::NotFound`] variant rather than a
//! marker route, so matching on a resolution is exhaustive.
//!
//! ## Hooks ([`PreHook`], [`PostHook`], [`ErrorHook`])
//!
//! Code that runs around route invocation. A pre hook may short-circuit, a
//! post hook always runs once a response exists, and an error hook may turn
//! any fault into a response.
//!
//! ## Collaborators ([`RouteResolver`], [`RouteInvoker`], [`ResponseProcessor`])
//!
//! The pieces a dispatcher is assembled from.
//!
//! ## Dispatch ([`RequestDispatcher`])
//!
//! The single entry point: one request in, one response (or [`Fault`]) out.
//!
//! # Error Types
//!
//! - [`Fault`] - A failure raised by a pipeline stage
//! - [`BuildError`] - Dispatcher construction errors

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

mod context;
mod dispatcher;
mod error;
mod hook;
mod media;
mod request;
mod resolver;
mod response;
mod route;

// Re-exports
pub use context::Context;
pub use dispatcher::{DynRequestDispatcher, RequestDispatcher};
pub use error::{BoxError, BuildError, Fault};
pub use hook::{DynPostHook, DynPreHook, ErrorHook, PostHook, PreHook};
pub use media::{APPLICATION_XML, MediaRange, Quality};
pub use request::{Request, RequestHeaders};
pub use resolver::{ExtensionMapping, ResponseProcessor, RouteInvoker, RouteResolver};
pub use response::{Body, BodyProducer, BodyStream, Response};
pub use route::{Parameters, Resolution, Route, RouteMatch};

pub use tokio_util::sync::CancellationToken;
