//! # courier - Fault-Tolerant Request Dispatch
//!
//! `courier` takes one request context and turns it into one response:
//! resolve a route (trying the path's file extension as a content type
//! first), run the pre hook, invoke the route unless the pre hook already
//! answered, run the post hook, and give the error hook a chance to turn
//! any fault into a response.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use courier::prelude::*;
//!
//! let mut table = RouteTable::new();
//! table.add(Route::new(Method::GET, "/users/{id}", |params, _cancel| async move {
//!     Ok(Response::text(format!("user {}", params.get("id").unwrap_or("?"))))
//! }))?;
//!
//! let dispatcher = DefaultDispatcher::builder()
//!     .resolver(table)
//!     .invoker(DefaultInvoker)
//!     .processor(ExtensionMap::json())
//!     .build()?;
//!
//! let mut ctx = Context::new(Request::get("/users/7.json"));
//! let response = dispatcher.dispatch(&mut ctx, &CancellationToken::new()).await?;
//! ```
//!
//! ## Features
//!
//! | Feature | Default | Enables |
//! |---------|---------|---------|
//! | `tracing` | yes | `tracing` spans and events |
//! | `matchit` | yes | [`RouteTable`] |
//! | `timeout` | yes | [`hooks::TimeoutHook`] |

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

pub use courier_core::{
    // Media types
    APPLICATION_XML,
    // Errors
    BoxError,
    BuildError,
    // Data model
    Body,
    BodyProducer,
    BodyStream,
    CancellationToken,
    Context,
    // Dispatch
    DynRequestDispatcher,
    // Hooks
    DynPostHook,
    DynPreHook,
    ErrorHook,
    // Collaborators
    ExtensionMapping,
    Fault,
    MediaRange,
    Parameters,
    PostHook,
    PreHook,
    Quality,
    Request,
    RequestDispatcher,
    RequestHeaders,
    // Routes
    Resolution,
    Response,
    ResponseProcessor,
    Route,
    RouteInvoker,
    RouteMatch,
    RouteResolver,
};

pub use courier_std::{
    AfterPipeline, BeforePipeline, DefaultDispatcher, DefaultInvoker, DispatcherBuilder,
    ErrorPipeline, ExtensionMap, ExtensionNegotiator, Outcome, Stage,
};

#[cfg(feature = "matchit")]
pub use courier_std::{RouteTable, RouteTableError};

/// Individual pipeline stages, for driving a dispatch by hand.
pub mod stages {
    pub use courier_std::dispatch::{decide, recover, run_invoke, run_post_hook, run_pre_hook};
}

/// Content negotiation helpers.
pub mod negotiation {
    pub use courier_std::negotiation::{ExtensionNegotiator, path_extension};
}

/// Standard hook implementations.
pub mod hooks {
    #![allow(clippy::wildcard_imports)]
    pub use courier_std::hooks::*;
}

/// Testing utilities.
pub mod testing {
    #![allow(clippy::wildcard_imports)]
    pub use courier_std::testing::*;
}

/// Prelude module - common imports for Courier.
///
/// # Usage
///
/// ```rust,ignore
/// use courier::prelude::*;
/// ```
pub mod prelude {
    #[cfg(feature = "matchit")]
    pub use crate::RouteTable;
    pub use crate::{
        CancellationToken, Context, DefaultDispatcher, DefaultInvoker, ErrorHook, ExtensionMap,
        Fault, PostHook, PreHook, Request, RequestDispatcher, Resolution, Response, Route,
        RouteInvoker, RouteResolver,
    };
}
