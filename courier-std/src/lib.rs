//! # courier-std
//!
//! Standard implementations for the Courier request dispatch framework.
//!
//! This crate provides:
//! - **Dispatch**: [`DefaultDispatcher`], the staged request pipeline, and its [`DispatcherBuilder`]
//! - **Negotiation**: [`ExtensionNegotiator`], two-pass resolution by path extension
//! - **Routing**: [`RouteTable`] (feature `matchit`) and [`DefaultInvoker`]
//! - **Pipelines**: [`BeforePipeline`], [`AfterPipeline`], [`ErrorPipeline`]
//! - **Standard hooks**: Logging, Timeout
//! - **Response processors**: [`ExtensionMap`]
//! - **Testing**: doubles for every collaborator in [`testing`]

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

// Re-export core traits
pub use courier_core;

// Modules
pub mod dispatch;
pub mod hooks;
pub mod invoker;
pub mod negotiation;
pub mod pipeline;
pub mod processors;
#[cfg(feature = "matchit")]
pub mod routing;
pub mod testing;

pub use dispatch::{DefaultDispatcher, DispatcherBuilder, Outcome, Stage};
pub use invoker::DefaultInvoker;
pub use negotiation::ExtensionNegotiator;
pub use pipeline::{AfterPipeline, BeforePipeline, ErrorPipeline};
pub use processors::ExtensionMap;
#[cfg(feature = "matchit")]
pub use routing::{RouteTable, RouteTableError};
