//! # Request Context
//!
//! The per-request record threaded through every stage of a dispatch.
//!
//! A context owns the inbound [`Request`], the single response slot and the
//! parameters captured by the route that was invoked. Exactly one dispatch
//! works on a context at a time; stages borrow it mutably one after another,
//! so the slot never needs a lock.

use crate::{request::Request, response::Response, route::Parameters};
use http::Extensions;

/// Mutable per-request state.
#[derive(Debug)]
pub struct Context {
    request: Request,
    response: Option<Response>,
    parameters: Parameters,
    extensions: Extensions,
}

impl Context {
    /// Create a context for a request, with an empty response slot.
    pub fn new(request: Request) -> Self {
        Self {
            request,
            response: None,
            parameters: Parameters::new(),
            extensions: Extensions::new(),
        }
    }

    /// The inbound request.
    pub fn request(&self) -> &Request {
        &self.request
    }

    /// Mutable access to the inbound request.
    pub fn request_mut(&mut self) -> &mut Request {
        &mut self.request
    }

    /// The response currently held in the slot, if any.
    pub fn response(&self) -> Option<&Response> {
        self.response.as_ref()
    }

    /// Mutable access to the response currently held in the slot.
    pub fn response_mut(&mut self) -> Option<&mut Response> {
        self.response.as_mut()
    }

    /// Overwrite the response slot. Passing `None` empties it.
    pub fn set_response(&mut self, response: impl Into<Option<Response>>) {
        self.response = response.into();
    }

    /// Empty the response slot, returning what it held.
    pub fn take_response(&mut self) -> Option<Response> {
        self.response.take()
    }

    /// Parameters captured by the invoked route.
    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    /// Replace the captured parameters.
    pub fn set_parameters(&mut self, parameters: Parameters) {
        self.parameters = parameters;
    }

    /// Typed storage for hooks to share per-request state.
    pub fn extensions(&self) -> &Extensions {
        &self.extensions
    }

    /// Mutable access to the typed extensions.
    pub fn extensions_mut(&mut self) -> &mut Extensions {
        &mut self.extensions
    }
}

impl From<Request> for Context {
    fn from(request: Request) -> Self {
        Context::new(request)
    }
}
