#![allow(dead_code)]

use courier::{
    Context, DefaultDispatcher, ExtensionMap, Request, Resolution,
    testing::{CountingInvoker, RecordingResolver},
};
use std::sync::Arc;

// ============================================================================
// Dispatchers
// ============================================================================

/// A dispatcher whose resolver answers every path with `resolution`.
pub fn dispatcher(
    resolution: Resolution,
    invoker: CountingInvoker,
) -> DefaultDispatcher<RecordingResolver, CountingInvoker> {
    DefaultDispatcher::new(
        RecordingResolver::new().with_fallback(resolution),
        invoker,
        Vec::new(),
    )
}

/// A dispatcher that negotiates `xml` and `json` extensions.
pub fn negotiating(resolver: RecordingResolver) -> DefaultDispatcher<RecordingResolver, CountingInvoker> {
    DefaultDispatcher::new(
        resolver,
        CountingInvoker::new(),
        vec![Arc::new(ExtensionMap::xml()), Arc::new(ExtensionMap::json())],
    )
}

// ============================================================================
// Requests
// ============================================================================

pub fn ctx(path: &str) -> Context {
    Context::new(Request::get(path))
}
