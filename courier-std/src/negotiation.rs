//! # Content Negotiation by Extension
//!
//! A request for `/report.xml` is first resolved as a request for
//! `/report` that accepts exactly the media types registered for `xml`.
//! If that finds no route, the request is resolved again exactly as it
//! arrived.
//!
//! ```text
//! /report.xml, Accept: (none)
//!   pass 1: /report,     Accept: application/xml;q=max   -> route? done
//!   pass 2: /report.xml, Accept: (none)                  -> always returned
//! ```
//!
//! The first pass replaces the accept list rather than merging into it.
//! The second pass restores the original path and accept list wholesale.

use courier_core::{Context, MediaRange, Quality, Resolution, ResponseProcessor, RouteResolver};
use std::sync::Arc;

#[cfg(feature = "tracing")]
use tracing::debug;

/// The extension of the last path segment, without the dot.
///
/// Returns `None` when the last segment has no dot or ends with one.
///
/// ```rust,ignore
/// assert_eq!(path_extension("/report.xml"), Some("xml"));
/// assert_eq!(path_extension("/v1.2/report"), None);
/// ```
pub fn path_extension(path: &str) -> Option<&str> {
    let segment = path.rsplit('/').next().unwrap_or(path);
    let (_, extension) = segment.rsplit_once('.')?;
    (!extension.is_empty()).then_some(extension)
}

/// Remove a trailing `.extension` from `path`.
fn strip_extension(path: &str, extension: &str) -> String {
    path.strip_suffix(extension)
        .and_then(|rest| rest.strip_suffix('.'))
        .unwrap_or(path)
        .to_owned()
}

/// Two-pass route resolution driven by the request path's file extension.
#[derive(Clone)]
pub struct ExtensionNegotiator {
    processors: Arc<[Arc<dyn ResponseProcessor>]>,
    enabled: bool,
}

impl ExtensionNegotiator {
    /// Create a negotiator consulting the given processors.
    pub fn new(processors: Vec<Arc<dyn ResponseProcessor>>) -> Self {
        Self {
            processors: processors.into(),
            enabled: true,
        }
    }

    /// Turn extension handling on or off.
    ///
    /// When off, [`resolve`](Self::resolve) makes a single resolver call
    /// with the request as it arrived.
    #[must_use]
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Whether extension handling is on.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// The number of processors consulted.
    pub fn processor_count(&self) -> usize {
        self.processors.len()
    }

    /// Media ranges registered for `extension` by any processor.
    ///
    /// Matching ignores ASCII case. Duplicates are dropped, keeping the
    /// first occurrence, and every range carries [`Quality::MAX`].
    pub fn media_ranges_for(&self, extension: &str) -> Vec<MediaRange> {
        let mut ranges = Vec::new();
        for mapping in self
            .processors
            .iter()
            .flat_map(|processor| processor.extension_mappings())
            .filter(|mapping| mapping.applies_to(extension))
        {
            let range = MediaRange::new(mapping.media_type().clone(), Quality::MAX);
            if !ranges.contains(&range) {
                ranges.push(range);
            }
        }
        ranges
    }

    /// Resolve the request held by `ctx` through `resolver`.
    ///
    /// The request path and accept list are rewritten before each resolver
    /// call, and are left as they were for the pass whose result is
    /// returned.
    pub fn resolve<R>(&self, ctx: &mut Context, resolver: &R) -> Resolution
    where
        R: RouteResolver + ?Sized,
    {
        let original_path = ctx.request().path().to_owned();
        let original_accept = ctx.request().headers().accept().to_vec();

        if self.enabled {
            if let Some(extension) = path_extension(&original_path) {
                let mapped = self.media_ranges_for(extension);

                if !mapped.is_empty() {
                    let added = mapped
                        .iter()
                        .filter(|range| !original_accept.contains(range))
                        .count();
                    let stripped = strip_extension(&original_path, extension);

                    #[cfg(feature = "tracing")]
                    debug!(
                        extension,
                        path = %stripped,
                        mapped = mapped.len(),
                        added,
                        "resolving with extension media ranges"
                    );
                    #[cfg(not(feature = "tracing"))]
                    let _ = added;

                    let resolution = resolve_with(ctx, resolver, stripped, mapped);
                    if !resolution.route.is_not_found() {
                        return resolution;
                    }
                }
            }
        }

        #[cfg(feature = "tracing")]
        debug!(path = %original_path, "resolving with original request");

        resolve_with(ctx, resolver, original_path, original_accept)
    }
}

impl Default for ExtensionNegotiator {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

fn resolve_with<R>(
    ctx: &mut Context,
    resolver: &R,
    path: String,
    accept: Vec<MediaRange>,
) -> Resolution
where
    R: RouteResolver + ?Sized,
{
    let request = ctx.request_mut();
    request.set_path(path);
    request.headers_mut().set_accept(accept);
    resolver.resolve(ctx)
}
