//! The inbound request as seen by the dispatcher.

use crate::media::MediaRange;
use http::{HeaderMap, HeaderValue, Method, header::AsHeaderName};

/// Request headers with the `Accept` header pre-parsed into media ranges.
#[derive(Debug, Clone, Default)]
pub struct RequestHeaders {
    accept: Vec<MediaRange>,
    others: HeaderMap,
}

impl RequestHeaders {
    /// Build from raw headers.
    ///
    /// Every `Accept` value is parsed, in order, into [`MediaRange`]s; the
    /// remaining headers are kept as they are.
    pub fn from_header_map(mut map: HeaderMap) -> Self {
        let accept = map
            .get_all(http::header::ACCEPT)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(MediaRange::parse_accept)
            .collect();
        map.remove(http::header::ACCEPT);

        Self {
            accept,
            others: map,
        }
    }

    /// The accepted media ranges, in header order.
    pub fn accept(&self) -> &[MediaRange] {
        &self.accept
    }

    /// Replace the accepted media ranges.
    pub fn set_accept(&mut self, accept: Vec<MediaRange>) {
        self.accept = accept;
    }

    /// Look up any header other than `Accept`.
    pub fn get<K: AsHeaderName>(&self, name: K) -> Option<&HeaderValue> {
        self.others.get(name)
    }

    /// All headers other than `Accept`.
    pub fn map(&self) -> &HeaderMap {
        &self.others
    }
}

/// An inbound request.
#[derive(Debug, Clone)]
pub struct Request {
    method: Method,
    path: String,
    headers: RequestHeaders,
}

impl Request {
    /// Create a request without headers.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: RequestHeaders::default(),
        }
    }

    /// Shorthand for a `GET` request.
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    /// Attach raw headers (the `Accept` header is parsed).
    #[must_use]
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = RequestHeaders::from_header_map(headers);
        self
    }

    /// Attach already parsed media ranges.
    #[must_use]
    pub fn with_accept(mut self, accept: impl IntoIterator<Item = MediaRange>) -> Self {
        self.headers.set_accept(accept.into_iter().collect());
        self
    }

    /// The request method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// The request path, without query string.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Rewrite the request path.
    pub fn set_path(&mut self, path: impl Into<String>) {
        self.path = path.into();
    }

    /// The parsed request headers.
    pub fn headers(&self) -> &RequestHeaders {
        &self.headers
    }

    /// Mutable access to the request headers.
    pub fn headers_mut(&mut self) -> &mut RequestHeaders {
        &mut self.headers
    }
}
