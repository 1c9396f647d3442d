//! The response value produced by hooks and route actions.

use crate::error::BoxError;
use bytes::{Bytes, BytesMut};
use futures::{
    StreamExt, TryStreamExt,
    stream::{self, BoxStream},
};
use http::{HeaderMap, HeaderName, HeaderValue, StatusCode, header::CONTENT_TYPE};
use std::{fmt, sync::Arc};

/// A stream of body chunks.
pub type BodyStream = BoxStream<'static, Result<Bytes, BoxError>>;

/// A reusable factory of body streams.
///
/// Each call to [`produce`](Self::produce) yields a fresh stream, so a
/// response carrying a producer can be cloned and written more than once.
#[derive(Clone)]
pub struct BodyProducer(Arc<dyn Fn() -> BodyStream + Send + Sync>);

impl BodyProducer {
    /// Create a producer from a stream factory.
    pub fn new<F>(factory: F) -> Self
    where
        F: Fn() -> BodyStream + Send + Sync + 'static,
    {
        Self(Arc::new(factory))
    }

    /// Start a new body stream.
    pub fn produce(&self) -> BodyStream {
        (self.0)()
    }
}

impl fmt::Debug for BodyProducer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BodyProducer(..)")
    }
}

/// The body of a [`Response`].
#[derive(Debug, Clone, Default)]
pub enum Body {
    /// No content.
    #[default]
    Empty,
    /// Content fully held in memory.
    Full(Bytes),
    /// Content generated on demand.
    Producer(BodyProducer),
}

impl Body {
    /// The in-memory content, if this body holds any.
    pub fn as_bytes(&self) -> Option<&Bytes> {
        match self {
            Body::Full(bytes) => Some(bytes),
            _ => None,
        }
    }

    /// Turn the body into a stream of chunks.
    pub fn into_stream(self) -> BodyStream {
        match self {
            Body::Empty => stream::empty().boxed(),
            Body::Full(bytes) => stream::once(async move { Ok(bytes) }).boxed(),
            Body::Producer(producer) => producer.produce(),
        }
    }

    /// Drain the body into a single buffer.
    pub async fn collect(self) -> Result<Bytes, BoxError> {
        let buffer = self
            .into_stream()
            .try_fold(BytesMut::new(), |mut buffer, chunk| async move {
                buffer.extend_from_slice(&chunk);
                Ok(buffer)
            })
            .await?;
        Ok(buffer.freeze())
    }
}

impl From<Bytes> for Body {
    fn from(bytes: Bytes) -> Self {
        Body::Full(bytes)
    }
}

impl From<String> for Body {
    fn from(text: String) -> Self {
        Body::Full(Bytes::from(text))
    }
}

impl From<&'static str> for Body {
    fn from(text: &'static str) -> Self {
        Body::Full(Bytes::from_static(text.as_bytes()))
    }
}

impl From<Vec<u8>> for Body {
    fn from(bytes: Vec<u8>) -> Self {
        Body::Full(Bytes::from(bytes))
    }
}

impl From<BodyProducer> for Body {
    fn from(producer: BodyProducer) -> Self {
        Body::Producer(producer)
    }
}

/// A response: status, headers and a body.
///
/// Cloning is cheap; bodies share their bytes or producer.
#[derive(Debug, Clone, Default)]
pub struct Response {
    status: StatusCode,
    headers: HeaderMap,
    body: Body,
}

impl Response {
    /// An empty response with the given status.
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            ..Self::default()
        }
    }

    /// A `200 OK` plain-text response.
    pub fn text(body: impl Into<String>) -> Self {
        Self::new(StatusCode::OK)
            .with_header(
                CONTENT_TYPE,
                HeaderValue::from_static("text/plain; charset=utf-8"),
            )
            .with_body(body.into())
    }

    /// An empty `404 Not Found` response.
    pub fn not_found() -> Self {
        Self::new(StatusCode::NOT_FOUND)
    }

    #[must_use]
    /// Replace the status.
    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    #[must_use]
    /// Set a header, replacing any previous value.
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    #[must_use]
    /// Replace the body.
    pub fn with_body(mut self, body: impl Into<Body>) -> Self {
        self.body = body.into();
        self
    }

    /// The response status.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Change the response status.
    pub fn set_status(&mut self, status: StatusCode) {
        self.status = status;
    }

    /// The response headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Mutable access to the response headers.
    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    /// The response body.
    pub fn body(&self) -> &Body {
        &self.body
    }

    /// Consume the response, returning its body.
    pub fn into_body(self) -> Body {
        self.body
    }
}

impl From<StatusCode> for Response {
    fn from(status: StatusCode) -> Self {
        Response::new(status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_response() {
        let response = Response::text("hello");
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(CONTENT_TYPE).unwrap(),
            "text/plain; charset=utf-8"
        );
        assert_eq!(response.body().as_bytes().unwrap(), "hello");
    }

    #[test]
    fn test_default_response_is_empty_ok() {
        let response = Response::default();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(matches!(response.body(), Body::Empty));
    }

    #[tokio::test]
    async fn test_producer_body_can_be_collected_twice() {
        let producer = BodyProducer::new(|| {
            stream::iter(vec![Ok(Bytes::from_static(b"ab")), Ok(Bytes::from_static(b"cd"))])
                .boxed()
        });
        let response = Response::new(StatusCode::OK).with_body(producer);
        let copy = response.clone();

        assert_eq!(response.into_body().collect().await.unwrap(), "abcd");
        assert_eq!(copy.into_body().collect().await.unwrap(), "abcd");
    }

    #[tokio::test]
    async fn test_empty_body_collects_to_nothing() {
        assert!(Body::Empty.collect().await.unwrap().is_empty());
    }
}
