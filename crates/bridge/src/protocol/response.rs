//! Produced response types.
//!
//! A handler answers with a [`RackResponse`]: status, headers and a finite,
//! non-restartable sequence of body chunks. The body is pulled item by item
//! while streaming, so a large or slowly-produced response is never buffered
//! whole in memory.

use std::error::Error;
use std::fmt;

use bytes::Bytes;
use http::{HeaderMap, StatusCode, header};

/// Error raised by a response body sequence while it is being iterated.
pub type BodyError = Box<dyn Error + Send + Sync>;

/// A lazily-produced sequence of response body chunks.
///
/// Items may block while being produced (the sequence is only ever pulled on
/// a worker thread). The sequence is finite and cannot be restarted.
pub struct ResponseBody(Box<dyn Iterator<Item = Result<Bytes, BodyError>> + Send>);

impl ResponseBody {
    pub fn empty() -> Self {
        Self(Box::new(std::iter::empty()))
    }

    pub fn once(chunk: impl Into<Bytes>) -> Self {
        Self(Box::new(std::iter::once(Ok(chunk.into()))))
    }

    /// Builds a body from an infallible sequence of chunks.
    pub fn from_chunks<I>(chunks: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Bytes>,
        I::IntoIter: Send + 'static,
    {
        Self(Box::new(chunks.into_iter().map(|chunk| Ok(chunk.into()))))
    }

    /// Builds a body from a sequence that may fail mid-iteration.
    pub fn from_results<I>(results: I) -> Self
    where
        I: IntoIterator<Item = Result<Bytes, BodyError>>,
        I::IntoIter: Send + 'static,
    {
        Self(Box::new(results.into_iter()))
    }
}

impl Iterator for ResponseBody {
    type Item = Result<Bytes, BodyError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next()
    }
}

impl fmt::Debug for ResponseBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ResponseBody")
    }
}

impl From<&'static str> for ResponseBody {
    fn from(value: &'static str) -> Self {
        Self::once(Bytes::from_static(value.as_bytes()))
    }
}

impl From<String> for ResponseBody {
    fn from(value: String) -> Self {
        Self::once(Bytes::from(value))
    }
}

impl From<Bytes> for ResponseBody {
    fn from(value: Bytes) -> Self {
        Self::once(value)
    }
}

impl From<Vec<u8>> for ResponseBody {
    fn from(value: Vec<u8>) -> Self {
        Self::once(Bytes::from(value))
    }
}

/// The response a handler produces: status, headers and body sequence.
///
/// Owned by the handler until it returns, then owned by the streamer.
#[derive(Debug)]
pub struct RackResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: ResponseBody,
}

impl RackResponse {
    pub fn new(status: StatusCode, headers: HeaderMap, body: ResponseBody) -> Self {
        Self { status, headers, body }
    }

    pub fn with_body(status: StatusCode, body: ResponseBody) -> Self {
        Self::new(status, HeaderMap::new(), body)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    /// Declared `Content-Length`, if the handler set one.
    pub fn content_length(&self) -> Option<u64> {
        self.headers
            .get(header::CONTENT_LENGTH)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.parse().ok())
    }

    pub fn into_parts(self) -> (StatusCode, HeaderMap, ResponseBody) {
        (self.status, self.headers, self.body)
    }
}
