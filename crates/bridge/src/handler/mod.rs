//! The consumer contract: synchronous request handlers.
//!
//! A [`RackHandler`] is invoked exactly once per request, on a worker thread,
//! with a [`RackRequest`] carrying the parsed metadata and a blocking body
//! input. It returns the status/headers/body triple as a
//! [`RackResponse`](crate::protocol::RackResponse), or fails; failures are
//! translated into a 500 response by [`recover`], never propagated.

use std::error::Error;

use crate::protocol::{RackInput, RackResponse, RequestMeta};

mod recover;
pub use recover::HandlerFailure;
pub use recover::RuntimeMode;
pub(crate) use recover::{failure_response, recover};

/// Any unhandled error raised by a handler.
pub type HandlerError = Box<dyn Error + Send + Sync>;

/// One inbound request as the handler sees it: metadata plus body input.
#[derive(Debug)]
pub struct RackRequest {
    meta: RequestMeta,
    input: RackInput,
}

impl RackRequest {
    pub fn new(meta: RequestMeta, input: RackInput) -> Self {
        Self { meta, input }
    }

    pub fn meta(&self) -> &RequestMeta {
        &self.meta
    }

    /// The request body source, with blocking `read`/`rewind`/`close`
    /// semantics.
    pub fn input(&mut self) -> &mut RackInput {
        &mut self.input
    }

    pub fn into_parts(self) -> (RequestMeta, RackInput) {
        (self.meta, self.input)
    }
}

/// A synchronous request handler.
///
/// `call` runs on a worker thread and may block (on the body input, on
/// downstream I/O, on CPU-bound work) without stalling the event loop.
pub trait RackHandler: Send + Sync + 'static {
    fn call(&self, request: RackRequest) -> Result<RackResponse, HandlerError>;
}

#[derive(Debug)]
pub struct HandlerFn<F> {
    f: F,
}

impl<F> RackHandler for HandlerFn<F>
where
    F: Fn(RackRequest) -> Result<RackResponse, HandlerError> + Send + Sync + 'static,
{
    fn call(&self, request: RackRequest) -> Result<RackResponse, HandlerError> {
        (self.f)(request)
    }
}

/// Wraps a plain function or closure as a [`RackHandler`].
pub fn make_handler<F>(f: F) -> HandlerFn<F>
where
    F: Fn(RackRequest) -> Result<RackResponse, HandlerError> + Send + Sync + 'static,
{
    HandlerFn { f }
}
