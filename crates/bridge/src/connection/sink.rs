use http::{HeaderMap, StatusCode};

use crate::protocol::SendError;

/// The write side of the underlying connection, as the bridge sees it.
///
/// Implementations enqueue data onto the connection's outbound buffer and
/// return quickly; they must be callable from worker threads. Everything the
/// bridge knows about the connection's lifecycle goes through this trait;
/// the connection is otherwise opaque.
pub trait ConnectionSink: Send + Sync + 'static {
    /// Writes the status line and headers. Called at most once per request.
    fn write_headers(&self, status: StatusCode, headers: &HeaderMap) -> Result<(), SendError>;

    /// Writes raw body bytes to the wire.
    fn write_body_chunk(&self, chunk: &[u8]) -> Result<(), SendError>;

    /// Marks the request as logically succeeded before its body has fully
    /// arrived, so the surrounding server flushes the response instead of
    /// waiting for body completion.
    fn mark_succeeded_early(&self);

    /// Ends the request, keeping the TCP connection open when `keep_alive`
    /// is set.
    fn terminate(&self, keep_alive: bool);
}
