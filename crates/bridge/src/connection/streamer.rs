use std::time::Instant;

use http::{Method, StatusCode};
use tracing::{error, info};

use crate::connection::ConnectionSink;
use crate::protocol::{RackResponse, RequestMeta, SendError};

/// Line written to the wire when streaming a response fails mid-way. The
/// connection is closed right after, which well-behaved clients treat as a
/// failed request.
const TRANSMISSION_FAILED_LINE: &[u8] = b"HTTP/1.1 500 Internal Server Error\r\n\r\n";

/// Request facts captured up front for the final access log line.
#[derive(Debug)]
pub(crate) struct ResponseLog {
    method: Method,
    path: String,
    query: Option<String>,
    start: Instant,
}

impl ResponseLog {
    pub(crate) fn new(meta: &RequestMeta) -> Self {
        Self {
            method: meta.method().clone(),
            path: meta.path().to_owned(),
            query: meta.query().map(str::to_owned),
            start: Instant::now(),
        }
    }
}

/// Streams a produced response to the connection.
///
/// Runs on a worker thread: the body sequence may block between items. Each
/// chunk is forwarded as soon as it is produced, so the body is never
/// buffered whole. Any failure while pulling or writing forces the
/// connection closed after a minimal fixed error line, since a partially
/// sent response is not recoverable. The final response is logged exactly
/// once either way.
pub(crate) fn send_response<C>(response: RackResponse, sink: &C, keep_alive: bool, log: &ResponseLog)
where
    C: ConnectionSink + ?Sized,
{
    let declared_length = response.content_length();
    let (status, headers, body) = response.into_parts();

    let mut sent: u64 = 0;
    let mut failure: Option<SendError> = None;

    match sink.write_headers(status, &headers) {
        Err(e) => failure = Some(e),
        Ok(()) => {
            for item in body {
                match item {
                    Ok(chunk) => {
                        if let Err(e) = sink.write_body_chunk(&chunk) {
                            failure = Some(e);
                            break;
                        }
                        sent += chunk.len() as u64;
                    }
                    Err(e) => {
                        failure = Some(SendError::body(e));
                        break;
                    }
                }
            }
        }
    }

    match failure {
        None => sink.terminate(keep_alive),
        Some(ref e) => {
            error!(cause = %e, "failed to stream response, closing connection");
            let _ = sink.write_body_chunk(TRANSMISSION_FAILED_LINE);
            sink.terminate(false);
        }
    }

    log_response(log, status, declared_length.unwrap_or(sent), failure.is_none());
}

fn log_response(log: &ResponseLog, status: StatusCode, length: u64, sent: bool) {
    info!(
        method = %log.method,
        path = %log.path,
        query = log.query.as_deref().unwrap_or(""),
        status = status.as_u16(),
        length,
        elapsed_ms = log.start.elapsed().as_millis() as u64,
        sent,
        "request finished"
    );
}
