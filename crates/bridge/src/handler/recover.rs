use std::error::Error;
use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};

use http::{HeaderMap, HeaderValue, StatusCode, header};
use tracing::error;

use crate::handler::{RackHandler, RackRequest};
use crate::protocol::{RackResponse, ResponseBody};

/// Runtime mode of the surrounding process, selecting how much detail a
/// translated failure response exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RuntimeMode {
    #[default]
    Development,
    Production,
}

impl RuntimeMode {
    /// Reads the mode from the `BRIDGE_ENV` environment variable; anything
    /// other than `production` selects development.
    pub fn from_env() -> Self {
        match std::env::var("BRIDGE_ENV") {
            Ok(value) if value.eq_ignore_ascii_case("production") => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

/// A handler failure captured for diagnostic retrieval.
#[derive(Debug, Clone)]
pub struct HandlerFailure {
    message: String,
}

impl HandlerFailure {
    pub(crate) fn new(message: String) -> Self {
        Self { message }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for HandlerFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

const GENERIC_ERROR_BODY: &str = "An error occurred";

/// Runs the handler, translating any unhandled failure into a 500 response.
///
/// The failure is logged in full detail regardless of the response verbosity
/// and returned alongside the response for later retrieval. The request input
/// is closed by the time this returns, whether the handler finished, errored
/// or panicked, so the replay cache is always released.
pub(crate) fn recover<H>(handler: &H, request: RackRequest, mode: RuntimeMode) -> (RackResponse, Option<HandlerFailure>)
where
    H: RackHandler + ?Sized,
{
    match catch_unwind(AssertUnwindSafe(|| handler.call(request))) {
        Ok(Ok(response)) => (response, None),

        Ok(Err(e)) => {
            let failure = HandlerFailure::new(format!("handler error: {}", render_error(&*e)));
            error!(cause = %failure, "rack handler failed");
            (failure_response(&failure, mode), Some(failure))
        }

        Err(panic) => {
            let failure = HandlerFailure::new(format!("handler panicked: {}", panic_message(panic.as_ref())));
            error!(cause = %failure, "rack handler panicked");
            (failure_response(&failure, mode), Some(failure))
        }
    }
}

/// Builds the translated 500 response: a fixed generic body in production, a
/// rendering of the failure otherwise. `Content-Length` is always the exact
/// byte length of the body.
pub(crate) fn failure_response(failure: &HandlerFailure, mode: RuntimeMode) -> RackResponse {
    let body = if mode.is_production() { GENERIC_ERROR_BODY.to_owned() } else { failure.message().to_owned() };

    let mut headers = HeaderMap::new();
    headers.insert(header::CONTENT_LENGTH, HeaderValue::from(body.len()));

    RackResponse::new(StatusCode::INTERNAL_SERVER_ERROR, headers, ResponseBody::from(body))
}

fn render_error(error: &(dyn Error)) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> &str {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message
    } else {
        "unknown panic payload"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::make_handler;
    use crate::protocol::input_channel;
    use bytes::Bytes;
    use http::Request;

    fn request() -> RackRequest {
        let (mut feed, input) = input_channel(false).unwrap();
        feed.finish();
        RackRequest::new(Request::builder().uri("/").body(()).unwrap().into(), input)
    }

    fn collect_body(response: RackResponse) -> (StatusCode, HeaderMap, Bytes) {
        let (status, headers, body) = response.into_parts();
        let mut collected = Vec::new();
        for item in body {
            collected.extend_from_slice(&item.unwrap());
        }
        (status, headers, Bytes::from(collected))
    }

    #[test]
    fn passes_successful_responses_through() {
        let handler = make_handler(|_req| Ok(RackResponse::with_body(StatusCode::OK, ResponseBody::from("ok"))));

        let (response, failure) = recover(&handler, request(), RuntimeMode::Development);
        assert!(failure.is_none());
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[test]
    fn translates_errors_into_detailed_500s() {
        let handler = make_handler(|_req| Err("division by zero".into()));

        let (response, failure) = recover(&handler, request(), RuntimeMode::Development);
        let failure = failure.unwrap();
        assert!(failure.message().contains("division by zero"));

        let (status, headers, body) = collect_body(response);
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(std::str::from_utf8(&body).unwrap().contains("division by zero"));
        assert_eq!(headers.get(header::CONTENT_LENGTH).unwrap(), &HeaderValue::from(body.len()));
    }

    #[test]
    fn hides_details_in_production() {
        let handler = make_handler(|_req| Err("secret detail".into()));

        let (response, failure) = recover(&handler, request(), RuntimeMode::Production);
        assert!(failure.unwrap().message().contains("secret detail"));

        let (status, headers, body) = collect_body(response);
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(&body[..], GENERIC_ERROR_BODY.as_bytes());
        assert_eq!(headers.get(header::CONTENT_LENGTH).unwrap(), &HeaderValue::from(GENERIC_ERROR_BODY.len()));
    }

    #[test]
    fn catches_panics() {
        let handler = make_handler(|_req| panic!("boom"));

        let (response, failure) = recover(&handler, request(), RuntimeMode::Development);
        assert!(failure.unwrap().message().contains("boom"));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
