use std::sync::{Arc, Mutex};

use bytes::Bytes;
use thiserror::Error;
use tokio::task::{self, JoinHandle};
use tracing::error;

use crate::connection::streamer::{ResponseLog, send_response};
use crate::connection::ConnectionSink;
use crate::handler::{HandlerFailure, RackHandler, RackRequest, RuntimeMode, failure_response, recover};
use crate::protocol::{BridgeError, InputFeed, RequestMeta, input_channel};

/// The adapter between an event-driven server and one synchronous rack-style
/// handler.
///
/// One `RackBridge` serves the whole process: the surrounding server calls
/// [`on_headers`](Self::on_headers) for every request it has parsed a head
/// for, then forwards that request's body and close events into the returned
/// [`RequestDriver`].
#[derive(Debug)]
pub struct RackBridge<H> {
    app: Arc<H>,
    rewindable_input: bool,
    mode: RuntimeMode,
}

impl<H> RackBridge<H>
where
    H: RackHandler,
{
    pub fn builder() -> RackBridgeBuilder<H> {
        RackBridgeBuilder::new()
    }

    /// Starts a request once its headers are parsed.
    ///
    /// Builds the body pipe, then spawns the request task: the handler runs
    /// on a worker thread with the blocking input, and as soon as it yields a
    /// response the connection is marked succeeded and the response is
    /// streamed out on a second worker thread. The caller's thread never
    /// blocks.
    ///
    /// Must be called from within a tokio runtime.
    pub fn on_headers<C>(&self, meta: RequestMeta, sink: Arc<C>) -> Result<RequestDriver, BridgeError>
    where
        C: ConnectionSink,
    {
        let (feed, input) = input_channel(self.rewindable_input)?;

        let keep_alive = meta.keep_alive();
        let log = ResponseLog::new(&meta);
        let request = RackRequest::new(meta, input);

        let app = Arc::clone(&self.app);
        let mode = self.mode;
        let failure = Arc::new(Mutex::new(None));
        let failure_slot = Arc::clone(&failure);

        let task = tokio::spawn(async move {
            let outcome = task::spawn_blocking(move || recover(app.as_ref(), request, mode)).await;

            let response = match outcome {
                Ok((response, recovered)) => {
                    if let Some(recovered) = recovered {
                        *failure_slot.lock().unwrap() = Some(recovered);
                    }
                    response
                }
                Err(e) => {
                    error!(cause = %e, "request worker task failed");
                    let recovered = HandlerFailure::new(format!("request worker task failed: {e}"));
                    let response = failure_response(&recovered, mode);
                    *failure_slot.lock().unwrap() = Some(recovered);
                    response
                }
            };

            // the response may exist before the body has fully arrived; tell
            // the server so it flushes instead of waiting for body completion
            sink.mark_succeeded_early();

            let send = task::spawn_blocking(move || send_response(response, sink.as_ref(), keep_alive, &log));
            if let Err(e) = send.await {
                error!(cause = %e, "response worker task failed");
            }
        });

        Ok(RequestDriver { feed, failure, task: Some(task) })
    }
}

#[derive(Debug)]
pub struct RackBridgeBuilder<H> {
    app: Option<Arc<H>>,
    rewindable_input: bool,
    mode: Option<RuntimeMode>,
}

#[derive(Error, Debug)]
pub enum BuildError {
    #[error("rack app must be set")]
    MissingApp,
}

impl<H> RackBridgeBuilder<H>
where
    H: RackHandler,
{
    fn new() -> Self {
        Self { app: None, rewindable_input: true, mode: None }
    }

    /// The handler incoming requests are proxied to. Required.
    pub fn rack_app(mut self, app: H) -> Self {
        self.app = Some(Arc::new(app));
        self
    }

    /// Whether request bodies are cached onto disk so the handler can rewind
    /// them. Defaults to true.
    pub fn rewindable_input(mut self, value: bool) -> Self {
        self.rewindable_input = value;
        self
    }

    /// Overrides the runtime mode; defaults to [`RuntimeMode::from_env`].
    pub fn runtime_mode(mut self, mode: RuntimeMode) -> Self {
        self.mode = Some(mode);
        self
    }

    pub fn build(self) -> Result<RackBridge<H>, BuildError> {
        let app = self.app.ok_or(BuildError::MissingApp)?;
        let mode = self.mode.unwrap_or_else(RuntimeMode::from_env);
        Ok(RackBridge { app, rewindable_input: self.rewindable_input, mode })
    }
}

/// The per-request object server callbacks operate on.
///
/// Forwards body and close events into the suspended request. Events are
/// serialized by construction: everything funnels through one ordered queue
/// with a single consumer.
#[derive(Debug)]
pub struct RequestDriver {
    feed: InputFeed,
    failure: Arc<Mutex<Option<HandlerFailure>>>,
    task: Option<JoinHandle<()>>,
}

impl RequestDriver {
    /// Forwards one body chunk received from the client. Never blocks;
    /// chunks the handler no longer wants are discarded.
    pub fn on_body_chunk(&mut self, chunk: Bytes) {
        self.feed.push(chunk);
    }

    /// Signals that the request body is complete. Pending reads observe
    /// end-of-body.
    pub fn on_body_complete(&mut self) {
        self.feed.finish();
    }

    /// Signals that the client connection closed or aborted. Modeled as a
    /// forced end-of-body: pending reads return instead of hanging. A no-op
    /// after the request already completed.
    pub fn on_connection_closed(&mut self) {
        self.feed.finish();
    }

    /// The last handler failure translated for this request, if any.
    pub fn failure(&self) -> Option<HandlerFailure> {
        self.failure.lock().unwrap().clone()
    }

    /// Waits until the response has been fully streamed and the connection
    /// terminated.
    pub async fn wait(&mut self) {
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                error!(cause = %e, "request task join failed");
            }
        }
    }
}
