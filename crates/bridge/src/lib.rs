//! Bridge an event-driven HTTP server to blocking rack-style handlers.
//!
//! Event-driven servers deliver a request's body as discrete asynchronous
//! chunks and expect the response to be produced incrementally. Plenty of
//! request-handling code wants the opposite: one synchronous call that can
//! read the whole body through a blocking, seek-capable stream and return a
//! status/headers/body triple. This crate is the adapter between the two
//! worlds:
//!
//! - each request runs its handler on a worker thread, suspended at a
//!   channel receive whenever it needs body bytes that have not arrived yet,
//!   so the event loop is never blocked;
//! - the body input implements rich `read`/`rewind`/`close` semantics, with
//!   an optional disk-backed replay cache behind `rewind`;
//! - a response can be produced and flushed before the body has fully
//!   arrived, and is streamed out chunk by chunk without ever being buffered
//!   whole;
//! - handler failures are translated into 500 responses, and transmission
//!   failures into a forced connection close; neither escapes the adapter.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use bytes::Bytes;
//! use http::{HeaderMap, Request, StatusCode};
//! use rack_bridge::connection::{ConnectionSink, RackBridge};
//! use rack_bridge::handler::make_handler;
//! use rack_bridge::protocol::{RackResponse, RequestMeta, ResponseBody, SendError};
//!
//! struct StdoutSink;
//!
//! impl ConnectionSink for StdoutSink {
//!     fn write_headers(&self, status: StatusCode, _headers: &HeaderMap) -> Result<(), SendError> {
//!         println!("status: {status}");
//!         Ok(())
//!     }
//!
//!     fn write_body_chunk(&self, chunk: &[u8]) -> Result<(), SendError> {
//!         println!("chunk: {} bytes", chunk.len());
//!         Ok(())
//!     }
//!
//!     fn mark_succeeded_early(&self) {}
//!
//!     fn terminate(&self, keep_alive: bool) {
//!         println!("terminate, keep_alive: {keep_alive}");
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let bridge = RackBridge::builder()
//!         .rack_app(make_handler(|mut request| {
//!             let body = request.input().read(None)?.unwrap_or_default();
//!             Ok(RackResponse::with_body(StatusCode::OK, ResponseBody::from(body)))
//!         }))
//!         .build()
//!         .unwrap();
//!
//!     // the surrounding server calls these as its events fire
//!     let meta: RequestMeta = Request::builder().method("POST").uri("/echo").body(()).unwrap().into();
//!     let mut driver = bridge.on_headers(meta, Arc::new(StdoutSink)).unwrap();
//!     driver.on_body_chunk(Bytes::from_static(b"hello"));
//!     driver.on_body_complete();
//!     driver.wait().await;
//! }
//! ```
//!
//! # Architecture
//!
//! - [`protocol`]: body frames, request metadata, the blocking input with its
//!   replay cache, produced responses, error types
//! - [`handler`]: the synchronous consumer contract and failure translation
//! - [`connection`]: the per-request driver, response streaming and the
//!   connection sink trait
//!
//! What this crate deliberately does not do: parse HTTP, terminate TLS, pool
//! connections, or run a handler's body consumption in parallel with itself.
//! The wire protocol belongs to the surrounding server; this crate sits
//! strictly between that server's events and the handler's blocking reads.

pub mod connection;
pub mod handler;
pub mod protocol;
