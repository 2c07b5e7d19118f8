//! Connection-facing side of the bridge: request lifecycle and response
//! streaming.
//!
//! [`RackBridge`] is configured once with the rack app and per-process
//! options; [`RequestDriver`] is the per-request object the server's
//! callbacks operate on; [`ConnectionSink`] is the opaque write side of the
//! underlying connection the bridge produces to. Response streaming and the
//! final access log line live in the private streamer module.

mod sink;
pub use sink::ConnectionSink;

mod driver;
pub use driver::BuildError;
pub use driver::RackBridge;
pub use driver::RackBridgeBuilder;
pub use driver::RequestDriver;

mod streamer;
