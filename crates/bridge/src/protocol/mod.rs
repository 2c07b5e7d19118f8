//! Core protocol types and abstractions of the bridge.
//!
//! This module holds the vocabulary the rest of the crate is written in:
//!
//! - **Body delivery** ([`message`]): [`BodyFrame`], the unit the event
//!   source pushes: a chunk of bytes or the end-of-body marker.
//!
//! - **Request metadata** ([`metadata`]): [`RequestMeta`], the environment
//!   record built by the surrounding server when it has parsed the request
//!   head, including the keep-alive decision.
//!
//! - **Request input** ([`input`]): the bidirectional pipe between the event
//!   loop and the handler: [`InputFeed`] on the producer side, [`RackInput`]
//!   with its blocking `read`/`rewind`/`close` contract on the consumer side,
//!   plus the disk-backed replay cache behind rewindable inputs.
//!
//! - **Produced responses** ([`response`]): [`RackResponse`] and its lazily
//!   pulled [`ResponseBody`] chunk sequence.
//!
//! - **Errors** ([`error`]): [`BridgeError`] at the top, [`InputError`] for
//!   the read side, [`SendError`] for the transmission side.

mod message;
pub use message::BodyFrame;

mod metadata;
pub use metadata::RequestMeta;
pub use metadata::Scheme;

mod response;
pub use response::BodyError;
pub use response::RackResponse;
pub use response::ResponseBody;

mod error;
pub use error::BridgeError;
pub use error::InputError;
pub use error::SendError;

mod input;
pub use input::InputFeed;
pub use input::RackInput;
pub use input::input_channel;
