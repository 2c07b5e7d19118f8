use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("input error: {source}")]
    Input {
        #[from]
        source: InputError,
    },

    #[error("send error: {source}")]
    Send {
        #[from]
        source: SendError,
    },
}

/// Errors surfaced to the handler through the request input.
///
/// `SeekUnsupported` mirrors the behaviour of seeking on pipes and sockets:
/// it is an ordinary error return, not fatal to the request.
#[derive(Error, Debug)]
pub enum InputError {
    #[error("seek not supported on a non-rewindable input")]
    SeekUnsupported,

    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl InputError {
    pub fn io<E: Into<io::Error>>(e: E) -> Self {
        Self::Io { source: e.into() }
    }
}

/// Errors raised while streaming a produced response to the connection.
///
/// These never escape the streamer: any of them forces the connection closed
/// after a minimal fixed error line.
#[derive(Error, Debug)]
pub enum SendError {
    #[error("response body error: {reason}")]
    Body { reason: String },

    #[error("connection closed")]
    ConnectionClosed,

    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl SendError {
    pub fn body<S: ToString>(reason: S) -> Self {
        Self::Body { reason: reason.to_string() }
    }

    pub fn io<E: Into<io::Error>>(e: E) -> Self {
        Self::Io { source: e.into() }
    }
}
