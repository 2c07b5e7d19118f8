//! Request body input implementation.
//!
//! This module is the bidirectional pipe between the event-driven side of the
//! bridge and the blocking consumer side:
//!
//! - [`InputFeed`]: the producer half, driven from the event loop. Pushing a
//!   chunk never blocks.
//! - [`RackInput`]: the consumer half, handed to the handler as its body
//!   source. A read that needs bytes which have not arrived yet parks the
//!   worker thread on the channel receive until the next chunk (or EOF) is
//!   pushed; that receive is the single suspension point of a request.
//!
//! When the input is rewindable, every consumed byte is also appended to an
//! anonymous disk-backed [`ReplayCache`], so the body can be re-read from the
//! start after a `rewind`. The cache file is owned exclusively by its input
//! and is deleted when the read side closes, including on failure paths.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom, Write};

use bytes::Bytes;
use tokio::sync::mpsc;

use crate::protocol::{BodyFrame, InputError};

/// Creates the input pipe for one request.
///
/// Returns the event-loop half and the handler half. With `rewindable` set,
/// the handler half carries a disk-backed replay cache; otherwise `rewind`
/// fails with [`InputError::SeekUnsupported`].
pub fn input_channel(rewindable: bool) -> Result<(InputFeed, RackInput), InputError> {
    let (sender, receiver) = mpsc::unbounded_channel();

    let cache = if rewindable { Some(ReplayCache::new()?) } else { None };

    let feed = InputFeed { sender, finished: false };
    let input = RackInput { receiver, pending: None, cache, eof: false, closed: false };

    Ok((feed, input))
}

/// Producer half of the request body pipe.
///
/// Owned by the request driver and fed from server callbacks. All operations
/// are non-blocking.
#[derive(Debug)]
pub struct InputFeed {
    sender: mpsc::UnboundedSender<BodyFrame>,
    finished: bool,
}

impl InputFeed {
    /// Enqueues one body chunk.
    ///
    /// Chunks pushed after the read side is gone (the handler already
    /// finished) are silently discarded.
    pub fn push(&self, chunk: Bytes) {
        if self.finished {
            return;
        }
        let _ = self.sender.send(BodyFrame::Chunk(chunk));
    }

    /// Marks the end of the body. Idempotent; later pushes are dropped.
    pub fn finish(&mut self) {
        if self.finished {
            return;
        }
        self.finished = true;
        let _ = self.sender.send(BodyFrame::Eof);
    }
}

/// Consumer half of the request body pipe, with `read`/`rewind`/`close`
/// semantics for the handler.
///
/// Reads block the calling thread, so this type must only be used from a
/// worker thread, never from the event loop.
#[derive(Debug)]
pub struct RackInput {
    receiver: mpsc::UnboundedReceiver<BodyFrame>,
    pending: Option<Bytes>,
    cache: Option<ReplayCache>,
    eof: bool,
    closed: bool,
}

impl RackInput {
    /// Reads body bytes, blocking until they have arrived.
    ///
    /// With `length` given, reads at most that many bytes; without, reads the
    /// whole remaining body. A bounded read on an exhausted source returns
    /// `Ok(None)`, the end-of-body sentinel, while an unbounded read returns
    /// empty bytes instead.
    pub fn read(&mut self, length: Option<usize>) -> Result<Option<Bytes>, InputError> {
        let mut out = Vec::new();
        Ok(self.read_into(length, &mut out)?.map(|_| Bytes::from(out)))
    }

    /// Destination-buffer variant of [`read`](Self::read).
    ///
    /// `out` is cleared first and the read accumulates into it; the return
    /// value follows the same end-of-body sentinel rule, reporting the number
    /// of bytes read.
    pub fn read_into(&mut self, length: Option<usize>, out: &mut Vec<u8>) -> Result<Option<usize>, InputError> {
        out.clear();

        // a prior rewind leaves unread bytes in the cache, serve those first
        if let Some(cache) = self.cache.as_mut() {
            if cache.has_unread() {
                cache.read_unread(length, out)?;
            }
        }

        loop {
            if let Some(length) = length {
                if out.len() == length {
                    break;
                }
            }

            let mut chunk = match self.pending.take() {
                Some(chunk) => chunk,
                None => match self.pull_chunk() {
                    Some(chunk) => chunk,
                    None => break,
                },
            };

            let consumed = match length.map(|length| length - out.len()) {
                Some(needed) if needed < chunk.len() => {
                    let prefix = chunk.split_to(needed);
                    self.pending = Some(chunk);
                    prefix
                }
                _ => chunk,
            };

            out.extend_from_slice(&consumed);
            if let Some(cache) = self.cache.as_mut() {
                cache.append(&consumed)?;
            }
        }

        if length.is_some() && out.is_empty() { Ok(None) } else { Ok(Some(out.len())) }
    }

    /// Repositions the read cursor to the start of the body.
    ///
    /// Fails with [`InputError::SeekUnsupported`] when the input was created
    /// without a replay cache.
    pub fn rewind(&mut self) -> Result<(), InputError> {
        match self.cache.as_mut() {
            Some(cache) => {
                cache.rewind();
                Ok(())
            }
            None => Err(InputError::SeekUnsupported),
        }
    }

    /// Closes the read side and deletes the replay cache. Idempotent.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        self.receiver.close();
        self.cache.take();
    }

    fn pull_chunk(&mut self) -> Option<Bytes> {
        if self.eof {
            return None;
        }
        match self.receiver.blocking_recv() {
            Some(BodyFrame::Chunk(bytes)) => Some(bytes),
            Some(BodyFrame::Eof) | None => {
                self.eof = true;
                None
            }
        }
    }
}

impl Drop for RackInput {
    fn drop(&mut self) {
        self.close();
    }
}

/// Append-only disk store of every body byte consumed so far, plus a read
/// cursor for replays.
///
/// Backed by an anonymous tempfile, so the store disappears as soon as it is
/// dropped.
#[derive(Debug)]
struct ReplayCache {
    file: File,
    read_pos: u64,
    len: u64,
}

impl ReplayCache {
    fn new() -> Result<Self, InputError> {
        Ok(Self { file: tempfile::tempfile()?, read_pos: 0, len: 0 })
    }

    fn has_unread(&self) -> bool {
        self.read_pos < self.len
    }

    fn append(&mut self, bytes: &[u8]) -> Result<(), InputError> {
        self.file.seek(SeekFrom::Start(self.len))?;
        self.file.write_all(bytes)?;
        self.len += bytes.len() as u64;
        // appends only happen for bytes already delivered to the reader, so
        // the read cursor moves past them
        self.read_pos = self.len;
        Ok(())
    }

    fn read_unread(&mut self, length: Option<usize>, out: &mut Vec<u8>) -> Result<(), InputError> {
        let available = usize::try_from(self.len - self.read_pos).unwrap_or(usize::MAX);
        let wanted = match length {
            Some(length) => length.min(available),
            None => available,
        };
        if wanted == 0 {
            return Ok(());
        }

        self.file.seek(SeekFrom::Start(self.read_pos))?;
        let mut buf = vec![0u8; wanted];
        self.file.read_exact(&mut buf)?;
        self.read_pos += wanted as u64;
        out.extend_from_slice(&buf);
        Ok(())
    }

    fn rewind(&mut self) {
        self.read_pos = 0;
    }
}
