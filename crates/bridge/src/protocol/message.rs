use bytes::Bytes;

/// One unit of request body delivered by the surrounding server.
///
/// The event source hands body bytes over as discrete chunks in wire order,
/// terminated by a single `Eof` marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BodyFrame {
    /// A chunk of request body bytes
    Chunk(Bytes),
    /// Marks the end of the request body
    Eof,
}

impl BodyFrame {
    /// Returns true if this frame marks the end of the body
    #[inline]
    pub fn is_eof(&self) -> bool {
        matches!(self, BodyFrame::Eof)
    }

    /// Returns true if this frame carries chunk data
    #[inline]
    pub fn is_chunk(&self) -> bool {
        matches!(self, BodyFrame::Chunk(_))
    }

    /// Consumes the frame and returns the contained bytes if this is a chunk
    pub fn into_bytes(self) -> Option<Bytes> {
        match self {
            BodyFrame::Chunk(bytes) => Some(bytes),
            BodyFrame::Eof => None,
        }
    }
}

impl From<Bytes> for BodyFrame {
    fn from(bytes: Bytes) -> Self {
        Self::Chunk(bytes)
    }
}
