use bytes::Bytes;
use http::{HeaderMap, StatusCode};

/// A piece of body data travelling between transport and application.
///
/// Used in both directions: the transport hands request body chunks to the application,
/// and the application hands response body chunks back. `more_body == false` marks the
/// last chunk of a body; it may carry data or be empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BodyChunk {
    pub body: Bytes,
    pub more_body: bool,
}

impl BodyChunk {
    /// A chunk that is followed by more data
    #[inline]
    pub fn more(body: Bytes) -> Self {
        Self { body, more_body: true }
    }

    /// The final chunk of a body
    #[inline]
    pub fn last(body: Bytes) -> Self {
        Self { body, more_body: false }
    }

    /// An empty final chunk, used to terminate a streamed body
    #[inline]
    pub fn end() -> Self {
        Self::last(Bytes::new())
    }

    /// Returns true if this chunk ends the body
    #[inline]
    pub fn is_last(&self) -> bool {
        !self.more_body
    }
}

/// The "response start" message: status line and headers.
#[derive(Debug, Clone)]
pub struct ResponseStart {
    pub status: StatusCode,
    pub headers: HeaderMap,
}

impl ResponseStart {
    pub fn new(status: StatusCode, headers: HeaderMap) -> Self {
        Self { status, headers }
    }
}

/// A message sent from the application to the transport.
///
/// A well-formed response is one `Start` followed by one or more `Body` messages, the last
/// of which has `more_body == false`.
#[derive(Debug, Clone)]
pub enum SendMessage {
    /// Status and headers, always sent first
    Start(ResponseStart),
    /// A chunk of response body
    Body(BodyChunk),
}

impl SendMessage {
    /// Returns true if this message is the response start
    #[inline]
    pub fn is_start(&self) -> bool {
        matches!(self, SendMessage::Start(_))
    }

    /// Returns true if this message carries body data
    #[inline]
    pub fn is_body(&self) -> bool {
        matches!(self, SendMessage::Body(_))
    }

    /// Converts the message into a body chunk if it carries one
    pub fn into_body_chunk(self) -> Option<BodyChunk> {
        match self {
            SendMessage::Start(_) => None,
            SendMessage::Body(chunk) => Some(chunk),
        }
    }
}

impl From<BodyChunk> for SendMessage {
    fn from(chunk: BodyChunk) -> Self {
        Self::Body(chunk)
    }
}

impl From<ResponseStart> for SendMessage {
    fn from(start: ResponseStart) -> Self {
        Self::Start(start)
    }
}
