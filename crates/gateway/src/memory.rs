//! An in-memory gateway.
//!
//! The types in this module play the transport role without any socket: request bodies
//! come from a list of chunks, response messages are recorded (or forwarded to a channel)
//! and can be checked against the message-flow contract afterwards.
//!
//! ```no_run
//! # use bytes::Bytes;
//! # use http::Request;
//! # use lite_gateway::{memory, Application};
//! # async fn run(app: impl Application) -> Result<(), lite_gateway::protocol::GatewayError> {
//! let request = Request::get("/items/42?verbose=true").body(Bytes::new()).unwrap();
//! let recorded = memory::call(&app, request).await?;
//! println!("{} {:?}", recorded.status(), recorded.text());
//! # Ok(())
//! # }
//! ```

use std::collections::VecDeque;

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use futures::SinkExt;
use futures::channel::mpsc;
use http::{HeaderMap, Request, StatusCode};
use tracing::warn;

use crate::protocol::{BodyChunk, GatewayError, ResponseStart, Scope, SendMessage};
use crate::{Application, BodyReceiver, ResponseSender};

/// Serves a request through `app` and records the response.
pub async fn call<A>(app: &A, request: Request<Bytes>) -> Result<RecordedResponse, GatewayError>
where
    A: Application + ?Sized,
{
    let (parts, body) = request.into_parts();
    call_chunked(app, Request::from_parts(parts, vec![body])).await
}

/// Serves a request whose body arrives as several chunks and records the response.
pub async fn call_chunked<A>(app: &A, request: Request<Vec<Bytes>>) -> Result<RecordedResponse, GatewayError>
where
    A: Application + ?Sized,
{
    let (parts, chunks) = request.into_parts();
    let mut receiver = MemoryReceiver::new(chunks);
    let mut sender = RecordingSender::new();

    app.call(Scope::from(parts), &mut receiver, &mut sender).await?;
    sender.finish()
}

/// A [`BodyReceiver`] over a fixed list of chunks.
#[derive(Debug)]
pub struct MemoryReceiver {
    chunks: VecDeque<BodyChunk>,
}

impl MemoryReceiver {
    /// Every chunk but the last is flagged `more_body`; an empty list yields one empty final chunk.
    pub fn new(chunks: Vec<Bytes>) -> Self {
        let count = chunks.len();
        let mut queue = chunks
            .into_iter()
            .enumerate()
            .map(|(index, body)| if index + 1 == count { BodyChunk::last(body) } else { BodyChunk::more(body) })
            .collect::<VecDeque<_>>();

        if queue.is_empty() {
            queue.push_back(BodyChunk::end());
        }

        Self { chunks: queue }
    }

    pub fn empty() -> Self {
        Self::new(vec![])
    }

    /// Number of chunks not yet received
    pub fn remaining(&self) -> usize {
        self.chunks.len()
    }
}

#[async_trait]
impl BodyReceiver for MemoryReceiver {
    async fn receive(&mut self) -> Result<BodyChunk, GatewayError> {
        self.chunks.pop_front().ok_or(GatewayError::Disconnected)
    }
}

/// A [`ResponseSender`] that keeps every message.
#[derive(Debug, Default)]
pub struct RecordingSender {
    messages: Vec<SendMessage>,
    finished: bool,
}

impl RecordingSender {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[SendMessage] {
        &self.messages
    }

    pub fn into_messages(self) -> Vec<SendMessage> {
        self.messages
    }

    /// Checks the recorded messages against the message-flow contract.
    pub fn finish(self) -> Result<RecordedResponse, GatewayError> {
        RecordedResponse::from_messages(self.messages)
    }
}

#[async_trait]
impl ResponseSender for RecordingSender {
    async fn send(&mut self, message: SendMessage) -> Result<(), GatewayError> {
        if self.finished {
            warn!("response message sent after the end of body");
            return Err(GatewayError::protocol("message sent after the end of body"));
        }

        if let SendMessage::Body(chunk) = &message {
            self.finished = chunk.is_last();
        }

        self.messages.push(message);
        Ok(())
    }
}

/// A [`ResponseSender`] forwarding every message into a bounded channel.
#[derive(Debug, Clone)]
pub struct ChannelSender {
    sender: mpsc::Sender<SendMessage>,
}

/// Creates a sender whose messages can be consumed concurrently from the returned receiver.
pub fn channel(buffer: usize) -> (ChannelSender, mpsc::Receiver<SendMessage>) {
    let (sender, receiver) = mpsc::channel(buffer);
    (ChannelSender { sender }, receiver)
}

#[async_trait]
impl ResponseSender for ChannelSender {
    async fn send(&mut self, message: SendMessage) -> Result<(), GatewayError> {
        self.sender.send(message).await.map_err(|_| GatewayError::Disconnected)
    }
}

/// A complete response captured by a [`RecordingSender`].
#[derive(Debug, Clone)]
pub struct RecordedResponse {
    start: ResponseStart,
    chunks: Vec<BodyChunk>,
}

impl RecordedResponse {
    /// Builds a recorded response, rejecting message sequences that break the contract:
    /// a missing or repeated start, no body, or a body that never ends.
    pub fn from_messages(messages: Vec<SendMessage>) -> Result<Self, GatewayError> {
        let mut iter = messages.into_iter();

        let start = match iter.next() {
            Some(SendMessage::Start(start)) => start,
            Some(SendMessage::Body(_)) => return Err(GatewayError::protocol("body sent before response start")),
            None => return Err(GatewayError::protocol("no response sent")),
        };

        let mut chunks = Vec::new();
        for message in iter {
            match message {
                SendMessage::Start(_) => return Err(GatewayError::protocol("response start sent twice")),
                SendMessage::Body(chunk) => chunks.push(chunk),
            }
        }

        match chunks.last() {
            Some(chunk) if chunk.is_last() => Ok(Self { start, chunks }),
            Some(_) => Err(GatewayError::protocol("response body never ended")),
            None => Err(GatewayError::protocol("response without body message")),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.start.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.start.headers
    }

    /// Returns the first value of header `name` as a string
    pub fn header(&self, name: &str) -> Option<&str> {
        self.start.headers.get(name).and_then(|value| value.to_str().ok())
    }

    /// Every body message, in emission order
    pub fn body_chunks(&self) -> &[BodyChunk] {
        &self.chunks
    }

    /// The whole body, concatenated
    pub fn body(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(self.chunks.iter().map(|chunk| chunk.body.len()).sum());
        for chunk in &self.chunks {
            buf.extend_from_slice(&chunk.body);
        }
        buf.freeze()
    }

    /// The whole body as UTF-8 text, invalid sequences replaced
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body()).into_owned()
    }
}
