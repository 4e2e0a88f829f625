//! Turning handler results into responses.
//!
//! A handler returns anything implementing [`IntoReply`]. The resulting [`Reply`] is either
//! a bare payload, a payload with an explicit status, or a fully built [`Response`];
//! [`normalize`] picks the representation of bare payloads from the endpoint's content type.

use bytes::{Bytes, BytesMut};
use http::StatusCode;
use mime::Mime;
use serde::Serialize;

use crate::error::HandlerError;
use crate::response::Response;
use crate::value::{Model, Value};

/// What a handler produced, before a representation is chosen.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Empty,
    Text(String),
    Json(serde_json::Value),
    Bytes(Bytes),
    Chunks(Vec<Bytes>),
}

impl Payload {
    fn into_text(self) -> String {
        match self {
            Payload::Empty => String::new(),
            Payload::Text(text) | Payload::Json(serde_json::Value::String(text)) => text,
            Payload::Json(value) => value.to_string(),
            Payload::Bytes(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
            Payload::Chunks(chunks) => String::from_utf8_lossy(&concat(&chunks)).into_owned(),
        }
    }

    fn into_json(self) -> serde_json::Value {
        match self {
            Payload::Empty => serde_json::Value::Null,
            Payload::Json(value) => value,
            other => serde_json::Value::String(other.into_text()),
        }
    }

    fn into_bytes(self) -> Bytes {
        match self {
            Payload::Bytes(bytes) => bytes,
            Payload::Chunks(chunks) => concat(&chunks),
            other => Bytes::from(other.into_text()),
        }
    }
}

/// The three shapes a handler result can take.
#[derive(Debug, Clone)]
pub enum Reply {
    Value(Payload),
    WithStatus(Payload, StatusCode),
    Response(Response),
}

/// A trait for types that can be returned from request handlers.
pub trait IntoReply {
    fn into_reply(self) -> Result<Reply, HandlerError>;
}

/// Serializes the wrapped value as JSON.
#[derive(Debug, Clone, Copy, Default)]
pub struct Json<T>(pub T);

/// Wraps text as an HTML response.
#[derive(Debug, Clone, Copy, Default)]
pub struct Html<T>(pub T);

impl IntoReply for Reply {
    fn into_reply(self) -> Result<Reply, HandlerError> {
        Ok(self)
    }
}

impl IntoReply for Payload {
    fn into_reply(self) -> Result<Reply, HandlerError> {
        Ok(Reply::Value(self))
    }
}

impl IntoReply for String {
    fn into_reply(self) -> Result<Reply, HandlerError> {
        Ok(Reply::Value(Payload::Text(self)))
    }
}

impl IntoReply for &'static str {
    fn into_reply(self) -> Result<Reply, HandlerError> {
        Ok(Reply::Value(Payload::Text(self.to_owned())))
    }
}

impl IntoReply for () {
    fn into_reply(self) -> Result<Reply, HandlerError> {
        Ok(Reply::Value(Payload::Empty))
    }
}

impl IntoReply for Bytes {
    fn into_reply(self) -> Result<Reply, HandlerError> {
        Ok(Reply::Value(Payload::Bytes(self)))
    }
}

impl IntoReply for Vec<Bytes> {
    fn into_reply(self) -> Result<Reply, HandlerError> {
        Ok(Reply::Value(Payload::Chunks(self)))
    }
}

impl IntoReply for serde_json::Value {
    fn into_reply(self) -> Result<Reply, HandlerError> {
        Ok(Reply::Value(Payload::Json(self)))
    }
}

impl<T: Serialize> IntoReply for Json<T> {
    fn into_reply(self) -> Result<Reply, HandlerError> {
        Ok(Reply::Value(Payload::Json(serde_json::to_value(self.0)?)))
    }
}

impl<T: Into<String>> IntoReply for Html<T> {
    fn into_reply(self) -> Result<Reply, HandlerError> {
        Ok(Reply::Response(Response::html(self.0)))
    }
}

/// Text and bytes keep their representation, everything else is rendered as JSON.
impl IntoReply for Value {
    fn into_reply(self) -> Result<Reply, HandlerError> {
        let payload = match self {
            Value::Str(text) => Payload::Text(text),
            Value::Bytes(bytes) => Payload::Bytes(bytes),
            other => Payload::Json(other.to_json()),
        };
        Ok(Reply::Value(payload))
    }
}

impl IntoReply for Model {
    fn into_reply(self) -> Result<Reply, HandlerError> {
        Ok(Reply::Value(Payload::Json(self.to_json())))
    }
}

impl IntoReply for Response {
    fn into_reply(self) -> Result<Reply, HandlerError> {
        Ok(Reply::Response(self))
    }
}

/// None renders as an empty payload.
impl<T: IntoReply> IntoReply for Option<T> {
    fn into_reply(self) -> Result<Reply, HandlerError> {
        match self {
            Some(t) => t.into_reply(),
            None => Ok(Reply::Value(Payload::Empty)),
        }
    }
}

/// The status replaces the endpoint default, or the status of a built response.
impl<T: IntoReply> IntoReply for (T, StatusCode) {
    fn into_reply(self) -> Result<Reply, HandlerError> {
        let (inner, status) = self;
        Ok(match inner.into_reply()? {
            Reply::Value(payload) | Reply::WithStatus(payload, _) => Reply::WithStatus(payload, status),
            Reply::Response(response) => Reply::Response(response.with_status(status)),
        })
    }
}

impl<T: IntoReply> IntoReply for (StatusCode, T) {
    fn into_reply(self) -> Result<Reply, HandlerError> {
        let (status, inner) = self;
        (inner, status).into_reply()
    }
}

/// `Err` is a handler failure.
impl<T, E> IntoReply for Result<T, E>
where
    T: IntoReply,
    E: Into<HandlerError>,
{
    fn into_reply(self) -> Result<Reply, HandlerError> {
        match self {
            Ok(t) => t.into_reply(),
            Err(e) => Err(e.into()),
        }
    }
}

/// Builds the response for a reply.
///
/// Built responses pass through untouched. Payloads get `status` unless the reply carries
/// its own, and a representation chosen from `content_type`: raw bytes and binary media
/// types are binary, `application/json` is JSON, `text/html` is HTML and anything else is
/// plain text.
pub fn normalize(reply: Reply, status: StatusCode, content_type: &Mime) -> Response {
    match reply {
        Reply::Response(response) => response,
        Reply::Value(payload) => render(payload, content_type).with_status(status),
        Reply::WithStatus(payload, status) => render(payload, content_type).with_status(status),
    }
}

fn render(payload: Payload, content_type: &Mime) -> Response {
    let raw_bytes = matches!(payload, Payload::Bytes(_) | Payload::Chunks(_));

    if raw_bytes || is_binary(content_type) {
        let response = match payload {
            Payload::Chunks(chunks) => Response::chunked(chunks),
            other => Response::binary(other.into_bytes()),
        };
        // raw bytes under the default json type keep the binary default
        return if is_json(content_type) { response } else { response.with_content_type(content_type) };
    }

    if is_json(content_type) {
        Response::json(payload.into_json()).with_content_type(content_type)
    } else if content_type.essence_str() == mime::TEXT_HTML.essence_str() {
        Response::html(payload.into_text()).with_content_type(content_type)
    } else {
        Response::plain(payload.into_text()).with_content_type(content_type)
    }
}

fn is_json(content_type: &Mime) -> bool {
    content_type.essence_str() == mime::APPLICATION_JSON.essence_str()
}

fn is_binary(content_type: &Mime) -> bool {
    let top = content_type.type_();
    top == mime::IMAGE || top == mime::AUDIO || top == mime::VIDEO || content_type.essence_str() == mime::APPLICATION_OCTET_STREAM.essence_str()
}

fn concat(chunks: &[Bytes]) -> Bytes {
    let mut buf = BytesMut::with_capacity(chunks.iter().map(Bytes::len).sum());
    for chunk in chunks {
        buf.extend_from_slice(chunk);
    }
    buf.freeze()
}
