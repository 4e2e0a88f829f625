//! The response model.
//!
//! A [`Response`] is one of a closed set of body representations plus a status and a
//! header list. The header list starts with the `content-type` of the representation and
//! can be extended with [`Response::add_header`]; [`Response::into_parts`] serializes the
//! body for the wire.

use bytes::Bytes;
use http::header::CONTENT_TYPE;
use http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use mime::Mime;
use serde::Serialize;

use crate::body::ResponseBody;

/// Body representations.
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    Plain(String),
    Html(String),
    Json(serde_json::Value),
    Binary(Bytes),
    /// Bytes emitted as a sequence of chunks
    ChunkedBinary(Vec<Bytes>),
}

impl Body {
    /// The content type a representation starts with
    pub fn default_content_type(&self) -> Mime {
        match self {
            Body::Plain(_) => mime::TEXT_PLAIN,
            Body::Html(_) => mime::TEXT_HTML,
            Body::Json(_) => mime::APPLICATION_JSON,
            Body::Binary(_) | Body::ChunkedBinary(_) => mime::APPLICATION_OCTET_STREAM,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Response {
    body: Body,
    status: StatusCode,
    headers: HeaderMap,
}

impl Response {
    pub fn new(body: Body) -> Self {
        let content_type = body.default_content_type();
        let mut headers = HeaderMap::with_capacity(8);
        headers.insert(CONTENT_TYPE, header_value(&content_type));
        Self { body, status: StatusCode::OK, headers }
    }

    pub fn plain(text: impl Into<String>) -> Self {
        Self::new(Body::Plain(text.into()))
    }

    pub fn html(text: impl Into<String>) -> Self {
        Self::new(Body::Html(text.into()))
    }

    pub fn json(value: serde_json::Value) -> Self {
        Self::new(Body::Json(value))
    }

    /// Serializes `value` into a JSON response
    pub fn json_from<T: Serialize + ?Sized>(value: &T) -> Result<Self, serde_json::Error> {
        serde_json::to_value(value).map(Self::json)
    }

    pub fn binary(bytes: impl Into<Bytes>) -> Self {
        Self::new(Body::Binary(bytes.into()))
    }

    pub fn chunked(chunks: Vec<Bytes>) -> Self {
        Self::new(Body::ChunkedBinary(chunks))
    }

    #[must_use]
    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    /// Replaces the `content-type` header
    #[must_use]
    pub fn with_content_type(mut self, content_type: &Mime) -> Self {
        self.headers.insert(CONTENT_TYPE, header_value(content_type));
        self
    }

    /// Appends a header, keeping earlier values with the same name
    #[must_use]
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.add_header(name, value);
        self
    }

    pub fn add_header(&mut self, name: HeaderName, value: HeaderValue) {
        self.headers.append(name, value);
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn set_status(&mut self, status: StatusCode) {
        self.status = status;
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    pub fn content_type(&self) -> Option<&str> {
        self.headers.get(CONTENT_TYPE).and_then(|value| value.to_str().ok())
    }

    pub fn body(&self) -> &Body {
        &self.body
    }

    /// Serializes the body: text as UTF-8, JSON as its text form, chunks as a lazy stream.
    pub fn into_body(self) -> ResponseBody {
        self.into_parts().2
    }

    pub fn into_parts(self) -> (StatusCode, HeaderMap, ResponseBody) {
        let body = match self.body {
            Body::Plain(text) | Body::Html(text) => ResponseBody::from(text),
            Body::Json(value) => ResponseBody::from(value.to_string()),
            Body::Binary(bytes) => ResponseBody::from(bytes),
            Body::ChunkedBinary(chunks) => ResponseBody::chunks(chunks),
        };
        (self.status, self.headers, body)
    }
}

fn header_value(content_type: &Mime) -> HeaderValue {
    // a parsed mime only holds visible ASCII
    HeaderValue::from_str(content_type.as_ref()).unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use serde_json::json;

    async fn collect(response: Response) -> Bytes {
        response.into_body().collect().await.unwrap().to_bytes()
    }

    #[tokio::test]
    async fn default_content_types() {
        assert_eq!(Response::plain("a").content_type(), Some("text/plain"));
        assert_eq!(Response::html("a").content_type(), Some("text/html"));
        assert_eq!(Response::json(json!(1)).content_type(), Some("application/json"));
        assert_eq!(Response::binary(Bytes::new()).content_type(), Some("application/octet-stream"));
        assert_eq!(Response::chunked(vec![]).content_type(), Some("application/octet-stream"));
    }

    #[tokio::test]
    async fn serializes_each_representation() {
        assert_eq!(collect(Response::plain("héllo")).await, Bytes::from("héllo"));
        assert_eq!(collect(Response::json(json!({"a": [1, 2]}))).await, Bytes::from(r#"{"a":[1,2]}"#));
        assert_eq!(collect(Response::binary(vec![0u8, 1, 2])).await, Bytes::from_static(&[0, 1, 2]));

        let chunked = Response::chunked(vec![Bytes::from("ab"), Bytes::from("cd")]);
        assert_eq!(collect(chunked).await, Bytes::from("abcd"));
    }

    #[test]
    fn add_header_appends() {
        let mut response = Response::plain("x").with_status(StatusCode::CREATED);
        response.add_header(HeaderName::from_static("x-tag"), HeaderValue::from_static("a"));
        response.add_header(HeaderName::from_static("x-tag"), HeaderValue::from_static("b"));

        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(response.headers().get_all("x-tag").iter().count(), 2);
        assert_eq!(response.headers().get_all(CONTENT_TYPE).iter().count(), 1);
    }

    #[test]
    fn content_type_is_replaced() {
        let response = Response::plain("x").with_content_type(&mime::TEXT_CSV);

        assert_eq!(response.content_type(), Some("text/csv"));
        assert_eq!(response.headers().get_all(CONTENT_TYPE).iter().count(), 1);
    }

    #[test]
    fn json_from_serializable() {
        #[derive(Serialize)]
        struct Item {
            id: u32,
        }

        let response = Response::json_from(&Item { id: 3 }).unwrap();

        assert_eq!(response.body(), &Body::Json(json!({"id": 3})));
    }
}
