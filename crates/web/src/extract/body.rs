use bytes::{Bytes, BytesMut};
use lite_gateway::BodyReceiver;
use mime::Mime;
use tracing::trace;

use super::multipart::parse_multipart;
use crate::error::{ParseError, ReadError};
use crate::value::Arguments;

/// Receives body chunks until the last one, failing once more than `limit` bytes arrived.
pub async fn read_body(receiver: &mut dyn BodyReceiver, limit: usize) -> Result<Bytes, ReadError> {
    let mut buf = BytesMut::new();

    loop {
        let chunk = receiver.receive().await?;
        if buf.len() + chunk.body.len() > limit {
            return Err(ParseError::body_too_large(limit).into());
        }

        buf.extend_from_slice(&chunk.body);
        if chunk.is_last() {
            break;
        }
    }

    trace!(size = buf.len(), "request body received");
    Ok(buf.freeze())
}

/// Decodes a body into raw arguments according to its content type.
///
/// JSON objects spread their top-level keys, multipart forms bind one argument per part
/// name. Other content types, and JSON values that are not objects, decode to nothing.
pub fn decode_body(content_type: &str, body: &Bytes) -> Result<Arguments, ParseError> {
    let Ok(mime) = content_type.parse::<Mime>() else {
        return Ok(Arguments::new());
    };

    if mime.essence_str() == mime::APPLICATION_JSON.essence_str() {
        decode_json(body)
    } else if mime.type_() == mime::MULTIPART && mime.subtype() == mime::FORM_DATA {
        let boundary = mime
            .get_param(mime::BOUNDARY)
            .ok_or_else(|| ParseError::invalid_body("multipart boundary is missing"))?;
        parse_multipart(body, boundary.as_str())
    } else {
        Ok(Arguments::new())
    }
}

fn decode_json(body: &Bytes) -> Result<Arguments, ParseError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Arguments::new());
    }

    match serde_json::from_slice::<serde_json::Value>(body).map_err(ParseError::invalid_body)? {
        serde_json::Value::Object(object) => Ok(Arguments::from_json_object(object)),
        _ => Ok(Arguments::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;
    use lite_gateway::memory::MemoryReceiver;
    use lite_gateway::protocol::GatewayError;
    use serde_json::json;

    #[tokio::test]
    async fn reads_every_chunk() {
        let mut receiver = MemoryReceiver::new(vec![Bytes::from_static(b"{\"a\":"), Bytes::from_static(b"1}")]);

        let body = read_body(&mut receiver, 1024).await.unwrap();

        assert_eq!(body, Bytes::from_static(b"{\"a\":1}"));
        assert_eq!(receiver.remaining(), 0);
    }

    #[tokio::test]
    async fn rejects_bodies_over_the_limit() {
        let mut receiver = MemoryReceiver::new(vec![Bytes::from_static(b"12345"), Bytes::from_static(b"6789")]);

        let result = read_body(&mut receiver, 8).await;

        assert!(matches!(result, Err(ReadError::Parse(ParseError::BodyTooLarge { limit: 8 }))));
    }

    #[tokio::test]
    async fn transport_failures_are_gateway_errors() {
        let mut receiver = MemoryReceiver::new(vec![Bytes::from_static(b"a")]);
        read_body(&mut receiver, 8).await.unwrap();

        let result = read_body(&mut receiver, 8).await;

        assert!(matches!(result, Err(ReadError::Gateway(GatewayError::Disconnected))));
    }

    #[test]
    fn json_object_spreads_keys() {
        let body = Bytes::from_static(br#"{"x": 2, "nested": {"a": [1]}}"#);

        let args = decode_body("application/json; charset=utf-8", &body).unwrap();

        assert_eq!(args.get("x"), Some(&Value::Json(json!(2))));
        assert_eq!(args.get("nested"), Some(&Value::Json(json!({"a": [1]}))));
    }

    #[test]
    fn json_edge_cases() {
        assert!(decode_body("application/json", &Bytes::new()).unwrap().is_empty());
        assert!(decode_body("application/json", &Bytes::from_static(b"[1, 2]")).unwrap().is_empty());
        assert!(matches!(
            decode_body("application/json", &Bytes::from_static(b"{broken")),
            Err(ParseError::InvalidBody { .. })
        ));
    }

    #[test]
    fn other_content_types_decode_to_nothing() {
        assert!(decode_body("text/plain", &Bytes::from_static(b"x=1")).unwrap().is_empty());
        assert!(decode_body("not a mime", &Bytes::from_static(b"x=1")).unwrap().is_empty());
    }

    #[test]
    fn multipart_requires_a_boundary() {
        let result = decode_body("multipart/form-data", &Bytes::from_static(b"--x--"));

        assert!(matches!(result, Err(ParseError::InvalidBody { .. })));
    }

    #[test]
    fn multipart_form() {
        let body = Bytes::from_static(b"--xyz\r\nContent-Disposition: form-data; name=\"a\"\r\n\r\n1\r\n--xyz--\r\n");

        let args = decode_body("multipart/form-data; boundary=xyz", &body).unwrap();

        assert_eq!(args.get("a"), Some(&Value::from("1")));
    }
}
