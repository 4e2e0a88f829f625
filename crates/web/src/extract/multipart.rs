//! `multipart/form-data` decoding.
//!
//! Parts are cut at `\r\n--boundary` delimiters without any text conversion, so binary
//! uploads survive untouched. Parts carrying a `filename` bind as bytes, the others as text
//! (or bytes when they are not valid UTF-8).

use bytes::Bytes;

use super::query::group_pairs;
use crate::error::ParseError;
use crate::value::{Arguments, Value};

const CRLF: &[u8] = b"\r\n";
const HEADER_END: &[u8] = b"\r\n\r\n";

pub fn parse_multipart(body: &Bytes, boundary: &str) -> Result<Arguments, ParseError> {
    if boundary.is_empty() {
        return Err(ParseError::invalid_body("empty multipart boundary"));
    }

    let delimiter = [b"--".as_slice(), boundary.as_bytes()].concat();
    let separator = [CRLF, delimiter.as_slice()].concat();

    let first = find(body, &delimiter).ok_or_else(|| ParseError::invalid_body("multipart boundary not found"))?;
    let mut pos = first + delimiter.len();
    let mut pairs = Vec::new();

    loop {
        let rest = &body[pos..];
        if rest.starts_with(b"--") {
            break;
        }

        let line_end = find(rest, CRLF).ok_or_else(|| ParseError::invalid_body("unterminated multipart delimiter"))?;
        let part_start = pos + line_end + CRLF.len();

        let part_len = find(&body[part_start..], &separator)
            .ok_or_else(|| ParseError::invalid_body("unterminated multipart body"))?;
        let part = body.slice(part_start..part_start + part_len);
        pos = part_start + part_len + separator.len();

        if let Some(pair) = parse_part(&part)? {
            pairs.push(pair);
        }
    }

    Ok(group_pairs(pairs))
}

fn parse_part(part: &Bytes) -> Result<Option<(String, Value)>, ParseError> {
    let (head, content) = if part.starts_with(CRLF) {
        (&part[..0], part.slice(CRLF.len()..))
    } else {
        let end = find(part, HEADER_END).ok_or_else(|| ParseError::invalid_body("malformed multipart part"))?;
        (&part[..end], part.slice(end + HEADER_END.len()..))
    };

    let head = std::str::from_utf8(head).map_err(|_| ParseError::invalid_body("multipart headers are not utf-8"))?;
    let Some(disposition) = head.split("\r\n").find_map(|line| {
        let (name, value) = line.split_once(':')?;
        name.trim().eq_ignore_ascii_case("content-disposition").then_some(value.trim())
    }) else {
        return Ok(None);
    };

    let mut name = None;
    let mut filename = None;
    for param in disposition.split(';').skip(1) {
        if let Some((key, value)) = param.split_once('=') {
            let value = value.trim().trim_matches('"').to_owned();
            match key.trim().to_ascii_lowercase().as_str() {
                "name" => name = Some(value),
                "filename" => filename = Some(value),
                _ => {}
            }
        }
    }

    let Some(name) = name else {
        return Ok(None);
    };

    let value = match (filename, String::from_utf8(content.to_vec())) {
        (None, Ok(text)) => Value::Str(text),
        _ => Value::Bytes(content),
    };

    Ok(Some((name, value)))
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.len() > haystack.len() {
        return None;
    }
    haystack.windows(needle.len()).position(|window| window == needle)
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOUNDARY: &str = "----lite-boundary";

    fn form(parts: &[(&str, Option<&str>, &[u8])]) -> Bytes {
        let mut body = Vec::new();
        for (name, filename, content) in parts {
            body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
            match filename {
                Some(filename) => body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n").as_bytes(),
                ),
                None => body.extend_from_slice(format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes()),
            }
            body.extend_from_slice(content);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        Bytes::from(body)
    }

    #[test]
    fn text_and_file_parts() {
        let body = form(&[("title", None, b"hello".as_slice()), ("upload", Some("a.bin"), [0u8, 159, 146, 150].as_slice())]);

        let args = parse_multipart(&body, BOUNDARY).unwrap();

        assert_eq!(args.get("title"), Some(&Value::from("hello")));
        assert_eq!(args.get("upload"), Some(&Value::Bytes(Bytes::from_static(&[0, 159, 146, 150]))));
    }

    #[test]
    fn text_file_stays_bytes() {
        let body = form(&[("upload", Some("a.txt"), b"plain text".as_slice())]);

        let args = parse_multipart(&body, BOUNDARY).unwrap();

        assert_eq!(args.get("upload"), Some(&Value::Bytes(Bytes::from_static(b"plain text"))));
    }

    #[test]
    fn repeated_names_become_a_list() {
        let body = form(&[("tag", None, b"a".as_slice()), ("tag", None, b"b".as_slice())]);

        let args = parse_multipart(&body, BOUNDARY).unwrap();

        assert_eq!(args.get("tag"), Some(&Value::List(vec![Value::from("a"), Value::from("b")])));
    }

    #[test]
    fn content_may_contain_crlf() {
        let body = form(&[("text", None, b"line one\r\nline two".as_slice())]);

        let args = parse_multipart(&body, BOUNDARY).unwrap();

        assert_eq!(args.get("text"), Some(&Value::from("line one\r\nline two")));
    }

    #[test]
    fn malformed_bodies() {
        assert!(matches!(parse_multipart(&Bytes::from_static(b"nothing here"), BOUNDARY), Err(ParseError::InvalidBody { .. })));

        let truncated = Bytes::from(format!("--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"a\"\r\n\r\nvalue"));
        assert!(matches!(parse_multipart(&truncated, BOUNDARY), Err(ParseError::InvalidBody { .. })));
    }
}
