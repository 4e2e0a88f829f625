//! Request scope handling.
//!
//! A [`Scope`] is everything the application learns about a request before reading its
//! body: method, path, raw query string, headers and version. It wraps a bodyless
//! `http::Request<()>` so transports built on the `http` crate can hand their parsed
//! request head over without copying.

use http::request::Parts;
use http::{HeaderMap, Method, Request, Uri, Version};

/// The head of one inbound request.
#[derive(Debug)]
pub struct Scope {
    inner: Request<()>,
}

impl AsRef<Request<()>> for Scope {
    fn as_ref(&self) -> &Request<()> {
        &self.inner
    }
}

impl Scope {
    /// Consumes the scope and returns the inner `Request<()>`.
    pub fn into_inner(self) -> Request<()> {
        self.inner
    }

    /// Returns a reference to the request's HTTP method.
    pub fn method(&self) -> &Method {
        self.inner.method()
    }

    /// Returns a reference to the request's URI.
    pub fn uri(&self) -> &Uri {
        self.inner.uri()
    }

    /// Returns the path component of the request target, e.g. `/items/42`.
    pub fn path(&self) -> &str {
        self.inner.uri().path()
    }

    /// Returns the raw query string without the leading `?`, or an empty string.
    pub fn query_string(&self) -> &str {
        self.inner.uri().query().unwrap_or("")
    }

    /// Returns the request's HTTP version.
    pub fn version(&self) -> Version {
        self.inner.version()
    }

    /// Returns a reference to the request's headers.
    pub fn headers(&self) -> &HeaderMap {
        self.inner.headers()
    }

    /// Returns the value of the header `name` if it is present and visible ASCII.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.inner.headers().get(name).and_then(|value| value.to_str().ok())
    }

    /// Returns the `content-type` header, if any.
    pub fn content_type(&self) -> Option<&str> {
        self.header(http::header::CONTENT_TYPE.as_str())
    }
}

impl From<Parts> for Scope {
    #[inline]
    fn from(parts: Parts) -> Self {
        Self { inner: Request::from_parts(parts, ()) }
    }
}

impl From<Request<()>> for Scope {
    #[inline]
    fn from(inner: Request<()>) -> Self {
        Self { inner }
    }
}

#[cfg(test)]
mod tests {
    use http::{HeaderValue, Method, Request, Version};

    use super::*;

    #[test]
    fn from_request_parts() {
        let request = Request::post("/index/?a=1&b=2&a=3")
            .header(http::header::CONTENT_TYPE, "application/json")
            .header("magic_code", "123")
            .body(())
            .unwrap();

        let scope: Scope = request.into_parts().0.into();

        assert_eq!(scope.method(), &Method::POST);
        assert_eq!(scope.version(), Version::HTTP_11);
        assert_eq!(scope.path(), "/index/");
        assert_eq!(scope.query_string(), "a=1&b=2&a=3");
        assert_eq!(scope.headers().len(), 2);
        assert_eq!(scope.content_type(), Some("application/json"));
        assert_eq!(scope.header("magic_code"), Some("123"));
        assert_eq!(scope.headers().get("magic_code"), Some(&HeaderValue::from_static("123")));
    }

    #[test]
    fn missing_query_is_empty() {
        let scope = Scope::from(Request::get("/hello").body(()).unwrap());

        assert_eq!(scope.path(), "/hello");
        assert_eq!(scope.query_string(), "");
        assert_eq!(scope.content_type(), None);
    }
}
