use async_trait::async_trait;
use http::{HeaderName, HeaderValue};

use super::PostProcessor;
use crate::response::Response;

/// Adds fixed headers to every response, e.g. CORS headers.
///
/// Headers are appended, so values already set by the handler are kept.
#[derive(Debug, Clone, Default)]
pub struct SetHeader {
    headers: Vec<(HeaderName, HeaderValue)>,
}

impl SetHeader {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.push((name, value));
        self
    }

    /// `access-control-allow-origin` for the given origin
    pub fn allow_origin(origin: &'static str) -> Self {
        Self::new().header(http::header::ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static(origin))
    }
}

#[async_trait]
impl PostProcessor for SetHeader {
    async fn postprocess(&self, mut response: Response) -> Response {
        for (name, value) in &self.headers {
            response.add_header(name.clone(), value.clone());
        }
        response
    }
}
