//! HTTP date header value management.
//!
//! Formatting the `Date` header on every response is wasteful: the value only changes once
//! per second. [`DateService`] keeps the formatted value in an [`ArcSwap`] and reformats it
//! only when the cached value is older than the refresh interval.

use std::sync::Arc;
use std::time::{Duration, Instant};

use arc_swap::ArcSwap;
use async_trait::async_trait;
use bytes::Bytes;
use http::HeaderValue;
use once_cell::sync::Lazy;

use super::PostProcessor;
use crate::response::Response;

static DATE_SERVICE: Lazy<DateService> = Lazy::new(|| DateService::with_refresh_interval(Duration::from_millis(800)));

/// A cache of the current RFC 7231 date.
#[derive(Debug)]
pub struct DateService {
    current: ArcSwap<CachedDate>,
    refresh_interval: Duration,
}

#[derive(Debug)]
struct CachedDate {
    formatted_at: Instant,
    value: Option<HeaderValue>,
}

impl CachedDate {
    fn now() -> Self {
        let mut buf = faf_http_date::get_date_buff_no_key();
        faf_http_date::get_date_no_key(&mut buf);
        let value = HeaderValue::from_maybe_shared(Bytes::from_owner(buf)).ok();

        Self { formatted_at: Instant::now(), value }
    }
}

impl DateService {
    /// Returns the process-wide instance.
    pub fn global() -> &'static DateService {
        &DATE_SERVICE
    }

    pub fn with_refresh_interval(refresh_interval: Duration) -> Self {
        Self { current: ArcSwap::from_pointee(CachedDate::now()), refresh_interval }
    }

    /// The current date as a header value, reformatted when the cache is stale.
    pub fn http_date(&self) -> Option<HeaderValue> {
        let cached = self.current.load();
        if cached.formatted_at.elapsed() < self.refresh_interval {
            return cached.value.clone();
        }

        let fresh = Arc::new(CachedDate::now());
        let value = fresh.value.clone();
        self.current.store(fresh);
        value
    }
}

/// Sets the `Date` header on every response.
#[derive(Debug, Clone, Copy)]
pub struct DateHeader {
    service: &'static DateService,
}

impl DateHeader {
    pub fn new() -> Self {
        Self { service: DateService::global() }
    }
}

impl Default for DateHeader {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PostProcessor for DateHeader {
    async fn postprocess(&self, mut response: Response) -> Response {
        if let Some(date) = self.service.http_date() {
            response.headers_mut().insert(http::header::DATE, date);
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_rfc7231_dates() {
        let service = DateService::with_refresh_interval(Duration::from_secs(1));

        let date = service.http_date().unwrap();
        let text = date.to_str().unwrap();

        assert!(text.ends_with(" GMT"));
    }

    #[test]
    fn cached_value_is_reused() {
        let service = DateService::with_refresh_interval(Duration::from_secs(3600));

        let first = service.http_date();
        let second = service.http_date();

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn date_header_is_inserted() {
        let response = DateHeader::new().postprocess(Response::plain("x")).await;

        assert!(response.headers().contains_key(http::header::DATE));
    }
}
