//! Pre- and post-processing chains.
//!
//! A [`PreProcessor`] sees the request before the arguments are resolved and may answer it
//! directly, skipping the rest of the pre chain, the resolver and the handler. A
//! [`PostProcessor`] transforms every response, including short-circuit and error responses.
//!
//! Chains compose by list concatenation: wrapping an inner chain in an outer one runs the
//! outer pre-processors first and the outer post-processors last.

mod date;
mod headers;

pub use date::{DateHeader, DateService};
pub use headers::SetHeader;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::request::Request;
use crate::response::Response;

/// Outcome of a pre-processor.
#[derive(Debug)]
pub enum PreFlow {
    /// Hand the (possibly modified) request to the next step
    Continue(Request),
    /// Answer now
    Respond(Response),
}

#[async_trait]
pub trait PreProcessor: Send + Sync {
    async fn preprocess(&self, request: Request) -> PreFlow;
}

#[async_trait]
pub trait PostProcessor: Send + Sync {
    async fn postprocess(&self, response: Response) -> Response;
}

/// A closure used as a [`PreProcessor`], see [`pre_fn`]
pub struct PreFn<F> {
    f: F,
}

/// A closure used as a [`PostProcessor`], see [`post_fn`]
pub struct PostFn<F> {
    f: F,
}

/// Adapts `async |Request| -> PreFlow` into a pre-processor.
pub fn pre_fn<F, Fut>(f: F) -> PreFn<F>
where
    F: Fn(Request) -> Fut + Send + Sync,
    Fut: Future<Output = PreFlow> + Send + 'static,
{
    PreFn { f }
}

/// Adapts `async |Response| -> Response` into a post-processor.
pub fn post_fn<F, Fut>(f: F) -> PostFn<F>
where
    F: Fn(Response) -> Fut + Send + Sync,
    Fut: Future<Output = Response> + Send + 'static,
{
    PostFn { f }
}

#[async_trait]
impl<F, Fut> PreProcessor for PreFn<F>
where
    F: Fn(Request) -> Fut + Send + Sync,
    Fut: Future<Output = PreFlow> + Send + 'static,
{
    async fn preprocess(&self, request: Request) -> PreFlow {
        (self.f)(request).await
    }
}

#[async_trait]
impl<F, Fut> PostProcessor for PostFn<F>
where
    F: Fn(Response) -> Fut + Send + Sync,
    Fut: Future<Output = Response> + Send + 'static,
{
    async fn postprocess(&self, response: Response) -> Response {
        (self.f)(response).await
    }
}

impl<F> fmt::Debug for PreFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PreFn")
    }
}

impl<F> fmt::Debug for PostFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PostFn")
    }
}

/// Ordered pre- and post-processor lists.
#[derive(Clone, Default)]
pub struct Interceptors {
    pre: Vec<Arc<dyn PreProcessor>>,
    post: Vec<Arc<dyn PostProcessor>>,
}

impl Interceptors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_pre<P: PreProcessor + 'static>(&mut self, processor: P) {
        self.pre.push(Arc::new(processor));
    }

    pub fn add_post<P: PostProcessor + 'static>(&mut self, processor: P) {
        self.post.push(Arc::new(processor));
    }

    pub fn pre_len(&self) -> usize {
        self.pre.len()
    }

    pub fn post_len(&self) -> usize {
        self.post.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pre.is_empty() && self.post.is_empty()
    }

    /// Composes `self` inside `outer`: pre = outer then self, post = self then outer.
    #[must_use]
    pub fn wrapped_by(&self, outer: &Interceptors) -> Interceptors {
        if outer.is_empty() {
            return self.clone();
        }

        let pre = outer.pre.iter().chain(&self.pre).map(Arc::clone).collect();
        let post = self.post.iter().chain(&outer.post).map(Arc::clone).collect();
        Interceptors { pre, post }
    }

    /// Runs the pre chain in order until a processor responds.
    pub async fn run_pre(&self, mut request: Request) -> PreFlow {
        for processor in &self.pre {
            match processor.preprocess(request).await {
                PreFlow::Continue(next) => request = next,
                respond @ PreFlow::Respond(_) => return respond,
            }
        }
        PreFlow::Continue(request)
    }

    /// Runs the post chain in order.
    pub async fn run_post(&self, mut response: Response) -> Response {
        for processor in &self.post {
            response = processor.postprocess(response).await;
        }
        response
    }
}

impl fmt::Debug for Interceptors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Interceptors").field("pre", &self.pre.len()).field("post", &self.post.len()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::PathParams;
    use crate::value::Arguments;
    use http::{HeaderName, HeaderValue, StatusCode};
    use lite_gateway::protocol::Scope;
    use std::sync::Mutex;

    fn request() -> Request {
        let scope = Scope::from(http::Request::get("/").body(()).unwrap());
        Request::new(scope, PathParams::empty(), Arguments::new())
    }

    fn recorder(log: &Arc<Mutex<Vec<String>>>, name: &'static str) -> impl PreProcessor + 'static {
        let log = Arc::clone(log);
        pre_fn(move |request| {
            log.lock().unwrap().push(name.to_owned());
            async move { PreFlow::Continue(request) }
        })
    }

    fn tag(name: &'static str) -> impl PostProcessor + 'static {
        post_fn(move |mut response: Response| async move {
            response.add_header(HeaderName::from_static("x-order"), HeaderValue::from_static(name));
            response
        })
    }

    #[tokio::test]
    async fn pre_chain_runs_in_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut interceptors = Interceptors::new();
        interceptors.add_pre(recorder(&log, "a"));
        interceptors.add_pre(recorder(&log, "b"));

        let flow = interceptors.run_pre(request()).await;

        assert!(matches!(flow, PreFlow::Continue(_)));
        assert_eq!(*log.lock().unwrap(), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn respond_short_circuits() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut interceptors = Interceptors::new();
        interceptors.add_pre(pre_fn(|_request| async {
            PreFlow::Respond(Response::plain("denied").with_status(StatusCode::FORBIDDEN))
        }));
        interceptors.add_pre(recorder(&log, "never"));

        let flow = interceptors.run_pre(request()).await;

        assert!(matches!(flow, PreFlow::Respond(ref response) if response.status() == StatusCode::FORBIDDEN));
        assert!(log.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn wrapping_orders_both_chains() {
        let log = Arc::new(Mutex::new(Vec::new()));

        let mut inner = Interceptors::new();
        inner.add_pre(recorder(&log, "inner"));
        inner.add_post(tag("inner"));

        let mut outer = Interceptors::new();
        outer.add_pre(recorder(&log, "outer"));
        outer.add_post(tag("outer"));

        let composed = inner.wrapped_by(&outer);
        composed.run_pre(request()).await;
        let response = composed.run_post(Response::plain("x")).await;

        assert_eq!(*log.lock().unwrap(), vec!["outer", "inner"]);
        let order = response.headers().get_all("x-order").iter().map(|v| v.to_str().unwrap()).collect::<Vec<_>>();
        assert_eq!(order, vec!["inner", "outer"]);
        assert_eq!(inner.pre_len(), 1);
    }
}
