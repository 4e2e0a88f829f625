//! Endpoints: a handler plus everything needed to call it.
//!
//! An [`Endpoint`] is built once through an [`EndpointBuilder`] (usually obtained from
//! [`get`](crate::router::get), [`post`](crate::router::post), ...) and never mutated
//! afterwards; composition produces new endpoint values with extra tags or middleware.

use std::any::Any;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use async_trait::async_trait;
use futures::FutureExt;
use http::StatusCode;
use mime::Mime;
use once_cell::sync::Lazy;
use tracing::{error, warn};

use crate::error::{HandlerError, error_chain, internal_error};
use crate::extract::resolve_arguments;
use crate::handler::RequestHandler;
use crate::interceptor::{Interceptors, PostProcessor, PreProcessor};
use crate::request::Request;
use crate::responder::{Payload, Reply, normalize};
use crate::response::Response;
use crate::router::MethodKey;
use crate::schema::{Param, ParamType};
use crate::validate::ModelValidator;

static NOT_FOUND: Lazy<Arc<Endpoint>> =
    Lazy::new(|| Arc::new(EndpointBuilder::new(MethodKey::Any, NotFound).status(StatusCode::NOT_FOUND).build()));

#[derive(Clone)]
pub struct Endpoint {
    handler: Arc<dyn RequestHandler>,
    method: MethodKey,
    status: StatusCode,
    content_type: Mime,
    returns: Option<ParamType>,
    params: Vec<Param>,
    tags: Vec<String>,
    interceptors: Interceptors,
}

impl Endpoint {
    pub fn builder<H: RequestHandler + 'static>(method: MethodKey, handler: H) -> EndpointBuilder {
        EndpointBuilder::new(method, handler)
    }

    /// The endpoint answering requests no route matches: 404 with the JSON body
    /// `"No such endpoint"`.
    pub fn not_found() -> Arc<Endpoint> {
        Arc::clone(&NOT_FOUND)
    }

    pub fn is_not_found(endpoint: &Arc<Endpoint>) -> bool {
        Arc::ptr_eq(endpoint, &NOT_FOUND)
    }

    pub fn method(&self) -> &MethodKey {
        &self.method
    }

    /// Status used when the handler doesn't choose one
    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn content_type(&self) -> &Mime {
        &self.content_type
    }

    pub fn returns(&self) -> Option<&ParamType> {
        self.returns.as_ref()
    }

    pub fn params(&self) -> &[Param] {
        &self.params
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn interceptors(&self) -> &Interceptors {
        &self.interceptors
    }

    /// A copy carrying the additional `tags`
    #[must_use]
    pub fn with_tags(&self, tags: &[String]) -> Endpoint {
        let mut endpoint = self.clone();
        for tag in tags {
            if !endpoint.tags.contains(tag) {
                endpoint.tags.push(tag.clone());
            }
        }
        endpoint
    }

    /// A copy whose middleware runs inside `outer`
    #[must_use]
    pub fn wrapped_by(&self, outer: &Interceptors) -> Endpoint {
        Endpoint { interceptors: self.interceptors.wrapped_by(outer), ..self.clone() }
    }

    /// Resolves the arguments, invokes the handler and builds the response.
    ///
    /// Argument failures become client errors; handler errors and panics become a 500.
    pub async fn execute(&self, mut request: Request, validator: &dyn ModelValidator) -> Response {
        let args = match resolve_arguments(&self.params, request.args(), validator) {
            Ok(args) => args,
            Err(e) => {
                warn!(cause = %e, path = request.path(), "failed to resolve arguments");
                return e.to_response();
            }
        };
        request.set_args(args);

        match AssertUnwindSafe(self.handler.invoke(request)).catch_unwind().await {
            Ok(Ok(reply)) => normalize(reply, self.status, &self.content_type),
            Ok(Err(e)) => {
                let details = error_chain(&*e);
                error!(cause = %details, "handler failed");
                internal_error(details)
            }
            Err(panic) => {
                let details = panic_message(&*panic);
                error!(cause = %details, "handler panicked");
                internal_error(details)
            }
        }
    }
}

impl fmt::Debug for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Endpoint")
            .field("method", &self.method)
            .field("status", &self.status)
            .field("content_type", &self.content_type)
            .field("returns", &self.returns)
            .field("params", &self.params)
            .field("tags", &self.tags)
            .field("interceptors", &self.interceptors)
            .finish_non_exhaustive()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_owned()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        String::from("handler panicked")
    }
}

struct NotFound;

#[async_trait]
impl RequestHandler for NotFound {
    async fn invoke(&self, _request: Request) -> Result<Reply, HandlerError> {
        Ok(Reply::Value(Payload::Text(String::from("No such endpoint"))))
    }
}

/// Declares the metadata of an endpoint.
pub struct EndpointBuilder {
    handler: Arc<dyn RequestHandler>,
    method: MethodKey,
    status: StatusCode,
    content_type: Mime,
    returns: Option<ParamType>,
    params: Vec<Param>,
    tags: Vec<String>,
    interceptors: Interceptors,
}

impl EndpointBuilder {
    pub fn new<H: RequestHandler + 'static>(method: MethodKey, handler: H) -> Self {
        Self {
            handler: Arc::new(handler),
            method,
            status: StatusCode::OK,
            content_type: mime::APPLICATION_JSON,
            returns: None,
            params: Vec::new(),
            tags: Vec::new(),
            interceptors: Interceptors::new(),
        }
    }

    pub fn method(&self) -> &MethodKey {
        &self.method
    }

    /// Declares the next handler parameter
    #[must_use]
    pub fn param(mut self, param: Param) -> Self {
        self.params.push(param);
        self
    }

    #[must_use]
    pub fn params(mut self, params: impl IntoIterator<Item = Param>) -> Self {
        self.params.extend(params);
        self
    }

    #[must_use]
    pub fn status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    #[must_use]
    pub fn content_type(mut self, content_type: Mime) -> Self {
        self.content_type = content_type;
        self
    }

    /// Declares the type of the value the handler returns, for reporting layers
    #[must_use]
    pub fn returns(mut self, returns: ParamType) -> Self {
        self.returns = Some(returns);
        self
    }

    #[must_use]
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Adds a pre-processor running only for this endpoint
    #[must_use]
    pub fn pre<P: PreProcessor + 'static>(mut self, processor: P) -> Self {
        self.interceptors.add_pre(processor);
        self
    }

    /// Adds a post-processor running only for this endpoint
    #[must_use]
    pub fn post<P: PostProcessor + 'static>(mut self, processor: P) -> Self {
        self.interceptors.add_post(processor);
        self
    }

    pub fn build(self) -> Endpoint {
        Endpoint {
            handler: self.handler,
            method: self.method,
            status: self.status,
            content_type: self.content_type,
            returns: self.returns,
            params: self.params,
            tags: self.tags,
            interceptors: self.interceptors,
        }
    }
}

impl fmt::Debug for EndpointBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EndpointBuilder").field("method", &self.method).finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::handler_fn;
    use crate::request::PathParams;
    use crate::response::Body;
    use crate::validate::SchemaValidator;
    use crate::value::{Arguments, Value};
    use lite_gateway::protocol::Scope;
    use serde_json::json;

    fn request(args: Arguments) -> Request {
        let scope = Scope::from(http::Request::get("/").body(()).unwrap());
        Request::new(scope, PathParams::empty(), args)
    }

    async fn double(args: Arguments) -> Result<String, HandlerError> {
        let x: i64 = args.get_as("x")?;
        Ok((x * 2).to_string())
    }

    #[tokio::test]
    async fn executes_with_declared_params() {
        let endpoint = EndpointBuilder::new(MethodKey::Any, handler_fn(double))
            .param(Param::required("x", ParamType::Int))
            .content_type(mime::TEXT_PLAIN)
            .status(StatusCode::ACCEPTED)
            .build();
        let mut args = Arguments::new();
        args.insert("x", "21");

        let response = endpoint.execute(request(args), &SchemaValidator).await;

        assert_eq!(response.status(), StatusCode::ACCEPTED);
        assert_eq!(response.body(), &Body::Plain("42".into()));
    }

    #[tokio::test]
    async fn argument_errors_are_client_errors() {
        let endpoint = EndpointBuilder::new(MethodKey::Any, handler_fn(double))
            .param(Param::required("x", ParamType::Int))
            .build();

        let response = endpoint.execute(request(Arguments::new()), &SchemaValidator).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn panics_become_internal_errors() {
        async fn explode(_args: Arguments) -> String {
            panic!("kaboom")
        }
        let endpoint = EndpointBuilder::new(MethodKey::Any, handler_fn(explode)).build();

        let response = endpoint.execute(request(Arguments::new()), &SchemaValidator).await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.body(), &Body::Json(json!({"message": "Internal server error", "details": "kaboom"})));
    }

    #[tokio::test]
    async fn internal_errors_carry_the_source_chain() {
        #[derive(thiserror::Error, Debug)]
        #[error("loading report failed")]
        struct ReportFailed(#[source] std::io::Error);

        async fn report(_args: Arguments) -> Result<String, HandlerError> {
            Err(ReportFailed(std::io::Error::other("disk full")).into())
        }
        let endpoint = EndpointBuilder::new(MethodKey::Any, handler_fn(report)).build();

        let response = endpoint.execute(request(Arguments::new()), &SchemaValidator).await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            response.body(),
            &Body::Json(json!({"message": "Internal server error", "details": "loading report failed: caused by: disk full"}))
        );
    }

    #[tokio::test]
    async fn not_found_endpoint() {
        let endpoint = Endpoint::not_found();

        let response = endpoint.execute(request(Arguments::new()), &SchemaValidator).await;

        assert!(Endpoint::is_not_found(&endpoint));
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(response.body(), &Body::Json(Value::from("No such endpoint").to_json()));
    }

    #[test]
    fn tags_are_not_duplicated() {
        let endpoint = EndpointBuilder::new(MethodKey::Any, NotFound).tag("a").build();

        let tagged = endpoint.with_tags(&["a".to_owned(), "b".to_owned()]);

        assert_eq!(tagged.tags(), &["a".to_owned(), "b".to_owned()][..]);
        assert_eq!(endpoint.tags().len(), 1);
    }
}
