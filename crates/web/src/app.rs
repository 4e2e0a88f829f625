//! The application: a frozen route table plus app-level configuration, served through the
//! gateway [`Application`] contract.
//!
//! For every request the dispatcher
//!
//! 1. resolves the endpoint from path and method (falling back to the not-found endpoint)
//! 2. collects the raw arguments: query string, then path captures, then the decoded body
//! 3. runs the app-level pre chain, then the endpoint's own pre chain
//! 4. resolves the declared parameters and invokes the handler
//! 5. runs the endpoint's post chain, then the app-level post chain
//! 6. emits the response as one start message and one or more body messages
//!
//! Malformed requests are answered with a client error that still goes through step 5. Only
//! transport failures escape [`Application::call`].

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use http_body_util::BodyExt;
use lite_gateway::protocol::{BodyChunk, GatewayError, ResponseStart, Scope};
use lite_gateway::{Application, BodyReceiver, ResponseSender};
use tracing::{debug, error, warn};

use crate::endpoint::{Endpoint, EndpointBuilder};
use crate::error::ReadError;
use crate::extract::{decode_body, parse_query, read_body};
use crate::interceptor::{Interceptors, PostProcessor, PreFlow, PreProcessor};
use crate::request::{PathParams, Request};
use crate::response::Response;
use crate::router::{RouteTable, Router};
use crate::validate::{ModelValidator, SchemaValidator};
use crate::value::Arguments;

const DEFAULT_MAX_BODY_SIZE: usize = 10 * 1024 * 1024;

pub struct App {
    table: RouteTable,
    interceptors: Interceptors,
    max_body_size: usize,
    validator: Arc<dyn ModelValidator>,
}

pub struct AppBuilder {
    table: RouteTable,
    interceptors: Interceptors,
    max_body_size: usize,
    validator: Arc<dyn ModelValidator>,
}

impl AppBuilder {
    fn new() -> Self {
        Self {
            table: RouteTable::new(),
            interceptors: Interceptors::new(),
            max_body_size: DEFAULT_MAX_BODY_SIZE,
            validator: Arc::new(SchemaValidator),
        }
    }

    #[must_use]
    pub fn route(mut self, pattern: &str, builder: EndpointBuilder) -> Self {
        let method = builder.method().clone();
        self.table.register(pattern, method, builder.build());
        self
    }

    /// Mounts `router` under its own prefix
    #[must_use]
    pub fn mount(mut self, router: &Router) -> Self {
        self.table.merge(router.table(), router.prefix(), router.tags());
        self
    }

    /// Mounts `router` under `prefix` instead of its own
    #[must_use]
    pub fn mount_at(mut self, router: &Router, prefix: &str) -> Self {
        self.table.merge(router.table(), prefix, router.tags());
        self
    }

    #[must_use]
    pub fn pre<P: PreProcessor + 'static>(mut self, processor: P) -> Self {
        self.interceptors.add_pre(processor);
        self
    }

    #[must_use]
    pub fn post<P: PostProcessor + 'static>(mut self, processor: P) -> Self {
        self.interceptors.add_post(processor);
        self
    }

    /// Largest accepted request body in bytes, 10 MiB by default
    #[must_use]
    pub fn max_body_size(mut self, max_body_size: usize) -> Self {
        self.max_body_size = max_body_size;
        self
    }

    /// Replaces the [`SchemaValidator`] used for model parameters
    #[must_use]
    pub fn validator<V: ModelValidator + 'static>(mut self, validator: V) -> Self {
        self.validator = Arc::new(validator);
        self
    }

    pub fn build(self) -> App {
        App {
            table: self.table,
            interceptors: self.interceptors,
            max_body_size: self.max_body_size,
            validator: self.validator,
        }
    }
}

impl App {
    pub fn builder() -> AppBuilder {
        AppBuilder::new()
    }

    pub fn routes(&self) -> &RouteTable {
        &self.table
    }

    pub fn interceptors(&self) -> &Interceptors {
        &self.interceptors
    }

    pub fn max_body_size(&self) -> usize {
        self.max_body_size
    }

    async fn collect_arguments(
        &self,
        scope: &Scope,
        path_params: &PathParams,
        receive: &mut dyn BodyReceiver,
    ) -> Result<Arguments, ReadError> {
        let mut args = parse_query(scope.query_string())?;
        args.merge(path_params.to_arguments());

        if let Some(content_type) = scope.content_type() {
            let body = read_body(receive, self.max_body_size).await?;
            args.merge(decode_body(content_type, &body)?);
        }

        Ok(args)
    }

    async fn handle(&self, endpoint: &Endpoint, request: Request) -> Response {
        let request = match self.interceptors.run_pre(request).await {
            PreFlow::Continue(request) => request,
            PreFlow::Respond(response) => return response,
        };

        let request = match endpoint.interceptors().run_pre(request).await {
            PreFlow::Continue(request) => request,
            PreFlow::Respond(response) => return response,
        };

        endpoint.execute(request, self.validator.as_ref()).await
    }
}

#[async_trait]
impl Application for App {
    async fn call(
        &self,
        scope: Scope,
        receive: &mut dyn BodyReceiver,
        send: &mut dyn ResponseSender,
    ) -> Result<(), GatewayError> {
        debug!(method = %scope.method(), path = scope.path(), "dispatching request");

        let matched = self.table.resolve(scope.path(), scope.method());
        let not_found = matched.is_not_found();
        let (endpoint, path_params) = matched.into_parts();

        let args =
            if not_found { Ok(Arguments::new()) } else { self.collect_arguments(&scope, &path_params, receive).await };

        let response = match args {
            Ok(args) => self.handle(&endpoint, Request::new(scope, path_params, args)).await,
            Err(ReadError::Parse(e)) => {
                warn!(cause = %e, path = scope.path(), "failed to read request arguments");
                e.to_response()
            }
            Err(ReadError::Gateway(e)) => {
                error!(cause = %e, "failed to receive request body");
                return Err(e);
            }
        };

        let response = endpoint.interceptors().run_post(response).await;
        let response = self.interceptors.run_post(response).await;

        emit(response, send).await.inspect_err(|e| error!(cause = %e, "failed to send response"))
    }
}

/// Sends `response` as one start message followed by its body messages.
///
/// A single-buffer body is sent as one final chunk; a streamed body as one chunk per frame
/// followed by an empty final chunk.
async fn emit(response: Response, send: &mut dyn ResponseSender) -> Result<(), GatewayError> {
    let (status, headers, mut body) = response.into_parts();
    send.send(ResponseStart::new(status, headers).into()).await?;

    if !body.is_stream() {
        let bytes = match body.frame().await {
            Some(Ok(frame)) => frame.into_data().unwrap_or_default(),
            Some(Err(never)) => match never {},
            None => Bytes::new(),
        };
        return send.send(BodyChunk::last(bytes).into()).await;
    }

    while let Some(frame) = body.frame().await {
        let frame = match frame {
            Ok(frame) => frame,
            Err(never) => match never {},
        };
        if let Ok(data) = frame.into_data() {
            send.send(BodyChunk::more(data).into()).await?;
        }
    }

    send.send(BodyChunk::end().into()).await
}

impl fmt::Debug for App {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("App")
            .field("routes", &self.table.len())
            .field("interceptors", &self.interceptors)
            .field("max_body_size", &self.max_body_size)
            .finish_non_exhaustive()
    }
}

impl fmt::Debug for AppBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppBuilder").field("routes", &self.table.len()).finish_non_exhaustive()
    }
}
