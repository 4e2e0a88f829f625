//! Routing: patterns, route tables and routers.
//!
//! A [`Router`] groups routes under a prefix, with its own tags and middleware. Routers are
//! composed by mounting: the child's routes are copied into the parent with the child's
//! prefix prepended and its tags added, so a mounted router is never mutated.
//!
//! Router middleware is attached to an endpoint when the route is registered (and again,
//! as an outer layer, when the router is mounted into another router). Middleware added to
//! a router after a route was registered does not apply to that route.

mod method;
mod pattern;
mod table;

pub use method::MethodKey;
pub use pattern::RoutePattern;
pub use table::{RouteMatch, RouteTable};

use http::Method;

use crate::endpoint::EndpointBuilder;
use crate::handler::RequestHandler;
use crate::interceptor::{Interceptors, PostProcessor, PreProcessor};

/// A named group of routes.
#[derive(Debug, Clone, Default)]
pub struct Router {
    prefix: String,
    tags: Vec<String>,
    interceptors: Interceptors,
    table: RouteTable,
}

impl Router {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self { prefix: prefix.into(), ..Self::default() }
    }

    /// Tag added to every endpoint of this router when it is mounted
    #[must_use]
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
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

    /// Registers an endpoint under `pattern`, relative to this router's prefix.
    #[must_use]
    pub fn route(mut self, pattern: &str, builder: EndpointBuilder) -> Self {
        let method = builder.method().clone();
        let endpoint = builder.build().wrapped_by(&self.interceptors);
        self.table.register(pattern, method, endpoint);
        self
    }

    /// Copies the routes of `child` into this router under the child's prefix.
    #[must_use]
    pub fn mount(mut self, child: &Router) -> Self {
        let wrapped = child.table.map_endpoints(|endpoint| endpoint.wrapped_by(&self.interceptors));
        self.table.merge(&wrapped, &child.prefix, &child.tags);
        self
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn interceptors(&self) -> &Interceptors {
        &self.interceptors
    }

    pub fn table(&self) -> &RouteTable {
        &self.table
    }
}

macro_rules! method_endpoint {
    ($name:ident, $method:expr) => {
        pub fn $name<H: RequestHandler + 'static>(handler: H) -> EndpointBuilder {
            EndpointBuilder::new($method, handler)
        }
    };
}

method_endpoint!(get, MethodKey::Method(Method::GET));
method_endpoint!(post, MethodKey::Method(Method::POST));
method_endpoint!(put, MethodKey::Method(Method::PUT));
method_endpoint!(patch, MethodKey::Method(Method::PATCH));
method_endpoint!(delete, MethodKey::Method(Method::DELETE));
method_endpoint!(head, MethodKey::Method(Method::HEAD));
method_endpoint!(options, MethodKey::Method(Method::OPTIONS));
method_endpoint!(any, MethodKey::Any);
