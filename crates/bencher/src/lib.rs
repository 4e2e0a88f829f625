use bytes::Bytes;
use http::header::CONTENT_TYPE;
use lite_web::{App, Arguments, ModelSchema, Param, ParamType, Router, Value, get, handler_fn, post};

#[derive(Debug, Copy, Clone)]
pub struct TestCase {
    name: &'static str,
    group: TestGroup,
    request: TestRequest,
}

impl TestCase {
    pub fn new(name: &'static str, group: TestGroup, request: TestRequest) -> Self {
        Self { name, group, request }
    }

    pub fn small(name: &'static str, request: TestRequest) -> Self {
        Self::new(name, TestGroup::Small, request)
    }

    pub fn normal(name: &'static str, request: TestRequest) -> Self {
        Self::new(name, TestGroup::Normal, request)
    }

    pub fn large(name: &'static str, request: TestRequest) -> Self {
        Self::new(name, TestGroup::Large, request)
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn group(&self) -> TestGroup {
        self.group
    }

    pub fn request(&self) -> &TestRequest {
        &self.request
    }
}

/// A request replayed by a benchmark.
#[derive(Debug, Copy, Clone)]
pub struct TestRequest {
    method: &'static str,
    uri: &'static str,
    content_type: Option<&'static str>,
    body: &'static str,
}

impl TestRequest {
    pub const fn get(uri: &'static str) -> Self {
        Self { method: "GET", uri, content_type: None, body: "" }
    }

    pub const fn post_json(uri: &'static str, body: &'static str) -> Self {
        Self { method: "POST", uri, content_type: Some("application/json"), body }
    }

    pub fn uri(&self) -> &'static str {
        self.uri
    }

    pub fn path(&self) -> &'static str {
        self.uri.split_once('?').map_or(self.uri, |(path, _)| path)
    }

    pub fn method(&self) -> http::Method {
        http::Method::from_bytes(self.method.as_bytes()).unwrap_or(http::Method::GET)
    }

    pub fn body_len(&self) -> usize {
        self.body.len()
    }

    pub fn to_http(&self) -> Result<http::Request<Bytes>, http::Error> {
        let mut builder = http::Request::builder().method(self.method()).uri(self.uri);
        if let Some(content_type) = self.content_type {
            builder = builder.header(CONTENT_TYPE, content_type);
        }
        builder.body(Bytes::from_static(self.body.as_bytes()))
    }
}

#[derive(Clone, Copy, Debug)]
pub enum TestGroup {
    Small,
    Normal,
    Large,
}

async fn pong(_args: Arguments) -> &'static str {
    "pong"
}

async fn echo_id(args: Arguments) -> Value {
    args.get("id").cloned().unwrap_or(Value::Null)
}

async fn echo_item(args: Arguments) -> Option<Value> {
    args.get("item").cloned()
}

async fn filler(_args: Arguments) {}

fn item_schema() -> ModelSchema {
    let tag = ModelSchema::new("Tag").field(Param::required("name", ParamType::Str));
    ModelSchema::new("Item")
        .field(Param::required("name", ParamType::Str))
        .field(Param::required("price", ParamType::Float))
        .field(Param::optional("tags", ParamType::list(ParamType::model(tag))))
}

/// An app with `filler_routes` routes registered ahead of the benchmarked ones, so that
/// resolution has to scan past them.
pub fn bench_app(filler_routes: usize) -> App {
    let mut builder = App::builder();
    for i in 0..filler_routes {
        builder = builder.route(&format!("/filler/{i}/{{id}}"), get(handler_fn(filler)));
    }

    let api = Router::new("/api")
        .tag("api")
        .route("/users/{id}", get(handler_fn(echo_id)).param(Param::required("id", ParamType::Int)))
        .route("/items", post(handler_fn(echo_item)).param(Param::required("item", ParamType::model(item_schema()))));

    builder.route("/ping", get(handler_fn(pong))).mount(&api).build()
}
