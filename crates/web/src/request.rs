//! Request handling module that provides access to the request head, path parameters and
//! the argument mapping.
//!
//! A [`Request`] is created for every inbound event. Its argument mapping starts as the
//! merged raw arguments; pre-processors may replace it, and the argument resolver replaces
//! it with the typed arguments before the handler runs.

use http::{HeaderMap, Method, Uri, Version};
use lite_gateway::protocol::Scope;

use crate::value::{Arguments, Value};

#[derive(Debug)]
pub struct Request {
    scope: Scope,
    path_params: PathParams,
    args: Arguments,
}

impl Request {
    pub fn new(scope: Scope, path_params: PathParams, args: Arguments) -> Self {
        Self { scope, path_params, args }
    }

    /// Returns a reference to the request scope
    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    pub fn method(&self) -> &Method {
        self.scope.method()
    }

    pub fn uri(&self) -> &Uri {
        self.scope.uri()
    }

    pub fn path(&self) -> &str {
        self.scope.path()
    }

    pub fn query_string(&self) -> &str {
        self.scope.query_string()
    }

    pub fn version(&self) -> Version {
        self.scope.version()
    }

    pub fn headers(&self) -> &HeaderMap {
        self.scope.headers()
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.scope.header(name)
    }

    /// Returns the parameters captured from the request path
    pub fn path_params(&self) -> &PathParams {
        &self.path_params
    }

    pub fn args(&self) -> &Arguments {
        &self.args
    }

    pub fn args_mut(&mut self) -> &mut Arguments {
        &mut self.args
    }

    /// Replaces the argument mapping
    pub fn set_args(&mut self, args: Arguments) {
        self.args = args;
    }

    pub fn into_args(self) -> Arguments {
        self.args
    }
}

/// Parameters captured from the request path.
///
/// For the pattern `/users/{id}` and the path `/users/42`, `id` is captured as `"42"`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathParams {
    kind: PathParamsKind,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
enum PathParamsKind {
    #[default]
    None,
    Params(Vec<(String, String)>),
}

impl PathParams {
    /// If the captures are empty, returns an empty PathParams instance
    #[inline]
    pub fn new(params: Vec<(String, String)>) -> Self {
        if params.is_empty() { Self::empty() } else { Self { kind: PathParamsKind::Params(params) } }
    }

    #[inline]
    pub fn empty() -> Self {
        Self { kind: PathParamsKind::None }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        match &self.kind {
            PathParamsKind::None => true,
            PathParamsKind::Params(params) => params.is_empty(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        match &self.kind {
            PathParamsKind::None => 0,
            PathParamsKind::Params(params) => params.len(),
        }
    }

    /// Gets the value of a path parameter by its name
    #[inline]
    pub fn get(&self, key: impl AsRef<str>) -> Option<&str> {
        match &self.kind {
            PathParamsKind::Params(params) => {
                params.iter().find(|(name, _)| name == key.as_ref()).map(|(_, value)| value.as_str())
            }
            PathParamsKind::None => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        let params = match &self.kind {
            PathParamsKind::Params(params) => params.as_slice(),
            PathParamsKind::None => &[],
        };
        params.iter().map(|(name, value)| (name.as_str(), value.as_str()))
    }

    /// The captures as raw text arguments
    pub fn to_arguments(&self) -> Arguments {
        self.iter().map(|(name, value)| (name.to_owned(), Value::from(value))).collect()
    }
}

impl From<Vec<(String, String)>> for PathParams {
    fn from(params: Vec<(String, String)>) -> Self {
        PathParams::new(params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::Request as HttpRequest;

    #[test]
    fn path_params_lookup() {
        let params = PathParams::from(vec![("id".to_owned(), "42".to_owned()), ("name".to_owned(), "x".to_owned())]);

        assert_eq!(params.len(), 2);
        assert_eq!(params.get("id"), Some("42"));
        assert_eq!(params.get("missing"), None);
        assert_eq!(params.to_arguments().get("name"), Some(&Value::from("x")));
    }

    #[test]
    fn empty_path_params() {
        let params = PathParams::new(vec![]);

        assert!(params.is_empty());
        assert_eq!(params, PathParams::empty());
        assert_eq!(params.iter().count(), 0);
    }

    #[test]
    fn request_accessors() {
        let scope = Scope::from(HttpRequest::get("/items/1?q=a").header("x-token", "t").body(()).unwrap());
        let mut request = Request::new(scope, PathParams::empty(), Arguments::new());

        assert_eq!(request.method(), Method::GET);
        assert_eq!(request.path(), "/items/1");
        assert_eq!(request.query_string(), "q=a");
        assert_eq!(request.header("x-token"), Some("t"));

        let mut args = Arguments::new();
        args.insert("q", "b");
        request.set_args(args);
        assert_eq!(request.into_args().get("q"), Some(&Value::from("b")));
    }
}
