use std::sync::Arc;

use http::Method;
use tracing::debug;

use super::method::MethodKey;
use super::pattern::RoutePattern;
use crate::endpoint::Endpoint;
use crate::request::PathParams;

/// Ordered mapping from route pattern to the endpoints registered for it.
///
/// Patterns are kept in registration order and resolution is a linear scan: the first
/// pattern matching the path decides, later patterns are never consulted.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    entries: Vec<RouteEntry>,
}

#[derive(Debug, Clone)]
struct RouteEntry {
    pattern: RoutePattern,
    endpoints: Vec<(MethodKey, Arc<Endpoint>)>,
}

/// The endpoint chosen for a request, along with the captured path parameters
#[derive(Debug, Clone)]
pub struct RouteMatch {
    endpoint: Arc<Endpoint>,
    params: PathParams,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `endpoint` for `(pattern, method)`, replacing any previous registration.
    pub fn register(&mut self, pattern: &str, method: MethodKey, endpoint: Endpoint) {
        self.insert(pattern, method, Arc::new(endpoint));
    }

    fn insert(&mut self, pattern: &str, method: MethodKey, endpoint: Arc<Endpoint>) {
        let index = match self.entries.iter().position(|entry| entry.pattern.as_str() == pattern) {
            Some(index) => index,
            None => {
                self.entries.push(RouteEntry { pattern: RoutePattern::parse(pattern), endpoints: Vec::new() });
                self.entries.len() - 1
            }
        };

        let endpoints = &mut self.entries[index].endpoints;
        match endpoints.iter_mut().find(|(key, _)| *key == method) {
            Some((_, existing)) => *existing = endpoint,
            None => endpoints.push((method, endpoint)),
        }
    }

    /// Finds the endpoint for `path` and `method`, falling back to [`Endpoint::not_found`].
    pub fn resolve(&self, path: &str, method: &Method) -> RouteMatch {
        for entry in &self.entries {
            let Some(params) = entry.pattern.matches(path) else {
                continue;
            };

            let endpoint = entry
                .endpoints
                .iter()
                .find(|(key, _)| key.is_exactly(method))
                .or_else(|| entry.endpoints.iter().find(|(key, _)| key.is_any()));

            return match endpoint {
                Some((key, endpoint)) => {
                    debug!(path, pattern = %entry.pattern, method = %key, "route matched");
                    RouteMatch { endpoint: Arc::clone(endpoint), params }
                }
                None => {
                    debug!(path, pattern = %entry.pattern, %method, "method not registered for pattern");
                    RouteMatch::not_found()
                }
            };
        }

        debug!(path, %method, "no route matched");
        RouteMatch::not_found()
    }

    /// Copies every entry of `other` into this table with `prefix` prepended to its pattern
    /// and `tags` added to its endpoints.
    pub fn merge(&mut self, other: &RouteTable, prefix: &str, tags: &[String]) {
        for entry in &other.entries {
            let pattern = format!("{prefix}{}", entry.pattern.as_str());
            for (method, endpoint) in &entry.endpoints {
                let endpoint =
                    if tags.is_empty() { Arc::clone(endpoint) } else { Arc::new(endpoint.with_tags(tags)) };
                self.insert(&pattern, method.clone(), endpoint);
            }
        }
    }

    /// A copy of this table with every endpoint replaced by `f(endpoint)`
    #[must_use]
    pub fn map_endpoints<F>(&self, f: F) -> RouteTable
    where
        F: Fn(&Endpoint) -> Endpoint,
    {
        let entries = self
            .entries
            .iter()
            .map(|entry| RouteEntry {
                pattern: entry.pattern.clone(),
                endpoints: entry
                    .endpoints
                    .iter()
                    .map(|(method, endpoint)| (method.clone(), Arc::new(f(endpoint))))
                    .collect(),
            })
            .collect();

        RouteTable { entries }
    }

    /// Every `(pattern, method, endpoint)` in registration order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &MethodKey, &Arc<Endpoint>)> {
        self.entries.iter().flat_map(|entry| {
            entry.endpoints.iter().map(move |(method, endpoint)| (entry.pattern.as_str(), method, endpoint))
        })
    }

    /// Number of registered patterns
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl RouteMatch {
    fn not_found() -> Self {
        Self { endpoint: Endpoint::not_found(), params: PathParams::empty() }
    }

    pub fn endpoint(&self) -> &Arc<Endpoint> {
        &self.endpoint
    }

    pub fn params(&self) -> &PathParams {
        &self.params
    }

    pub fn is_not_found(&self) -> bool {
        Endpoint::is_not_found(&self.endpoint)
    }

    pub fn into_parts(self) -> (Arc<Endpoint>, PathParams) {
        (self.endpoint, self.params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::handler_fn;
    use crate::value::Arguments;
    use http::StatusCode;

    async fn noop(_args: Arguments) -> &'static str {
        "ok"
    }

    fn endpoint(method: MethodKey, status: StatusCode) -> Endpoint {
        Endpoint::builder(method, handler_fn(noop)).status(status).build()
    }

    #[test]
    fn resolves_exact_method_before_any() {
        let mut table = RouteTable::new();
        table.register("/items", MethodKey::Any, endpoint(MethodKey::Any, StatusCode::ACCEPTED));
        table.register("/items", Method::POST.into(), endpoint(Method::POST.into(), StatusCode::CREATED));

        assert_eq!(table.resolve("/items", &Method::POST).endpoint().status(), StatusCode::CREATED);
        assert_eq!(table.resolve("/items", &Method::GET).endpoint().status(), StatusCode::ACCEPTED);
    }

    #[test]
    fn last_registration_wins() {
        let mut table = RouteTable::new();
        table.register("/a", Method::GET.into(), endpoint(Method::GET.into(), StatusCode::OK));
        table.register("/a", Method::GET.into(), endpoint(Method::GET.into(), StatusCode::ACCEPTED));

        assert_eq!(table.len(), 1);
        assert_eq!(table.iter().count(), 1);
        assert_eq!(table.resolve("/a", &Method::GET).endpoint().status(), StatusCode::ACCEPTED);
    }

    #[test]
    fn first_matching_pattern_decides() {
        let mut table = RouteTable::new();
        table.register("/users/{id}", Method::GET.into(), endpoint(Method::GET.into(), StatusCode::OK));
        table.register("/users/me", Method::POST.into(), endpoint(Method::POST.into(), StatusCode::CREATED));

        let matched = table.resolve("/users/me", &Method::POST);

        assert!(matched.is_not_found());
        assert_eq!(table.resolve("/users/me", &Method::GET).params().get("id"), Some("me"));
    }

    #[test]
    fn unknown_paths_are_not_found() {
        let table = RouteTable::new();

        let matched = table.resolve("/missing", &Method::GET);

        assert!(matched.is_not_found());
        assert_eq!(matched.endpoint().status(), StatusCode::NOT_FOUND);
        assert!(matched.params().is_empty());
    }

    #[test]
    fn merge_prefixes_and_tags() {
        let mut child = RouteTable::new();
        child.register("/list", Method::GET.into(), endpoint(Method::GET.into(), StatusCode::OK));
        child.register("/{id}", Method::GET.into(), endpoint(Method::GET.into(), StatusCode::OK));

        let mut table = RouteTable::new();
        table.merge(&child, "/items", &["items".to_owned()]);

        let patterns = table.iter().map(|(pattern, _, _)| pattern).collect::<Vec<_>>();
        assert_eq!(patterns, vec!["/items/list", "/items/{id}"]);
        assert_eq!(table.resolve("/items/7", &Method::GET).endpoint().tags(), &["items".to_owned()][..]);
        assert!(child.iter().all(|(_, _, endpoint)| endpoint.tags().is_empty()));
    }

    #[test]
    fn map_endpoints_leaves_original_untouched() {
        let mut table = RouteTable::new();
        table.register("/a", MethodKey::Any, endpoint(MethodKey::Any, StatusCode::OK));

        let tagged = table.map_endpoints(|endpoint| endpoint.with_tags(&["x".to_owned()]));

        assert_eq!(tagged.resolve("/a", &Method::GET).endpoint().tags().len(), 1);
        assert!(table.resolve("/a", &Method::GET).endpoint().tags().is_empty());
    }
}
