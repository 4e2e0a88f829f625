use std::fmt;

use http::Method;

/// The method an endpoint is registered for: one concrete method or any method.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MethodKey {
    Any,
    Method(Method),
}

impl MethodKey {
    pub fn is_any(&self) -> bool {
        matches!(self, MethodKey::Any)
    }

    /// Returns true for the concrete method `method`; `Any` never matches exactly.
    pub fn is_exactly(&self, method: &Method) -> bool {
        match self {
            MethodKey::Any => false,
            MethodKey::Method(own) => own == method,
        }
    }
}

impl From<Method> for MethodKey {
    fn from(method: Method) -> Self {
        MethodKey::Method(method)
    }
}

impl fmt::Display for MethodKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MethodKey::Any => f.write_str("ANY"),
            MethodKey::Method(method) => f.write_str(method.as_str()),
        }
    }
}
