use std::error::Error;
use std::fmt::Display;

use http::StatusCode;
use lite_gateway::protocol::GatewayError;
use serde_json::json;
use thiserror::Error;

use crate::response::Response;
use crate::validate::FieldError;

/// Error type returned by request handlers.
pub type HandlerError = Box<dyn Error + Send + Sync>;

/// Failures while turning a request into handler arguments.
///
/// Every variant maps to a structured JSON client error through [`ParseError::to_response`].
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("validation failed with {} error(s)", .errors.len())]
    ValidationFailed { errors: Vec<FieldError> },

    #[error("can't convert argument `{param_name}` to {param_type}")]
    ConversionFailed { param_name: String, param_type: String, value: serde_json::Value },

    #[error("missing required argument `{param_name}` of type {param_type}")]
    MissingRequired { param_name: String, param_type: String },

    #[error("invalid body: {reason}")]
    InvalidBody { reason: String },

    #[error("invalid query string: {reason}")]
    InvalidQuery { reason: String },

    #[error("body exceeds the limit of {limit} bytes")]
    BodyTooLarge { limit: usize },
}

impl ParseError {
    pub fn validation_failed(errors: Vec<FieldError>) -> Self {
        Self::ValidationFailed { errors }
    }

    pub fn conversion_failed<N: ToString, T: ToString>(param_name: N, param_type: T, value: serde_json::Value) -> Self {
        Self::ConversionFailed { param_name: param_name.to_string(), param_type: param_type.to_string(), value }
    }

    pub fn missing_required<N: ToString, T: ToString>(param_name: N, param_type: T) -> Self {
        Self::MissingRequired { param_name: param_name.to_string(), param_type: param_type.to_string() }
    }

    pub fn invalid_body<S: ToString>(str: S) -> Self {
        Self::InvalidBody { reason: str.to_string() }
    }

    pub fn invalid_query<S: ToString>(str: S) -> Self {
        Self::InvalidQuery { reason: str.to_string() }
    }

    pub fn body_too_large(limit: usize) -> Self {
        Self::BodyTooLarge { limit }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::BodyTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            _ => StatusCode::BAD_REQUEST,
        }
    }

    /// Renders the error as `{"message": ..., "details": ...}`.
    pub fn to_response(&self) -> Response {
        let body = match self {
            Self::ValidationFailed { errors } => json!({"message": "Validation failed", "details": errors}),
            Self::ConversionFailed { param_name, param_type, value } => json!({
                "message": "Conversion failed",
                "details": {"param_name": param_name, "param_type": param_type, "value": value},
            }),
            Self::MissingRequired { param_name, param_type } => json!({
                "message": "Missing required argument",
                "details": {"param_name": param_name, "param_type": param_type},
            }),
            Self::InvalidBody { reason } => json!({"message": "Invalid body", "details": reason}),
            Self::InvalidQuery { reason } => json!({"message": "Invalid query string", "details": reason}),
            Self::BodyTooLarge { limit } => json!({"message": "Payload too large", "details": {"limit": limit}}),
        };

        Response::json(body).with_status(self.status())
    }
}

/// Failures while collecting the raw arguments of a request.
#[derive(Error, Debug)]
pub enum ReadError {
    /// The transport failed; no response can be sent
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    /// The request is malformed; answered with a client error
    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// The 500 response for a failed or panicked handler.
pub(crate) fn internal_error(details: impl Display) -> Response {
    let body = json!({"message": "Internal server error", "details": details.to_string()});
    Response::json(body).with_status(StatusCode::INTERNAL_SERVER_ERROR)
}

/// The error message followed by each of its sources, outermost first.
pub(crate) fn error_chain(error: &dyn Error) -> String {
    let mut chain = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        chain.push_str(": caused by: ");
        chain.push_str(&cause.to_string());
        source = cause.source();
    }
    chain
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::response::Body;
    use crate::validate::FieldError;

    fn json_body(response: &Response) -> &serde_json::Value {
        match response.body() {
            Body::Json(json) => json,
            other => panic!("expected json body, got {other:?}"),
        }
    }

    #[test]
    fn missing_required_body() {
        let response = ParseError::missing_required("x", "int").to_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(response.content_type(), Some("application/json"));
        assert_eq!(
            json_body(&response),
            &json!({"message": "Missing required argument", "details": {"param_name": "x", "param_type": "int"}})
        );
    }

    #[test]
    fn conversion_failed_body() {
        let response = ParseError::conversion_failed("x", "int", json!("abc")).to_response();

        assert_eq!(
            json_body(&response),
            &json!({"message": "Conversion failed", "details": {"param_name": "x", "param_type": "int", "value": "abc"}})
        );
    }

    #[test]
    fn validation_failed_body() {
        let errors = vec![FieldError::missing(vec!["a".into()])];
        let response = ParseError::validation_failed(errors).to_response();

        assert_eq!(
            json_body(&response),
            &json!({"message": "Validation failed", "details": [{"loc": ["a"], "msg": "field required", "type": "value_error.missing"}]})
        );
    }

    #[test]
    fn body_too_large_is_413() {
        let response = ParseError::body_too_large(16).to_response();

        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(json_body(&response), &json!({"message": "Payload too large", "details": {"limit": 16}}));
    }

    #[test]
    fn internal_error_body() {
        let response = internal_error("boom");

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json_body(&response), &json!({"message": "Internal server error", "details": "boom"}));
    }

    #[derive(Error, Debug)]
    #[error("query failed")]
    struct QueryFailed(#[source] std::io::Error);

    #[test]
    fn error_chain_lists_sources() {
        let error = QueryFailed(std::io::Error::other("connection reset"));

        assert_eq!(error_chain(&error), "query failed: caused by: connection reset");
        assert_eq!(error_chain(&std::io::Error::other("plain")), "plain");
    }
}
