//! A small web framework core driven by the lite gateway contract.
//!
//! Routes are declared with [`get`], [`post`] and friends, grouped with [`Router`] and frozen
//! into an [`App`], which implements [`lite_gateway::Application`].
//!
//! ```
//! use bytes::Bytes;
//! use lite_web::{App, Arguments, Param, ParamType, get, handler_fn};
//!
//! async fn greet(args: Arguments) -> String {
//!     let name: String = args.get_as("name").unwrap_or_default();
//!     format!("hello {name}")
//! }
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let app = App::builder()
//!     .route("/greet/{name}", get(handler_fn(greet)).param(Param::required("name", ParamType::Str)))
//!     .build();
//!
//! let request = http::Request::get("/greet/world").body(Bytes::new()).unwrap();
//! let recorded = lite_gateway::memory::call(&app, request).await.unwrap();
//! assert_eq!(recorded.text(), r#""hello world""#);
//! # }
//! ```

mod app;
mod body;
mod endpoint;
mod error;
mod handler;
mod request;
mod responder;
mod response;

pub mod extract;
pub mod interceptor;
pub mod router;
pub mod schema;
pub mod validate;
pub mod value;

pub use app::App;
pub use app::AppBuilder;
pub use body::ResponseBody;
pub use endpoint::Endpoint;
pub use endpoint::EndpointBuilder;
pub use error::HandlerError;
pub use error::ParseError;
pub use error::ReadError;
pub use handler::FnHandler;
pub use handler::RequestHandler;
pub use handler::handler_fn;
pub use request::PathParams;
pub use request::Request;
pub use responder::Html;
pub use responder::IntoReply;
pub use responder::Json;
pub use responder::Payload;
pub use responder::Reply;
pub use responder::normalize;
pub use response::Body;
pub use response::Response;
pub use router::Router;
pub use router::{any, delete, get, head, options, patch, post, put};
pub use schema::{ModelSchema, Param, ParamType, Requirement};
pub use validate::{FieldError, ModelValidator, SchemaValidator};
pub use value::{ArgumentError, Arguments, FromValue, Model, Value};
