//! The asynchronous gateway contract used by lite web applications
//!
//! This crate describes the boundary between a transport (the thing that owns sockets and
//! HTTP framing) and an application (the thing that turns a request into a response). The
//! transport is not part of this crate: it only needs to
//!
//! - describe the request head as a [`protocol::Scope`]
//! - hand out request body chunks through a [`BodyReceiver`]
//! - accept response messages through a [`ResponseSender`]
//!
//! # Message flow
//!
//! For every request the transport calls [`Application::call`] once. The application pulls
//! [`protocol::BodyChunk`]s until one arrives with `more_body == false`, then emits:
//!
//! 1. exactly one [`protocol::SendMessage::Start`] carrying status and headers
//! 2. either a single [`protocol::SendMessage::Body`] with `more_body == false`, or N body
//!    messages with `more_body == true` followed by one empty body with `more_body == false`
//!
//! # Example
//!
//! ```no_run
//! use async_trait::async_trait;
//! use bytes::Bytes;
//! use http::{HeaderMap, Request, StatusCode};
//! use lite_gateway::memory;
//! use lite_gateway::protocol::{BodyChunk, GatewayError, ResponseStart, Scope, SendMessage};
//! use lite_gateway::{Application, BodyReceiver, ResponseSender};
//!
//! struct Hello;
//!
//! #[async_trait]
//! impl Application for Hello {
//!     async fn call(
//!         &self,
//!         _scope: Scope,
//!         _receive: &mut dyn BodyReceiver,
//!         send: &mut dyn ResponseSender,
//!     ) -> Result<(), GatewayError> {
//!         send.send(SendMessage::Start(ResponseStart::new(StatusCode::OK, HeaderMap::new()))).await?;
//!         send.send(SendMessage::Body(BodyChunk::last(Bytes::from_static(b"hello")))).await
//!     }
//! }
//!
//! # async fn run() -> Result<(), GatewayError> {
//! let recorded = memory::call(&Hello, Request::get("/").body(Bytes::new()).unwrap()).await?;
//! assert_eq!(recorded.body(), Bytes::from_static(b"hello"));
//! # Ok(())
//! # }
//! ```
//!
//! # Modules
//!
//! - [`protocol`]: scope, message and error types
//! - [`memory`]: an in-memory gateway, useful for tests, demos and benchmarks

mod application;

pub mod memory;
pub mod protocol;

pub use application::Application;
pub use application::BodyReceiver;
pub use application::ResponseSender;
