//! Gateway protocol types.
//!
//! - [`Scope`]: the request head handed to the application
//! - [`BodyChunk`]: one piece of request or response body plus the end-of-body flag
//! - [`ResponseStart`] and [`SendMessage`]: what the application emits
//! - [`GatewayError`]: failures of the transport side of the contract

mod scope;
pub use scope::Scope;

mod message;
pub use message::BodyChunk;
pub use message::ResponseStart;
pub use message::SendMessage;

mod error;
pub use error::GatewayError;
