use std::sync::Arc;

use async_trait::async_trait;

use crate::protocol::{BodyChunk, GatewayError, Scope, SendMessage};

/// The pull side of the request body.
///
/// Each call yields the next chunk; the chunk with `more_body == false` is the last one.
/// Calling `receive` again after the last chunk is a protocol violation and transports may
/// answer with [`GatewayError::Disconnected`].
#[async_trait]
pub trait BodyReceiver: Send {
    async fn receive(&mut self) -> Result<BodyChunk, GatewayError>;
}

/// The push side of the response.
#[async_trait]
pub trait ResponseSender: Send {
    async fn send(&mut self, message: SendMessage) -> Result<(), GatewayError>;
}

/// An application served by a gateway.
///
/// `call` runs once per request. Only transport failures are reported through the `Err`
/// channel; every application level failure must already have been turned into a response.
#[async_trait]
pub trait Application: Send + Sync {
    async fn call(
        &self,
        scope: Scope,
        receive: &mut dyn BodyReceiver,
        send: &mut dyn ResponseSender,
    ) -> Result<(), GatewayError>;
}

#[async_trait]
impl<A> Application for Arc<A>
where
    A: Application + ?Sized,
{
    async fn call(
        &self,
        scope: Scope,
        receive: &mut dyn BodyReceiver,
        send: &mut dyn ResponseSender,
    ) -> Result<(), GatewayError> {
        self.as_ref().call(scope, receive, send).await
    }
}
