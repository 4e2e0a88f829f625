use std::fmt;
use std::marker::PhantomData;

use async_trait::async_trait;

use crate::error::HandlerError;
use crate::request::Request;
use crate::responder::{IntoReply, Reply};
use crate::value::Arguments;

/// The user function behind an endpoint.
///
/// `invoke` receives the request after argument resolution, so `request.args()` holds the
/// typed arguments declared by the endpoint.
#[async_trait]
pub trait RequestHandler: Send + Sync {
    async fn invoke(&self, request: Request) -> Result<Reply, HandlerError>;
}

/// An async function of the resolved arguments, used as a [`RequestHandler`]
pub struct FnHandler<F, Fut> {
    f: F,
    _phantom: PhantomData<fn() -> Fut>,
}

impl<F, Fut> FnHandler<F, Fut>
where
    F: Fn(Arguments) -> Fut,
{
    fn new(f: F) -> Self {
        Self { f, _phantom: PhantomData }
    }
}

impl<F, Fut> fmt::Debug for FnHandler<F, Fut> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnHandler").finish_non_exhaustive()
    }
}

/// Adapts `async fn(Arguments) -> impl IntoReply` into a handler.
///
/// # Example
/// ```
/// # use lite_web::handler_fn;
/// # use lite_web::value::Arguments;
/// async fn hello(args: Arguments) -> String {
///     let name: Option<String> = args.get_as("name").unwrap_or_default();
///     format!("hello {}", name.as_deref().unwrap_or("world"))
/// }
///
/// let handler = handler_fn(hello);
/// ```
pub fn handler_fn<F, Fut>(f: F) -> FnHandler<F, Fut>
where
    F: Fn(Arguments) -> Fut,
{
    FnHandler::new(f)
}

#[async_trait]
impl<F, Fut> RequestHandler for FnHandler<F, Fut>
where
    F: Fn(Arguments) -> Fut + Send + Sync,
    Fut: Future + Send + 'static,
    Fut::Output: IntoReply,
{
    async fn invoke(&self, request: Request) -> Result<Reply, HandlerError> {
        (self.f)(request.into_args()).await.into_reply()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::PathParams;
    use crate::responder::Payload;
    use lite_gateway::protocol::Scope;

    fn assert_is_handler<T: RequestHandler>(_handler: &T) {
        // no op
    }

    fn request(args: Arguments) -> Request {
        let scope = Scope::from(http::Request::get("/").body(()).unwrap());
        Request::new(scope, PathParams::empty(), args)
    }

    #[test]
    fn async_fn_is_handler() {
        async fn get(_args: Arguments) {}

        assert_is_handler(&handler_fn(get));
    }

    #[test]
    fn closure_is_handler() {
        let prefix = String::from(">");
        let handler = handler_fn(move |_args: Arguments| {
            let prefix = prefix.clone();
            async move { prefix }
        });

        assert_is_handler(&handler);
    }

    #[tokio::test]
    async fn invoke_passes_arguments() {
        async fn echo(args: Arguments) -> Result<String, HandlerError> {
            let x: i64 = args.get_as("x")?;
            Ok(format!("x={x}"))
        }

        let mut args = Arguments::new();
        args.insert("x", 5);

        let reply = handler_fn(echo).invoke(request(args)).await.unwrap();

        assert!(matches!(reply, Reply::Value(Payload::Text(text)) if text == "x=5"));
    }

    #[tokio::test]
    async fn invoke_reports_errors() {
        async fn echo(args: Arguments) -> Result<String, HandlerError> {
            let x: i64 = args.get_as("x")?;
            Ok(format!("x={x}"))
        }

        let result = handler_fn(echo).invoke(request(Arguments::new())).await;

        assert!(result.is_err());
    }
}
