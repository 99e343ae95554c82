//! Request logging.

use tracing::info;

use super::{BoxFuture, Flow, Middleware};
use crate::context::Context;
use crate::request::Request;
use crate::response::Response;

/// Emits one `info` event per request and lets it continue.
///
/// Place it after [`BasicAuth`](super::BasicAuth) to have the user name
/// included.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestLogger;

impl Middleware for RequestLogger {
    fn call<'a>(
        &'a self,
        _res: &'a mut Response,
        req: &'a Request,
        ctx: &'a mut Context,
    ) -> BoxFuture<'a, Flow> {
        match ctx.auth() {
            Some(auth) => info!(
                method = %req.method,
                path = %req.path,
                user = %auth.user,
                authenticated = auth.authenticated,
                "Request"
            ),
            None => info!(method = %req.method, path = %req.path, "Request"),
        }
        Box::pin(std::future::ready(Flow::Continue))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_logger_continues() {
        let mut res = Response::default();
        let mut ctx = Context::new();
        let flow = RequestLogger
            .call(&mut res, &Request::get("/"), &mut ctx)
            .await;
        assert_eq!(flow, Flow::Continue);
        assert_eq!(res.status, 200);
    }
}
