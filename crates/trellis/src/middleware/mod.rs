//! Middleware: the unit of request processing.
//!
//! Every stage of a dispatch chain, including the router and each route
//! handler, is a [`Middleware`]. It receives the response sink, the request and
//! the per-request [`Context`], and reports whether the request is now fully
//! answered.
//!
//! # Example
//!
//! ```
//! use trellis::middleware::{from_fn, Flow};
//! use trellis::{Context, Request, Response};
//!
//! let tag = from_fn(|_res: &mut Response, req: &Request, ctx: &mut Context| {
//!     ctx.set("path_len", req.path.len());
//!     Flow::Continue
//! });
//! # let _ = tag;
//! ```
//!
//! Async middleware implement the trait directly:
//!
//! ```ignore
//! struct LoadUser;
//!
//! impl Middleware for LoadUser {
//!     fn call<'a>(
//!         &'a self,
//!         _res: &'a mut Response,
//!         req: &'a Request,
//!         ctx: &'a mut Context,
//!     ) -> BoxFuture<'a, Flow> {
//!         Box::pin(async move {
//!             let user = lookup(req.get_header("x-user")).await;
//!             ctx.set("user", user);
//!             Flow::Continue
//!         })
//!     }
//! }
//! ```

mod auth;
mod body;
mod logging;
mod query;
mod static_files;

pub use auth::{AuthInfo, BasicAuth};
pub use body::{BodyParser, Upload};
pub use futures::future::BoxFuture;
pub use logging::RequestLogger;
pub use query::{Query, QueryParser};
pub use static_files::Static;

use std::fmt;
use std::sync::Arc;

use crate::context::Context;
use crate::request::Request;
use crate::response::Response;

/// Outcome of one middleware call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Pass the request on to the next middleware.
    Continue,
    /// The response is fully written; stop the chain.
    Handled,
}

impl Flow {
    /// Returns true for [`Flow::Handled`].
    #[must_use]
    pub const fn is_handled(self) -> bool {
        matches!(self, Self::Handled)
    }
}

impl From<bool> for Flow {
    fn from(handled: bool) -> Self {
        if handled {
            Self::Handled
        } else {
            Self::Continue
        }
    }
}

impl From<Flow> for bool {
    fn from(flow: Flow) -> Self {
        flow.is_handled()
    }
}

/// A stage of the dispatch chain.
///
/// Returning [`Flow::Handled`] means the response has been written and no
/// later middleware, route or default response may run for this request.
pub trait Middleware: Send + Sync {
    /// Processes one request.
    fn call<'a>(
        &'a self,
        res: &'a mut Response,
        req: &'a Request,
        ctx: &'a mut Context,
    ) -> BoxFuture<'a, Flow>;
}

impl<M: Middleware + ?Sized> Middleware for Arc<M> {
    fn call<'a>(
        &'a self,
        res: &'a mut Response,
        req: &'a Request,
        ctx: &'a mut Context,
    ) -> BoxFuture<'a, Flow> {
        (**self).call(res, req, ctx)
    }
}

impl<M: Middleware + ?Sized> Middleware for Box<M> {
    fn call<'a>(
        &'a self,
        res: &'a mut Response,
        req: &'a Request,
        ctx: &'a mut Context,
    ) -> BoxFuture<'a, Flow> {
        (**self).call(res, req, ctx)
    }
}

/// Middleware built from a synchronous closure. See [`from_fn`].
#[derive(Clone)]
pub struct FnMiddleware<F> {
    f: F,
}

/// Wraps a synchronous closure as [`Middleware`].
pub const fn from_fn<F>(f: F) -> FnMiddleware<F>
where
    F: Fn(&mut Response, &Request, &mut Context) -> Flow + Send + Sync,
{
    FnMiddleware { f }
}

impl<F> Middleware for FnMiddleware<F>
where
    F: Fn(&mut Response, &Request, &mut Context) -> Flow + Send + Sync,
{
    fn call<'a>(
        &'a self,
        res: &'a mut Response,
        req: &'a Request,
        ctx: &'a mut Context,
    ) -> BoxFuture<'a, Flow> {
        let flow = (self.f)(res, req, ctx);
        Box::pin(std::future::ready(flow))
    }
}

impl<F> fmt::Debug for FnMiddleware<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FnMiddleware")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flow_bool_conversion() {
        assert_eq!(Flow::from(true), Flow::Handled);
        assert_eq!(Flow::from(false), Flow::Continue);
        assert!(bool::from(Flow::Handled));
        assert!(!Flow::Continue.is_handled());
    }

    #[tokio::test]
    async fn test_from_fn_runs_closure() {
        let mw = from_fn(|res, req, ctx| {
            ctx.set("seen", req.path.clone());
            res.write("hi");
            Flow::Handled
        });

        let mut res = Response::default();
        let mut ctx = Context::new();
        let req = Request::get("/x");

        assert_eq!(mw.call(&mut res, &req, &mut ctx).await, Flow::Handled);
        assert_eq!(ctx.get_string("seen"), "/x");
        assert_eq!(res.body_string(), Some("hi".to_string()));
    }

    #[tokio::test]
    async fn test_shared_middleware() {
        let mw: Arc<dyn Middleware> = Arc::new(from_fn(|_, _, _| Flow::Continue));
        let mut res = Response::default();
        let mut ctx = Context::new();
        let flow = mw.call(&mut res, &Request::get("/"), &mut ctx).await;
        assert_eq!(flow, Flow::Continue);
    }
}
