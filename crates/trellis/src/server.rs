//! The dispatch engine.

use std::fmt;
use std::sync::Arc;

use tracing::warn;

use crate::config::ServerConfig;
use crate::context::Context;
use crate::middleware::Middleware;
use crate::request::{Method, Request};
use crate::response::Response;

/// Runs each request through an ordered middleware chain.
///
/// The chain stops at the first middleware that reports
/// [`Flow::Handled`](crate::Flow::Handled). A request nobody handles gets the
/// default 404 page.
///
/// # Example
///
/// ```
/// use trellis::middleware::{from_fn, Flow};
/// use trellis::{Request, Router, Server};
///
/// # #[tokio::main]
/// # async fn main() {
/// let router = Router::new();
/// router
///     .get("/ping", from_fn(|res, _, _| {
///         res.write("pong");
///         Flow::Handled
///     }))
///     .unwrap();
///
/// let server = Server::new().middleware(router);
///
/// let res = server.handle(Request::get("/ping")).await;
/// assert_eq!(res.body_string().as_deref(), Some("pong"));
///
/// let res = server.handle(Request::get("/missing")).await;
/// assert_eq!(res.status, 404);
/// # }
/// ```
#[derive(Clone, Default)]
pub struct Server {
    middleware: Vec<Arc<dyn Middleware>>,
    config: ServerConfig,
}

impl Server {
    /// Creates a server with an empty chain and the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a server with an empty chain and the given configuration.
    #[must_use]
    pub const fn with_config(config: ServerConfig) -> Self {
        Self {
            middleware: Vec::new(),
            config,
        }
    }

    /// Appends a middleware to the chain.
    #[must_use]
    pub fn middleware(mut self, mw: impl Middleware + 'static) -> Self {
        self.add_middleware(mw);
        self
    }

    /// Appends a middleware to the chain in place.
    pub fn add_middleware(&mut self, mw: impl Middleware + 'static) -> &mut Self {
        self.middleware.push(Arc::new(mw));
        self
    }

    /// The active configuration.
    #[must_use]
    pub const fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Number of middleware in the chain.
    #[must_use]
    pub fn len(&self) -> usize {
        self.middleware.len()
    }

    /// Returns true if the chain is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.middleware.is_empty()
    }

    /// Dispatches one request and returns the response.
    pub async fn handle(&self, request: Request) -> Response {
        let mut response = Response::default();
        let mut ctx = Context::new();

        for mw in &self.middleware {
            if mw.call(&mut response, &request, &mut ctx).await.is_handled() {
                return response;
            }
        }

        if self.config.log_unhandled {
            warn!(
                method = %request.method,
                path = %request.path,
                headers = ?request.headers,
                "Unhandled request"
            );
        }
        response.write_error_page(404, request.method == Method::Head);
        response
    }
}

impl fmt::Debug for Server {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Server")
            .field("middleware", &self.middleware.len())
            .field("config", &self.config)
            .finish()
    }
}
