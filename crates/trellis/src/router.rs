//! The router middleware.

use std::sync::Arc;

use tracing::debug;

use crate::context::{keys, Context};
use crate::error::Result;
use crate::middleware::{BoxFuture, Flow, Middleware};
use crate::pattern::Pattern;
use crate::request::Request;
use crate::response::Response;
use crate::route::Route;
use crate::table::RouteTable;

/// Dispatches requests to routes in registration order.
///
/// A `Router` is a cheap handle around a shared [`RouteTable`]: clone it,
/// register one clone with the [`Server`](crate::Server) and keep another to
/// add or remove routes while requests are being served.
///
/// # Example
///
/// ```
/// use trellis::middleware::{from_fn, Flow};
/// use trellis::Router;
///
/// let router = Router::new();
/// router
///     .get("/greet/:first/:last", from_fn(|res, _req, ctx| {
///         let params = ctx.params().cloned().unwrap_or_default();
///         res.write(format!("Hello {} {}", params.get("first"), params.get("last")));
///         Flow::Handled
///     }))
///     .unwrap();
/// assert_eq!(router.table().len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Router {
    table: Arc<RouteTable>,
}

impl Router {
    /// Creates a router with an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a router from a fixed list of routes.
    pub fn with_routes<I>(routes: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Arc<Route>>,
    {
        let router = Self::new();
        router.table.add(routes);
        router
    }

    /// The underlying route table.
    #[must_use]
    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    /// Registers a route for one or more methods (`"GET"`, `"GET,POST"`,
    /// `"*"`).
    ///
    /// # Errors
    ///
    /// Returns an error, and registers nothing, if the method string is blank
    /// or the pattern does not compile.
    pub fn add(
        &self,
        method: &str,
        pattern: impl Into<Pattern>,
        handler: impl Middleware + 'static,
    ) -> Result<Arc<Route>> {
        let route = Arc::new(Route::new(method, pattern, handler)?);
        self.table.add([Arc::clone(&route)]);
        Ok(route)
    }

    /// Removes previously registered routes.
    ///
    /// Returns how many were removed.
    pub fn remove(&self, routes: &[Arc<Route>]) -> usize {
        self.table.remove(routes)
    }

    /// Registers a route answering every method.
    ///
    /// # Errors
    ///
    /// See [`add`](Self::add).
    pub fn any(
        &self,
        pattern: impl Into<Pattern>,
        handler: impl Middleware + 'static,
    ) -> Result<Arc<Route>> {
        self.add("*", pattern, handler)
    }

    /// Registers a GET route.
    ///
    /// # Errors
    ///
    /// See [`add`](Self::add).
    pub fn get(
        &self,
        pattern: impl Into<Pattern>,
        handler: impl Middleware + 'static,
    ) -> Result<Arc<Route>> {
        self.add("GET", pattern, handler)
    }

    /// Registers a POST route.
    ///
    /// # Errors
    ///
    /// See [`add`](Self::add).
    pub fn post(
        &self,
        pattern: impl Into<Pattern>,
        handler: impl Middleware + 'static,
    ) -> Result<Arc<Route>> {
        self.add("POST", pattern, handler)
    }

    /// Registers a PUT route.
    ///
    /// # Errors
    ///
    /// See [`add`](Self::add).
    pub fn put(
        &self,
        pattern: impl Into<Pattern>,
        handler: impl Middleware + 'static,
    ) -> Result<Arc<Route>> {
        self.add("PUT", pattern, handler)
    }

    /// Registers a DELETE route.
    ///
    /// # Errors
    ///
    /// See [`add`](Self::add).
    pub fn delete(
        &self,
        pattern: impl Into<Pattern>,
        handler: impl Middleware + 'static,
    ) -> Result<Arc<Route>> {
        self.add("DELETE", pattern, handler)
    }

    /// Registers a HEAD route.
    ///
    /// # Errors
    ///
    /// See [`add`](Self::add).
    pub fn head(
        &self,
        pattern: impl Into<Pattern>,
        handler: impl Middleware + 'static,
    ) -> Result<Arc<Route>> {
        self.add("HEAD", pattern, handler)
    }

    /// Registers a PATCH route.
    ///
    /// # Errors
    ///
    /// See [`add`](Self::add).
    pub fn patch(
        &self,
        pattern: impl Into<Pattern>,
        handler: impl Middleware + 'static,
    ) -> Result<Arc<Route>> {
        self.add("PATCH", pattern, handler)
    }

    /// Registers an OPTIONS route.
    ///
    /// # Errors
    ///
    /// See [`add`](Self::add).
    pub fn options(
        &self,
        pattern: impl Into<Pattern>,
        handler: impl Middleware + 'static,
    ) -> Result<Arc<Route>> {
        self.add("OPTIONS", pattern, handler)
    }

    /// Registers a TRACE route.
    ///
    /// # Errors
    ///
    /// See [`add`](Self::add).
    pub fn trace(
        &self,
        pattern: impl Into<Pattern>,
        handler: impl Middleware + 'static,
    ) -> Result<Arc<Route>> {
        self.add("TRACE", pattern, handler)
    }

    /// Registers a CONNECT route.
    ///
    /// # Errors
    ///
    /// See [`add`](Self::add).
    pub fn connect(
        &self,
        pattern: impl Into<Pattern>,
        handler: impl Middleware + 'static,
    ) -> Result<Arc<Route>> {
        self.add("CONNECT", pattern, handler)
    }

    async fn route(&self, res: &mut Response, req: &Request, ctx: &mut Context) -> Flow {
        // One snapshot per request: routes added or removed meanwhile take
        // effect from the next request on.
        let routes = self.table.snapshot();

        for route in routes.iter() {
            let Some(params) = route.matches(req.method, &req.path) else {
                continue;
            };

            debug!(
                method = %req.method,
                path = %req.path,
                pattern = route.matcher().as_str(),
                "Route matched"
            );

            ctx.set(keys::PARAMS, params);
            if route.handler().call(res, req, ctx).await.is_handled() {
                return Flow::Handled;
            }
        }

        Flow::Continue
    }
}

impl Middleware for Router {
    fn call<'a>(
        &'a self,
        res: &'a mut Response,
        req: &'a Request,
        ctx: &'a mut Context,
    ) -> BoxFuture<'a, Flow> {
        Box::pin(self.route(res, req, ctx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::from_fn;
    use crate::request::Method;
    use crate::RouterError;

    fn greet() -> impl Middleware {
        from_fn(|res, _req, ctx| {
            let params = ctx.params().cloned().unwrap_or_default();
            res.write(format!("Hello {} {}", params.get("first"), params.get("last")));
            Flow::Handled
        })
    }

    async fn run(router: &Router, req: Request) -> (Flow, Response, Context) {
        let mut res = Response::default();
        let mut ctx = Context::new();
        let flow = router.call(&mut res, &req, &mut ctx).await;
        (flow, res, ctx)
    }

    #[tokio::test]
    async fn test_params_reach_handler() {
        let router = Router::new();
        router.get("/greet/:first/:last", greet()).unwrap();

        let (flow, res, ctx) = run(&router, Request::get("/greet/Jane/Doe")).await;

        assert_eq!(flow, Flow::Handled);
        assert_eq!(res.body_string(), Some("Hello Jane Doe".to_string()));
        let params = ctx.params().unwrap();
        assert_eq!(params.get("first"), "Jane");
        assert_eq!(params.get("last"), "Doe");
    }

    #[tokio::test]
    async fn test_no_match_continues() {
        let router = Router::new();
        router.get("/greet/:first/:last", greet()).unwrap();

        let (flow, res, ctx) = run(&router, Request::get("/elsewhere")).await;

        assert_eq!(flow, Flow::Continue);
        assert!(res.body.is_empty());
        assert!(ctx.params().is_none());
    }

    #[tokio::test]
    async fn test_continue_falls_to_next_route() {
        let router = Router::new();
        router
            .get(
                "/users/:id",
                from_fn(|_, _, ctx| {
                    let id = ctx.params().map(|p| p.get("id").to_string());
                    ctx.set("first_saw", id);
                    Flow::Continue
                }),
            )
            .unwrap();
        router
            .get(
                "/users/:name",
                from_fn(|res, _, ctx| {
                    res.write(ctx.params().map(|p| p.get("name")).unwrap_or_default());
                    Flow::Handled
                }),
            )
            .unwrap();

        let (flow, res, ctx) = run(&router, Request::get("/users/ada")).await;

        assert_eq!(flow, Flow::Handled);
        assert_eq!(res.body_string(), Some("ada".to_string()));
        // the second match installs its own params
        assert_eq!(ctx.params().unwrap().try_get("id"), None);
        assert_eq!(
            ctx.get_as::<Option<String>>("first_saw"),
            Some(&Some("ada".to_string()))
        );
    }

    #[tokio::test]
    async fn test_remove_falls_through() {
        let router = Router::new();
        let specific = router
            .get("/users/admin", from_fn(|res, _, _| {
                res.write("admin");
                Flow::Handled
            }))
            .unwrap();
        router
            .get("/users/:id", from_fn(|res, _, _| {
                res.write("generic");
                Flow::Handled
            }))
            .unwrap();

        let (_, res, _) = run(&router, Request::get("/users/admin")).await;
        assert_eq!(res.body_string(), Some("admin".to_string()));

        assert_eq!(router.remove(&[specific]), 1);
        let (_, res, _) = run(&router, Request::get("/users/admin")).await;
        assert_eq!(res.body_string(), Some("generic".to_string()));
    }

    #[tokio::test]
    async fn test_multi_method_route() {
        let router = Router::new();
        router
            .add("get,post", "/form", from_fn(|_, _, _| Flow::Handled))
            .unwrap();

        let (flow, _, _) = run(&router, Request::post("/form")).await;
        assert_eq!(flow, Flow::Handled);
        let (flow, _, _) = run(&router, Request::new(Method::Put, "/form")).await;
        assert_eq!(flow, Flow::Continue);
    }

    #[test]
    fn test_registration_error_adds_nothing() {
        let router = Router::new();
        let err = router.add(" ", "/x", greet()).unwrap_err();
        assert!(matches!(err, RouterError::MissingMethod));
        assert!(router.table().is_empty());
    }

    #[test]
    fn test_with_routes_and_shared_table() {
        let router = Router::with_routes([
            Route::new("GET", "/a", greet()).unwrap(),
            Route::new("GET", "/b", greet()).unwrap(),
        ]);
        let handle = router.clone();
        handle.delete("/c", greet()).unwrap();

        assert_eq!(router.table().len(), 3);
    }

    #[test]
    fn test_verb_helpers() {
        let router = Router::new();
        let routes = [
            router.get("/", greet()).unwrap(),
            router.post("/", greet()).unwrap(),
            router.put("/", greet()).unwrap(),
            router.delete("/", greet()).unwrap(),
            router.head("/", greet()).unwrap(),
            router.patch("/", greet()).unwrap(),
            router.options("/", greet()).unwrap(),
            router.trace("/", greet()).unwrap(),
            router.connect("/", greet()).unwrap(),
            router.any("/", greet()).unwrap(),
        ];
        let names: Vec<String> = routes.iter().map(|r| r.methods().to_string()).collect();
        assert_eq!(
            names,
            ["GET", "POST", "PUT", "DELETE", "HEAD", "PATCH", "OPTIONS", "TRACE", "CONNECT", "*"]
        );
    }
}
