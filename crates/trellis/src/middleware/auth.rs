//! HTTP basic authentication.

use std::collections::HashMap;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use super::{BoxFuture, Flow, Middleware};
use crate::context::{keys, Context};
use crate::request::Request;
use crate::response::Response;

/// Outcome of basic authentication, stored under [`keys::AUTH`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthInfo {
    /// User name sent by the client.
    pub user: String,
    /// Whether the credentials matched.
    pub authenticated: bool,
}

/// Checks `Authorization: Basic` credentials against a fixed user table.
///
/// When `required`, unauthenticated requests are answered with `401` and the
/// chain stops. Otherwise the request continues either way and handlers can
/// look at [`Context::auth`].
#[derive(Debug, Clone)]
pub struct BasicAuth {
    users: HashMap<String, String>,
    required: bool,
    realm: String,
}

impl BasicAuth {
    /// Creates basic auth over `user -> password` pairs.
    pub fn new<I, U, P>(users: I, required: bool) -> Self
    where
        I: IntoIterator<Item = (U, P)>,
        U: Into<String>,
        P: Into<String>,
    {
        Self {
            users: users
                .into_iter()
                .map(|(u, p)| (u.into(), p.into()))
                .collect(),
            required,
            realm: "Restricted".to_string(),
        }
    }

    /// Sets the realm announced in `WWW-Authenticate`.
    #[must_use]
    pub fn realm(mut self, realm: impl Into<String>) -> Self {
        self.realm = realm.into();
        self
    }

    /// Decodes the credentials of a request, if any are present and well formed.
    fn credentials(req: &Request) -> Option<(String, String)> {
        let header = req.get_header("Authorization")?;
        let (scheme, encoded) = header.trim().split_once(' ')?;
        if !scheme.eq_ignore_ascii_case("basic") {
            return None;
        }

        let decoded = STANDARD.decode(encoded.trim()).ok()?;
        let decoded = String::from_utf8(decoded).ok()?;
        let (user, password) = decoded.split_once(':')?;
        Some((user.to_string(), password.to_string()))
    }

    fn authenticate(&self, req: &Request, ctx: &mut Context) -> bool {
        let Some((user, password)) = Self::credentials(req) else {
            return false;
        };

        let authenticated = self.users.get(&user).is_some_and(|p| *p == password);
        ctx.set(
            keys::AUTH,
            AuthInfo {
                user,
                authenticated,
            },
        );
        authenticated
    }

    fn challenge(&self) -> Response {
        Response::text("Authorization required")
            .status(401)
            .header("WWW-Authenticate", format!("Basic realm=\"{}\"", self.realm))
    }
}

impl Middleware for BasicAuth {
    fn call<'a>(
        &'a self,
        res: &'a mut Response,
        req: &'a Request,
        ctx: &'a mut Context,
    ) -> BoxFuture<'a, Flow> {
        let authenticated = self.authenticate(req, ctx);
        let flow = if self.required && !authenticated {
            *res = self.challenge();
            Flow::Handled
        } else {
            Flow::Continue
        };
        Box::pin(std::future::ready(flow))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn basic(user: &str, pass: &str) -> String {
        format!("Basic {}", STANDARD.encode(format!("{user}:{pass}")))
    }

    async fn run(auth: &BasicAuth, req: Request) -> (Flow, Response, Context) {
        let mut res = Response::default();
        let mut ctx = Context::new();
        let flow = auth.call(&mut res, &req, &mut ctx).await;
        (flow, res, ctx)
    }

    #[tokio::test]
    async fn test_valid_credentials() {
        let auth = BasicAuth::new([("jack", "johnson")], true);
        let req = Request::get("/").header("Authorization", basic("jack", "johnson"));

        let (flow, _, ctx) = run(&auth, req).await;

        assert_eq!(flow, Flow::Continue);
        assert_eq!(
            ctx.auth(),
            Some(&AuthInfo {
                user: "jack".to_string(),
                authenticated: true
            })
        );
    }

    #[tokio::test]
    async fn test_wrong_password_required() {
        let auth = BasicAuth::new([("jack", "johnson")], true).realm("admin");
        let req = Request::get("/").header("Authorization", basic("jack", "nope"));

        let (flow, res, ctx) = run(&auth, req).await;

        assert_eq!(flow, Flow::Handled);
        assert_eq!(res.status, 401);
        assert_eq!(res.get_header("WWW-Authenticate"), Some("Basic realm=\"admin\""));
        assert_eq!(
            res.get_header("Content-Type"),
            Some("text/plain; charset=utf-8")
        );
        assert_eq!(ctx.auth().map(|a| a.authenticated), Some(false));
    }

    #[tokio::test]
    async fn test_missing_header_optional() {
        let auth = BasicAuth::new([("jack", "johnson")], false);

        let (flow, res, ctx) = run(&auth, Request::get("/")).await;

        assert_eq!(flow, Flow::Continue);
        assert_eq!(res.status, 200);
        assert!(ctx.auth().is_none());
    }

    #[tokio::test]
    async fn test_missing_header_required() {
        let auth = BasicAuth::new([("jack", "johnson")], true);
        let (flow, res, _) = run(&auth, Request::get("/")).await;
        assert_eq!(flow, Flow::Handled);
        assert_eq!(res.body_string(), Some("Authorization required".to_string()));
    }

    #[tokio::test]
    async fn test_malformed_header() {
        let auth = BasicAuth::new([("jack", "johnson")], false);
        let req = Request::get("/").header("Authorization", "Basic !!!not-base64");
        let (flow, _, ctx) = run(&auth, req).await;
        assert_eq!(flow, Flow::Continue);
        assert!(ctx.auth().is_none());

        let req = Request::get("/").header("Authorization", "Bearer abc");
        let (_, _, ctx) = run(&auth, req).await;
        assert!(ctx.auth().is_none());
    }

    #[test]
    fn test_password_may_contain_colon() {
        let req = Request::get("/").header("authorization", basic("svc", "a:b:c"));
        assert_eq!(
            BasicAuth::credentials(&req),
            Some(("svc".to_string(), "a:b:c".to_string()))
        );
    }
}
