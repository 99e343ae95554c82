//! Route definitions.

use std::fmt;
use std::sync::Arc;

use crate::error::{Result, RouterError};
use crate::middleware::Middleware;
use crate::pattern::{Matcher, Pattern};
use crate::request::{Method, Params};

/// The verbs a route answers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MethodSet {
    /// `*`: every verb.
    Any,
    /// The listed verbs.
    Only(Vec<Method>),
}

impl MethodSet {
    /// Parses a method string such as `"GET"`, `"get, post"` or `"*"`.
    ///
    /// Verbs are separated by any non-letter character and compared
    /// case-insensitively. Every verb must be one of the [`Method`]s a request
    /// can carry.
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::MissingMethod`] for a blank string and
    /// [`RouterError::InvalidMethod`] when no verb can be found or a verb is not
    /// a known HTTP method.
    pub fn parse(methods: &str) -> Result<Self> {
        let methods = methods.trim();
        if methods.is_empty() {
            return Err(RouterError::MissingMethod);
        }
        if methods == "*" {
            return Ok(Self::Any);
        }

        let mut verbs = Vec::new();
        for token in methods
            .split(|c: char| !c.is_alphabetic())
            .filter(|token| !token.is_empty())
        {
            let verb = token
                .parse::<Method>()
                .map_err(|_| RouterError::InvalidMethod(methods.to_string()))?;
            if !verbs.contains(&verb) {
                verbs.push(verb);
            }
        }

        if verbs.is_empty() {
            return Err(RouterError::InvalidMethod(methods.to_string()));
        }
        Ok(Self::Only(verbs))
    }

    /// Returns true if `method` is one of the verbs, or the set is `*`.
    #[must_use]
    pub fn allows(&self, method: Method) -> bool {
        match self {
            Self::Any => true,
            Self::Only(verbs) => verbs.contains(&method),
        }
    }
}

impl fmt::Display for MethodSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => f.write_str("*"),
            Self::Only(verbs) => {
                for (i, verb) in verbs.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    f.write_str(verb.as_str())?;
                }
                Ok(())
            }
        }
    }
}

/// A single route: methods, compiled pattern and handler.
///
/// Routes are compiled once when built and never change afterwards. They are
/// shared as `Arc<Route>`; the `Arc` is also the route's identity for
/// [`RouteTable::remove`](crate::RouteTable::remove).
pub struct Route {
    methods: MethodSet,
    matcher: Matcher,
    handler: Box<dyn Middleware>,
}

impl Route {
    /// Validates and compiles a route.
    ///
    /// # Errors
    ///
    /// Returns an error if the method string is blank or names anything but
    /// known HTTP verbs, or if a literal pattern does not compile.
    pub fn new(
        method: &str,
        pattern: impl Into<Pattern>,
        handler: impl Middleware + 'static,
    ) -> Result<Self> {
        Ok(Self {
            methods: MethodSet::parse(method)?,
            matcher: Matcher::compile(pattern.into())?,
            handler: Box::new(handler),
        })
    }

    /// Matches a request method and path, returning the captured params.
    #[must_use]
    pub fn matches(&self, method: Method, path: &str) -> Option<Params> {
        if !self.methods.allows(method) {
            return None;
        }
        self.matcher.captures(path)
    }

    /// The verbs this route answers to.
    #[must_use]
    pub const fn methods(&self) -> &MethodSet {
        &self.methods
    }

    /// The compiled pattern.
    #[must_use]
    pub const fn matcher(&self) -> &Matcher {
        &self.matcher
    }

    /// The route handler.
    #[must_use]
    pub fn handler(&self) -> &dyn Middleware {
        self.handler.as_ref()
    }

    /// Returns true if both handles refer to the same registered route.
    #[must_use]
    pub fn same(a: &Arc<Self>, b: &Arc<Self>) -> bool {
        Arc::ptr_eq(a, b)
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("methods", &self.methods)
            .field("matcher", &self.matcher)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::{from_fn, Flow};

    fn noop() -> impl Middleware {
        from_fn(|_, _, _| Flow::Handled)
    }

    #[test]
    fn test_method_set_parse() {
        assert_eq!(MethodSet::parse("*").unwrap(), MethodSet::Any);
        assert_eq!(
            MethodSet::parse("get, Post|put,GET").unwrap(),
            MethodSet::Only(vec![Method::Get, Method::Post, Method::Put])
        );
        assert!(matches!(MethodSet::parse("  "), Err(RouterError::MissingMethod)));
        assert!(matches!(
            MethodSet::parse("1,2"),
            Err(RouterError::InvalidMethod(_))
        ));
    }

    #[test]
    fn test_unknown_verbs_rejected() {
        for methods in ["PROPFIND", "GET,PROPFIND", "GETPOST", "TARGET"] {
            assert!(
                matches!(
                    MethodSet::parse(methods),
                    Err(RouterError::InvalidMethod(ref m)) if m == methods
                ),
                "{methods} should be rejected"
            );
        }
    }

    #[test]
    fn test_method_set_allows() {
        let set = MethodSet::parse("GET,POST").unwrap();
        assert!(set.allows(Method::Get));
        assert!(set.allows(Method::Post));
        assert!(!set.allows(Method::Put));
        assert!(MethodSet::Any.allows(Method::Delete));
        assert_eq!(set.to_string(), "GET,POST");
    }

    #[test]
    fn test_route_matches_method_and_path() {
        let route = Route::new("post", "/users/:id", noop()).unwrap();
        assert_eq!(route.matches(Method::Post, "/users/7").unwrap().get("id"), "7");
        assert!(route.matches(Method::Get, "/users/7").is_none());
        assert!(route.matches(Method::Post, "/users").is_none());
    }

    #[test]
    fn test_wildcard_route() {
        let route = Route::new("*", "/ping", noop()).unwrap();
        assert!(route.matches(Method::Get, "/ping").is_some());
        assert!(route.matches(Method::Trace, "/ping").is_some());
        assert_eq!(route.methods().to_string(), "*");
    }

    #[test]
    fn test_route_config_errors() {
        assert!(matches!(
            Route::new("", "/x", noop()),
            Err(RouterError::MissingMethod)
        ));
        assert!(matches!(
            Route::new("PROPFIND", "/dav", noop()),
            Err(RouterError::InvalidMethod(_))
        ));
        assert!(matches!(
            Route::new("GET", "/:a/:a", noop()),
            Err(RouterError::InvalidPattern { .. })
        ));
    }
}
