//! Query string parsing.

use std::collections::HashMap;

use super::{BoxFuture, Flow, Middleware};
use crate::context::{keys, Context};
use crate::request::Request;
use crate::response::Response;

/// Multi-valued `key=value` pairs from a query string or form body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    values: HashMap<String, Vec<String>>,
}

impl Query {
    /// Parses `application/x-www-form-urlencoded` text.
    ///
    /// `+` decodes to a space and percent-escapes are decoded; repeated keys
    /// keep every value in order of appearance.
    #[must_use]
    pub fn parse(input: &str) -> Self {
        let mut values: HashMap<String, Vec<String>> = HashMap::new();
        for (key, value) in form_urlencoded::parse(input.as_bytes()) {
            values
                .entry(key.into_owned())
                .or_default()
                .push(value.into_owned());
        }
        Self { values }
    }

    pub(crate) fn append(&mut self, key: String, value: String) {
        self.values.entry(key).or_default().push(value);
    }

    /// Returns the first value for `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values
            .get(key)
            .and_then(|v| v.first())
            .map(String::as_str)
    }

    /// Returns every value for `key`.
    #[must_use]
    pub fn get_all(&self, key: &str) -> &[String] {
        self.values.get(key).map_or(&[][..], Vec::as_slice)
    }

    /// Returns an iterator over each key and its values.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.values
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Returns the number of distinct keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true when no pair was parsed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Stores the parsed query string under [`keys::QUERY`].
///
/// Requests without a query string get an empty [`Query`], so later
/// middleware can rely on the key being present.
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryParser;

impl Middleware for QueryParser {
    fn call<'a>(
        &'a self,
        _res: &'a mut Response,
        req: &'a Request,
        ctx: &'a mut Context,
    ) -> BoxFuture<'a, Flow> {
        let query = req.query.as_deref().map(Query::parse).unwrap_or_default();
        ctx.set(keys::QUERY, query);
        Box::pin(std::future::ready(Flow::Continue))
    }
}
