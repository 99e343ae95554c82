//! Per-request context shared along one dispatch chain.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;

use crate::middleware::{AuthInfo, Query, Upload};
use crate::request::Params;

/// Well-known context keys used by the router and the bundled middleware.
pub mod keys {
    /// [`Params`](crate::Params) of the route currently being invoked.
    pub const PARAMS: &str = "params";
    /// Parsed query string, a [`Query`](crate::middleware::Query).
    pub const QUERY: &str = "query";
    /// Raw request body as a `String`.
    pub const BODY: &str = "body";
    /// JSON request body as a `serde_json::Value`.
    pub const BODY_JSON: &str = "body_json";
    /// URL-encoded or multipart form fields, a [`Query`](crate::middleware::Query).
    pub const FORM: &str = "form";
    /// Multipart file parts, a `Vec<`[`Upload`](crate::middleware::Upload)`>`.
    pub const FILES: &str = "files";
    /// Why the body could not be parsed, as a `String`.
    pub const BODY_ERROR: &str = "body_error";
    /// Result of basic authentication, an [`AuthInfo`](crate::middleware::AuthInfo).
    pub const AUTH: &str = "auth";
}

type Value = Box<dyn Any + Send + Sync>;

/// Mutable key-value store living for exactly one dispatch.
///
/// Every request gets a fresh, empty context; middleware earlier in the chain
/// use it to hand values to later ones.
#[derive(Default)]
pub struct Context {
    values: HashMap<String, Value>,
}

impl Context {
    /// Creates an empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Gets the value stored under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&(dyn Any + Send + Sync)> {
        self.values.get(key).map(|value| &**value)
    }

    /// Gets the value stored under `key` if it has type `T`.
    #[must_use]
    pub fn get_as<T: Any>(&self, key: &str) -> Option<&T> {
        self.get(key)?.downcast_ref::<T>()
    }

    /// Mutable variant of [`get_as`](Self::get_as).
    pub fn get_mut_as<T: Any>(&mut self, key: &str) -> Option<&mut T> {
        self.values.get_mut(key)?.downcast_mut::<T>()
    }

    /// Gets a string value, or an empty string if the key is absent or does
    /// not hold a string.
    #[must_use]
    pub fn get_string(&self, key: &str) -> String {
        let Some(value) = self.get(key) else {
            return String::new();
        };

        if let Some(s) = value.downcast_ref::<String>() {
            s.clone()
        } else if let Some(s) = value.downcast_ref::<&'static str>() {
            (*s).to_string()
        } else {
            String::new()
        }
    }

    /// Stores `value` under `key`, replacing any previous value.
    pub fn set<T: Any + Send + Sync>(&mut self, key: impl Into<String>, value: T) {
        self.values.insert(key.into(), Box::new(value));
    }

    /// Removes and returns the value stored under `key`.
    pub fn remove(&mut self, key: &str) -> Option<Box<dyn Any + Send + Sync>> {
        self.values.remove(key)
    }

    /// Returns true if a value is stored under `key`.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Params of the matched route.
    #[must_use]
    pub fn params(&self) -> Option<&Params> {
        self.get_as(keys::PARAMS)
    }

    /// Parsed query string.
    #[must_use]
    pub fn query(&self) -> Option<&Query> {
        self.get_as(keys::QUERY)
    }

    /// Parsed form fields.
    #[must_use]
    pub fn form(&self) -> Option<&Query> {
        self.get_as(keys::FORM)
    }

    /// Files uploaded in a multipart body.
    #[must_use]
    pub fn files(&self) -> Option<&[Upload]> {
        self.get_as::<Vec<Upload>>(keys::FILES).map(Vec::as_slice)
    }

    /// Raw request body text.
    #[must_use]
    pub fn body(&self) -> Option<&str> {
        self.get_as::<String>(keys::BODY).map(String::as_str)
    }

    /// JSON request body.
    #[must_use]
    pub fn body_json(&self) -> Option<&serde_json::Value> {
        self.get_as(keys::BODY_JSON)
    }

    /// Basic authentication result.
    #[must_use]
    pub fn auth(&self) -> Option<&AuthInfo> {
        self.get_as(keys::AUTH)
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("keys", &self.values.keys().collect::<Vec<_>>())
            .finish()
    }
}
