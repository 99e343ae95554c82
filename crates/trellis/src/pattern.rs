//! Path pattern compilation.
//!
//! A literal template such as `/greet/:first/:last` is compiled into an
//! anchored regex with one named capture group per variable:
//!
//! ```text
//! /greet/:first/:last  =>  ^/greet/(?P<first>[^/?#]+)/(?P<last>[^/?#]+)/?$
//! ```
//!
//! Everything that is not a variable is escaped, so `/files/a.b` only ever
//! matches the literal dot. A single trailing `/` is optional on both sides:
//! `/users` and `/users/` compile to the same matcher.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;

use crate::error::{Result, RouterError};
use crate::request::Params;

/// A route pattern as supplied at registration.
#[derive(Debug, Clone)]
pub enum Pattern {
    /// A sinatra-style template, compiled on registration.
    Literal(String),
    /// A regex used exactly as given.
    Precompiled(Regex),
}

impl From<&str> for Pattern {
    fn from(template: &str) -> Self {
        Self::Literal(template.to_string())
    }
}

impl From<String> for Pattern {
    fn from(template: String) -> Self {
        Self::Literal(template)
    }
}

impl From<Regex> for Pattern {
    fn from(regex: Regex) -> Self {
        Self::Precompiled(regex)
    }
}

/// `:identifier`, where the identifier starts with a Unicode letter.
fn variable_regex() -> &'static Regex {
    static VARIABLE: OnceLock<Regex> = OnceLock::new();
    VARIABLE.get_or_init(|| Regex::new(r":\p{L}[\p{L}\p{N}]*").expect("variable regex is valid"))
}

/// A compiled pattern: a regex plus its parameter names in capture order.
#[derive(Clone)]
pub struct Matcher {
    regex: Regex,
    param_names: Vec<String>,
}

impl Matcher {
    /// Compiles a pattern.
    ///
    /// Precompiled regexes pass through untouched; their parameter names are
    /// the capture group names, with unnamed groups named by their 1-based
    /// index.
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::InvalidPattern`] if a literal template does not
    /// compile, for example when a variable name is used twice.
    ///
    /// # Example
    ///
    /// ```
    /// use trellis::Matcher;
    ///
    /// let matcher = Matcher::compile("/posts/:id/comments/:comment".into()).unwrap();
    /// let params = matcher.captures("/posts/123/comments/456").unwrap();
    /// assert_eq!(params.get("id"), "123");
    /// assert_eq!(params.get("comment"), "456");
    /// ```
    pub fn compile(pattern: Pattern) -> Result<Self> {
        match pattern {
            Pattern::Literal(template) => Self::compile_template(&template),
            Pattern::Precompiled(regex) => Ok(Self::from_regex(regex)),
        }
    }

    fn compile_template(template: &str) -> Result<Self> {
        let body = template.strip_suffix('/').unwrap_or(template);

        let mut source = String::from("^");
        let mut param_names = Vec::new();
        let mut last = 0;

        for var in variable_regex().find_iter(body) {
            source.push_str(&regex::escape(&body[last..var.start()]));

            // skip the leading colon
            let name = &var.as_str()[1..];
            source.push_str("(?P<");
            source.push_str(name);
            source.push_str(">[^/?#]+)");

            param_names.push(name.to_string());
            last = var.end();
        }

        source.push_str(&regex::escape(&body[last..]));
        source.push_str("/?$");

        let regex = Regex::new(&source).map_err(|source| RouterError::InvalidPattern {
            pattern: template.to_string(),
            source,
        })?;

        Ok(Self { regex, param_names })
    }

    fn from_regex(regex: Regex) -> Self {
        let param_names = regex
            .capture_names()
            .enumerate()
            .skip(1)
            .map(|(index, name)| name.map_or_else(|| index.to_string(), str::to_string))
            .collect();

        Self { regex, param_names }
    }

    /// Matches a full request path, returning the captured parameters.
    ///
    /// Optional groups that did not participate in the match are left out.
    #[must_use]
    pub fn captures(&self, path: &str) -> Option<Params> {
        let caps = self.regex.captures(path)?;

        let mut params = Params::new();
        for (i, name) in self.param_names.iter().enumerate() {
            if let Some(value) = caps.get(i + 1) {
                params.insert(name.clone(), value.as_str());
            }
        }

        Some(params)
    }

    /// Returns true if the path matches, without extracting parameters.
    #[must_use]
    pub fn is_match(&self, path: &str) -> bool {
        self.regex.is_match(path)
    }

    /// Returns the parameter names in capture order.
    #[must_use]
    pub fn param_names(&self) -> &[String] {
        &self.param_names
    }

    /// Returns the compiled regex source.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }
}

impl fmt::Debug for Matcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Matcher")
            .field("regex", &self.regex.as_str())
            .field("param_names", &self.param_names)
            .finish()
    }
}
