//! # trellis
//!
//! A minimal middleware chain and sinatra-style router for HTTP servers.
//!
//! This crate provides:
//! - Path templates with `:name` parameters compiled to anchored regexes
//! - A route table that can be changed while requests are being served
//! - A per-request context shared by every stage of the chain
//! - A dispatch engine that stops at the first stage that handles the request
//!   and answers everything else with a 404 page
//!
//! The crate does not speak HTTP itself: an HTTP server hands each parsed
//! [`Request`] to [`Server::handle`] and writes back the [`Response`].
//!
//! ## Quick Start
//!
//! ```
//! use trellis::middleware::{from_fn, Flow, QueryParser};
//! use trellis::{Request, Router, Server};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let router = Router::new();
//! router
//!     .get("/greet/:first/:last", from_fn(|res, _req, ctx| {
//!         let params = ctx.params().cloned().unwrap_or_default();
//!         res.write(format!("Hello {} {}", params.get("first"), params.get("last")));
//!         Flow::Handled
//!     }))
//!     .unwrap();
//!
//! let server = Server::new().middleware(QueryParser).middleware(router.clone());
//!
//! let res = server.handle(Request::get("/greet/Jane/Doe")).await;
//! assert_eq!(res.body_string().as_deref(), Some("Hello Jane Doe"));
//! # }
//! ```
//!
//! ## Path Templates
//!
//! A `:` followed by a letter and then letters or digits names a parameter
//! that matches one non-empty segment piece without `/`, `?` or `#`.
//! Everything else is matched literally, and one trailing slash is optional:
//!
//! ```
//! use trellis::{Matcher, Pattern};
//!
//! let m = Matcher::compile(Pattern::from("/files/:name.:ext")).unwrap();
//! let params = m.captures("/files/report.pdf/").unwrap();
//! assert_eq!(params.get("name"), "report");
//! assert_eq!(params.get("ext"), "pdf");
//! ```
//!
//! A precompiled [`regex::Regex`] is used as given; unnamed groups are
//! reported under their index (`"1"`, `"2"`, ...).
//!
//! ## Changing Routes at Runtime
//!
//! [`Router`] is a handle to a shared [`RouteTable`]. Keep a clone after
//! registering it with the server; routes added or removed through it apply
//! from the next request on, and requests in flight keep the table they
//! started with.

pub mod config;
pub mod context;
pub mod error;
pub mod middleware;
pub mod pattern;
pub mod request;
pub mod response;
pub mod route;
pub mod router;
pub mod server;
pub mod table;

pub use config::ServerConfig;
pub use context::{keys, Context};
pub use error::{Result, RouterError};
pub use middleware::{from_fn, Flow, Middleware};
pub use pattern::{Matcher, Pattern};
pub use request::{Method, Params, Request};
pub use response::Response;
pub use route::{MethodSet, Route};
pub use router::Router;
pub use server::Server;
pub use table::{RouteTable, Snapshot};
