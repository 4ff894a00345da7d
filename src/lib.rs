//! radixmux is a high-performance HTTP request router built on a compressed
//! trie (radix tree) per HTTP method.
//!
//! The registered path can contain two kinds of parameters:
//!
//! | Syntax      | Type                |
//! |-------------|---------------------|
//! | `{name}`    | named parameter     |
//! | `{name...}` | catch-all parameter |
//!
//! Named parameters are dynamic path segments matching anything until the
//! next `/` or the path end:
//!
//! ```text
//! Path: /blog/{category}/{post}
//!
//! /blog/go/request-routers            match: category="go", post="request-routers"
//! /blog/go/request-routers/           no match, but a redirect is suggested
//! /blog/go/                           no match
//! ```
//!
//! Catch-all parameters match everything from the directory index (the `/`
//! before the catch-all) to the path end and must be the final segment:
//!
//! ```text
//! Path: /files/{filepath...}
//!
//! /files/                             match: filepath="/"
//! /files/templates/article.html       match: filepath="/templates/article.html"
//! /files                              no match, but a redirect is suggested
//! ```
//!
//! A request matches exactly one or no route; precedence questions between
//! overlapping patterns cannot arise because conflicting registrations are
//! rejected up front.
//!
//! ```
//! use radixmux::Router;
//! use radixmux::Params;
//! use http::Method;
//!
//! let mut router = Router::new();
//! router.get("/", "index");
//! router.get("/hello/{name}", "hello");
//!
//! let mut params = Params::new();
//! let (value, _) = router.lookup(&Method::GET, "/hello/world", Some(&mut params));
//! assert_eq!(value.copied(), Some("hello"));
//! assert_eq!(params.get("name"), Some("world"));
//! ```
//!
//! Routers can be composed behind path prefixes with
//! [`MultiRouter`], and served over HTTP with the types in [`server`].

pub mod multi;
pub mod params;
pub mod path;
pub mod router;
pub mod runtime_config;
pub mod server;
pub mod static_files;
pub mod tree;

pub use multi::MultiRouter;
pub use params::{Params, MATCHED_ROUTE_PATH};
pub use path::clean_path;
pub use router::{RouteOutcome, Router};
pub use runtime_config::RuntimeConfig;
pub use static_files::{serve_files, StaticFiles};
pub use tree::Node;
