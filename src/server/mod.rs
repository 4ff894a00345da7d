//! # Server Module
//!
//! HTTP wire layer for the router, built on `may_minihttp` and the `may`
//! coroutine runtime.
//!
//! ## Overview
//!
//! This module contains:
//! - [`Handler`], [`HandlerRequest`] and [`HandlerResponse`] - the handler
//!   contract for routes
//! - [`RouterService`] / [`MultiRouterService`] - `HttpService`
//!   implementations translating [`crate::router::RouteOutcome`] verdicts
//!   into wire responses; their `serve` methods bind an address and return
//!   a [`ServerHandle`]
//! - Request parsing (method, path, query string, headers) and response
//!   writing helpers
//!
//! ## Request flow
//!
//! ```text
//! HTTP connection -> RouterService -> Router -> Handler
//! ```
//!
//! Handlers run synchronously on the serving coroutine; there is no
//! internal scheduler. A panicking handler is caught and turned into a 500
//! response instead of tearing down the connection loop.
//!
//! Outcome mapping: matches invoke the handler; trailing-slash and
//! fixed-path verdicts become `301`/`308` responses with a `Location`
//! header; method-not-allowed and automatic OPTIONS set `Allow` before
//! invoking the router's collaborator (or a built-in reply); everything
//! else falls through to the not-found collaborator or a JSON 404.

mod request;
mod response;
mod service;

pub use request::{parse_query_params, parse_request, ParsedRequest};
pub use response::{write_handler_response, write_json_error};
pub use service::{
    handler, Handler, HandlerRequest, HandlerResponse, MultiRouterService, RouterService,
    ServerHandle,
};
