//! # Router Module
//!
//! Per-method request dispatch on top of the radix [`crate::tree`].
//!
//! ## Overview
//!
//! A [`Router`] keeps one tree per HTTP method and is responsible for:
//! - Registering routes (`/users/{id}`, `/files/{path...}`) with their
//!   handlers, failing fast on conflicting or malformed registrations
//! - Resolving incoming `(method, path)` pairs to a handler plus captured
//!   parameters
//! - Producing the redirect, `405 Method Not Allowed` and automatic
//!   `OPTIONS` verdicts when no handler matches directly
//!
//! ## Dispatch policy
//!
//! [`Router::dispatch`] returns a [`RouteOutcome`] instead of writing a
//! response, so the wire layer stays separate:
//!
//! 1. A handler registered for the method and path wins outright.
//! 2. Otherwise, if the path is off by one trailing slash (or only by
//!    letter case / superfluous path elements), a permanent redirect to the
//!    canonical path is suggested: `301` for GET, `308` for everything
//!    else so the method and body survive. `CONNECT` and the root path are
//!    never redirected.
//! 3. `OPTIONS` requests are answered with the allowed-methods set when
//!    automatic OPTIONS handling is on.
//! 4. If other methods could serve the path, the outcome is
//!    method-not-allowed carrying a lexicographically sorted `Allow` list.
//! 5. Otherwise: not found.
//!
//! The router is built once during setup and then only read; concurrent
//! lookups are safe, interleaving registration with lookups is not.

mod core;

pub use core::{RouteOutcome, Router};
