//! # MultiRouter Module
//!
//! Composition of independent [`Router`]s behind path prefixes.
//!
//! A [`MultiRouter`] forwards each request to the router registered for the
//! longest matching prefix, stripping the prefix from the path first (a
//! path stripped to nothing becomes `/`). Prefix matching respects segment
//! boundaries: `/admin` never captures `/administrator`. The outer path is
//! only borrowed, so downstream observers keep seeing the original request
//! path once dispatch returns.
//!
//! Shadowing is detected when groups are registered, not at dispatch time:
//! a group whose full route paths would fall under another group's prefix,
//! or a default-router route reachable only through a group prefix, aborts
//! setup with a diagnostic naming both parties.

use std::collections::HashMap;

use http::Method;
use tracing::debug;

use crate::params::Params;
use crate::router::{RouteOutcome, Router};

/// Routes requests to different routers based on path prefixes.
///
/// Lookup order: longest matching group prefix, then the root (`/`) group,
/// then the default router.
pub struct MultiRouter<T> {
    groups: HashMap<String, Router<T>>,
    /// Prefixes sorted by descending length; ties keep registration order.
    prefix_order: Vec<String>,
    default_router: Option<Router<T>>,
}

impl<T> Default for MultiRouter<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Ensure a leading `/` and strip the trailing one, except for `/` itself.
fn normalize_prefix(prefix: &str) -> String {
    let mut p = if prefix.starts_with('/') {
        prefix.to_string()
    } else {
        format!("/{prefix}")
    };
    while p.len() > 1 && p.ends_with('/') {
        p.pop();
    }
    p
}

/// True when `prefix` covers `path` up to a segment boundary.
fn path_has_prefix(path: &str, prefix: &str) -> bool {
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

impl<T> MultiRouter<T> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            groups: HashMap::new(),
            prefix_order: Vec::new(),
            default_router: None,
        }
    }

    /// Register `router` under a path prefix.
    ///
    /// The prefix is normalized (leading `/` added, trailing `/` stripped)
    /// before registration. Registering the same prefix again replaces the
    /// group.
    ///
    /// # Panics
    ///
    /// Panics with a group-conflict diagnostic when any route of the new
    /// group would be claimed by an existing group, or when an existing
    /// group's route would be claimed by the new prefix.
    pub fn register_group(&mut self, prefix: &str, router: Router<T>) {
        let prefix = normalize_prefix(prefix);

        // Routes of the new group must not reach into another group
        for path in router.paths() {
            let full_path = format!("{prefix}{path}");
            for existing in self.groups.keys() {
                if existing != "/"
                    && *existing != prefix
                    && full_path.starts_with(existing.as_str())
                {
                    panic!(
                        "GROUP CONFLICT: group '{prefix}' route '{path}' (full path: '{full_path}') conflicts with existing group '{existing}'"
                    );
                }
            }
        }

        // Existing group routes must not fall under the new prefix
        for (existing, existing_router) in &self.groups {
            if existing == "/" || *existing == prefix {
                continue;
            }
            for existing_path in existing_router.paths() {
                let full_existing = format!("{existing}{existing_path}");
                if full_existing.starts_with(&prefix) {
                    panic!(
                        "GROUP CONFLICT: new group '{prefix}' conflicts with existing route '{full_existing}' in group '{existing}'"
                    );
                }
            }
        }

        debug!(prefix = %prefix, "group registered");

        if self.groups.insert(prefix.clone(), router).is_none() {
            self.prefix_order.push(prefix);
            self.prefix_order.sort_by(|a, b| b.len().cmp(&a.len()));
        }
    }

    /// Register an empty router under `prefix` and return it for route
    /// registration.
    pub fn new_group(&mut self, prefix: &str) -> &mut Router<T> {
        let prefix = normalize_prefix(prefix);
        self.register_group(&prefix, Router::new());
        self.groups.get_mut(&prefix).expect("group just registered")
    }

    /// The router registered under `prefix`, if any.
    #[must_use]
    pub fn group(&self, prefix: &str) -> Option<&Router<T>> {
        self.groups.get(&normalize_prefix(prefix))
    }

    /// Mutable access to the router registered under `prefix`.
    pub fn group_mut(&mut self, prefix: &str) -> Option<&mut Router<T>> {
        self.groups.get_mut(&normalize_prefix(prefix))
    }

    /// Set the fallback router for paths no group covers.
    ///
    /// # Panics
    ///
    /// Panics with a route-conflict diagnostic when the router carries a
    /// route that a registered group prefix would shadow.
    pub fn set_default(&mut self, router: Router<T>) {
        for path in router.paths() {
            for prefix in &self.prefix_order {
                if prefix != "/" && path.starts_with(prefix.as_str()) {
                    panic!(
                        "ROUTE CONFLICT: default router has route '{path}' which conflicts with group '{prefix}'! Move it to that group instead."
                    );
                }
            }
        }
        self.default_router = Some(router);
    }

    /// The fallback router, if one was set.
    #[must_use]
    pub fn default_router(&self) -> Option<&Router<T>> {
        self.default_router.as_ref()
    }

    /// Register a route on the default router, creating it if needed.
    ///
    /// # Panics
    ///
    /// Panics with a route-conflict diagnostic when `path` falls under a
    /// registered group prefix, and propagates the default router's own
    /// registration failures.
    pub fn register_default(&mut self, method: Method, path: &str, value: T) {
        for prefix in &self.prefix_order {
            if prefix != "/" && path.starts_with(prefix.as_str()) {
                panic!("ROUTE CONFLICT: cannot register '{path}' - conflicts with group '{prefix}'");
            }
        }
        self.default_router
            .get_or_insert_with(Router::new)
            .handle(method, path, value);
    }

    /// Resolve a request against the composed routers.
    ///
    /// Returns the selected router's [`RouteOutcome`], the router itself
    /// (whose collaborator slots apply to the outcome), and the path that
    /// router saw - the request path with the group prefix stripped, never
    /// empty. Redirect locations produced by a group are re-prefixed so
    /// they stay valid for the outer request path.
    pub fn dispatch<'a>(
        &'a self,
        method: &Method,
        path: &'a str,
        params: &mut Params<'a>,
    ) -> (RouteOutcome<'a, T>, Option<&'a Router<T>>, &'a str) {
        for prefix in &self.prefix_order {
            if prefix == "/" {
                continue;
            }
            if !path_has_prefix(path, prefix) {
                continue;
            }

            let router = &self.groups[prefix.as_str()];
            let rest = &path[prefix.len()..];
            let stripped = if rest.is_empty() { "/" } else { rest };

            debug!(prefix = %prefix, stripped = %stripped, "group dispatch");

            let outcome = match router.dispatch(method, stripped, params) {
                // The group computed its redirect against the stripped
                // path; put the prefix back
                RouteOutcome::Redirect { location, code } => RouteOutcome::Redirect {
                    location: format!("{prefix}{location}"),
                    code,
                },
                other => other,
            };
            return (outcome, Some(router), stripped);
        }

        if let Some(root) = self.groups.get("/") {
            return (root.dispatch(method, path, params), Some(root), path);
        }

        if let Some(default) = &self.default_router {
            return (default.dispatch(method, path, params), Some(default), path);
        }

        (RouteOutcome::NotFound, None, path)
    }
}
