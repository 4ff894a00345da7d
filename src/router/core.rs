// Dispatch sits on the request hot path; the happy path must not
// allocate beyond what the redirect and Allow verdicts themselves carry
#![deny(clippy::inefficient_to_string)]
#![deny(clippy::format_push_string)]
#![deny(clippy::unnecessary_to_owned)]

use std::collections::HashMap;

use http::{Method, StatusCode};
use tracing::{debug, warn};

use crate::params::{Params, MATCHED_ROUTE_PATH};
use crate::path::clean_path;
use crate::tree::{count_params, Node};

/// A route entry stored in the tree. Carries the handler and, when
/// [`Router::save_matched_route_path`] was set at registration time, the
/// route pattern to expose under [`MATCHED_ROUTE_PATH`].
struct Registration<T> {
    value: T,
    route_path: Option<Box<str>>,
}

/// Verdict of [`Router::dispatch`] for a single request.
///
/// Captured path parameters are written to the sink passed to `dispatch`;
/// the outcome only carries what the caller cannot recover from the router
/// itself.
pub enum RouteOutcome<'a, T> {
    /// A handler is registered for this method and path.
    Match {
        /// The registered handler.
        value: &'a T,
    },
    /// No handler, but `location` would match: respond with a permanent
    /// redirect. `code` is `301` for GET and `308` for all other methods.
    Redirect { location: String, code: StatusCode },
    /// Automatic `OPTIONS` answer; `allow` is the comma separated,
    /// lexicographically sorted method list for the `Allow` header.
    AutoOptions { allow: String },
    /// The path exists under other methods only; `allow` as above, minus
    /// the requested method.
    MethodNotAllowed { allow: String },
    /// Nothing matched.
    NotFound,
}

/// HTTP request router backed by one radix tree per method.
///
/// Routes use `{name}` for named parameters (one segment) and `{name...}`
/// for catch-alls (the rest of the path, only as the final segment). A
/// request can match exactly one or no route; ambiguous registrations are
/// rejected when they are added, not at lookup time.
///
/// All configuration flags default to on except
/// [`save_matched_route_path`](Self::save_matched_route_path).
pub struct Router<T> {
    trees: HashMap<Method, Node<Registration<T>>>,

    /// Route paths in registration order, for prefix-composition conflict
    /// checks.
    paths: Vec<String>,

    /// Widest parameter count over all registered routes; lookup sinks are
    /// pre-reserved to this size so capture never reallocates.
    max_params: usize,

    /// Cached `Allow` list for server-wide (`*`) OPTIONS requests.
    global_allowed: String,

    /// If enabled, routes registered from now on record their pattern and
    /// lookups expose it as the [`MATCHED_ROUTE_PATH`] parameter.
    pub save_matched_route_path: bool,

    /// Redirect (`301`/`308`) when the path with a trailing slash added or
    /// removed has a handler.
    pub redirect_trailing_slash: bool,

    /// Attempt to repair the path (clean superfluous elements, fix letter
    /// case) and redirect to the canonical route when nothing matches.
    pub redirect_fixed_path: bool,

    /// Answer with `405` and an `Allow` header when the path is registered
    /// under other methods.
    pub handle_method_not_allowed: bool,

    /// Answer `OPTIONS` requests automatically. Explicit OPTIONS routes
    /// take priority.
    pub handle_options: bool,

    /// Handler invoked on automatic OPTIONS replies, after the `Allow`
    /// header is determined.
    pub global_options: Option<T>,

    /// Handler invoked when no route matched.
    pub not_found: Option<T>,

    /// Handler invoked for method-not-allowed outcomes.
    pub method_not_allowed: Option<T>,
}

impl<T> Default for Router<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Router<T> {
    /// New router with path auto-correction (trailing slash and fixed-path
    /// redirects), `405` handling and automatic OPTIONS enabled.
    #[must_use]
    pub fn new() -> Self {
        Self {
            trees: HashMap::new(),
            paths: Vec::new(),
            max_params: 0,
            global_allowed: String::new(),
            save_matched_route_path: false,
            redirect_trailing_slash: true,
            redirect_fixed_path: true,
            handle_method_not_allowed: true,
            handle_options: true,
            global_options: None,
            not_found: None,
            method_not_allowed: None,
        }
    }

    /// Register a handler for the given method and route path.
    ///
    /// # Panics
    ///
    /// Panics when the path does not begin with `/`, when a wildcard is
    /// malformed, or when the route conflicts with or duplicates an
    /// existing registration. Registration errors are configuration bugs
    /// and abort setup.
    pub fn handle(&mut self, method: Method, path: &str, value: T) {
        if !path.starts_with('/') {
            panic!("path must begin with '/' in path '{path}'");
        }

        debug!(method = %method, path = %path, "route registered");

        let mut vars = count_params(path);
        if self.save_matched_route_path {
            vars += 1;
        }
        self.max_params = self.max_params.max(vars);

        let route_path = self
            .save_matched_route_path
            .then(|| Box::<str>::from(path));

        if !self.trees.contains_key(&method) {
            self.trees.insert(method.clone(), Node::default());
            self.global_allowed = self.allowed_methods("*", None);
        }
        let root = self
            .trees
            .get_mut(&method)
            .expect("tree exists for this method");
        root.add_route(path, Registration { value, route_path });

        if !self.paths.iter().any(|p| p == path) {
            self.paths.push(path.to_string());
        }
    }

    /// Shortcut for [`handle`](Self::handle) with [`Method::GET`].
    pub fn get(&mut self, path: &str, value: T) {
        self.handle(Method::GET, path, value);
    }

    /// Shortcut for [`handle`](Self::handle) with [`Method::HEAD`].
    pub fn head(&mut self, path: &str, value: T) {
        self.handle(Method::HEAD, path, value);
    }

    /// Shortcut for [`handle`](Self::handle) with [`Method::OPTIONS`].
    pub fn options(&mut self, path: &str, value: T) {
        self.handle(Method::OPTIONS, path, value);
    }

    /// Shortcut for [`handle`](Self::handle) with [`Method::POST`].
    pub fn post(&mut self, path: &str, value: T) {
        self.handle(Method::POST, path, value);
    }

    /// Shortcut for [`handle`](Self::handle) with [`Method::PUT`].
    pub fn put(&mut self, path: &str, value: T) {
        self.handle(Method::PUT, path, value);
    }

    /// Shortcut for [`handle`](Self::handle) with [`Method::PATCH`].
    pub fn patch(&mut self, path: &str, value: T) {
        self.handle(Method::PATCH, path, value);
    }

    /// Shortcut for [`handle`](Self::handle) with [`Method::DELETE`].
    pub fn delete(&mut self, path: &str, value: T) {
        self.handle(Method::DELETE, path, value);
    }

    /// All route paths registered so far, in registration order.
    pub(crate) fn paths(&self) -> &[String] {
        &self.paths
    }

    /// Manual lookup of a method + path combination, for building a
    /// framework around the router.
    ///
    /// Returns the registered handler, or `None` plus a hint telling
    /// whether a redirect to the path with the trailing slash toggled
    /// would succeed.
    pub fn lookup<'a>(
        &'a self,
        method: &Method,
        path: &'a str,
        params: Option<&mut Params<'a>>,
    ) -> (Option<&'a T>, bool) {
        match self.trees.get(method) {
            Some(root) => self.lookup_in(root, path, params),
            None => (None, false),
        }
    }

    fn lookup_in<'a>(
        &'a self,
        root: &'a Node<Registration<T>>,
        path: &'a str,
        params: Option<&mut Params<'a>>,
    ) -> (Option<&'a T>, bool) {
        match params {
            Some(ps) => {
                ps.reserve(self.max_params);
                let (reg, tsr) = root.get_value(path, Some(&mut *ps));
                match reg {
                    Some(reg) => {
                        if let Some(route_path) = &reg.route_path {
                            ps.push(MATCHED_ROUTE_PATH, route_path);
                        }
                        (Some(&reg.value), tsr)
                    }
                    None => {
                        // Discard partial captures from a failed walk
                        ps.clear();
                        (None, tsr)
                    }
                }
            }
            None => {
                let (reg, tsr) = root.get_value(path, None);
                (reg.map(|r| &r.value), tsr)
            }
        }
    }

    /// Comma separated list of methods that can serve `path`, excluding
    /// `req_method`, sorted lexicographically. Pass `*` for the
    /// server-wide set. Empty when no other method applies.
    #[must_use]
    pub fn allowed(&self, path: &str, req_method: &Method) -> String {
        self.allowed_methods(path, Some(req_method))
    }

    fn allowed_methods(&self, path: &str, req_method: Option<&Method>) -> String {
        let mut allowed: Vec<&str> = Vec::with_capacity(9);

        if path == "*" {
            // Server-wide; `req_method == None` recomputes the cache
            if req_method.is_some() {
                return self.global_allowed.clone();
            }
            for method in self.trees.keys() {
                if *method == Method::OPTIONS {
                    continue;
                }
                allowed.push(method.as_str());
            }
        } else {
            for (method, tree) in &self.trees {
                // Skip the requested method - it was already tried
                if Some(method) == req_method || *method == Method::OPTIONS {
                    continue;
                }
                let (value, _) = tree.get_value(path, None);
                if value.is_some() {
                    allowed.push(method.as_str());
                }
            }
        }

        if allowed.is_empty() {
            return String::new();
        }

        if self.handle_options {
            allowed.push("OPTIONS");
        }

        // The list is tiny, an insertion sort avoids extra allocations
        for i in 1..allowed.len() {
            let mut j = i;
            while j > 0 && allowed[j] < allowed[j - 1] {
                allowed.swap(j, j - 1);
                j -= 1;
            }
        }

        allowed.join(", ")
    }

    /// Resolve a request to its [`RouteOutcome`], applying the redirect,
    /// automatic OPTIONS and method-not-allowed policy.
    ///
    /// Captured parameters are written into `params` on a match; the sink
    /// is left empty otherwise.
    pub fn dispatch<'a>(
        &'a self,
        method: &Method,
        path: &'a str,
        params: &mut Params<'a>,
    ) -> RouteOutcome<'a, T> {
        if let Some(root) = self.trees.get(method) {
            let (value, tsr) = self.lookup_in(root, path, Some(params));
            if let Some(value) = value {
                debug!(method = %method, path = %path, "route matched");
                return RouteOutcome::Match { value };
            }

            if *method != Method::CONNECT && path != "/" {
                // 301 for GET; 308 keeps the method and body for the rest
                let code = if *method == Method::GET {
                    StatusCode::MOVED_PERMANENTLY
                } else {
                    StatusCode::PERMANENT_REDIRECT
                };

                if tsr && self.redirect_trailing_slash {
                    let location = if path.len() > 1 && path.ends_with('/') {
                        path[..path.len() - 1].to_string()
                    } else {
                        format!("{path}/")
                    };
                    debug!(
                        method = %method,
                        path = %path,
                        location = %location,
                        "trailing slash redirect"
                    );
                    return RouteOutcome::Redirect { location, code };
                }

                if self.redirect_fixed_path {
                    if let Some(fixed) =
                        root.find_case_insensitive_path(&clean_path(path), self.redirect_trailing_slash)
                    {
                        debug!(
                            method = %method,
                            path = %path,
                            location = %fixed,
                            "fixed path redirect"
                        );
                        return RouteOutcome::Redirect {
                            location: fixed,
                            code,
                        };
                    }
                }
            }
        }

        if *method == Method::OPTIONS && self.handle_options {
            let allow = self.allowed_methods(path, Some(&Method::OPTIONS));
            if !allow.is_empty() {
                return RouteOutcome::AutoOptions { allow };
            }
        } else if self.handle_method_not_allowed {
            let allow = self.allowed_methods(path, Some(method));
            if !allow.is_empty() {
                return RouteOutcome::MethodNotAllowed { allow };
            }
        }

        warn!(method = %method, path = %path, "no route matched");
        RouteOutcome::NotFound
    }
}
