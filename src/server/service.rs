use std::collections::HashMap;
use std::io;
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Once};
use std::thread;
use std::time::{Duration, Instant};

use http::Method;
use may::coroutine::JoinHandle;
use may_minihttp::{HttpService, Request, Response};
use serde::Serialize;
use serde_json::Value;
use tracing::error;

use super::request::{parse_request, ParsedRequest};
use super::response::{write_allow, write_handler_response, write_json_error, write_redirect};
use crate::multi::MultiRouter;
use crate::params::Params;
use crate::router::{RouteOutcome, Router};
use crate::runtime_config::RuntimeConfig;

/// Request data passed to a route handler.
#[derive(Debug, Clone)]
pub struct HandlerRequest {
    pub method: Method,
    /// The path the owning router matched against. For a group router
    /// behind a [`MultiRouter`] prefix this is the stripped path.
    pub path: String,
    /// Parameters captured from the route's wildcards.
    pub path_params: HashMap<String, String>,
    pub query_params: HashMap<String, String>,
    /// Header names are lowercased.
    pub headers: HashMap<String, String>,
}

impl HandlerRequest {
    /// Get a captured path parameter by name.
    #[must_use]
    pub fn path_param(&self, name: &str) -> Option<&str> {
        self.path_params.get(name).map(String::as_str)
    }
}

/// Response produced by a route handler.
#[derive(Debug, Clone, Serialize)]
pub struct HandlerResponse {
    /// HTTP status code (200, 404, 500, ...)
    pub status: u16,
    /// Additional response headers.
    #[serde(skip_serializing)]
    pub headers: HashMap<String, String>,
    /// Response body; serialized as JSON unless it is a plain string.
    pub body: Value,
    /// Raw body bytes for non-JSON payloads (file serving); takes
    /// precedence over `body` when set. The content type must be supplied
    /// via `headers`.
    #[serde(skip_serializing)]
    pub raw: Option<Vec<u8>>,
}

impl HandlerResponse {
    /// JSON response with the given status.
    #[must_use]
    pub fn json(status: u16, body: Value) -> Self {
        Self {
            status,
            headers: HashMap::new(),
            body,
            raw: None,
        }
    }

    /// `200 OK` JSON response.
    #[must_use]
    pub fn ok_json(body: Value) -> Self {
        Self::json(200, body)
    }

    /// Raw byte response with an explicit content type.
    #[must_use]
    pub fn raw(status: u16, content_type: &str, bytes: Vec<u8>) -> Self {
        let mut headers = HashMap::new();
        headers.insert("Content-Type".to_string(), content_type.to_string());
        Self {
            status,
            headers,
            body: Value::Null,
            raw: Some(bytes),
        }
    }
}

/// A route handler. Runs synchronously on the serving coroutine.
pub type Handler = Arc<dyn Fn(&HandlerRequest) -> HandlerResponse + Send + Sync>;

/// Wrap a closure into a [`Handler`].
pub fn handler<F>(f: F) -> Handler
where
    F: Fn(&HandlerRequest) -> HandlerResponse + Send + Sync + 'static,
{
    Arc::new(f)
}

static RUNTIME_INIT: Once = Once::new();

/// Handle to a running service, returned by [`RouterService::serve`] and
/// [`MultiRouterService::serve`].
pub struct ServerHandle {
    addr: SocketAddr,
    accept_loop: JoinHandle<()>,
}

impl ServerHandle {
    /// The address the service is listening on.
    #[must_use]
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Block until the listener accepts TCP connections, up to half a
    /// second.
    pub fn wait_ready(&self) -> io::Result<()> {
        let deadline = Instant::now() + Duration::from_millis(500);
        while TcpStream::connect(self.addr).is_err() {
            if Instant::now() > deadline {
                return Err(io::Error::new(
                    io::ErrorKind::TimedOut,
                    "listener did not come up",
                ));
            }
            thread::sleep(Duration::from_millis(10));
        }
        Ok(())
    }

    /// Tear down the accept loop. Connections in flight are dropped; the
    /// routing tables are untouched and can be served again.
    pub fn stop(self) {
        unsafe { self.accept_loop.coroutine().cancel() };
        self.accept_loop.join().ok();
    }
}

/// Bind `addr` and run `service` on the coroutine runtime. Coroutine
/// stacks are sized from [`RuntimeConfig`] once per process, before the
/// first listener spawns.
fn start_service<S>(service: S, addr: impl ToSocketAddrs) -> io::Result<ServerHandle>
where
    S: HttpService + Clone + Send + Sync + 'static,
{
    RUNTIME_INIT.call_once(|| {
        may::config().set_stack_size(RuntimeConfig::from_env().stack_size);
    });

    let addr = addr
        .to_socket_addrs()?
        .next()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "unresolvable bind address"))?;
    let accept_loop = may_minihttp::HttpServer(service).start(addr)?;
    Ok(ServerHandle { addr, accept_loop })
}

/// `HttpService` serving a single [`Router`].
#[derive(Clone)]
pub struct RouterService(pub Arc<Router<Handler>>);

impl RouterService {
    #[must_use]
    pub fn new(router: Router<Handler>) -> Self {
        Self(Arc::new(router))
    }

    /// Serve this router over HTTP.
    ///
    /// # Errors
    ///
    /// Returns an error when `addr` does not resolve or cannot be bound.
    pub fn serve<A: ToSocketAddrs>(self, addr: A) -> io::Result<ServerHandle> {
        start_service(self, addr)
    }
}

impl HttpService for RouterService {
    fn call(&mut self, req: Request, res: &mut Response) -> io::Result<()> {
        let parsed = match parse_request(&req) {
            Ok(parsed) => parsed,
            Err(_) => {
                write_json_error(res, 400, serde_json::json!({ "error": "Bad Request" }));
                return Ok(());
            }
        };

        let mut params = Params::new();
        let outcome = self.0.dispatch(&parsed.method, &parsed.path, &mut params);
        finish(&self.0, &parsed, &parsed.path, outcome, &params, res);
        Ok(())
    }
}

/// `HttpService` serving a [`MultiRouter`] composition.
#[derive(Clone)]
pub struct MultiRouterService(pub Arc<MultiRouter<Handler>>);

impl MultiRouterService {
    #[must_use]
    pub fn new(multi: MultiRouter<Handler>) -> Self {
        Self(Arc::new(multi))
    }

    /// Serve this composition over HTTP.
    ///
    /// # Errors
    ///
    /// Returns an error when `addr` does not resolve or cannot be bound.
    pub fn serve<A: ToSocketAddrs>(self, addr: A) -> io::Result<ServerHandle> {
        start_service(self, addr)
    }
}

impl HttpService for MultiRouterService {
    fn call(&mut self, req: Request, res: &mut Response) -> io::Result<()> {
        let parsed = match parse_request(&req) {
            Ok(parsed) => parsed,
            Err(_) => {
                write_json_error(res, 400, serde_json::json!({ "error": "Bad Request" }));
                return Ok(());
            }
        };

        let mut params = Params::new();
        let (outcome, router, seen_path) =
            self.0.dispatch(&parsed.method, &parsed.path, &mut params);
        match router {
            Some(router) => finish(router, &parsed, seen_path, outcome, &params, res),
            None => not_found(&parsed, res),
        }
        Ok(())
    }
}

/// Translate a dispatch outcome into a wire response, consulting the
/// router's collaborator slots.
fn finish(
    router: &Router<Handler>,
    parsed: &ParsedRequest,
    seen_path: &str,
    outcome: RouteOutcome<'_, Handler>,
    params: &Params<'_>,
    res: &mut Response,
) {
    match outcome {
        RouteOutcome::Match { value } => invoke(value, parsed, seen_path, params, res),
        RouteOutcome::Redirect { location, code } => write_redirect(res, &location, code),
        RouteOutcome::AutoOptions { allow } => {
            write_allow(res, &allow);
            match &router.global_options {
                Some(h) => invoke(h, parsed, seen_path, params, res),
                None => {
                    res.status_code(200, "OK");
                }
            }
        }
        RouteOutcome::MethodNotAllowed { allow } => {
            write_allow(res, &allow);
            match &router.method_not_allowed {
                Some(h) => invoke(h, parsed, seen_path, params, res),
                None => write_json_error(
                    res,
                    405,
                    serde_json::json!({ "error": "Method Not Allowed" }),
                ),
            }
        }
        RouteOutcome::NotFound => match &router.not_found {
            Some(h) => invoke(h, parsed, seen_path, params, res),
            None => not_found(parsed, res),
        },
    }
}

fn not_found(parsed: &ParsedRequest, res: &mut Response) {
    write_json_error(
        res,
        404,
        serde_json::json!({
            "error": "Not Found",
            "method": parsed.method.as_str(),
            "path": parsed.path,
        }),
    );
}

fn invoke(
    handler: &Handler,
    parsed: &ParsedRequest,
    seen_path: &str,
    params: &Params<'_>,
    res: &mut Response,
) {
    let request = HandlerRequest {
        method: parsed.method.clone(),
        path: seen_path.to_string(),
        path_params: params
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
        query_params: parsed.query_params.clone(),
        headers: parsed.headers.clone(),
    };

    match catch_unwind(AssertUnwindSafe(|| handler(&request))) {
        Ok(response) => write_handler_response(res, &response),
        Err(panic) => {
            let panic_message = format!("{panic:?}");
            error!(
                method = %request.method,
                path = %request.path,
                panic_message = %panic_message,
                "handler panicked"
            );
            write_json_error(
                res,
                500,
                serde_json::json!({
                    "error": "Handler panicked",
                    "details": panic_message,
                }),
            );
        }
    }
}
