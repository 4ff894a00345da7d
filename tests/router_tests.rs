use http::{Method, StatusCode};
use radixmux::{Params, RouteOutcome, Router};

fn lookup_route<'a>(router: &'a Router<&'static str>, path: &'a str) -> Option<&'static str> {
    router.lookup(&Method::GET, path, None).0.copied()
}

#[test]
fn test_static_route_set() {
    let mut router = Router::new();
    for route in [
        "/a", "/hi", "/contact", "/co", "/c", "/ab", "/doc/", "/doc/go_faq.html",
        "/doc/go1.html",
    ] {
        router.get(route, route);
    }

    assert_eq!(lookup_route(&router, "/co"), Some("/co"));
    let (value, tsr) = router.lookup(&Method::GET, "/con", None);
    assert!(value.is_none() && !tsr);

    let (value, tsr) = router.lookup(&Method::GET, "/doc", None);
    assert!(value.is_none());
    assert!(tsr, "expected TSR for /doc");
}

#[test]
fn test_param_and_trailing_slash_routes() {
    let mut router = Router::new();
    router.get("/search/{query}", "search_query");
    router.get("/search/", "search_index");

    let mut params = Params::new();
    let (value, _) = router.lookup(&Method::GET, "/search/foo", Some(&mut params));
    assert_eq!(value.copied(), Some("search_query"));
    assert_eq!(params.get("query"), Some("foo"));

    let (value, _) = router.lookup(&Method::GET, "/search/", None);
    assert_eq!(value.copied(), Some("search_index"));

    let (value, tsr) = router.lookup(&Method::GET, "/search/foo/", None);
    assert!(value.is_none());
    assert!(tsr);
}

#[test]
fn test_catch_all_routes() {
    let mut router = Router::new();
    router.get("/src/{filepath...}", "src_files");

    let mut params = Params::new();
    let (value, _) = router.lookup(&Method::GET, "/src/", Some(&mut params));
    assert_eq!(value.copied(), Some("src_files"));
    assert_eq!(params.get("filepath"), Some("/"));

    params.clear();
    let (value, _) = router.lookup(&Method::GET, "/src/a/b.png", Some(&mut params));
    assert_eq!(value.copied(), Some("src_files"));
    assert_eq!(params.get("filepath"), Some("/a/b.png"));

    let (value, tsr) = router.lookup(&Method::GET, "/src", None);
    assert!(value.is_none());
    assert!(tsr, "expected TSR for /src");
}

#[test]
fn test_mid_segment_params() {
    let mut router = Router::new();
    router.get("/user_{name}", "user");
    router.get("/user_{name}/about", "user_about");

    let mut params = Params::new();
    let (value, _) = router.lookup(&Method::GET, "/user_gopher/about", Some(&mut params));
    assert_eq!(value.copied(), Some("user_about"));
    assert_eq!(params.get("name"), Some("gopher"));
}

#[test]
fn test_dispatch_policy_end_to_end() {
    let mut router = Router::new();
    router.get("/resource", "get_resource");
    router.post("/resource", "post_resource");
    router.get("/ABOUT/", "about");

    let mut params = Params::new();

    // Trailing slash, GET: 301
    match router.dispatch(&Method::GET, "/resource/", &mut params) {
        RouteOutcome::Redirect { location, code } => {
            assert_eq!(location, "/resource");
            assert_eq!(code, StatusCode::MOVED_PERMANENTLY);
        }
        _ => panic!("expected redirect"),
    }

    // Trailing slash, POST: 308
    match router.dispatch(&Method::POST, "/resource/", &mut params) {
        RouteOutcome::Redirect { code, .. } => {
            assert_eq!(code, StatusCode::PERMANENT_REDIRECT)
        }
        _ => panic!("expected redirect"),
    }

    // Case repair on the cleaned path
    match router.dispatch(&Method::GET, "//about", &mut params) {
        RouteOutcome::Redirect { location, .. } => assert_eq!(location, "/ABOUT/"),
        _ => panic!("expected fixed-path redirect"),
    }

    // 405 with sorted Allow
    match router.dispatch(&Method::DELETE, "/resource", &mut params) {
        RouteOutcome::MethodNotAllowed { allow } => {
            assert_eq!(allow, "GET, OPTIONS, POST");
        }
        _ => panic!("expected method-not-allowed"),
    }

    // Automatic OPTIONS
    match router.dispatch(&Method::OPTIONS, "/resource", &mut params) {
        RouteOutcome::AutoOptions { allow } => assert_eq!(allow, "GET, OPTIONS, POST"),
        _ => panic!("expected auto OPTIONS"),
    }

    // Plain miss
    assert!(matches!(
        router.dispatch(&Method::GET, "/missing", &mut params),
        RouteOutcome::NotFound
    ));
}

#[test]
fn test_all_method_shortcuts() {
    let mut router = Router::new();
    router.get("/r", "get");
    router.head("/r", "head");
    router.options("/r", "options");
    router.post("/r", "post");
    router.put("/r", "put");
    router.patch("/r", "patch");
    router.delete("/r", "delete");

    for (method, want) in [
        (Method::GET, "get"),
        (Method::HEAD, "head"),
        (Method::OPTIONS, "options"),
        (Method::POST, "post"),
        (Method::PUT, "put"),
        (Method::PATCH, "patch"),
        (Method::DELETE, "delete"),
    ] {
        let (value, _) = router.lookup(&method, "/r", None);
        assert_eq!(value.copied(), Some(want), "method {method}");
    }
}

#[test]
fn test_custom_method() {
    let mut router = Router::new();
    let method: Method = "PURGE".parse().unwrap();
    router.handle(method.clone(), "/cache/{key}", "purge_cache");

    let mut params = Params::new();
    let (value, _) = router.lookup(&method, "/cache/users", Some(&mut params));
    assert_eq!(value.copied(), Some("purge_cache"));
    assert_eq!(params.get("key"), Some("users"));
}

#[test]
fn test_duplicate_registration_panics() {
    let result = std::panic::catch_unwind(|| {
        let mut router = Router::new();
        router.get("/same", "first");
        router.get("/same", "second");
    });
    assert!(result.is_err());
}

#[test]
fn test_conflicting_registrations_panic() {
    // Static after wildcard at the same position
    let result = std::panic::catch_unwind(|| {
        let mut router = Router::new();
        router.get("/{a}", "param");
        router.get("/x", "static");
    });
    assert!(result.is_err());

    // Different wildcard names at the same position
    let result = std::panic::catch_unwind(|| {
        let mut router = Router::new();
        router.get("/v/{a}", "a");
        router.get("/v/{b}", "b");
    });
    assert!(result.is_err());

    // Catch-all not terminal
    let result = std::panic::catch_unwind(|| {
        let mut router = Router::new();
        router.get("/files/{p...}/x", "bad");
    });
    assert!(result.is_err());
}

#[test]
fn test_method_isolation() {
    let mut router = Router::new();
    router.get("/thing", "get_thing");

    let (value, tsr) = router.lookup(&Method::POST, "/thing", None);
    assert!(value.is_none());
    assert!(!tsr);
}
