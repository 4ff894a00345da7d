use std::panic::{catch_unwind, AssertUnwindSafe};

use http::{Method, StatusCode};
use radixmux::{MultiRouter, Params, RouteOutcome, Router};

fn panic_text(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        String::new()
    }
}

#[test]
fn test_no_conflicts() {
    let mut multi = MultiRouter::new();

    let mut api = Router::new();
    api.get("/users/{id}", "api_user");
    api.get("/files/{filepath...}", "api_files");
    multi.register_group("/api", api);

    let admin = multi.new_group("/admin");
    admin.get("/dashboard", "dashboard");
    admin.get("/users", "admin_users");

    let mut default = Router::new();
    default.get("/home", "home");
    default.get("/about", "about");
    multi.set_default(default);
}

#[test]
fn test_default_router_conflicts_with_group() {
    let mut multi: MultiRouter<&'static str> = MultiRouter::new();
    let admin = multi.new_group("/admin");
    admin.get("/users", "admin_users");

    let mut default = Router::new();
    default.get("/admin/dashboard", "dashboard");

    let err = catch_unwind(AssertUnwindSafe(|| multi.set_default(default)))
        .expect_err("expected panic for conflicting default route");
    let msg = panic_text(err);
    assert!(
        msg.contains("ROUTE CONFLICT") && msg.contains("/admin/dashboard"),
        "unexpected conflict message: {msg}"
    );
}

#[test]
fn test_group_conflicts_with_existing_group() {
    let mut multi = MultiRouter::new();

    let mut api = Router::new();
    api.get("/admin/users", "api_admin_users"); // full path /api/admin/users
    multi.register_group("/api", api);

    let mut admin = Router::new();
    admin.get("/users", "users"); // would also be /api/admin/users

    let err = catch_unwind(AssertUnwindSafe(|| {
        multi.register_group("/api/admin", admin);
    }))
    .expect_err("expected panic for conflicting group");
    assert!(panic_text(err).contains("GROUP CONFLICT"));
}

#[test]
fn test_new_group_conflicts_with_existing_route() {
    let mut multi = MultiRouter::new();

    let mut api = Router::new();
    api.get("/v2/users", "v2_users"); // full path /api/v2/users
    multi.register_group("/api", api);

    let mut v2 = Router::new();
    v2.get("/users", "users"); // would also be /api/v2/users

    let err = catch_unwind(AssertUnwindSafe(|| {
        multi.register_group("/api/v2", v2);
    }))
    .expect_err("expected panic for conflicting new group");
    assert!(panic_text(err).contains("GROUP CONFLICT"));
}

#[test]
fn test_multiple_default_conflicts_reports_first() {
    let mut multi: MultiRouter<&'static str> = MultiRouter::new();

    multi.new_group("/api").get("/users", "api_users");
    multi.new_group("/admin").get("/dashboard", "dashboard");

    let mut default = Router::new();
    default.get("/api/files", "api_files"); // conflicts with /api
    default.get("/admin/users", "admin_users"); // conflicts with /admin
    default.get("/home", "home"); // no conflict

    let err = catch_unwind(AssertUnwindSafe(|| multi.set_default(default)))
        .expect_err("expected panic for conflicting default routes");
    let msg = panic_text(err);
    assert!(
        msg.contains("ROUTE CONFLICT") && msg.contains("/api/files"),
        "expected the first conflict (/api/files), got: {msg}"
    );
}

#[test]
fn test_catch_all_routes_do_not_conflict() {
    let mut multi = MultiRouter::new();

    let mut api = Router::new();
    api.get("/files/{filepath...}", "api_files");
    multi.register_group("/api", api);

    multi.new_group("/admin").get("/logs/{logpath...}", "admin_logs");

    let mut default = Router::new();
    default.get("/{path...}", "spa");
    multi.set_default(default);
}

#[test]
fn test_deep_nesting_conflict() {
    let mut multi = MultiRouter::new();

    let mut api = Router::new();
    api.get("/v1/admin/users/profile", "profile");
    multi.register_group("/api", api);

    let mut v1 = Router::new();
    v1.get("/admin/users/profile", "profile2");

    let err = catch_unwind(AssertUnwindSafe(|| {
        multi.register_group("/api/v1", v1);
    }))
    .expect_err("expected panic for deeply nested conflict");
    assert!(panic_text(err).contains("GROUP CONFLICT"));
}

#[test]
fn test_empty_groups_do_not_conflict() {
    let mut multi: MultiRouter<&'static str> = MultiRouter::new();
    multi.new_group("/api");
    multi.new_group("/admin");
    multi.new_group("/v1");

    let mut default = Router::new();
    default.get("/home", "home");
    multi.set_default(default);
}

#[test]
fn test_root_group_and_default_coexist() {
    let mut multi = MultiRouter::new();

    let mut root = Router::new();
    root.get("/users", "root_users");
    multi.register_group("/", root);

    let mut default = Router::new();
    default.get("/admin", "default_admin");
    multi.set_default(default);
}

#[test]
fn test_prefix_normalization() {
    let mut multi = MultiRouter::new();

    let mut api = Router::new();
    api.get("/users", "api_users");
    multi.register_group("api", api); // no leading slash

    let mut admin = Router::new();
    admin.get("/dashboard", "dashboard");
    multi.register_group("/admin/", admin); // trailing slash stripped

    assert!(multi.group("/api").is_some());
    assert!(multi.group("/admin").is_some());

    let mut params = Params::new();
    let (outcome, _, seen) = multi.dispatch(&Method::GET, "/api/users", &mut params);
    assert!(matches!(outcome, RouteOutcome::Match { value } if *value == "api_users"));
    assert_eq!(seen, "/users");
}

#[test]
fn test_dispatch_strips_prefix() {
    let mut multi = MultiRouter::new();

    let mut api = Router::new();
    api.get("/users/{id}", "api_user");
    multi.register_group("/api", api);

    let mut default = Router::new();
    default.get("/home", "home");
    multi.set_default(default);

    let mut params = Params::new();
    let (outcome, router, seen) = multi.dispatch(&Method::GET, "/api/users/7", &mut params);
    assert!(matches!(outcome, RouteOutcome::Match { value } if *value == "api_user"));
    assert!(router.is_some());
    assert_eq!(seen, "/users/7");
    assert_eq!(params.get("id"), Some("7"));

    params.clear();
    let (outcome, _, seen) = multi.dispatch(&Method::GET, "/home", &mut params);
    assert!(matches!(outcome, RouteOutcome::Match { value } if *value == "home"));
    assert_eq!(seen, "/home");
}

#[test]
fn test_dispatch_longest_prefix_wins() {
    let mut multi = MultiRouter::new();
    multi.new_group("/api").get("/users", "api_users");
    multi.new_group("/api/v2").get("/users", "v2_users");

    let mut params = Params::new();
    let (outcome, _, _) = multi.dispatch(&Method::GET, "/api/v2/users", &mut params);
    assert!(matches!(outcome, RouteOutcome::Match { value } if *value == "v2_users"));

    let (outcome, _, _) = multi.dispatch(&Method::GET, "/api/users", &mut params);
    assert!(matches!(outcome, RouteOutcome::Match { value } if *value == "api_users"));
}

#[test]
fn test_dispatch_prefix_respects_segment_boundary() {
    let mut multi = MultiRouter::new();
    multi.new_group("/admin").get("/users", "admin_users");

    let mut default = Router::new();
    default.get("/administrator", "administrator");
    multi.set_default(default);

    let mut params = Params::new();
    let (outcome, _, seen) = multi.dispatch(&Method::GET, "/administrator", &mut params);
    assert!(matches!(outcome, RouteOutcome::Match { value } if *value == "administrator"));
    assert_eq!(seen, "/administrator");
}

#[test]
fn test_dispatch_prefix_only_becomes_root() {
    let mut multi = MultiRouter::new();
    multi.new_group("/api").get("/", "api_index");

    let mut params = Params::new();
    let (outcome, _, seen) = multi.dispatch(&Method::GET, "/api", &mut params);
    assert!(matches!(outcome, RouteOutcome::Match { value } if *value == "api_index"));
    assert_eq!(seen, "/");
}

#[test]
fn test_dispatch_reprefixes_group_redirects() {
    let mut multi = MultiRouter::new();
    multi.new_group("/api").get("/users/", "users_index");

    let mut params = Params::new();
    match multi.dispatch(&Method::GET, "/api/users", &mut params) {
        (RouteOutcome::Redirect { location, code }, _, _) => {
            assert_eq!(location, "/api/users/");
            assert_eq!(code, StatusCode::MOVED_PERMANENTLY);
        }
        _ => panic!("expected redirect"),
    }
}

#[test]
fn test_dispatch_falls_back_to_root_group() {
    let mut multi = MultiRouter::new();
    multi.new_group("/api").get("/users", "api_users");
    multi.new_group("/").get("/landing", "landing");

    let mut params = Params::new();
    let (outcome, _, _) = multi.dispatch(&Method::GET, "/landing", &mut params);
    assert!(matches!(outcome, RouteOutcome::Match { value } if *value == "landing"));
}

#[test]
fn test_dispatch_without_match_or_default() {
    let mut multi: MultiRouter<&'static str> = MultiRouter::new();
    multi.new_group("/api").get("/users", "api_users");

    let mut params = Params::new();
    let (outcome, router, _) = multi.dispatch(&Method::GET, "/elsewhere", &mut params);
    assert!(matches!(outcome, RouteOutcome::NotFound));
    assert!(router.is_none());
}

#[test]
fn test_register_default_conflict() {
    let mut multi: MultiRouter<&'static str> = MultiRouter::new();
    multi.new_group("/api").get("/users", "api_users");

    let err = catch_unwind(AssertUnwindSafe(|| {
        multi.register_default(Method::GET, "/api/x", "bad");
    }))
    .expect_err("expected panic for shadowed default route");
    assert!(panic_text(err).contains("ROUTE CONFLICT"));
}

#[test]
fn test_register_default_creates_router() {
    let mut multi = MultiRouter::new();
    multi.register_default(Method::GET, "/home", "home");

    let mut params = Params::new();
    let (outcome, _, _) = multi.dispatch(&Method::GET, "/home", &mut params);
    assert!(matches!(outcome, RouteOutcome::Match { value } if *value == "home"));
}
