use criterion::{black_box, criterion_group, criterion_main, Criterion};
use http::Method;
use radixmux::{Params, Router};

/// A route set shaped like a real REST API: shared prefixes, parameters at
/// several depths, one catch-all.
fn api_router() -> Router<usize> {
    let mut router = Router::new();
    let routes = [
        "/",
        "/cmd/{tool}/{sub}",
        "/cmd/{tool}/",
        "/src/{filepath...}",
        "/search/",
        "/search/{query}",
        "/user_{name}",
        "/user_{name}/about",
        "/files/{dir}/{filepath...}",
        "/doc/",
        "/doc/go_faq.html",
        "/doc/go1.html",
        "/info/{user}/public",
        "/info/{user}/project/{project}",
        "/api/v1/users",
        "/api/v1/users/{id}",
        "/api/v1/users/{id}/posts",
        "/api/v1/users/{id}/posts/{post_id}",
        "/api/v1/orders/{order_id}/items/{item_id}",
        "/api/v2/products",
        "/api/v2/products/{sku}",
    ];
    for (i, route) in routes.iter().enumerate() {
        router.get(route, i);
    }
    router
}

fn bench_lookup(c: &mut Criterion) {
    let router = api_router();

    c.bench_function("lookup_static", |b| {
        b.iter(|| {
            let (value, _) = router.lookup(&Method::GET, black_box("/doc/go1.html"), None);
            black_box(value)
        })
    });

    c.bench_function("lookup_one_param", |b| {
        let mut params = Params::new();
        b.iter(|| {
            params.clear();
            let (value, _) = router.lookup(
                &Method::GET,
                black_box("/api/v1/users/12345"),
                Some(&mut params),
            );
            black_box(value)
        })
    });

    c.bench_function("lookup_two_params", |b| {
        let mut params = Params::new();
        b.iter(|| {
            params.clear();
            let (value, _) = router.lookup(
                &Method::GET,
                black_box("/api/v1/users/12345/posts/67890"),
                Some(&mut params),
            );
            black_box(value)
        })
    });

    c.bench_function("lookup_catch_all", |b| {
        let mut params = Params::new();
        b.iter(|| {
            params.clear();
            let (value, _) = router.lookup(
                &Method::GET,
                black_box("/src/some/deep/dir/file.png"),
                Some(&mut params),
            );
            black_box(value)
        })
    });

    c.bench_function("lookup_miss", |b| {
        b.iter(|| {
            let (value, _) = router.lookup(&Method::GET, black_box("/api/v3/missing"), None);
            black_box(value)
        })
    });

    c.bench_function("lookup_no_capture", |b| {
        // Parameters matched but not recorded: the zero-allocation path
        b.iter(|| {
            let (value, _) =
                router.lookup(&Method::GET, black_box("/api/v1/users/12345/posts"), None);
            black_box(value)
        })
    });
}

fn bench_repair(c: &mut Criterion) {
    let router = api_router();

    c.bench_function("dispatch_case_repair", |b| {
        let mut params = Params::new();
        b.iter(|| {
            params.clear();
            black_box(router.dispatch(&Method::GET, black_box("/DOC/GO1.HTML"), &mut params))
        })
    });
}

criterion_group!(benches, bench_lookup, bench_repair);
criterion_main!(benches);
