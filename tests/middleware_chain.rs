use std::sync::{Arc, Mutex};

use ordo::middleware::{self, Middleware, ResolveError, Resolver, verify_correct_ordering};
use ordo::{BoxedHandler, ErasedHandler, Method, Request, Response, Router, StatusCode};

type Log = Arc<Mutex<Vec<&'static str>>>;

fn recording(name: &'static str, log: &Log, deps: &[&'static str]) -> Middleware {
    let log = Arc::clone(log);
    middleware::from_fn(
        name,
        move |req: Request, next: BoxedHandler| {
            log.lock().unwrap().push(name);
            next.call(req)
        },
        deps.iter().copied(),
    )
}

fn get(path: &str) -> Request {
    Request::new(Method::GET, path, Default::default(), "")
}

fn router() -> Router {
    Router::new().get("/users/{id}", |req: Request| async move {
        format!("user {}", req.param("id").unwrap_or("?"))
    })
}

#[tokio::test]
async fn runs_middleware_in_dependency_order_before_the_router() {
    let log: Log = Arc::default();
    let resolver = Resolver::new(
        recording("a", &log, &["b", "d"]),
        [
            recording("b", &log, &["c", "e"]),
            recording("c", &log, &["d", "e"]),
            recording("e", &log, &[]),
            recording("d", &log, &["e"]),
        ],
    )
    .unwrap();
    assert!(verify_correct_ordering(resolver.ordered_middleware()));

    let app = resolver.setup()(router().into_handler());
    let res = app.call(get("/users/7")).await;

    assert_eq!(res.status_code(), StatusCode::OK);
    assert_eq!(res.body(), b"user 7");
    assert_eq!(*log.lock().unwrap(), ["e", "d", "c", "b", "a"]);
}

#[tokio::test]
async fn middleware_can_short_circuit_and_decorate() {
    let gate = middleware::from_fn(
        "gate",
        |req: Request, next: BoxedHandler| async move {
            if req.header("authorization").is_none() {
                return Response::status(StatusCode::UNAUTHORIZED);
            }
            next.call(req).await
        },
        ["stamp"],
    );
    let stamp = middleware::from_fn(
        "stamp",
        |req: Request, next: BoxedHandler| async move {
            let mut res = next.call(req).await;
            res.insert_header("x-stamped", "yes");
            res
        },
        [] as [&str; 0],
    );

    let resolver = Resolver::new(gate, [stamp, middleware::trace()]).unwrap();
    let names: Vec<&str> = resolver.names().map(|n| n.as_str()).collect();
    assert_eq!(names, ["stamp", "gate", "trace"]);

    let app = resolver.setup()(router().into_handler());

    let denied = app.call(get("/users/1")).await;
    assert_eq!(denied.status_code(), StatusCode::UNAUTHORIZED);
    assert_eq!(denied.header("x-stamped"), Some("yes"));

    let mut req = get("/users/1");
    req.headers_mut().insert("authorization", "Bearer t".parse().unwrap());
    let allowed = app.call(req).await;
    assert_eq!(allowed.status_code(), StatusCode::OK);
    assert_eq!(allowed.header("x-stamped"), Some("yes"));
}

#[tokio::test]
async fn composed_handler_is_shared_across_tasks() {
    let log: Log = Arc::default();
    let resolver = Resolver::new(recording("outer", &log, &["inner"]), [recording("inner", &log, &[])]).unwrap();
    let app = resolver.setup()(router().into_handler());

    let mut tasks = tokio::task::JoinSet::new();
    for i in 0..16 {
        let app = BoxedHandler::clone(&app);
        tasks.spawn(async move { app.call(get(&format!("/users/{i}"))).await.status_code() });
    }
    while let Some(status) = tasks.join_next().await {
        assert_eq!(status.unwrap(), StatusCode::OK);
    }
    assert_eq!(log.lock().unwrap().len(), 32);
}

#[test]
fn construction_errors_surface_as_crate_errors() {
    let log: Log = Arc::default();
    let err = Resolver::new(recording("a", &log, &["b"]), [recording("b", &log, &["a"])]).unwrap_err();
    assert!(matches!(err, ResolveError::CircularDependency { .. }));

    let err: ordo::Error = Resolver::new(recording("a", &log, &["missing"]), []).unwrap_err().into();
    assert_eq!(err.to_string(), "middleware: missing dependency \"missing\" required by \"a\"");
}
