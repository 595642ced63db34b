//! Minimal ordo example: JSON endpoints behind dependency-ordered middleware.
//!
//! Run with:
//!   RUST_LOG=info,ordo=debug cargo run --example basic
//!
//! Try:
//!   curl -i http://localhost:3000/users/42
//!   curl -i -H 'authorization: Bearer t' http://localhost:3000/users/42
//!   curl -i -X POST -H 'authorization: Bearer t' http://localhost:3000/users -d '{"name":"alice"}'

use std::sync::atomic::{AtomicU64, Ordering};

use ordo::middleware::{self, Resolver};
use ordo::{BoxedHandler, ErasedHandler, Request, Response, Router, Server, StatusCode};
use tracing::info;

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

#[tokio::main]
async fn main() -> Result<(), ordo::Error> {
    tracing_subscriber::fmt::init();

    // Declared out of order on purpose; the resolver sorts them.
    let auth = middleware::from_fn("auth", require_token, ["request-id"]);
    let request_id = middleware::from_fn("request-id", assign_request_id, ["trace"]);
    let resolver = Resolver::new(auth, [request_id, middleware::trace()])?;

    let app = Router::new()
        .get("/users/{id}",    get_user)
        .post("/users",        create_user)
        .delete("/users/{id}", delete_user);

    Server::bind("0.0.0.0:3000")
        .middleware(resolver)
        .serve(app)
        .await
}

// ── Middleware ────────────────────────────────────────────────────────────────

async fn assign_request_id(mut req: Request, next: BoxedHandler) -> Response {
    let id = match req.header("x-request-id") {
        Some(id) => id.to_owned(),
        None => NEXT_ID.fetch_add(1, Ordering::Relaxed).to_string(),
    };
    if let Ok(value) = id.parse() {
        req.headers_mut().insert("x-request-id", value);
    }
    let mut res = next.call(req).await;
    res.insert_header("x-request-id", id);
    res
}

async fn require_token(req: Request, next: BoxedHandler) -> Response {
    if req.header("authorization").is_none() {
        info!(request_id = req.header("x-request-id"), "rejecting unauthenticated request");
        return Response::status(StatusCode::UNAUTHORIZED);
    }
    next.call(req).await
}

// ── Handlers ──────────────────────────────────────────────────────────────────

async fn get_user(req: Request) -> Response {
    let id = req.param("id").unwrap_or("unknown");
    Response::json(format!(r#"{{"id":"{id}","name":"alice"}}"#).into_bytes())
}

async fn create_user(req: Request) -> Response {
    if req.body().is_empty() {
        return Response::status(StatusCode::BAD_REQUEST);
    }
    Response::builder()
        .status(StatusCode::CREATED)
        .header("location", "/users/99")
        .json(br#"{"id":"99","name":"new_user"}"#.to_vec())
}

async fn delete_user(_req: Request) -> StatusCode {
    StatusCode::NO_CONTENT
}
