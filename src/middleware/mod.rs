//! Middleware layer.
//!
//! Middleware wraps the handler that follows it and is the right place for
//! cross-cutting concerns: tracing, request ids, authentication. Each unit is
//! a named [`Node`] that declares which other units must run before it. A
//! [`Resolver`] orders the units once at startup and [`Resolver::setup`]
//! composes them into one handler transform.
//!
//! ```rust
//! use ordo::{BoxedHandler, ErasedHandler, Request, Response, Router, StatusCode};
//! use ordo::middleware::{self, Resolver};
//!
//! let auth = middleware::from_fn("auth", |req: Request, next: BoxedHandler| async move {
//!     if req.header("x-request-id").is_none() {
//!         return Response::status(StatusCode::BAD_REQUEST);
//!     }
//!     next.call(req).await
//! }, ["request-id", "trace"]);
//!
//! let request_id = middleware::from_fn("request-id", |mut req: Request, next: BoxedHandler| async move {
//!     if !req.headers().contains_key("x-request-id") {
//!         req.headers_mut().insert("x-request-id", "generated".parse().unwrap());
//!     }
//!     next.call(req).await
//! }, ["trace"]);
//!
//! let resolver = Resolver::new(auth, [request_id, middleware::trace()])?;
//! let names: Vec<&str> = resolver.names().map(|n| n.as_str()).collect();
//! assert_eq!(names, ["trace", "request-id", "auth"]);
//!
//! let app = resolver.setup()(Router::new().into_handler());
//! # let _ = app;
//! # Ok::<(), ordo::middleware::ResolveError>(())
//! ```
//!
//! The generic core ([`Node`], [`Resolver`], [`verify_correct_ordering`]) does
//! not care what it wraps; HTTP middleware is simply `Node<BoxedHandler>`.

mod node;
mod ordered_set;
mod resolver;
mod trace;
mod verify;

use std::future::Future;
use std::sync::Arc;

use crate::handler::{BoxFuture, BoxedHandler, ErasedHandler};
use crate::request::Request;
use crate::response::IntoResponse;

pub use node::{Action, Name, Node};
pub use resolver::{ResolveError, Resolver};
pub use trace::trace;
pub use verify::verify_correct_ordering;

/// An HTTP middleware unit.
pub type Middleware = Node<BoxedHandler>;

/// Builds an HTTP middleware from an async function of the request and the
/// next handler.
///
/// `f` decides whether and when to call `next`; returning without calling it
/// short-circuits the rest of the chain.
pub fn from_fn<F, Fut, R, I, N>(name: impl Into<Name>, f: F, dependencies: I) -> Middleware
where
    F: Fn(Request, BoxedHandler) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
    I: IntoIterator<Item = N>,
    N: Into<Name>,
{
    let f = Arc::new(f);
    Node::new(
        name,
        move |next: BoxedHandler| -> BoxedHandler { Arc::new(FnLayer { f: Arc::clone(&f), next }) },
        dependencies,
    )
}

/// One installed layer: the user function plus the handler it wraps.
struct FnLayer<F> {
    f: Arc<F>,
    next: BoxedHandler,
}

impl<F, Fut, R> ErasedHandler for FnLayer<F>
where
    F: Fn(Request, BoxedHandler) -> Fut + Send + Sync,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn call(&self, req: Request) -> BoxFuture {
        let fut = (self.f)(req, Arc::clone(&self.next));
        Box::pin(async move { fut.await.into_response() })
    }
}
