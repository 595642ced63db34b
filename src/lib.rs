//! # ordo
//!
//! A minimal HTTP framework whose middleware declares what it depends on
//! and gets put in the right order for you.
//!
//! ## The contract
//!
//! Every middleware is a named unit with a list of units that must run
//! before it. At startup a [`Resolver`](middleware::Resolver) sorts the units
//! topologically, refuses cycles and unknown dependencies, and composes them
//! into one handler in front of the router. The order is computed once and
//! never changes at runtime.
//!
//! - Dependency-ordered middleware via [`middleware`]
//! - Radix-tree routing via [`matchit`]
//! - HTTP/1.1 and HTTP/2 via hyper, graceful shutdown on SIGTERM / Ctrl-C
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use ordo::{BoxedHandler, ErasedHandler, Method, Request, Response, Router, Server, StatusCode};
//! use ordo::middleware::{self, Resolver};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), ordo::Error> {
//!     let auth = middleware::from_fn("auth", require_token, ["trace"]);
//!     let resolver = Resolver::new(auth, [middleware::trace()])?;
//!
//!     let app = Router::new()
//!         .on(Method::GET, "/users/{id}", get_user);
//!
//!     Server::bind("0.0.0.0:3000").middleware(resolver).serve(app).await
//! }
//!
//! async fn require_token(req: Request, next: BoxedHandler) -> Response {
//!     match req.header("authorization") {
//!         Some(_) => next.call(req).await,
//!         None => Response::status(StatusCode::UNAUTHORIZED),
//!     }
//! }
//!
//! async fn get_user(req: Request) -> Response {
//!     let id = req.param("id").unwrap_or("unknown");
//!     Response::json(format!(r#"{{"id":"{id}"}}"#).into_bytes())
//! }
//! ```

mod error;
mod handler;
mod request;
mod response;
mod router;
mod server;

pub mod middleware;

pub use error::Error;
pub use handler::{BoxFuture, BoxedHandler, ErasedHandler, Handler};
pub use http::{Method, StatusCode};
pub use request::Request;
pub use response::{ContentType, IntoResponse, Response, ResponseBuilder};
pub use router::Router;
pub use server::Server;
