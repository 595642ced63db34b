//! Radix-tree request router.
//!
//! One tree per HTTP method. O(path-length) lookup. The router is itself a
//! handler: it is the terminal layer that the middleware chain wraps.

use std::collections::HashMap;
use std::sync::Arc;

use http::{Method, StatusCode};
use matchit::{InsertError, Router as MatchitRouter};

use crate::handler::{BoxFuture, BoxedHandler, ErasedHandler, Handler};
use crate::request::Request;
use crate::response::Response;

/// The application router.
///
/// Build it once at startup; pass it to [`Server::serve`](crate::Server::serve)
/// or turn it into a handler with [`Router::into_handler`].
pub struct Router {
    routes: HashMap<Method, MatchitRouter<BoxedHandler>>,
}

impl Router {
    pub fn new() -> Self {
        Self { routes: HashMap::new() }
    }

    /// Register a handler for a method + path pair. Returns `self` for chaining.
    ///
    /// Path parameters use `{name}` syntax; `req.param("name")` retrieves them:
    ///
    /// ```rust
    /// # use ordo::{Method, Request, Response, Router};
    /// # async fn get_user(_: Request) -> Response { Response::text("") }
    /// # async fn create_user(_: Request) -> Response { Response::text("") }
    /// Router::new()
    ///     .on(Method::GET,  "/users/{id}", get_user)
    ///     .on(Method::POST, "/users",      create_user);
    /// ```
    ///
    /// # Panics
    ///
    /// Panics if `path` is not a valid route or conflicts with an existing one.
    /// Use [`Router::try_on`] to handle that case.
    pub fn on(self, method: Method, path: &str, handler: impl Handler) -> Self {
        self.try_on(method, path, handler)
            .unwrap_or_else(|e| panic!("invalid route `{path}`: {e}"))
    }

    /// Like [`Router::on`], but reports invalid or conflicting routes.
    pub fn try_on(mut self, method: Method, path: &str, handler: impl Handler) -> Result<Self, InsertError> {
        self.routes
            .entry(method)
            .or_default()
            .insert(path, handler.into_boxed_handler())?;
        Ok(self)
    }

    pub fn get(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::GET, path, handler)
    }

    pub fn post(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::POST, path, handler)
    }

    pub fn put(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::PUT, path, handler)
    }

    pub fn delete(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::DELETE, path, handler)
    }

    /// Erases the router into the terminal handler of a middleware chain.
    pub fn into_handler(self) -> BoxedHandler {
        Arc::new(self)
    }

    /// Finds the handler for `method` + `path`.
    ///
    /// Fails with `404` when no route matches the path, and with `405` when
    /// the path exists under a different method.
    pub(crate) fn lookup(
        &self,
        method: &Method,
        path: &str,
    ) -> Result<(&BoxedHandler, HashMap<String, String>), StatusCode> {
        let matched = self.routes.get(method).and_then(|tree| tree.at(path).ok());
        let Some(matched) = matched else {
            let elsewhere = self.routes.iter()
                .any(|(m, tree)| m != method && tree.at(path).is_ok());
            return Err(if elsewhere { StatusCode::METHOD_NOT_ALLOWED } else { StatusCode::NOT_FOUND });
        };
        let params = matched.params.iter()
            .map(|(k, v)| (k.to_owned(), v.to_owned()))
            .collect();
        Ok((matched.value, params))
    }
}

impl ErasedHandler for Router {
    fn call(&self, req: Request) -> BoxFuture {
        match self.lookup(req.method(), req.path()) {
            Ok((handler, params)) => handler.call(req.with_params(params)),
            Err(status) => Box::pin(async move { Response::status(status) }),
        }
    }
}

impl Default for Router {
    fn default() -> Self { Self::new() }
}
