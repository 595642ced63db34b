//! Unified error type.

use std::net::AddrParseError;

use thiserror::Error;

use crate::middleware::ResolveError;

/// The error type returned by ordo's fallible operations.
///
/// Application-level errors (404, 422, etc.) are expressed as
/// [`Response`](crate::Response) values, not as `Error`s. This type surfaces
/// setup and infrastructure failures.
#[derive(Debug, Error)]
pub enum Error {
    /// Binding the listener failed.
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    /// The address given to [`Server::bind`](crate::Server::bind) is not `host:port`.
    #[error("invalid socket address: {0}")]
    InvalidAddress(#[from] AddrParseError),
    /// The middleware set could not be ordered.
    #[error("middleware: {0}")]
    Resolve(#[from] ResolveError),
}
