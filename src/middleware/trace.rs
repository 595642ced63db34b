//! Built-in request tracing middleware.

use std::time::Instant;

use tracing::{Instrument, info, info_span};

use super::{Middleware, Name, from_fn};
use crate::handler::{BoxedHandler, ErasedHandler};
use crate::request::Request;

/// Per-request span with method and path; logs status and latency when the
/// rest of the chain returns.
///
/// Named `"trace"` with no dependencies. Make other middleware depend on
/// `"trace"` to have their logs recorded inside the request span.
pub fn trace() -> Middleware {
    from_fn("trace", traced, std::iter::empty::<Name>())
}

async fn traced(req: Request, next: BoxedHandler) -> crate::Response {
    let span = info_span!("request", method = %req.method(), path = %req.path());
    let start = Instant::now();
    let response = next.call(req).instrument(span.clone()).await;
    span.in_scope(|| {
        info!(
            status = response.status_code().as_u16(),
            latency_us = u64::try_from(start.elapsed().as_micros()).unwrap_or(u64::MAX),
            "request completed",
        );
    });
    response
}
