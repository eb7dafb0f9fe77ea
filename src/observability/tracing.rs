//! Per-request spans.

use tracing::Span;

use crate::http::{attributes, Request};

/// Span wrapping one pass through the pipeline, tagged with the request id
/// assigned by the HTTP layer.
pub fn request_span(request: &Request) -> Span {
    let request_id = request
        .attribute_string(attributes::REQUEST_ID)
        .unwrap_or_else(|| "-".to_string());
    tracing::info_span!(
        "request",
        request_id = %request_id,
        method = %request.method(),
        path = %request.path()
    )
}
