use std::str::FromStr;

use axum::{
    body::Body,
    extract::Request,
    http::{HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::models::ClientTime;

/// HTTP header names for the per-request context
pub const REQUEST_ID_HEADER: &str = "x-request-id";
pub const CLIENT_HOUR_HEADER: &str = "x-client-hour";
pub const CLIENT_TZ_OFFSET_HEADER: &str = "x-client-timezone-offset";

/// Per-request context stored in request extensions: a request id for
/// tracing plus the client's wall-clock information.
#[derive(Clone, Debug)]
pub struct RequestContext {
    pub request_id: Uuid,
    pub client_time: ClientTime,
}

fn parse_header<T: FromStr>(headers: &HeaderMap, name: &str) -> Option<T> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse().ok())
}

/// Middleware that builds the [`RequestContext`] for every request.
///
/// An incoming `x-request-id` is reused, otherwise a fresh UUID is generated;
/// either way the id is echoed back on the response. Client time headers are
/// parsed leniently — a malformed or missing value simply yields `None` and
/// the engine falls back to server time.
pub async fn request_context_middleware(mut request: Request, next: Next) -> Response {
    let headers = request.headers();

    let request_id = headers
        .get(REQUEST_ID_HEADER)
        .and_then(|h| h.to_str().ok())
        .and_then(|s| Uuid::parse_str(s).ok())
        .unwrap_or_else(Uuid::new_v4);

    let client_time = ClientTime::new(
        parse_header(headers, CLIENT_HOUR_HEADER),
        parse_header(headers, CLIENT_TZ_OFFSET_HEADER),
    );

    request.extensions_mut().insert(RequestContext {
        request_id,
        client_time,
    });

    let mut response = next.run(request).await;

    if let Ok(header_value) = HeaderValue::from_str(&request_id.to_string()) {
        response
            .headers_mut()
            .insert(REQUEST_ID_HEADER, header_value);
    }

    response
}

/// Span factory for the HTTP trace layer, tagging spans with the request id
/// and the client hour when present.
pub fn make_span_with_request_context(request: &Request<Body>) -> tracing::Span {
    let (request_id, client_hour) = request
        .extensions()
        .get::<RequestContext>()
        .map(|ctx| {
            (
                ctx.request_id.to_string(),
                ctx.client_time.client_hour.map(|h| h.to_string()),
            )
        })
        .unwrap_or_else(|| ("unknown".to_string(), None));

    tracing::info_span!(
        "http_request",
        method = %request.method(),
        uri = %request.uri(),
        request_id = %request_id,
        client_hour = client_hour.as_deref().unwrap_or("-"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderMap;

    #[test]
    fn test_parse_header_valid_hour() {
        let mut headers = HeaderMap::new();
        headers.insert(CLIENT_HOUR_HEADER, HeaderValue::from_static("8"));
        assert_eq!(parse_header::<u32>(&headers, CLIENT_HOUR_HEADER), Some(8));
    }

    #[test]
    fn test_parse_header_trims_whitespace() {
        let mut headers = HeaderMap::new();
        headers.insert(CLIENT_TZ_OFFSET_HEADER, HeaderValue::from_static(" -300 "));
        assert_eq!(
            parse_header::<i32>(&headers, CLIENT_TZ_OFFSET_HEADER),
            Some(-300)
        );
    }

    #[test]
    fn test_parse_header_garbage_is_none() {
        let mut headers = HeaderMap::new();
        headers.insert(CLIENT_HOUR_HEADER, HeaderValue::from_static("noon"));
        assert_eq!(parse_header::<u32>(&headers, CLIENT_HOUR_HEADER), None);
    }

    #[test]
    fn test_parse_header_missing_is_none() {
        let headers = HeaderMap::new();
        assert_eq!(parse_header::<u32>(&headers, CLIENT_HOUR_HEADER), None);
    }
}
