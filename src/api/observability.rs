//! Per-request span, wide event and metrics.
//!
//! The auth layer runs inside the routed service, so it cannot write to the
//! outer span directly. It attaches an [`AuthOutcome`] to the response
//! instead, and [`request_observer`] reads it back once the handler is done.

use axum::{
    extract::{MatchedPath, Request, State},
    http::{HeaderName, HeaderValue, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use std::time::Instant;
use tracing::{Instrument, field, info, info_span};
use uuid::Uuid;

use super::AppState;
use crate::domain::UserId;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Longest client-supplied request id that is propagated as-is.
const MAX_REQUEST_ID_LEN: usize = 64;

/// How the caller of a protected route was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthOutcome {
    Authenticated(UserId),
    Rejected,
    VerificationRequired,
}

impl AuthOutcome {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Authenticated(_) => "authenticated",
            Self::Rejected => "rejected",
            Self::VerificationRequired => "verification_required",
        }
    }

    #[must_use]
    pub const fn user_id(self) -> Option<UserId> {
        match self {
            Self::Authenticated(id) => Some(id),
            Self::Rejected | Self::VerificationRequired => None,
        }
    }

    /// Tags `response` so the request observer can see who was served.
    pub fn attach(self, response: &mut Response) {
        response.extensions_mut().insert(self);
    }
}

fn request_id(req: &Request) -> String {
    req.headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|id| !id.is_empty() && id.len() <= MAX_REQUEST_ID_LEN)
        .map_or_else(|| Uuid::new_v4().to_string(), str::to_string)
}

const fn status_class(status: StatusCode) -> &'static str {
    match status.as_u16() {
        500.. => "5xx",
        400..=499 => "4xx",
        300..=399 => "3xx",
        _ => "2xx",
    }
}

/// GET /metrics
pub async fn get_metrics(State(state): State<Arc<AppState>>) -> Response {
    match state.prometheus_handle.as_ref() {
        Some(handle) => (
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            handle.render(),
        )
            .into_response(),
        None => (StatusCode::NOT_FOUND, "Metrics are disabled").into_response(),
    }
}

/// Wraps every routed request in a span carrying the request id, route and,
/// once known, the caller. Emits one `request finished` event per request.
pub async fn request_observer(req: Request, next: Next) -> Response {
    let started = Instant::now();
    let request_id = request_id(&req);
    let method = req.method().clone();
    let route = req
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| "unmatched".to_string(), |p| p.as_str().to_string());

    let span = info_span!(
        "http",
        request_id = %request_id,
        method = %method,
        route = %route,
        user_id = field::Empty,
        auth = field::Empty,
    );

    let mut response = next.run(req).instrument(span.clone()).await;

    let outcome = response.extensions().get::<AuthOutcome>().copied();
    let auth = outcome.map_or("public", AuthOutcome::label);
    span.record("auth", auth);
    if let Some(user_id) = outcome.and_then(AuthOutcome::user_id) {
        span.record("user_id", user_id.value());
    }

    let status = response.status();
    let elapsed = started.elapsed();

    metrics::counter!(
        "http_requests_total",
        "method" => method.to_string(),
        "route" => route.clone(),
        "status" => status_class(status),
        "auth" => auth,
    )
    .increment(1);
    metrics::histogram!("http_request_duration_seconds", "route" => route)
        .record(elapsed.as_secs_f64());

    span.in_scope(|| {
        info!(
            status = status.as_u16(),
            duration_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
            "request finished"
        );
    });

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response
            .headers_mut()
            .insert(HeaderName::from_static(REQUEST_ID_HEADER), value);
    }

    response
}

/// The API only serves JSON, so nothing may be framed, sniffed or cached.
const SECURITY_HEADERS: [(&str, &str); 4] = [
    ("x-content-type-options", "nosniff"),
    ("content-security-policy", "default-src 'none'; frame-ancestors 'none'"),
    ("referrer-policy", "no-referrer"),
    ("cache-control", "no-store"),
];

pub async fn security_headers_middleware(req: Request, next: Next) -> Response {
    let mut response = next.run(req).await;
    let headers = response.headers_mut();

    for (name, value) in SECURITY_HEADERS {
        headers.insert(
            HeaderName::from_static(name),
            HeaderValue::from_static(value),
        );
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    #[test]
    fn outcome_labels() {
        let ok = AuthOutcome::Authenticated(UserId::new(4));
        assert_eq!(ok.label(), "authenticated");
        assert_eq!(ok.user_id(), Some(UserId::new(4)));
        assert_eq!(AuthOutcome::VerificationRequired.user_id(), None);
    }

    #[test]
    fn status_classes() {
        assert_eq!(status_class(StatusCode::OK), "2xx");
        assert_eq!(status_class(StatusCode::CONFLICT), "4xx");
        assert_eq!(status_class(StatusCode::BAD_GATEWAY), "5xx");
    }

    #[test]
    fn client_request_ids_are_kept_when_reasonable() {
        let req = Request::builder()
            .header(REQUEST_ID_HEADER, "trace-123")
            .body(Body::empty())
            .unwrap();
        assert_eq!(request_id(&req), "trace-123");

        let req = Request::builder()
            .header(REQUEST_ID_HEADER, "x".repeat(MAX_REQUEST_ID_LEN + 1))
            .body(Body::empty())
            .unwrap();
        assert_ne!(request_id(&req).len(), MAX_REQUEST_ID_LEN + 1);
    }
}
