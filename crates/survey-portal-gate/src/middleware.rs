// crates/survey-portal-gate/src/middleware.rs
// ============================================================================
// Module: Gate Middleware
// Description: axum middleware applying gate decisions to in-process routes.
// Purpose: Enforce the access gate in front of protected handlers.
// Dependencies: axum
// ============================================================================

//! ## Overview
//! [`gate_layer`] runs [`AccessGate::check`] for each request and applies the
//! decision: pass-through requests get the refreshed credential in their
//! `Cookie` header and in `Set-Cookie` on the response; redirects answer
//! `303 See Other` without reaching the handler; fail-open forwards the
//! original request untouched. The resolved [`Identity`] is inserted as a
//! request extension for handlers that need the caller.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use axum::extract::Request;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::http::HeaderValue;
use axum::http::StatusCode;
use axum::http::header::COOKIE;
use axum::http::header::LOCATION;
use axum::http::header::SET_COOKIE;
use axum::middleware::Next;
use axum::response::IntoResponse;
use axum::response::Response;

use crate::gate::AccessGate;
use crate::gate::GateDecision;
use crate::gate::GateRequest;
use crate::gate::Identity;

/// Header carrying a caller-supplied request identifier.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

// ============================================================================
// SECTION: Middleware
// ============================================================================

/// Gate middleware for `axum::middleware::from_fn_with_state`.
pub async fn gate_layer(
    State(gate): State<Arc<AccessGate>>,
    mut request: Request,
    next: Next,
) -> Response {
    let path = request
        .uri()
        .path_and_query()
        .map_or_else(|| request.uri().path().to_string(), |value| value.as_str().to_string());
    let cookies = cookie_header(request.headers());
    let request_id = header_str(request.headers(), REQUEST_ID_HEADER).map(str::to_string);
    let decision = gate
        .check(GateRequest {
            path: &path,
            cookie_header: cookies.as_deref(),
            request_id: request_id.as_deref(),
        })
        .await;

    match decision {
        GateDecision::Proceed {
            identity,
            session,
        } => {
            let mut set_cookies = Vec::new();
            if let Some(session) = session {
                request.headers_mut().insert(COOKIE, session.forward_cookie);
                set_cookies = session.set_cookies;
            }
            if let Some(identity) = identity {
                request.extensions_mut().insert::<Identity>(identity);
            }
            let mut response = next.run(request).await;
            append_set_cookies(response.headers_mut(), set_cookies);
            response
        }
        GateDecision::FailOpen { .. } => next.run(request).await,
        GateDecision::RedirectToLogin {
            location,
            clear_cookies,
            ..
        } => redirect_response(&location, clear_cookies),
        GateDecision::RedirectDenied {
            location,
            session,
            ..
        } => redirect_response(&location, session.set_cookies),
    }
}

// ============================================================================
// SECTION: Response Helpers
// ============================================================================

/// Builds a `303 See Other` redirect carrying `cookies`.
///
/// A location that is not a valid header value answers `500`; the request
/// never reaches the protected handler.
#[must_use]
pub fn redirect_response(location: &str, cookies: Vec<HeaderValue>) -> Response {
    let Ok(location) = HeaderValue::from_str(location) else {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    };
    let mut response = StatusCode::SEE_OTHER.into_response();
    response.headers_mut().insert(LOCATION, location);
    append_set_cookies(response.headers_mut(), cookies);
    response
}

/// Appends `Set-Cookie` values.
pub fn append_set_cookies(headers: &mut HeaderMap, cookies: Vec<HeaderValue>) {
    for cookie in cookies {
        headers.append(SET_COOKIE, cookie);
    }
}

/// Joins every `Cookie` header into one string; non-ASCII headers are skipped.
#[must_use]
pub fn cookie_header(headers: &HeaderMap) -> Option<String> {
    let parts: Vec<&str> =
        headers.get_all(COOKIE).iter().filter_map(|value| value.to_str().ok()).collect();
    if parts.is_empty() { None } else { Some(parts.join("; ")) }
}

/// Reads a header as text.
#[must_use]
pub fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}
