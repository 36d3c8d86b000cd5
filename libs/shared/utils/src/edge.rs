use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderValue, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use serde_json::json;
use tracing::debug;

use shared_database::state::AppState;

use crate::jwt;

/// How the edge filter treats a request path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteClass {
    /// Reachable with or without a session.
    Public,
    /// Login/signup surfaces; an authenticated session is bounced home.
    AuthOnly,
    /// Interactive pages; unauthenticated requests are redirected to login
    /// with the original path preserved as a return target.
    Protected,
    /// Data endpoints; unauthenticated requests get a 401 body instead of
    /// a redirect.
    ProtectedApi,
}

pub fn classify_path(path: &str) -> RouteClass {
    match path {
        "/" | "/health" | "/api/auth/login" | "/api/auth/signup" => RouteClass::Public,
        "/login" | "/signup" => RouteClass::AuthOnly,
        _ if path.starts_with("/api/") => RouteClass::ProtectedApi,
        _ => RouteClass::Protected,
    }
}

/// Pull the raw session token out of the request. The Authorization header
/// takes precedence; the `session` cookie is the interactive fallback.
pub fn extract_token<B>(request: &Request<B>) -> Option<String> {
    if let Some(value) = request.headers().get(header::AUTHORIZATION) {
        if let Ok(value) = value.to_str() {
            if let Some(token) = value.strip_prefix("Bearer ") {
                return Some(token.to_string());
            }
        }
    }

    let cookies = request.headers().get(header::COOKIE)?.to_str().ok()?;
    cookies.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        (name == "session").then(|| value.to_string())
    })
}

/// Stateless gate in front of every request. Checks signature and expiry
/// only - deliberately never the data store, so it stays cheap enough to
/// run on requests that will be rejected before reaching any handler.
/// Full identity resolution is the extractor middleware's job.
pub async fn edge_filter(
    State(state): State<Arc<AppState>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();
    let class = classify_path(&path);

    let token_valid = extract_token(&request)
        .map(|token| jwt::verify(&token, &state.config.jwt_secret).is_ok())
        .unwrap_or(false);

    let response = match (class, token_valid) {
        (RouteClass::Public, _) => next.run(request).await,
        (RouteClass::AuthOnly, true) => Redirect::to("/").into_response(),
        (RouteClass::AuthOnly, false) => next.run(request).await,
        (RouteClass::Protected, false) => {
            debug!("unauthenticated request to {}, redirecting to login", path);
            Redirect::to(&format!("/login?redirect={}", path)).into_response()
        }
        (RouteClass::ProtectedApi, false) => (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "authentication required" })),
        )
            .into_response(),
        (_, true) => next.run(request).await,
    };

    apply_security_headers(response)
}

fn apply_security_headers(mut response: Response) -> Response {
    let headers = response.headers_mut();
    headers.insert(header::X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));
    headers.insert(
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    );
    headers.insert(
        header::REFERRER_POLICY,
        HeaderValue::from_static("strict-origin-when-cross-origin"),
    );
    response
}
