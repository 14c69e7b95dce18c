use axum::{
    extract::State,
    http::{HeaderMap, Request, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use sha2::{Digest, Sha256};

use crate::{AppState, error::AuthError};

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let raw = headers.get(header::AUTHORIZATION)?.to_str().ok()?.trim();
    let (scheme, token) = raw.split_once(' ')?;

    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }

    Some(token.trim())
}

// compare digests so the time taken does not depend on the shared prefix
fn secrets_match(given: &str, expected: &str) -> bool {
    Sha256::digest(given.as_bytes()) == Sha256::digest(expected.as_bytes())
}

/// Rejects the request with 401 unless it carries
/// `Authorization: Bearer <WEBHOOK_SECRET>`. A no-op when no secret is
/// configured.
pub async fn require_webhook_secret(
    State(state): State<AppState>,
    req: Request<axum::body::Body>,
    next: Next,
) -> Response {
    let Some(expected) = state.settings.webhook_secret.as_deref() else {
        return next.run(req).await;
    };

    match bearer_token(req.headers()) {
        Some(token) if secrets_match(token, expected) => next.run(req).await,
        Some(_) => {
            tracing::warn!("webhook rejected: bearer token mismatch");
            AuthError::Unauthorized.into_response()
        }
        None => {
            tracing::warn!("webhook rejected: missing bearer token");
            AuthError::Unauthorized.into_response()
        }
    }
}
