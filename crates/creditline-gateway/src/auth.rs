use axum::{
    Json,
    extract::{Request, State},
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};
use creditline_platform::ErrorBody;
use tracing::warn;

use crate::AppState;

pub const ADMIN_KEY_HEADER: &str = "x-admin-api-key";

/// Actor recorded on audit events for requests that passed admin auth.
pub const ADMIN_ACTOR: &str = "admin";

pub async fn require_admin(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, (StatusCode, Json<ErrorBody>)> {
    let Some(expected) = state.admin_api_key.as_deref() else {
        return Err((
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ErrorBody::new("admin authentication is not configured")),
        ));
    };

    let matches = presented_key(request.headers()).map(|key| keys_match(key, expected));
    match matches {
        Some(true) => Ok(next.run(request).await),
        Some(false) => {
            warn!(path = %request.uri().path(), "rejected admin request with invalid key");
            Err(unauthorized("invalid admin API key"))
        }
        None => Err(unauthorized("missing admin API key")),
    }
}

fn presented_key(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(ADMIN_KEY_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

/// Constant time for equal-length inputs.
fn keys_match(presented: &str, expected: &str) -> bool {
    let (presented, expected) = (presented.as_bytes(), expected.as_bytes());
    if presented.len() != expected.len() {
        return false;
    }
    presented
        .iter()
        .zip(expected)
        .fold(0u8, |diff, (a, b)| diff | (a ^ b))
        == 0
}

fn unauthorized(message: &str) -> (StatusCode, Json<ErrorBody>) {
    (StatusCode::UNAUTHORIZED, Json(ErrorBody::new(message)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_match_requires_identical_bytes() {
        assert!(keys_match("secret-key", "secret-key"));
        assert!(!keys_match("secret-kez", "secret-key"));
        assert!(!keys_match("Secret-key", "secret-key"));
        assert!(!keys_match("secret", "secret-key"));
        assert!(!keys_match("secret-key-2", "secret-key"));
        assert!(!keys_match("", "secret-key"));
    }

    #[test]
    fn presented_key_ignores_blank_headers() {
        let mut headers = HeaderMap::new();
        assert_eq!(presented_key(&headers), None);

        headers.insert(ADMIN_KEY_HEADER, "   ".parse().unwrap());
        assert_eq!(presented_key(&headers), None);

        headers.insert(ADMIN_KEY_HEADER, " secret-key ".parse().unwrap());
        assert_eq!(presented_key(&headers), Some("secret-key"));
    }
}
