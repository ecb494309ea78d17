use axum::{extract::Request, middleware::Next, response::Response};
use axum_extra::extract::CookieJar;

use crate::auth::{tokens_match, CSRF_COOKIE, CSRF_HEADER};
use crate::error::ApiError;

pub const CSRF_FAILURE: &str = "CSRF token missing or invalid";

/// Double-submit check for mutating routes: `X-CSRF-Token` must equal the
/// `csrf_token` cookie.
pub async fn require_csrf(jar: CookieJar, request: Request, next: Next) -> Result<Response, ApiError> {
    let valid = {
        let header = request.headers().get(CSRF_HEADER).and_then(|v| v.to_str().ok());
        tokens_match(header, jar.get(CSRF_COOKIE).map(|c| c.value()))
    };
    if !valid {
        tracing::warn!("{} {} rejected: {}", request.method(), request.uri().path(), CSRF_FAILURE);
        return Err(ApiError::forbidden(CSRF_FAILURE));
    }
    Ok(next.run(request).await)
}
