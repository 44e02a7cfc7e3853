use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use tracing::warn;

use crate::auth::{ADMIN_ROLE, AppState, decode_token};
use crate::error::ApiError;

/// Require a valid admin bearer token, unless the server runs with admin
/// auth disabled. On success the decoded claims go into request extensions.
pub async fn require_admin(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if !state.require_admin_auth {
        return Ok(next.run(req).await);
    }

    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or(ApiError::Unauthorized)?;

    let claims = decode_token(&state.jwt_secret, token).map_err(|e| {
        warn!("Rejected admin token: {}", e);
        ApiError::Unauthorized
    })?;

    if claims.role != ADMIN_ROLE {
        return Err(ApiError::Unauthorized);
    }

    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}
