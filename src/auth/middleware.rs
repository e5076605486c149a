use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};

use crate::auth::jwt::verify_token;
use crate::error::{AppError, AppResult};
use crate::store::path::is_valid_key;
use crate::AppState;

#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: String,
}

/// Resolve a token to the user it scopes requests to.
pub fn authenticate(state: &AppState, token: &str) -> AppResult<AuthUser> {
    let token_data = verify_token(token, &state.config)?;
    let id = token_data.claims.sub;

    // the id becomes a store path segment
    if !is_valid_key(&id) {
        tracing::warn!(sub = %id, "Token subject is not a usable user id");
        return Err(AppError::Unauthorized);
    }
    Ok(AuthUser { id })
}

pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AppError::Unauthorized)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(AppError::Unauthorized)?;

    let auth_user = authenticate(&state, token)?;

    req.extensions_mut().insert(auth_user);
    Ok(next.run(req).await)
}
