use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{header::AUTHORIZATION, HeaderMap, Request},
    middleware::Next,
    response::Response,
};
use tracing::debug;

use shared_config::AppConfig;
use shared_models::auth::{AuthSession, MaybeSession};
use shared_models::error::AppError;

use crate::jwt::validate_token;

/// Pulls the token out of an `Authorization: Bearer <token>` header.
pub fn extract_bearer_token(headers: &HeaderMap) -> Result<String, AppError> {
    let auth_header = headers
        .get(AUTHORIZATION)
        .ok_or_else(|| AppError::Auth("Missing authorization header".to_string()))?;

    let auth_value = auth_header
        .to_str()
        .map_err(|_| AppError::Auth("Invalid authorization header format".to_string()))?;

    auth_value
        .strip_prefix("Bearer ")
        .map(str::to_string)
        .ok_or_else(|| AppError::Auth("Invalid authorization header format".to_string()))
}

fn session_from_headers(headers: &HeaderMap, config: &AppConfig) -> Result<AuthSession, AppError> {
    let token = extract_bearer_token(headers)?;
    let user = validate_token(&token, &config.supabase_jwt_secret)
        .map_err(|e| AppError::Auth(e.to_string()))?;

    Ok(AuthSession { user, access_token: token })
}

/// Rejects the request unless it carries a valid Supabase token. Inserts both
/// the `User` and the `AuthSession` into the request extensions.
pub async fn auth_middleware(
    State(config): State<Arc<AppConfig>>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let session = session_from_headers(request.headers(), &config)?;

    request.extensions_mut().insert(session.user.clone());
    request.extensions_mut().insert(session);

    Ok(next.run(request).await)
}

/// Never rejects. Inserts `MaybeSession(Some(..))` for a valid token and
/// `MaybeSession(None)` otherwise, leaving the decision to the handler.
pub async fn optional_auth_middleware(
    State(config): State<Arc<AppConfig>>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let session = match session_from_headers(request.headers(), &config) {
        Ok(session) => Some(session),
        Err(err) => {
            debug!("Continuing without session: {}", err);
            None
        }
    };

    request.extensions_mut().insert(MaybeSession(session));

    next.run(request).await
}
