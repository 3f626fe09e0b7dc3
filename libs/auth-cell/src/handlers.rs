use std::sync::Arc;

use axum::{
    extract::{Extension, Json, State},
    http::{HeaderMap, StatusCode},
};
use serde_json::{json, Map, Value};
use tracing::{debug, info, warn};

use shared_config::AppConfig;
use shared_database::supabase::{SupabaseApiError, SupabaseClient};
use shared_models::auth::{
    AuthSession, RecoverRequest, SignInRequest, SignUpRequest, TokenResponse, UpdateUserRequest,
};
use shared_models::error::AppError;
use shared_utils::extractor::extract_bearer_token;
use shared_utils::jwt;

/// Supabase rejected the caller (bad credentials, expired session) versus
/// Supabase being unreachable or failing.
fn map_supabase_error(err: anyhow::Error) -> AppError {
    match err.downcast_ref::<SupabaseApiError>() {
        Some(api) if api.is_auth_error() => AppError::Auth(api.message.clone()),
        Some(api) if api.status.is_client_error() => AppError::BadRequest(api.message.clone()),
        _ => AppError::ExternalService(err.to_string()),
    }
}

fn require_non_empty(value: &str, field: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::ValidationError(format!("{} is required", field)));
    }
    Ok(())
}

pub async fn sign_up(
    State(config): State<Arc<AppConfig>>,
    Json(request): Json<SignUpRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    require_non_empty(&request.email, "email")?;
    require_non_empty(&request.password, "password")?;

    let mut data = Map::new();
    if let Some(full_name) = request.full_name {
        data.insert("full_name".to_string(), json!(full_name));
    }
    if let Some(phone) = request.phone {
        data.insert("phone".to_string(), json!(phone));
    }

    let client = SupabaseClient::new(&config);
    let result = client.sign_up(request.email.trim(), &request.password, Value::Object(data))
        .await
        .map_err(map_supabase_error)?;

    info!("Registered new account");
    Ok((StatusCode::CREATED, Json(result)))
}

pub async fn sign_in(
    State(config): State<Arc<AppConfig>>,
    Json(request): Json<SignInRequest>,
) -> Result<Json<Value>, AppError> {
    require_non_empty(&request.email, "email")?;
    require_non_empty(&request.password, "password")?;

    let client = SupabaseClient::new(&config);
    let session = client.sign_in_with_password(request.email.trim(), &request.password)
        .await
        .map_err(|e| {
            warn!("Sign in failed");
            map_supabase_error(e)
        })?;

    Ok(Json(session))
}

pub async fn recover_password(
    State(config): State<Arc<AppConfig>>,
    Json(request): Json<RecoverRequest>,
) -> Result<Json<Value>, AppError> {
    require_non_empty(&request.email, "email")?;

    let client = SupabaseClient::new(&config);
    client.recover_password(request.email.trim())
        .await
        .map_err(map_supabase_error)?;

    // Same answer whether or not the address is registered
    Ok(Json(json!({
        "success": true,
        "message": "If an account exists for this email, a recovery link has been sent."
    })))
}

pub async fn get_current_user(
    State(config): State<Arc<AppConfig>>,
    Extension(session): Extension<AuthSession>,
) -> Result<Json<Value>, AppError> {
    debug!("Fetching auth user {}", session.user.id);

    let client = SupabaseClient::new(&config);
    let user = client.get_user(&session.access_token)
        .await
        .map_err(map_supabase_error)?;

    Ok(Json(user))
}

pub async fn update_current_user(
    State(config): State<Arc<AppConfig>>,
    Extension(session): Extension<AuthSession>,
    Json(request): Json<UpdateUserRequest>,
) -> Result<Json<Value>, AppError> {
    let mut changes = Map::new();
    if let Some(email) = request.email {
        changes.insert("email".to_string(), json!(email));
    }
    if let Some(password) = request.password {
        changes.insert("password".to_string(), json!(password));
    }
    if let Some(data) = request.data {
        changes.insert("data".to_string(), data);
    }

    if changes.is_empty() {
        return Err(AppError::BadRequest("No changes supplied".to_string()));
    }

    debug!("Updating auth user {}", session.user.id);

    let client = SupabaseClient::new(&config);
    let user = client.update_user(&session.access_token, Value::Object(changes))
        .await
        .map_err(map_supabase_error)?;

    Ok(Json(user))
}

pub async fn validate_token(
    State(config): State<Arc<AppConfig>>,
    headers: HeaderMap,
) -> Result<Json<TokenResponse>, AppError> {
    debug!("Validating token");

    let token = extract_bearer_token(&headers)?;

    let user = jwt::validate_token(&token, &config.supabase_jwt_secret)
        .map_err(|e| AppError::Auth(e.to_string()))?;

    Ok(Json(TokenResponse {
        valid: true,
        user_id: user.id,
        email: user.email,
        role: user.role,
    }))
}

/// Like [`validate_token`] but never fails on a bad token.
pub async fn verify_token(
    State(config): State<Arc<AppConfig>>,
    headers: HeaderMap,
) -> Result<Json<Value>, AppError> {
    debug!("Verifying token");

    let token = extract_bearer_token(&headers)?;
    let valid = jwt::validate_token(&token, &config.supabase_jwt_secret).is_ok();

    Ok(Json(json!({ "valid": valid })))
}
