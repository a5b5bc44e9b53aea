//! Registration, login and token refresh.

use std::sync::Arc;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::auth::{extract_bearer_token, hash_password, verify_password};
use crate::error::ApiError;
use crate::state::AppState;
use bazaar_core::{validation, Role};
use bazaar_db::repository::user::NewUser;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub name: String,
    pub age: i64,
    pub password: String,
    pub password2: String,
    /// Defaults to CUSTOMER. Creating staff accounts requires an
    /// authenticated ADMIN caller.
    pub role: Option<Role>,
}

#[derive(Debug, Serialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub message: String,
    pub token: TokenPair,
}

/// POST /auth/register
pub async fn register(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    validation::validate_user_name(&req.name)?;
    validation::validate_email(&req.email)?;
    validation::validate_age(req.age)?;
    validation::validate_password(&req.password, &req.password2)?;

    let role = req.role.unwrap_or(Role::Customer);
    if role != Role::Customer {
        require_admin_caller(&state, &headers)?;
    }

    let password_hash = hash_password(&req.password)?;

    let (user, _cart) = state
        .db
        .users()
        .create(NewUser {
            email: req.email.trim().to_string(),
            name: req.name.trim().to_string(),
            age: req.age,
            password_hash,
            role,
        })
        .await?;

    info!(user_id = %user.id, role = ?user.role, "Account registered");

    let token = TokenPair {
        access: state.jwt.generate_access_token(&user.id, &user.email, user.role)?,
        refresh: state.jwt.generate_refresh_token(&user.id, &user.email, user.role)?,
    };

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            message: "Registration Successful!".to_string(),
            token,
        }),
    ))
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// POST /auth/login
///
/// Wrong email, wrong password and deactivated accounts all answer
/// with the same message, so the endpoint cannot be used to probe for
/// registered addresses.
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let user = state
        .db
        .users()
        .get_by_email(req.email.trim())
        .await?
        .ok_or_else(|| ApiError::unauthorized("Invalid credentials"))?;

    if !user.is_active || !verify_password(&req.password, &user.password_hash) {
        return Err(ApiError::unauthorized("Invalid credentials"));
    }

    info!(user_id = %user.id, "Login");

    let token = TokenPair {
        access: state.jwt.generate_access_token(&user.id, &user.email, user.role)?,
        refresh: state.jwt.generate_refresh_token(&user.id, &user.email, user.role)?,
    };

    Ok(Json(AuthResponse {
        message: "Login Successful!".to_string(),
        token,
    }))
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh: String,
}

#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub access: String,
}

/// POST /auth/refresh
pub async fn refresh(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RefreshRequest>,
) -> Result<Json<RefreshResponse>, ApiError> {
    let claims = state.jwt.validate_refresh_token(&req.refresh)?;

    // The account may have been deactivated since the token was issued.
    let user = state
        .db
        .users()
        .get_by_id(&claims.sub)
        .await?
        .filter(|u| u.is_active)
        .ok_or_else(|| ApiError::unauthorized("Invalid credentials"))?;

    let access = state.jwt.generate_access_token(&user.id, &user.email, user.role)?;

    Ok(Json(RefreshResponse { access }))
}

fn require_admin_caller(state: &AppState, headers: &HeaderMap) -> Result<(), ApiError> {
    let auth_header = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            ApiError::forbidden("Staff accounts can only be created by an administrator")
        })?;

    let token = extract_bearer_token(auth_header)
        .ok_or_else(|| ApiError::unauthorized("Invalid authorization header"))?;

    let claims = state.jwt.validate_access_token(token)?;
    if claims.role != Role::Admin {
        return Err(ApiError::forbidden(
            "Staff accounts can only be created by an administrator",
        ));
    }

    Ok(())
}
