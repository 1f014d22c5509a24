//! Authentication, profile and user administration routes.

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use uuid::Uuid;

use super::error::ApiError;
use super::extract::{ApiJson, ApiPath, AuthUser};
use super::AppState;
use crate::auth::{ProfileUpdate, Registration, Session, TokenPair};
use crate::domain::{Capability, Role, User};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/admin/login", post(admin_login))
        .route("/auth/refresh", post(refresh))
        .route("/users/profile", get(profile).put(update_profile))
        .route("/users/change-password", post(change_password))
        .route("/users/logout", post(logout))
        .route("/admin/users", get(list_users))
        .route("/admin/users/:id", get(get_user))
        .route("/admin/users/role/:role", get(users_with_role))
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub user_id: Uuid,
    pub refresh_token: String,
}

#[derive(Debug, Deserialize)]
pub struct PasswordChange {
    pub old_password: String,
    pub new_password: String,
}

async fn register(
    State(state): State<AppState>,
    ApiJson(form): ApiJson<Registration>,
) -> Result<(StatusCode, Json<Session>), ApiError> {
    let session = state.auth.register(form).await?;
    Ok((StatusCode::CREATED, Json(session)))
}

async fn login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> Result<Json<Session>, ApiError> {
    Ok(Json(state.auth.login(&req.email, &req.password).await?))
}

async fn admin_login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> Result<Json<Session>, ApiError> {
    Ok(Json(state.auth.admin_login(&req.email, &req.password).await?))
}

async fn refresh(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<RefreshRequest>,
) -> Result<Json<TokenPair>, ApiError> {
    Ok(Json(state.auth.refresh(req.user_id, &req.refresh_token).await?))
}

async fn profile(State(state): State<AppState>, caller: AuthUser) -> Result<Json<User>, ApiError> {
    Ok(Json(state.users.profile(caller.id).await?))
}

async fn update_profile(
    State(state): State<AppState>,
    caller: AuthUser,
    ApiJson(update): ApiJson<ProfileUpdate>,
) -> Result<Json<User>, ApiError> {
    Ok(Json(state.users.update_profile(caller.id, update).await?))
}

async fn change_password(
    State(state): State<AppState>,
    caller: AuthUser,
    ApiJson(req): ApiJson<PasswordChange>,
) -> Result<StatusCode, ApiError> {
    state
        .users
        .change_password(caller.id, &req.old_password, &req.new_password)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn logout(State(state): State<AppState>, caller: AuthUser) -> Result<StatusCode, ApiError> {
    state.auth.logout(caller.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn list_users(
    State(state): State<AppState>,
    caller: AuthUser,
) -> Result<Json<Vec<User>>, ApiError> {
    caller.require(Capability::ReadUsers)?;
    Ok(Json(state.users.list_users().await?))
}

async fn get_user(
    State(state): State<AppState>,
    caller: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<User>, ApiError> {
    caller.require(Capability::ReadUsers)?;
    Ok(Json(state.users.get_user(id).await?))
}

async fn users_with_role(
    State(state): State<AppState>,
    caller: AuthUser,
    ApiPath(role): ApiPath<String>,
) -> Result<Json<Vec<User>>, ApiError> {
    caller.require(Capability::ReadUsers)?;
    let role: Role = role
        .parse()
        .map_err(|e: crate::domain::UnknownRole| ApiError::bad_request(e.to_string()))?;
    Ok(Json(state.users.users_with_role(role).await?))
}
