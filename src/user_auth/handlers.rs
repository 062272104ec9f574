use axum::{
    Extension, Json,
    extract::{ConnectInfo, State},
    http::StatusCode,
};
use std::net::SocketAddr;
use std::sync::Arc;

use super::error::AuthError;
use super::service::{ChangePasswordRequest, CredentialsRequest, RegisteredUser};
use super::token::{Claims, IssuedToken};
use crate::audit::ActionRecord;
use crate::credential::{StoreError, normalize_email};
use crate::gateway::{
    state::AppState,
    types::{ApiResponse, JsonBody},
};

const USERS: &str = "Users";
const ACTIONS: &str = "Actions";

type HandlerResult<T> = Result<(StatusCode, Json<ApiResponse<T>>), AuthError>;

/// Register a new user
///
/// POST /api/v1/users/register
#[utoipa::path(
    post,
    path = "/api/v1/users/register",
    request_body = CredentialsRequest,
    responses(
        (status = 201, description = "User registered successfully", body = ApiResponse<RegisteredUser>),
        (status = 400, description = "Invalid email or password"),
        (status = 409, description = "Email already registered"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Users"
)]
pub async fn register(
    State(state): State<Arc<AppState>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    JsonBody(req): JsonBody<CredentialsRequest>,
) -> HandlerResult<RegisteredUser> {
    let user = state.user_auth.register(&req.email, &req.password).await?;
    state
        .actions
        .record("Register", USERS, &addr.ip().to_string())
        .await;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(user))))
}

/// Check credentials without issuing a token
///
/// POST /api/v1/users/check
#[utoipa::path(
    post,
    path = "/api/v1/users/check",
    request_body = CredentialsRequest,
    responses(
        (status = 200, description = "Credentials valid"),
        (status = 401, description = "Invalid credentials")
    ),
    tag = "Users"
)]
pub async fn check_credentials(
    State(state): State<Arc<AppState>>,
    JsonBody(req): JsonBody<CredentialsRequest>,
) -> HandlerResult<()> {
    state
        .user_auth
        .check_credentials(&req.email, &req.password)
        .await?;
    Ok((StatusCode::OK, Json(ApiResponse::success(()))))
}

/// Login user
///
/// POST /api/v1/users/login
#[utoipa::path(
    post,
    path = "/api/v1/users/login",
    request_body = CredentialsRequest,
    responses(
        (status = 200, description = "Login successful", body = ApiResponse<IssuedToken>),
        (status = 401, description = "Invalid credentials"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Users"
)]
pub async fn login(
    State(state): State<Arc<AppState>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    JsonBody(req): JsonBody<CredentialsRequest>,
) -> HandlerResult<IssuedToken> {
    let issued = state.user_auth.login(&req.email, &req.password).await?;
    state
        .actions
        .record("Login", USERS, &addr.ip().to_string())
        .await;
    Ok((StatusCode::OK, Json(ApiResponse::success(issued))))
}

/// Renew the bearer token
///
/// POST /api/v1/users/renew
#[utoipa::path(
    post,
    path = "/api/v1/users/renew",
    responses(
        (status = 200, description = "Token renewed", body = ApiResponse<IssuedToken>),
        (status = 401, description = "Missing, invalid or expired token")
    ),
    security(("bearer_jwt" = [])),
    tag = "Users"
)]
pub async fn renew_token(
    State(state): State<Arc<AppState>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Extension(claims): Extension<Claims>,
) -> HandlerResult<IssuedToken> {
    let issued = state.user_auth.renew(&claims.email).await?;
    state
        .actions
        .record("RenewToken", USERS, &addr.ip().to_string())
        .await;
    Ok((StatusCode::OK, Json(ApiResponse::success(issued))))
}

/// Change password
///
/// POST /api/v1/users/change-password
#[utoipa::path(
    post,
    path = "/api/v1/users/change-password",
    request_body = ChangePasswordRequest,
    responses(
        (status = 200, description = "Password updated"),
        (status = 400, description = "New password too short"),
        (status = 401, description = "Current password incorrect or token invalid")
    ),
    security(("bearer_jwt" = [])),
    tag = "Users"
)]
pub async fn change_password(
    State(state): State<Arc<AppState>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Extension(claims): Extension<Claims>,
    JsonBody(req): JsonBody<ChangePasswordRequest>,
) -> HandlerResult<()> {
    // A token only authorises changes to its own subject
    if normalize_email(&req.email) != claims.email {
        tracing::warn!(
            subject = %claims.email,
            target = %normalize_email(&req.email),
            "Password change for another account rejected"
        );
        return Err(AuthError::InvalidCredentials);
    }

    state
        .user_auth
        .change_password(&req.email, &req.password, &req.new_password)
        .await?;
    state
        .actions
        .record("ChangePassword", USERS, &addr.ip().to_string())
        .await;
    Ok((StatusCode::OK, Json(ApiResponse::success(()))))
}

/// List recorded actions
///
/// GET /api/v1/actions
#[utoipa::path(
    get,
    path = "/api/v1/actions",
    responses(
        (status = 200, description = "Action log", body = ApiResponse<Vec<ActionRecord>>),
        (status = 401, description = "Missing, invalid or expired token")
    ),
    security(("bearer_jwt" = [])),
    tag = "Actions"
)]
pub async fn list_actions(
    State(state): State<Arc<AppState>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
) -> HandlerResult<Vec<ActionRecord>> {
    let actions = state
        .actions
        .list()
        .await
        .map_err(|e| AuthError::Storage(StoreError::Database(e)))?;
    state
        .actions
        .record("GetActions", ACTIONS, &addr.ip().to_string())
        .await;
    Ok((StatusCode::OK, Json(ApiResponse::success(actions))))
}
