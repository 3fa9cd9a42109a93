//! Authentication endpoints

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::user::{CreateUser, User},
    services::sessions::LoginOutcome,
};

use super::AuthenticatedUser;

#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize, ToSchema)]
pub struct LoginResponse {
    pub message: String,
    pub access_token: String,
    pub token_type: String,
    pub is_admin: bool,
}

#[derive(Deserialize, ToSchema)]
pub struct LogoutRequest {
    /// Must match the identity of the presented token
    pub email: String,
}

#[derive(Deserialize, ToSchema)]
pub struct ResetPasswordRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

/// Register a new user
#[utoipa::path(
    post,
    path = "/auth/register",
    tag = "auth",
    request_body = CreateUser,
    responses(
        (status = 201, description = "User registered", body = User),
        (status = 400, description = "Invalid input"),
        (status = 409, description = "Username or email taken")
    )
)]
pub async fn register(
    State(state): State<crate::AppState>,
    Json(user): Json<CreateUser>,
) -> AppResult<(StatusCode, Json<User>)> {
    let created = state.services.users.register(user).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Log in and receive a bearer token
#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in, or already logged in", body = LoginResponse),
        (status = 400, description = "Missing credentials"),
        (status = 401, description = "Wrong email or password")
    )
)]
pub async fn login(
    State(state): State<crate::AppState>,
    Json(request): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let outcome = state.services.sessions.login(&request.email, &request.password).await?;

    let message = match outcome {
        LoginOutcome::Created { .. } => "You logged in successfully.",
        LoginOutcome::AlreadyActive { .. } => "User is already logged in.",
    };

    Ok(Json(LoginResponse {
        message: message.to_string(),
        access_token: outcome.token().to_string(),
        token_type: "Bearer".to_string(),
        is_admin: outcome.is_admin(),
    }))
}

/// Log out, revoking the presented token
#[utoipa::path(
    post,
    path = "/auth/logout",
    tag = "auth",
    security(("bearer_auth" = [])),
    request_body = LogoutRequest,
    responses(
        (status = 200, description = "Logged out", body = MessageResponse),
        (status = 401, description = "Not logged in or identity mismatch")
    )
)]
pub async fn logout(
    State(state): State<crate::AppState>,
    AuthenticatedUser(caller): AuthenticatedUser,
    Json(request): Json<LogoutRequest>,
) -> AppResult<Json<MessageResponse>> {
    state.services.sessions.logout(&caller, &request.email).await?;

    Ok(Json(MessageResponse {
        message: "User successfully logged out.".to_string(),
    }))
}

/// Reset the caller's password; the presented token is revoked
#[utoipa::path(
    post,
    path = "/auth/reset",
    tag = "auth",
    security(("bearer_auth" = [])),
    request_body = ResetPasswordRequest,
    responses(
        (status = 200, description = "Password reset", body = MessageResponse),
        (status = 400, description = "Weak or unchanged password"),
        (status = 401, description = "Not authenticated or wrong email")
    )
)]
pub async fn reset_password(
    State(state): State<crate::AppState>,
    AuthenticatedUser(caller): AuthenticatedUser,
    Json(request): Json<ResetPasswordRequest>,
) -> AppResult<Json<MessageResponse>> {
    state
        .services
        .sessions
        .reset_password(&caller, &request.email, &request.password)
        .await?;

    Ok(Json(MessageResponse {
        message: "Password reset successful.".to_string(),
    }))
}
