// HTTP handlers for authentication endpoints

use crate::auth::{
    error::AuthError,
    middleware::AuthenticatedUser,
    models::{
        AuthResponse, ForgotPasswordRequest, LoginRequest, MessageResponse, RegisterRequest,
        ResetPasswordRequest, UserResponse,
    },
};
use crate::AppState;
use axum::{extract::State, http::StatusCode, Json};
use validator::Validate;

/// Handler for POST /api/auth/register
/// Creates a new user account. An authenticated admin caller may request
/// the ADMIN role for the new account; everyone else gets USER.
#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered", body = AuthResponse),
        (status = 400, description = "Invalid input data"),
        (status = 409, description = "Email already registered")
    ),
    tag = "auth"
)]
pub async fn register_handler(
    State(state): State<AppState>,
    requester: Option<AuthenticatedUser>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), AuthError> {
    request
        .validate()
        .map_err(|e| AuthError::ValidationError(e.to_string()))?;

    let response = state
        .auth_service
        .register(request, requester.map(|u| u.role))
        .await?;

    Ok((StatusCode::CREATED, Json(response)))
}

/// Handler for POST /api/auth/login
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 401, description = "Invalid email or password")
    ),
    tag = "auth"
)]
pub async fn login_handler(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AuthError> {
    request
        .validate()
        .map_err(|e| AuthError::ValidationError(e.to_string()))?;

    let response = state.auth_service.login(request).await?;
    Ok(Json(response))
}

/// Handler for GET /api/auth/profile (protected)
#[utoipa::path(
    get,
    path = "/api/auth/profile",
    responses(
        (status = 200, description = "Current user profile", body = UserResponse),
        (status = 401, description = "Missing or invalid token"),
        (status = 404, description = "User record no longer exists")
    ),
    security(("bearer_token" = [])),
    tag = "auth"
)]
pub async fn profile_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<UserResponse>, AuthError> {
    let profile = state.auth_service.get_profile(user.user_id).await?;
    Ok(Json(profile))
}

/// Handler for POST /api/auth/forgot-password
/// Always answers with the same generic message so account existence
/// cannot be enumerated.
#[utoipa::path(
    post,
    path = "/api/auth/forgot-password",
    request_body = ForgotPasswordRequest,
    responses(
        (status = 200, description = "Generic acknowledgement", body = MessageResponse)
    ),
    tag = "auth"
)]
pub async fn forgot_password_handler(
    State(state): State<AppState>,
    Json(request): Json<ForgotPasswordRequest>,
) -> Result<Json<MessageResponse>, AuthError> {
    request
        .validate()
        .map_err(|e| AuthError::ValidationError(e.to_string()))?;

    state.auth_service.forgot_password(&request.email).await?;

    Ok(Json(MessageResponse {
        message: "If the email is registered, reset instructions will be sent".to_string(),
    }))
}

/// Handler for POST /api/auth/reset-password
#[utoipa::path(
    post,
    path = "/api/auth/reset-password",
    request_body = ResetPasswordRequest,
    responses(
        (status = 200, description = "Password changed", body = MessageResponse),
        (status = 400, description = "Token invalid/expired or password too short")
    ),
    tag = "auth"
)]
pub async fn reset_password_handler(
    State(state): State<AppState>,
    Json(request): Json<ResetPasswordRequest>,
) -> Result<Json<MessageResponse>, AuthError> {
    request
        .validate()
        .map_err(|e| AuthError::ValidationError(e.to_string()))?;

    state
        .auth_service
        .reset_password(&request.token, &request.password)
        .await?;

    Ok(Json(MessageResponse {
        message: "Password changed successfully".to_string(),
    }))
}
