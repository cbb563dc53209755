// Authentication service - business logic layer

use crate::auth::{
    error::AuthError,
    mailer::ResetMailer,
    models::{AuthResponse, LoginRequest, RegisterRequest, Role, User, UserResponse},
    password::PasswordService,
    repository::UserRepository,
    token::TokenService,
};
use chrono::{Duration, Utc};
use std::sync::Arc;
use uuid::Uuid;

/// Lifetime of a password-reset token in minutes
const RESET_TOKEN_TTL_MINUTES: i64 = 60;

/// Role-assignment policy: a requested role is granted only when the
/// requester is an authenticated admin; anything else is silently
/// downgraded to USER so the public register endpoint can never escalate
/// privileges.
pub fn can_assign_role(requester: Option<Role>, requested: Role) -> Role {
    match (requested, requester) {
        (Role::Admin, Some(Role::Admin)) => Role::Admin,
        _ => Role::User,
    }
}

/// Authentication service coordinating registration, login, profile
/// retrieval and the password-reset lifecycle
pub struct AuthService {
    users: UserRepository,
    tokens: TokenService,
    mailer: Arc<dyn ResetMailer>,
}

impl AuthService {
    /// Create a new AuthService
    pub fn new(users: UserRepository, tokens: TokenService, mailer: Arc<dyn ResetMailer>) -> Self {
        Self {
            users,
            tokens,
            mailer,
        }
    }

    /// Register a new user. `requester_role` is the verified role of the
    /// caller, when the request carried a valid bearer token.
    pub async fn register(
        &self,
        request: RegisterRequest,
        requester_role: Option<Role>,
    ) -> Result<AuthResponse, AuthError> {
        if self.users.email_exists(&request.email).await? {
            return Err(AuthError::EmailAlreadyExists);
        }

        let role = can_assign_role(requester_role, request.role.unwrap_or(Role::User));

        // Argon2 is CPU-bound; keep it off the async worker threads
        let password = request.password;
        let password_hash =
            tokio::task::spawn_blocking(move || PasswordService::hash_password(&password))
                .await
                .map_err(|_| AuthError::PasswordHashError)??;

        let user = self
            .users
            .create_user(
                &request.name,
                &request.email,
                request.phone.as_deref(),
                &password_hash,
                role,
            )
            .await?;

        tracing::info!("Registered user {} with role {}", user.id, user.role);
        self.auth_response(user)
    }

    /// Login with email and password. Unknown email and wrong password
    /// both surface the same InvalidCredentials error.
    pub async fn login(&self, request: LoginRequest) -> Result<AuthResponse, AuthError> {
        let user = self
            .users
            .find_by_email(&request.email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        let password = request.password;
        let hash = user.password_hash.clone();
        let verified =
            tokio::task::spawn_blocking(move || PasswordService::verify_password(&password, &hash))
                .await
                .map_err(|_| AuthError::PasswordHashError)??;

        if !verified {
            return Err(AuthError::InvalidCredentials);
        }

        tracing::debug!("User {} logged in", user.id);
        self.auth_response(user)
    }

    /// Get the profile of the authenticated user, excluding password and
    /// reset-token fields
    pub async fn get_profile(&self, user_id: Uuid) -> Result<UserResponse, AuthError> {
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        Ok(user.into())
    }

    /// Begin a password reset. Succeeds generically whether or not the
    /// email is registered so account existence cannot be enumerated.
    pub async fn forgot_password(&self, email: &str) -> Result<(), AuthError> {
        let Some(user) = self.users.find_by_email(email).await? else {
            tracing::debug!("Password reset requested for unknown email");
            return Ok(());
        };

        let token = TokenService::generate_reset_token();
        let expires_at = Utc::now() + Duration::minutes(RESET_TOKEN_TTL_MINUTES);

        self.users
            .set_reset_token(user.id, &token, expires_at)
            .await?;

        self.mailer.send_reset_token(&user.email, &token).await;
        Ok(())
    }

    /// Complete a password reset. The token is consumed and the password
    /// replaced in a single atomic update; a second attempt with the same
    /// token fails.
    pub async fn reset_password(&self, token: &str, new_password: &str) -> Result<(), AuthError> {
        let password = new_password.to_string();
        let password_hash =
            tokio::task::spawn_blocking(move || PasswordService::hash_password(&password))
                .await
                .map_err(|_| AuthError::PasswordHashError)??;

        let consumed = self.users.consume_reset_token(token, &password_hash).await?;
        if !consumed {
            return Err(AuthError::InvalidOrExpiredResetToken);
        }

        tracing::info!("Password reset completed");
        Ok(())
    }

    fn auth_response(&self, user: User) -> Result<AuthResponse, AuthError> {
        let token = self
            .tokens
            .generate_access_token(user.id, &user.email, user.role)?;

        Ok(AuthResponse {
            user: user.into(),
            token,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// An unauthenticated caller can never create an admin
    #[test]
    fn test_anonymous_cannot_assign_admin() {
        assert_eq!(can_assign_role(None, Role::Admin), Role::User);
    }

    /// A regular user requesting admin is silently downgraded
    #[test]
    fn test_user_cannot_escalate_to_admin() {
        assert_eq!(can_assign_role(Some(Role::User), Role::Admin), Role::User);
    }

    /// Only an authenticated admin may mint another admin
    #[test]
    fn test_admin_can_assign_admin() {
        assert_eq!(can_assign_role(Some(Role::Admin), Role::Admin), Role::Admin);
    }

    /// Requesting USER always yields USER, whoever asks
    #[test]
    fn test_user_role_is_always_granted() {
        assert_eq!(can_assign_role(None, Role::User), Role::User);
        assert_eq!(can_assign_role(Some(Role::User), Role::User), Role::User);
        assert_eq!(can_assign_role(Some(Role::Admin), Role::User), Role::User);
    }
}
