// Authentication middleware for protected routes

use crate::auth::{error::AuthError, models::Role, token::TokenService};
use axum::{
    async_trait,
    body::Body,
    extract::FromRequestParts,
    http::{header, request::Parts, Request},
    middleware::Next,
    response::Response,
};
use tracing::{debug, warn};
use uuid::Uuid;

/// Authenticated user extractor for protected routes. Carries the
/// verified identity and role so downstream handlers never re-verify
/// the token.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub email: String,
    pub role: Role,
}

/// Pull and verify the bearer token from an Authorization header value
fn verify_bearer(auth_header: &str) -> Result<AuthenticatedUser, AuthError> {
    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(AuthError::InvalidToken)?;

    let jwt_secret = std::env::var("JWT_SECRET")
        .map_err(|_| AuthError::ConfigError("JWT_SECRET not configured".to_string()))?;

    let token_service = TokenService::new(jwt_secret);
    let claims = token_service.validate_access_token(token)?;

    Ok(AuthenticatedUser {
        user_id: claims.sub,
        email: claims.email,
        role: claims.role,
    })
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .ok_or(AuthError::MissingToken)?
            .to_str()
            .map_err(|_| AuthError::InvalidToken)?;

        verify_bearer(auth_header)
    }
}

/// Authorization middleware that requires a specific role.
///
/// Runs strictly after authentication: the token is verified first and
/// only then is the role compared, so an invalid token is always a 401
/// and a valid token with the wrong role a 403.
#[derive(Debug, Clone)]
pub struct RequireRole {
    required_role: Role,
}

impl RequireRole {
    /// Create a new RequireRole middleware with the specified requirement
    pub fn new(required_role: Role) -> Self {
        Self { required_role }
    }

    /// Create a middleware that requires the Admin role
    pub fn admin() -> Self {
        Self::new(Role::Admin)
    }

    /// Middleware function that validates role-based access
    pub async fn middleware(
        self,
        request: Request<Body>,
        next: Next,
    ) -> Result<Response, AuthError> {
        let endpoint = request.uri().path().to_string();

        let auth_header = request
            .headers()
            .get(header::AUTHORIZATION)
            .ok_or_else(|| {
                warn!(
                    "Missing Authorization header in request to protected endpoint: {}",
                    endpoint
                );
                AuthError::MissingToken
            })?
            .to_str()
            .map_err(|_| {
                warn!("Invalid Authorization header format for endpoint: {}", endpoint);
                AuthError::InvalidToken
            })?;

        let user = verify_bearer(auth_header)?;

        if user.role != self.required_role {
            warn!(
                "Authorization failed: user_id={}, required_role={}, actual_role={}, endpoint={}",
                user.user_id, self.required_role, user.role, endpoint
            );
            return Err(AuthError::InsufficientPermissions {
                required: self.required_role,
                actual: user.role,
            });
        }

        debug!(
            "Authorization successful: user_id={}, role={}, endpoint={}",
            user.user_id, user.role, endpoint
        );
        Ok(next.run(request).await)
    }
}
