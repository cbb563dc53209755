// Authentication module
// JWT-based authentication with registration, login, role-based access
// control and the password-reset token lifecycle

pub mod error;
pub mod handlers;
pub mod mailer;
pub mod middleware;
pub mod models;
pub mod password;
pub mod repository;
pub mod service;
pub mod token;

// Re-export commonly used types
pub use error::AuthError;
pub use mailer::{LogMailer, ResetMailer};
pub use middleware::{AuthenticatedUser, RequireRole};
pub use models::{AuthResponse, LoginRequest, RegisterRequest, Role, User, UserResponse};
pub use service::{can_assign_role, AuthService};
pub use token::TokenService;
