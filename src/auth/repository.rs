// Database repository for user accounts and reset tokens

use crate::auth::{
    error::AuthError,
    models::{Role, User},
};
use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use sqlx::PgPool;
use uuid::Uuid;

const USER_COLUMNS: &str = "id, name, email, phone, password_hash, role, \
                            reset_token, reset_token_exp, created_at, updated_at";

/// User repository for database operations
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new UserRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Hash a reset token with SHA-256 before it touches the database.
    /// The plaintext token only ever travels to the account owner.
    pub fn hash_reset_token(token: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(token.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    /// Create a new user
    pub async fn create_user(
        &self,
        name: &str,
        email: &str,
        phone: Option<&str>,
        password_hash: &str,
        role: Role,
    ) -> Result<User, AuthError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (name, email, phone, password_hash, role) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {USER_COLUMNS}"
        ))
        .bind(name)
        .bind(email)
        .bind(phone)
        .bind(password_hash)
        .bind(role)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AuthError::EmailAlreadyExists;
                }
            }
            AuthError::DatabaseError(e.to_string())
        })?;

        Ok(user)
    }

    /// Find a user by email (case-insensitive)
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, AuthError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE LOWER(email) = LOWER($1)"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AuthError::DatabaseError(e.to_string()))?;

        Ok(user)
    }

    /// Find a user by ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AuthError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AuthError::DatabaseError(e.to_string()))?;

        Ok(user)
    }

    /// Check if an email exists
    pub async fn email_exists(&self, email: &str) -> Result<bool, AuthError> {
        let exists: (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM users WHERE LOWER(email) = LOWER($1))")
                .bind(email)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| AuthError::DatabaseError(e.to_string()))?;

        Ok(exists.0)
    }

    /// Store a reset token (hashed) with its expiry on the user record
    pub async fn set_reset_token(
        &self,
        user_id: Uuid,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), AuthError> {
        let token_hash = Self::hash_reset_token(token);

        sqlx::query(
            "UPDATE users SET reset_token = $1, reset_token_exp = $2, updated_at = NOW() \
             WHERE id = $3",
        )
        .bind(token_hash)
        .bind(expires_at)
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(|e| AuthError::DatabaseError(e.to_string()))?;

        Ok(())
    }

    /// Consume a reset token: set the new password hash and clear both
    /// reset fields in one UPDATE. The WHERE clause enforces expiry and
    /// single use; zero affected rows means invalid, consumed, or
    /// expired. There is no window where an old token stays valid after
    /// the password change.
    pub async fn consume_reset_token(
        &self,
        token: &str,
        new_password_hash: &str,
    ) -> Result<bool, AuthError> {
        let token_hash = Self::hash_reset_token(token);

        let result = sqlx::query(
            "UPDATE users \
             SET password_hash = $1, reset_token = NULL, reset_token_exp = NULL, \
                 updated_at = NOW() \
             WHERE reset_token = $2 AND reset_token_exp > NOW()",
        )
        .bind(new_password_hash)
        .bind(token_hash)
        .execute(&self.pool)
        .await
        .map_err(|e| AuthError::DatabaseError(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }
}
