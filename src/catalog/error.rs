// Catalog error types and HTTP mappings

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use uuid::Uuid;

use crate::error::ErrorResponse;
use crate::media::MediaError;

/// Errors raised by catalog operations
#[derive(Debug)]
pub enum CatalogError {
    ValidationError(String),
    ProductNotFound(Uuid),
    NameTaken(String),
    /// A referenced category/type/objective/color id does not exist
    InvalidReference(String),
    UploadFailed(String),
    DatabaseError(sqlx::Error),
}

impl std::fmt::Display for CatalogError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CatalogError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            CatalogError::ProductNotFound(id) => write!(f, "Product {} not found", id),
            CatalogError::NameTaken(name) => write!(f, "Product name '{}' already exists", name),
            CatalogError::InvalidReference(msg) => write!(f, "Invalid reference: {}", msg),
            CatalogError::UploadFailed(msg) => write!(f, "Image upload failed: {}", msg),
            CatalogError::DatabaseError(e) => write!(f, "Database error: {}", e),
        }
    }
}

impl std::error::Error for CatalogError {}

impl CatalogError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            CatalogError::ValidationError(_) | CatalogError::InvalidReference(_) => {
                StatusCode::BAD_REQUEST
            }
            CatalogError::ProductNotFound(_) => StatusCode::NOT_FOUND,
            CatalogError::NameTaken(_) => StatusCode::CONFLICT,
            CatalogError::UploadFailed(_) | CatalogError::DatabaseError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            CatalogError::ValidationError(_) => "VALIDATION_ERROR",
            CatalogError::ProductNotFound(_) => "PRODUCT_NOT_FOUND",
            CatalogError::NameTaken(_) => "PRODUCT_NAME_TAKEN",
            CatalogError::InvalidReference(_) => "INVALID_REFERENCE",
            CatalogError::UploadFailed(_) => "UPLOAD_FAILED",
            CatalogError::DatabaseError(_) => "DATABASE_ERROR",
        }
    }
}

impl From<sqlx::Error> for CatalogError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_foreign_key_violation() {
                return CatalogError::InvalidReference(
                    "category, type, objective or color does not exist".to_string(),
                );
            }
        }
        CatalogError::DatabaseError(err)
    }
}

impl From<MediaError> for CatalogError {
    fn from(err: MediaError) -> Self {
        CatalogError::UploadFailed(err.to_string())
    }
}

impl IntoResponse for CatalogError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Internal failures are logged with detail but reported opaquely
        let message = match &self {
            CatalogError::DatabaseError(e) => {
                tracing::error!("Catalog database error: {}", e);
                "An internal error occurred".to_string()
            }
            CatalogError::UploadFailed(msg) => {
                tracing::error!("Image upload failed: {}", msg);
                "Image upload failed".to_string()
            }
            other => other.to_string(),
        };

        let body = ErrorResponse::new(self.error_code(), message, None);
        (status, Json(body)).into_response()
    }
}
