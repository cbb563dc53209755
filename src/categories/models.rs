// Category data models and DTOs
//
// Categories are the only reference table with their own management
// endpoints; their `key` is always derived from the name by the server.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryResponse {
    pub id: Uuid,
    /// URL-safe slug derived from the name, used by catalog filters
    pub key: String,
    pub name: String,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Compact product projection embedded in the category detail view
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryProduct {
    pub id: Uuid,
    pub name: String,
    pub price: i64,
    pub image_url: Option<String>,
}

/// A category together with the products filed under it
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CategoryDetail {
    #[serde(flatten)]
    pub category: CategoryResponse,
    pub products: Vec<CategoryProduct>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateCategory {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    /// Optional image source URL ingested by the media host
    pub image: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateCategory {
    #[validate(length(min = 1, message = "name cannot be empty"))]
    pub name: Option<String>,
    pub image: Option<String>,
}
