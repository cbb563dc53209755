// Catalog data models and DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// An image asset owned by a product. `public_id` identifies the stored
/// object at the media host and is required to release it when the
/// product is deleted or the image replaced.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductImage {
    pub url: String,
    pub public_id: String,
}

/// A reference-table row (Category / Type / Objective / Color)
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct RefItem {
    pub id: Uuid,
    pub key: String,
    pub name: String,
    pub image: Option<String>,
}

/// The embedded projection of a reference entry on a product
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RefEntry {
    pub key: String,
    pub name: String,
}

/// Flat row shape produced by the joined product listing query
#[derive(Debug, Clone, FromRow)]
pub struct ProductRecord {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub price: i64,
    pub stock: i32,
    pub size: String,
    pub variant: Vec<String>,
    pub image_url: Option<String>,
    pub image_public_id: Option<String>,
    pub category_key: String,
    pub category_name: String,
    pub type_key: String,
    pub type_name: String,
    pub objective_key: String,
    pub objective_name: String,
    pub color_key: String,
    pub color_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Product response with its reference entries embedded
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductResponse {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub price: i64,
    pub stock: i32,
    pub size: String,
    pub variant: Vec<String>,
    #[serde(rename = "imageUrl")]
    pub image: Option<ProductImage>,
    pub category: RefEntry,
    #[serde(rename = "type")]
    pub type_: RefEntry,
    pub objective: RefEntry,
    pub color: RefEntry,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ProductRecord> for ProductResponse {
    fn from(row: ProductRecord) -> Self {
        let image = match (row.image_url, row.image_public_id) {
            (Some(url), Some(public_id)) => Some(ProductImage { url, public_id }),
            _ => None,
        };

        Self {
            id: row.id,
            name: row.name,
            description: row.description,
            price: row.price,
            stock: row.stock,
            size: row.size,
            variant: row.variant,
            image,
            category: RefEntry {
                key: row.category_key,
                name: row.category_name,
            },
            type_: RefEntry {
                key: row.type_key,
                name: row.type_name,
            },
            objective: RefEntry {
                key: row.objective_key,
                name: row.objective_name,
            },
            color: RefEntry {
                key: row.color_key,
                name: row.color_name,
            },
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// One page of catalog results
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductPage {
    pub items: Vec<ProductResponse>,
    /// Count of the full matching set, not just this page
    pub total: i64,
    pub page: u32,
    pub total_pages: i64,
}

/// All four reference tables, as served by GET /api/products/meta
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MetaResponse {
    pub categories: Vec<RefItem>,
    pub types: Vec<RefItem>,
    pub objectives: Vec<RefItem>,
    pub colors: Vec<RefItem>,
}

/// Create-product request DTO. `image` is a source URL (or data URI)
/// that the media host ingests; the stored {url, publicId} pair is what
/// ends up on the product.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateProduct {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[validate(range(min = 0, message = "price must be non-negative"))]
    pub price: i64,
    #[validate(range(min = 0, message = "stock must be non-negative"))]
    pub stock: i32,
    #[validate(custom = "crate::validation::validate_size")]
    pub size: String,
    #[serde(default)]
    pub variant: Vec<String>,
    pub image: Option<String>,
    pub category_id: Uuid,
    pub type_id: Uuid,
    pub objective_id: Uuid,
    pub color_id: Uuid,
}

/// Update-product request DTO; all fields optional to support both PUT
/// and PATCH semantics
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateProduct {
    #[validate(length(min = 1, message = "name cannot be empty"))]
    pub name: Option<String>,
    pub description: Option<String>,
    #[validate(range(min = 0, message = "price must be non-negative"))]
    pub price: Option<i64>,
    #[validate(range(min = 0, message = "stock must be non-negative"))]
    pub stock: Option<i32>,
    #[validate(custom = "crate::validation::validate_size")]
    pub size: Option<String>,
    pub variant: Option<Vec<String>>,
    pub image: Option<String>,
    pub category_id: Option<Uuid>,
    pub type_id: Option<Uuid>,
    pub objective_id: Option<Uuid>,
    pub color_id: Option<Uuid>,
}
