// HTTP handlers for category management

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::categories::models::{
    CategoryDetail, CategoryResponse, CreateCategory, UpdateCategory,
};
use crate::error::ApiError;
use crate::validation::slugify;
use crate::AppState;

const CATEGORY_MEDIA_FOLDER: &str = "meesha-categories";

/// Upload a category image source and return the hosted URL. Categories
/// keep only the URL; their assets are not tracked for deletion.
async fn upload_image(state: &AppState, source: &str) -> Result<String, ApiError> {
    let stored = state
        .media
        .upload(source, CATEGORY_MEDIA_FOLDER)
        .await
        .map_err(|e| ApiError::InternalError(format!("image upload failed: {e}")))?;
    Ok(stored.url)
}

/// Handler for GET /api/categories
#[utoipa::path(
    get,
    path = "/api/categories",
    responses(
        (status = 200, description = "All categories, name ascending", body = [CategoryResponse])
    ),
    tag = "categories"
)]
pub async fn list_categories_handler(
    State(state): State<AppState>,
) -> Result<Json<Vec<CategoryResponse>>, ApiError> {
    let categories = state.categories.list().await?;
    Ok(Json(categories))
}

/// Handler for GET /api/categories/:id
/// Category detail with the products filed under it.
#[utoipa::path(
    get,
    path = "/api/categories/{id}",
    params(("id" = Uuid, Path, description = "Category id")),
    responses(
        (status = 200, description = "Category with its products", body = CategoryDetail),
        (status = 404, description = "No category with this id")
    ),
    tag = "categories"
)]
pub async fn get_category_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<CategoryDetail>, ApiError> {
    let category = state
        .categories
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound {
            resource: "Category".to_string(),
            id: id.to_string(),
        })?;

    let products = state.categories.products_in(id).await?;

    Ok(Json(CategoryDetail { category, products }))
}

/// Handler for POST /api/categories (admin)
/// The key is always derived from the name server-side.
#[utoipa::path(
    post,
    path = "/api/categories",
    request_body = CreateCategory,
    responses(
        (status = 201, description = "Category created", body = CategoryResponse),
        (status = 400, description = "Invalid input"),
        (status = 409, description = "Category already exists")
    ),
    security(("bearer_token" = [])),
    tag = "categories"
)]
pub async fn create_category_handler(
    State(state): State<AppState>,
    Json(request): Json<CreateCategory>,
) -> Result<(StatusCode, Json<CategoryResponse>), ApiError> {
    request.validate()?;

    let image = match &request.image {
        Some(source) => Some(upload_image(&state, source).await?),
        None => None,
    };

    let key = slugify(&request.name);
    let category = state
        .categories
        .insert(&key, &request.name, image.as_deref())
        .await?;

    tracing::info!("Created category {} ({})", category.name, category.id);
    Ok((StatusCode::CREATED, Json(category)))
}

/// Handler for PUT /api/categories/:id (admin)
/// Renaming re-derives the key so catalog filters stay consistent.
#[utoipa::path(
    put,
    path = "/api/categories/{id}",
    params(("id" = Uuid, Path, description = "Category id")),
    request_body = UpdateCategory,
    responses(
        (status = 200, description = "Category updated", body = CategoryResponse),
        (status = 404, description = "No category with this id"),
        (status = 409, description = "Category name already taken")
    ),
    security(("bearer_token" = [])),
    tag = "categories"
)]
pub async fn update_category_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateCategory>,
) -> Result<Json<CategoryResponse>, ApiError> {
    request.validate()?;

    let image = match &request.image {
        Some(source) => Some(upload_image(&state, source).await?),
        None => None,
    };

    let key = request.name.as_deref().map(slugify);
    let category = state
        .categories
        .update(id, key.as_deref(), request.name.as_deref(), image.as_deref())
        .await?
        .ok_or_else(|| ApiError::NotFound {
            resource: "Category".to_string(),
            id: id.to_string(),
        })?;

    Ok(Json(category))
}

/// Handler for DELETE /api/categories/:id (admin)
/// A category still referenced by products cannot be removed.
#[utoipa::path(
    delete,
    path = "/api/categories/{id}",
    params(("id" = Uuid, Path, description = "Category id")),
    responses(
        (status = 204, description = "Category deleted"),
        (status = 404, description = "No category with this id"),
        (status = 409, description = "Products still reference this category")
    ),
    security(("bearer_token" = [])),
    tag = "categories"
)]
pub async fn delete_category_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let in_use = state.categories.product_count(id).await?;
    if in_use > 0 {
        return Err(ApiError::Conflict {
            message: format!("Category is referenced by {} product(s)", in_use),
        });
    }

    let deleted = state.categories.delete(id).await?;
    if !deleted {
        return Err(ApiError::NotFound {
            resource: "Category".to_string(),
            id: id.to_string(),
        });
    }

    tracing::info!("Deleted category {}", id);
    Ok(StatusCode::NO_CONTENT)
}
