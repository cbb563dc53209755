// HTTP handlers for the product catalog

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::catalog::error::CatalogError;
use crate::catalog::models::{
    CreateProduct, MetaResponse, ProductPage, ProductResponse, UpdateProduct,
};
use crate::catalog::query::{ProductFilter, ProductQueryParams};
use crate::AppState;

/// Handler for GET /api/products
/// Filtered, paginated product listing. Malformed filter values are a
/// 400, never silently dropped.
#[utoipa::path(
    get,
    path = "/api/products",
    params(ProductQueryParams),
    responses(
        (status = 200, description = "One page of products", body = ProductPage),
        (status = 400, description = "Malformed filter value")
    ),
    tag = "catalog"
)]
pub async fn list_products_handler(
    State(state): State<AppState>,
    Query(params): Query<ProductQueryParams>,
) -> Result<Json<ProductPage>, CatalogError> {
    let filter = ProductFilter::from_params(params)
        .map_err(|e| CatalogError::ValidationError(e.message))?;

    let page = state.catalog_service.list_products(filter).await?;
    Ok(Json(page))
}

/// Handler for GET /api/products/meta
/// All four reference tables in one response, served cache-first.
#[utoipa::path(
    get,
    path = "/api/products/meta",
    responses(
        (status = 200, description = "Reference tables", body = MetaResponse)
    ),
    tag = "catalog"
)]
pub async fn meta_handler(
    State(state): State<AppState>,
) -> Result<Json<MetaResponse>, CatalogError> {
    let meta = state.catalog_service.get_meta().await?;
    Ok(Json(meta))
}

/// Handler for GET /api/products/:id
#[utoipa::path(
    get,
    path = "/api/products/{id}",
    params(("id" = Uuid, Path, description = "Product id")),
    responses(
        (status = 200, description = "Product detail", body = ProductResponse),
        (status = 404, description = "No product with this id")
    ),
    tag = "catalog"
)]
pub async fn get_product_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ProductResponse>, CatalogError> {
    let product = state.catalog_service.get_product(id).await?;
    Ok(Json(product))
}

/// Handler for POST /api/products (admin)
#[utoipa::path(
    post,
    path = "/api/products",
    request_body = CreateProduct,
    responses(
        (status = 201, description = "Product created", body = ProductResponse),
        (status = 400, description = "Invalid input or unknown reference id"),
        (status = 409, description = "Product name already exists")
    ),
    security(("bearer_token" = [])),
    tag = "catalog"
)]
pub async fn create_product_handler(
    State(state): State<AppState>,
    Json(request): Json<CreateProduct>,
) -> Result<(StatusCode, Json<ProductResponse>), CatalogError> {
    request
        .validate()
        .map_err(|e| CatalogError::ValidationError(e.to_string()))?;

    let product = state.catalog_service.create_product(request).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// Handler for PUT and PATCH /api/products/:id (admin)
/// Both verbs share partial-update semantics; absent fields are left
/// untouched.
#[utoipa::path(
    put,
    path = "/api/products/{id}",
    params(("id" = Uuid, Path, description = "Product id")),
    request_body = UpdateProduct,
    responses(
        (status = 200, description = "Product updated", body = ProductResponse),
        (status = 400, description = "Invalid input or unknown reference id"),
        (status = 404, description = "No product with this id"),
        (status = 409, description = "Product name already exists")
    ),
    security(("bearer_token" = [])),
    tag = "catalog"
)]
pub async fn update_product_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateProduct>,
) -> Result<Json<ProductResponse>, CatalogError> {
    request
        .validate()
        .map_err(|e| CatalogError::ValidationError(e.to_string()))?;

    let product = state.catalog_service.update_product(id, request).await?;
    Ok(Json(product))
}

/// Handler for DELETE /api/products/:id (admin)
#[utoipa::path(
    delete,
    path = "/api/products/{id}",
    params(("id" = Uuid, Path, description = "Product id")),
    responses(
        (status = 204, description = "Product deleted"),
        (status = 404, description = "No product with this id")
    ),
    security(("bearer_token" = [])),
    tag = "catalog"
)]
pub async fn delete_product_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, CatalogError> {
    state.catalog_service.delete_product(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
