// Database access for category management

use sqlx::PgPool;
use uuid::Uuid;

use crate::categories::models::{CategoryProduct, CategoryResponse};
use crate::error::ApiError;

#[derive(Clone)]
pub struct CategoryRepository {
    pool: PgPool,
}

impl CategoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> Result<Vec<CategoryResponse>, ApiError> {
        let categories = sqlx::query_as::<_, CategoryResponse>(
            "SELECT id, key, name, image, created_at FROM categories ORDER BY name ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(categories)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<CategoryResponse>, ApiError> {
        let category = sqlx::query_as::<_, CategoryResponse>(
            "SELECT id, key, name, image, created_at FROM categories WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(category)
    }

    /// Products filed under a category, newest first
    pub async fn products_in(&self, category_id: Uuid) -> Result<Vec<CategoryProduct>, ApiError> {
        let products = sqlx::query_as::<_, CategoryProduct>(
            "SELECT id, name, price, image_url FROM products \
             WHERE category_id = $1 ORDER BY created_at DESC, id",
        )
        .bind(category_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(products)
    }

    pub async fn product_count(&self, category_id: Uuid) -> Result<i64, ApiError> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE category_id = $1")
                .bind(category_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }

    /// Insert a category. A duplicate key (same name after slugging) is
    /// reported as a conflict.
    pub async fn insert(
        &self,
        key: &str,
        name: &str,
        image: Option<&str>,
    ) -> Result<CategoryResponse, ApiError> {
        let category = sqlx::query_as::<_, CategoryResponse>(
            "INSERT INTO categories (key, name, image) VALUES ($1, $2, $3) \
             RETURNING id, key, name, image, created_at",
        )
        .bind(key)
        .bind(name)
        .bind(image)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => ApiError::Conflict {
                message: format!("Category '{}' already exists", name),
            },
            _ => ApiError::from(e),
        })?;
        Ok(category)
    }

    /// Partial update; when the name changes the key is re-derived by
    /// the caller and passed alongside it.
    pub async fn update(
        &self,
        id: Uuid,
        key: Option<&str>,
        name: Option<&str>,
        image: Option<&str>,
    ) -> Result<Option<CategoryResponse>, ApiError> {
        let category = sqlx::query_as::<_, CategoryResponse>(
            "UPDATE categories SET \
                key = COALESCE($2, key), \
                name = COALESCE($3, name), \
                image = COALESCE($4, image) \
             WHERE id = $1 \
             RETURNING id, key, name, image, created_at",
        )
        .bind(id)
        .bind(key)
        .bind(name)
        .bind(image)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => ApiError::Conflict {
                message: format!("Category '{}' already exists", name.unwrap_or_default()),
            },
            _ => ApiError::from(e),
        })?;
        Ok(category)
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool, ApiError> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
