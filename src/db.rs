use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;
use uuid::Uuid;

/// Type alias for the PostgreSQL connection pool
pub type DbPool = PgPool;

/// Creates and configures a PostgreSQL connection pool
///
/// # Arguments
/// * `database_url` - PostgreSQL connection string
pub async fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    tracing::debug!("Creating database connection pool");

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(3))
        .connect(database_url)
        .await?;

    tracing::info!("Database connection pool created successfully");
    Ok(pool)
}

/// Check if a product with the given name already exists
pub async fn product_name_exists(pool: &PgPool, name: &str) -> Result<bool, sqlx::Error> {
    let exists: Option<bool> =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM products WHERE name = $1)")
            .bind(name)
            .fetch_one(pool)
            .await?;

    Ok(exists.unwrap_or(false))
}

/// Check if a product with the given name already exists, excluding a
/// specific ID. Used for updates so a product can keep its own name.
pub async fn product_name_exists_excluding_id(
    pool: &PgPool,
    name: &str,
    exclude_id: Uuid,
) -> Result<bool, sqlx::Error> {
    let exists: Option<bool> =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM products WHERE name = $1 AND id != $2)")
            .bind(name)
            .bind(exclude_id)
            .fetch_one(pool)
            .await?;

    Ok(exists.unwrap_or(false))
}
