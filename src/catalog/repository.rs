// Database access for products and the reference tables

use sqlx::postgres::PgArguments;
use sqlx::query::QueryAs;
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

use crate::catalog::error::CatalogError;
use crate::catalog::models::{CreateProduct, ProductRecord, RefItem, UpdateProduct};
use crate::catalog::query::{
    ProductFilter, ProductQueryBuilder, QueryArg, PRODUCT_COLUMNS, PRODUCT_JOINS,
};
use crate::media::StoredImage;

fn bind_args<'q>(
    mut query: QueryAs<'q, Postgres, ProductRecord, PgArguments>,
    args: &'q [QueryArg],
) -> QueryAs<'q, Postgres, ProductRecord, PgArguments> {
    for arg in args {
        query = match arg {
            QueryArg::Text(value) => query.bind(value),
            QueryArg::TextList(values) => query.bind(values),
            QueryArg::Int(value) => query.bind(*value),
        };
    }
    query
}

/// Repository for product rows. Every read goes through the joined
/// select so responses always carry the embedded reference entries.
#[derive(Clone)]
pub struct ProductRepository {
    pool: PgPool,
}

impl ProductRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Fetch one page of products plus the total count of the full
    /// matching set. Both statements are built from the same filter.
    pub async fn list(&self, filter: &ProductFilter) -> Result<(Vec<ProductRecord>, i64), CatalogError> {
        let builder = ProductQueryBuilder::new().apply(filter);

        let listing_sql = builder.build_listing(filter);
        let rows = bind_args(
            sqlx::query_as::<_, ProductRecord>(&listing_sql),
            builder.args(),
        )
        .fetch_all(&self.pool)
        .await?;

        let count_sql = builder.build_count();
        let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
        for arg in builder.args() {
            count_query = match arg {
                QueryArg::Text(value) => count_query.bind(value),
                QueryArg::TextList(values) => count_query.bind(values),
                QueryArg::Int(value) => count_query.bind(*value),
            };
        }
        let total = count_query.fetch_one(&self.pool).await?;

        Ok((rows, total))
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<ProductRecord>, CatalogError> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} {PRODUCT_JOINS} WHERE p.id = $1");
        let row = sqlx::query_as::<_, ProductRecord>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    /// Insert a product and return it with references embedded. A unique
    /// violation on the name surfaces as NameTaken, a foreign-key
    /// violation on any reference id as InvalidReference.
    pub async fn insert(
        &self,
        data: &CreateProduct,
        image: Option<&StoredImage>,
    ) -> Result<ProductRecord, CatalogError> {
        let id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO products
                (name, description, price, stock, size, variant,
                 image_url, image_public_id,
                 category_id, type_id, objective_id, color_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING id
            "#,
        )
        .bind(&data.name)
        .bind(&data.description)
        .bind(data.price)
        .bind(data.stock)
        .bind(&data.size)
        .bind(&data.variant)
        .bind(image.map(|i| i.url.as_str()))
        .bind(image.map(|i| i.public_id.as_str()))
        .bind(data.category_id)
        .bind(data.type_id)
        .bind(data.objective_id)
        .bind(data.color_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                CatalogError::NameTaken(data.name.clone())
            }
            _ => CatalogError::from(e),
        })?;

        self.find_by_id(id)
            .await?
            .ok_or_else(|| CatalogError::DatabaseError(sqlx::Error::RowNotFound))
    }

    /// Partially update a product; absent fields keep their current
    /// value via COALESCE. The new image pair, when present, replaces
    /// both image columns together.
    pub async fn update(
        &self,
        id: Uuid,
        changes: &UpdateProduct,
        image: Option<&StoredImage>,
    ) -> Result<ProductRecord, CatalogError> {
        let updated = sqlx::query_scalar::<_, Uuid>(
            r#"
            UPDATE products SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                price = COALESCE($4, price),
                stock = COALESCE($5, stock),
                size = COALESCE($6, size),
                variant = COALESCE($7, variant),
                image_url = COALESCE($8, image_url),
                image_public_id = COALESCE($9, image_public_id),
                category_id = COALESCE($10, category_id),
                type_id = COALESCE($11, type_id),
                objective_id = COALESCE($12, objective_id),
                color_id = COALESCE($13, color_id),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id
            "#,
        )
        .bind(id)
        .bind(changes.name.as_deref())
        .bind(changes.description.as_deref())
        .bind(changes.price)
        .bind(changes.stock)
        .bind(changes.size.as_deref())
        .bind(changes.variant.as_deref())
        .bind(image.map(|i| i.url.as_str()))
        .bind(image.map(|i| i.public_id.as_str()))
        .bind(changes.category_id)
        .bind(changes.type_id)
        .bind(changes.objective_id)
        .bind(changes.color_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                CatalogError::NameTaken(changes.name.clone().unwrap_or_default())
            }
            _ => CatalogError::from(e),
        })?;

        match updated {
            Some(id) => self
                .find_by_id(id)
                .await?
                .ok_or_else(|| CatalogError::DatabaseError(sqlx::Error::RowNotFound)),
            None => Err(CatalogError::ProductNotFound(id)),
        }
    }

    /// Delete a product, returning its media public id (if any) so the
    /// caller can release the stored asset. None means no such row.
    pub async fn delete(&self, id: Uuid) -> Result<Option<Option<String>>, CatalogError> {
        let row: Option<(Option<String>,)> =
            sqlx::query_as("DELETE FROM products WHERE id = $1 RETURNING image_public_id")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(|(public_id,)| public_id))
    }
}

/// Read access to the four reference tables backing /api/products/meta
#[derive(Clone)]
pub struct RefRepository {
    pool: PgPool,
}

impl RefRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch(&self, table: &str) -> Result<Vec<RefItem>, CatalogError> {
        // `table` is always one of the four fixed names below
        let sql = format!("SELECT id, key, name, image FROM {table} ORDER BY name ASC");
        let items = sqlx::query_as::<_, RefItem>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(items)
    }

    pub async fn all_categories(&self) -> Result<Vec<RefItem>, CatalogError> {
        self.fetch("categories").await
    }

    pub async fn all_types(&self) -> Result<Vec<RefItem>, CatalogError> {
        self.fetch("types").await
    }

    pub async fn all_objectives(&self) -> Result<Vec<RefItem>, CatalogError> {
        self.fetch("objectives").await
    }

    pub async fn all_colors(&self) -> Result<Vec<RefItem>, CatalogError> {
        self.fetch("colors").await
    }
}
