// Catalog business logic: listing, metadata, and product CRUD with
// media-asset lifecycle handling

use std::sync::Arc;

use sqlx::PgPool;
use uuid::Uuid;

use crate::catalog::cache::{MetaCache, MetaKey};
use crate::catalog::error::CatalogError;
use crate::catalog::models::{
    CreateProduct, MetaResponse, ProductPage, ProductResponse, RefItem, UpdateProduct,
};
use crate::catalog::query::ProductFilter;
use crate::catalog::repository::{ProductRepository, RefRepository};
use crate::db;
use crate::media::{MediaStore, StoredImage};

const PRODUCT_MEDIA_FOLDER: &str = "meesha-products";

pub struct CatalogService {
    db: PgPool,
    products: ProductRepository,
    refs: RefRepository,
    cache: Arc<MetaCache>,
    media: Arc<dyn MediaStore>,
}

impl CatalogService {
    pub fn new(db: PgPool, cache: Arc<MetaCache>, media: Arc<dyn MediaStore>) -> Self {
        Self {
            products: ProductRepository::new(db.clone()),
            refs: RefRepository::new(db.clone()),
            db,
            cache,
            media,
        }
    }

    /// List products for a validated filter. `total` counts the whole
    /// matching set, so totalPages stays correct past the first page.
    pub async fn list_products(&self, filter: ProductFilter) -> Result<ProductPage, CatalogError> {
        let (rows, total) = self.products.list(&filter).await?;

        let limit = i64::from(filter.limit);
        let total_pages = if total == 0 { 0 } else { (total + limit - 1) / limit };

        Ok(ProductPage {
            items: rows.into_iter().map(ProductResponse::from).collect(),
            total,
            page: filter.page,
            total_pages,
        })
    }

    async fn cached_refs<F, Fut>(
        &self,
        key: MetaKey,
        load: F,
    ) -> Result<Vec<RefItem>, CatalogError>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = Result<Vec<RefItem>, CatalogError>>,
    {
        if let Some(items) = self.cache.get(key).await {
            return Ok(items);
        }
        let items = load().await?;
        self.cache.set(key, items.clone()).await;
        Ok(items)
    }

    /// All four reference tables, cache-first. Concurrent misses may
    /// each hit the database once; last write wins and they all store
    /// the same snapshot.
    pub async fn get_meta(&self) -> Result<MetaResponse, CatalogError> {
        let categories = self
            .cached_refs(MetaKey::Categories, || self.refs.all_categories())
            .await?;
        let types = self
            .cached_refs(MetaKey::Types, || self.refs.all_types())
            .await?;
        let objectives = self
            .cached_refs(MetaKey::Objectives, || self.refs.all_objectives())
            .await?;
        let colors = self
            .cached_refs(MetaKey::Colors, || self.refs.all_colors())
            .await?;

        Ok(MetaResponse {
            categories,
            types,
            objectives,
            colors,
        })
    }

    pub async fn get_product(&self, id: Uuid) -> Result<ProductResponse, CatalogError> {
        let record = self
            .products
            .find_by_id(id)
            .await?
            .ok_or(CatalogError::ProductNotFound(id))?;
        Ok(record.into())
    }

    /// Create a product. The image, when given, is uploaded before the
    /// insert; if the insert then fails the fresh asset is released on a
    /// best-effort basis so the media store does not accumulate orphans.
    pub async fn create_product(
        &self,
        request: CreateProduct,
    ) -> Result<ProductResponse, CatalogError> {
        if db::product_name_exists(&self.db, &request.name).await? {
            return Err(CatalogError::NameTaken(request.name));
        }

        let image = match &request.image {
            Some(source) => Some(self.media.upload(source, PRODUCT_MEDIA_FOLDER).await?),
            None => None,
        };

        match self.products.insert(&request, image.as_ref()).await {
            Ok(record) => {
                tracing::info!("Created product {} ({})", record.name, record.id);
                Ok(record.into())
            }
            Err(err) => {
                if let Some(image) = &image {
                    self.release_asset(&image.public_id).await;
                }
                Err(err)
            }
        }
    }

    /// Update a product. A replacement image is uploaded first; after a
    /// successful update the previous asset is released best-effort, so
    /// a media-store hiccup never fails the request.
    pub async fn update_product(
        &self,
        id: Uuid,
        changes: UpdateProduct,
    ) -> Result<ProductResponse, CatalogError> {
        let existing = self
            .products
            .find_by_id(id)
            .await?
            .ok_or(CatalogError::ProductNotFound(id))?;

        if let Some(name) = &changes.name {
            if name != &existing.name
                && db::product_name_exists_excluding_id(&self.db, name, id).await?
            {
                return Err(CatalogError::NameTaken(name.clone()));
            }
        }

        let new_image: Option<StoredImage> = match &changes.image {
            Some(source) => Some(self.media.upload(source, PRODUCT_MEDIA_FOLDER).await?),
            None => None,
        };

        let record = match self.products.update(id, &changes, new_image.as_ref()).await {
            Ok(record) => record,
            Err(err) => {
                if let Some(image) = &new_image {
                    self.release_asset(&image.public_id).await;
                }
                return Err(err);
            }
        };

        if new_image.is_some() {
            if let Some(old_id) = &existing.image_public_id {
                self.release_asset(old_id).await;
            }
        }

        tracing::info!("Updated product {}", id);
        Ok(record.into())
    }

    /// Delete a product and release its stored image best-effort
    pub async fn delete_product(&self, id: Uuid) -> Result<(), CatalogError> {
        let public_id = self
            .products
            .delete(id)
            .await?
            .ok_or(CatalogError::ProductNotFound(id))?;

        if let Some(public_id) = public_id {
            self.release_asset(&public_id).await;
        }

        tracing::info!("Deleted product {}", id);
        Ok(())
    }

    async fn release_asset(&self, public_id: &str) {
        if let Err(err) = self.media.delete(public_id).await {
            tracing::warn!("Failed to release media asset {}: {}", public_id, err);
        }
    }
}
