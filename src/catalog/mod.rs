// Product catalog module
// Filtered listing with pagination, reference-table metadata behind a
// TTL cache, and admin CRUD with media-asset lifecycle handling

pub mod cache;
pub mod error;
pub mod handlers;
pub mod models;
pub mod query;
pub mod repository;
pub mod service;

// Re-export commonly used types
pub use cache::{MetaCache, MetaKey};
pub use error::CatalogError;
pub use models::{CreateProduct, MetaResponse, ProductPage, ProductResponse, UpdateProduct};
pub use query::{ProductFilter, ProductQueryParams};
pub use service::CatalogService;
