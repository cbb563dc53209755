// Category management module
// Public listing and detail views plus admin CRUD; the category key is
// a server-derived slug used by catalog filters

pub mod handlers;
pub mod models;
pub mod repository;

// Re-export commonly used types
pub use models::{CategoryDetail, CategoryProduct, CategoryResponse, CreateCategory, UpdateCategory};
pub use repository::CategoryRepository;
