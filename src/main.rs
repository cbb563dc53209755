pub mod auth;
pub mod catalog;
pub mod categories;
pub mod db;
pub mod error;
pub mod media;
pub mod validation;

use std::sync::Arc;

use axum::{
    extract::Request,
    middleware::{self, Next},
    routing::{get, post, put},
    Router,
};
use sqlx::PgPool;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use auth::{AuthService, LogMailer, RequireRole, ResetMailer, TokenService};
use catalog::{CatalogService, MetaCache};
use categories::CategoryRepository;
use media::{CloudinaryStore, MediaStore};

/// OpenAPI documentation structure
#[derive(OpenApi)]
#[openapi(
    paths(
        auth::handlers::register_handler,
        auth::handlers::login_handler,
        auth::handlers::profile_handler,
        auth::handlers::forgot_password_handler,
        auth::handlers::reset_password_handler,
        catalog::handlers::list_products_handler,
        catalog::handlers::meta_handler,
        catalog::handlers::get_product_handler,
        catalog::handlers::create_product_handler,
        catalog::handlers::update_product_handler,
        catalog::handlers::delete_product_handler,
        categories::handlers::list_categories_handler,
        categories::handlers::get_category_handler,
        categories::handlers::create_category_handler,
        categories::handlers::update_category_handler,
        categories::handlers::delete_category_handler,
    ),
    components(
        schemas(
            auth::models::Role,
            auth::models::UserResponse,
            auth::models::RegisterRequest,
            auth::models::LoginRequest,
            auth::models::ForgotPasswordRequest,
            auth::models::ResetPasswordRequest,
            auth::models::AuthResponse,
            auth::models::MessageResponse,
            catalog::models::ProductImage,
            catalog::models::RefItem,
            catalog::models::RefEntry,
            catalog::models::ProductResponse,
            catalog::models::ProductPage,
            catalog::models::MetaResponse,
            catalog::models::CreateProduct,
            catalog::models::UpdateProduct,
            categories::models::CategoryResponse,
            categories::models::CategoryProduct,
            categories::models::CategoryDetail,
            categories::models::CreateCategory,
            categories::models::UpdateCategory,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth", description = "Registration, login and password-reset endpoints"),
        (name = "catalog", description = "Product listing, metadata and admin CRUD"),
        (name = "categories", description = "Category management endpoints")
    ),
    info(
        title = "Meesha Flower Shop API",
        version = "1.0.0",
        description = "RESTful API for the Meesha flower shop: catalog browsing with JWT-secured administration"
    )
)]
struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_token",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub auth_service: Arc<AuthService>,
    pub catalog_service: Arc<CatalogService>,
    pub categories: CategoryRepository,
    pub media: Arc<dyn MediaStore>,
}

impl AppState {
    /// Wire up repositories and services around a connection pool
    pub fn new(db: PgPool, jwt_secret: String, mailer: Arc<dyn ResetMailer>) -> Self {
        let media: Arc<dyn MediaStore> = Arc::new(CloudinaryStore::from_env());
        Self::with_media(db, jwt_secret, mailer, media)
    }

    pub fn with_media(
        db: PgPool,
        jwt_secret: String,
        mailer: Arc<dyn ResetMailer>,
        media: Arc<dyn MediaStore>,
    ) -> Self {
        let auth_service = Arc::new(AuthService::new(
            auth::repository::UserRepository::new(db.clone()),
            TokenService::new(jwt_secret),
            mailer,
        ));
        let catalog_service = Arc::new(CatalogService::new(
            db.clone(),
            Arc::new(MetaCache::new()),
            media.clone(),
        ));
        let categories = CategoryRepository::new(db.clone());

        Self {
            db,
            auth_service,
            catalog_service,
            categories,
            media,
        }
    }
}

/// Creates and configures the application router
/// Public reads stay open; every write route sits behind the admin gate
pub fn create_router(state: AppState) -> Router {
    use tower_http::cors::{Any, CorsLayer};

    // Configure CORS to allow all origins, methods, and headers
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let admin_gate = RequireRole::admin();
    let admin_layer = middleware::from_fn(move |request: Request, next: Next| {
        let gate = admin_gate.clone();
        async move { gate.middleware(request, next).await }
    });

    let admin_routes = Router::new()
        .route("/api/products", post(catalog::handlers::create_product_handler))
        .route(
            "/api/products/:id",
            put(catalog::handlers::update_product_handler)
                .patch(catalog::handlers::update_product_handler)
                .delete(catalog::handlers::delete_product_handler),
        )
        .route("/api/categories", post(categories::handlers::create_category_handler))
        .route(
            "/api/categories/:id",
            put(categories::handlers::update_category_handler)
                .delete(categories::handlers::delete_category_handler),
        )
        .route_layer(admin_layer);

    Router::new()
        // Swagger UI
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Auth routes
        .route("/api/auth/register", post(auth::handlers::register_handler))
        .route("/api/auth/login", post(auth::handlers::login_handler))
        .route("/api/auth/profile", get(auth::handlers::profile_handler))
        .route(
            "/api/auth/forgot-password",
            post(auth::handlers::forgot_password_handler),
        )
        .route(
            "/api/auth/reset-password",
            post(auth::handlers::reset_password_handler),
        )
        // Public catalog routes
        .route("/api/products", get(catalog::handlers::list_products_handler))
        .route("/api/products/meta", get(catalog::handlers::meta_handler))
        .route("/api/products/:id", get(catalog::handlers::get_product_handler))
        .route(
            "/api/categories",
            get(categories::handlers::list_categories_handler),
        )
        .route(
            "/api/categories/:id",
            get(categories::handlers::get_category_handler),
        )
        // Admin-only writes
        .merge(admin_routes)
        .layer(cors)
        .with_state(state)
}

#[tokio::main]
async fn main() {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    // Initialize tracing subscriber for logging
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .init();

    tracing::info!("Meesha API - Starting...");

    // Get configuration from environment variables
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set in environment");
    let jwt_secret = std::env::var("JWT_SECRET").expect("JWT_SECRET must be set in environment");
    let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port = std::env::var("PORT").unwrap_or_else(|_| "8080".to_string());

    // Create database connection pool
    tracing::info!("Connecting to database...");
    let db_pool = db::create_pool(&database_url)
        .await
        .expect("Failed to create database pool");

    // Run SQLx migrations on startup
    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations")
        .run(&db_pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Migrations completed successfully");

    let mailer: Arc<dyn ResetMailer> = Arc::new(LogMailer::default());
    let state = AppState::new(db_pool, jwt_secret, mailer);
    let app = create_router(state);

    // Start the Axum server
    let addr = format!("{}:{}", host, port);
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("Meesha API is running on http://{}", addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui", addr);

    axum::serve(listener, app).await.expect("Server error");
}

#[cfg(test)]
mod tests;
