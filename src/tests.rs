// Handler tests for the Meesha flower shop API
// End-to-end tests over the full router. They need PostgreSQL: set
// DATABASE_URL to run them, otherwise each test skips itself.

use super::*;
use crate::auth::models::Role;
use crate::auth::repository::UserRepository;
use crate::auth::{LogMailer, TokenService};
use crate::media::{MediaError, MediaStore, StoredImage};
use async_trait::async_trait;
use axum::http::{header, HeaderValue, StatusCode};
use axum_test::TestServer;
use chrono::{Duration, Utc};
use serde_json::json;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

const TEST_SECRET: &str = "test_secret_key_for_testing_purposes";

// ============================================================================
// Test Helpers
// ============================================================================

/// In-memory MediaStore double; uploads succeed deterministically and
/// deletes are accepted silently
struct MockMediaStore;

#[async_trait]
impl MediaStore for MockMediaStore {
    async fn upload(&self, _source: &str, folder: &str) -> Result<StoredImage, MediaError> {
        let id = Uuid::new_v4();
        Ok(StoredImage {
            url: format!("https://mock.media/{folder}/{id}.jpg"),
            public_id: format!("{folder}/{id}"),
        })
    }

    async fn delete(&self, _public_id: &str) -> Result<(), MediaError> {
        Ok(())
    }
}

/// Connect to the test database and run migrations. Returns None when
/// DATABASE_URL is not set so the suite can run without PostgreSQL.
async fn try_test_pool() -> Option<PgPool> {
    let database_url = match std::env::var("DATABASE_URL") {
        Ok(url) => url,
        Err(_) => {
            eprintln!("skipping: DATABASE_URL not set");
            return None;
        }
    };

    let pool = crate::db::create_pool(&database_url)
        .await
        .expect("Failed to connect to test database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    Some(pool)
}

/// Build a test server over the full router with the mock media store
fn create_test_server(pool: PgPool) -> TestServer {
    std::env::set_var("JWT_SECRET", TEST_SECRET);

    let state = AppState::with_media(
        pool,
        TEST_SECRET.to_string(),
        Arc::new(LogMailer::default()),
        Arc::new(MockMediaStore),
    );

    TestServer::new(create_router(state)).unwrap()
}

/// Mint an admin bearer token without touching the database; the admin
/// gate only verifies the JWT
fn admin_token() -> String {
    TokenService::new(TEST_SECRET.to_string())
        .generate_access_token(Uuid::new_v4(), "admin@meesha.co", Role::Admin)
        .unwrap()
}

fn user_token() -> String {
    TokenService::new(TEST_SECRET.to_string())
        .generate_access_token(Uuid::new_v4(), "user@example.com", Role::User)
        .unwrap()
}

fn bearer(token: &str) -> HeaderValue {
    HeaderValue::from_str(&format!("Bearer {token}")).unwrap()
}

/// Unique suffix so parallel tests never collide on unique columns
fn unique(tag: &str) -> String {
    format!("{tag}-{}", Uuid::new_v4())
}

async fn reference_id(pool: &PgPool, table: &str, key: &str) -> Uuid {
    sqlx::query_scalar(&format!("SELECT id FROM {table} WHERE key = $1"))
        .bind(key)
        .fetch_one(pool)
        .await
        .expect("seeded reference row exists")
}

/// A valid create-product payload wired to seeded reference rows
async fn product_payload(pool: &PgPool, name: &str, price: i64) -> serde_json::Value {
    json!({
        "name": name,
        "description": "Test product",
        "price": price,
        "stock": 5,
        "size": "M",
        "variant": ["pita"],
        "image": "https://example.com/source.jpg",
        "category_id": reference_id(pool, "categories", "buket-bunga").await,
        "type_id": reference_id(pool, "types", "bunga-segar").await,
        "objective_id": reference_id(pool, "objectives", "anniversary").await,
        "color_id": reference_id(pool, "colors", "merah").await,
    })
}

// ============================================================================
// Auth Flow Tests
// ============================================================================

/// Register, then login with the same credentials, then fetch the
/// profile with the issued token
#[tokio::test]
async fn test_register_login_profile_flow() {
    let Some(pool) = try_test_pool().await else { return };
    let server = create_test_server(pool);

    let email = format!("{}@test.meesha.co", unique("alice"));

    let register = server
        .post("/api/auth/register")
        .json(&json!({
            "name": "Alice",
            "email": email,
            "phone": "081234567890",
            "password": "secret1"
        }))
        .await;
    assert_eq!(register.status_code(), StatusCode::CREATED);

    let body: serde_json::Value = register.json();
    assert_eq!(body["user"]["email"], email.as_str());
    assert_eq!(body["user"]["role"], "USER");
    assert!(body["user"].get("password_hash").is_none());

    let login = server
        .post("/api/auth/login")
        .json(&json!({ "email": email, "password": "secret1" }))
        .await;
    assert_eq!(login.status_code(), StatusCode::OK);
    let login_body: serde_json::Value = login.json();
    let token = login_body["token"].as_str().unwrap();

    let profile = server
        .get("/api/auth/profile")
        .add_header(header::AUTHORIZATION, bearer(token))
        .await;
    assert_eq!(profile.status_code(), StatusCode::OK);
    let profile_body: serde_json::Value = profile.json();
    assert_eq!(profile_body["email"], email.as_str());
}

/// Unknown email and wrong password must be indistinguishable
#[tokio::test]
async fn test_login_failures_are_indistinguishable() {
    let Some(pool) = try_test_pool().await else { return };
    let server = create_test_server(pool);

    let email = format!("{}@test.meesha.co", unique("bob"));
    server
        .post("/api/auth/register")
        .json(&json!({
            "name": "Bob",
            "email": email,
            "password": "secret1"
        }))
        .await;

    let wrong_password = server
        .post("/api/auth/login")
        .json(&json!({ "email": email, "password": "wrong-password" }))
        .await;
    let unknown_email = server
        .post("/api/auth/login")
        .json(&json!({
            "email": format!("{}@test.meesha.co", unique("ghost")),
            "password": "whatever1"
        }))
        .await;

    assert_eq!(wrong_password.status_code(), StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_email.status_code(), StatusCode::UNAUTHORIZED);

    let a: serde_json::Value = wrong_password.json();
    let b: serde_json::Value = unknown_email.json();
    assert_eq!(a["error_code"], b["error_code"]);
    assert_eq!(a["message"], b["message"]);
}

/// Registering the same email twice is a conflict
#[tokio::test]
async fn test_register_duplicate_email() {
    let Some(pool) = try_test_pool().await else { return };
    let server = create_test_server(pool);

    let email = format!("{}@test.meesha.co", unique("carol"));
    let payload = json!({
        "name": "Carol",
        "email": email,
        "password": "secret1"
    });

    let first = server.post("/api/auth/register").json(&payload).await;
    assert_eq!(first.status_code(), StatusCode::CREATED);

    let second = server.post("/api/auth/register").json(&payload).await;
    assert_eq!(second.status_code(), StatusCode::CONFLICT);
}

/// An anonymous caller asking for ADMIN is silently downgraded to USER
#[tokio::test]
async fn test_anonymous_register_cannot_request_admin() {
    let Some(pool) = try_test_pool().await else { return };
    let server = create_test_server(pool);

    let response = server
        .post("/api/auth/register")
        .json(&json!({
            "name": "Mallory",
            "email": format!("{}@test.meesha.co", unique("mallory")),
            "password": "secret1",
            "role": "ADMIN"
        }))
        .await;

    assert_eq!(response.status_code(), StatusCode::CREATED);
    let body: serde_json::Value = response.json();
    assert_eq!(body["user"]["role"], "USER");
}

/// Forgot-password answers identically for known and unknown emails
#[tokio::test]
async fn test_forgot_password_is_generic() {
    let Some(pool) = try_test_pool().await else { return };
    let server = create_test_server(pool);

    let email = format!("{}@test.meesha.co", unique("dave"));
    server
        .post("/api/auth/register")
        .json(&json!({ "name": "Dave", "email": email, "password": "secret1" }))
        .await;

    let known = server
        .post("/api/auth/forgot-password")
        .json(&json!({ "email": email }))
        .await;
    let unknown = server
        .post("/api/auth/forgot-password")
        .json(&json!({ "email": format!("{}@test.meesha.co", unique("nobody")) }))
        .await;

    assert_eq!(known.status_code(), StatusCode::OK);
    assert_eq!(unknown.status_code(), StatusCode::OK);

    let a: serde_json::Value = known.json();
    let b: serde_json::Value = unknown.json();
    assert_eq!(a["message"], b["message"]);
}

/// A reset token changes the password exactly once; replaying it fails
/// and the old password stops working
#[tokio::test]
async fn test_reset_token_is_single_use() {
    let Some(pool) = try_test_pool().await else { return };
    let server = create_test_server(pool.clone());

    let email = format!("{}@test.meesha.co", unique("erin"));
    server
        .post("/api/auth/register")
        .json(&json!({ "name": "Erin", "email": email, "password": "oldpass1" }))
        .await;

    // Plant a known token directly; the mailer only logs it
    let users = UserRepository::new(pool);
    let user = users.find_by_email(&email).await.unwrap().unwrap();
    let token = unique("reset-token");
    users
        .set_reset_token(user.id, &token, Utc::now() + Duration::minutes(60))
        .await
        .unwrap();

    let first = server
        .post("/api/auth/reset-password")
        .json(&json!({ "token": token, "password": "newpass1" }))
        .await;
    assert_eq!(first.status_code(), StatusCode::OK);

    let replay = server
        .post("/api/auth/reset-password")
        .json(&json!({ "token": token, "password": "evilpass1" }))
        .await;
    assert_eq!(replay.status_code(), StatusCode::BAD_REQUEST);

    let old_login = server
        .post("/api/auth/login")
        .json(&json!({ "email": email, "password": "oldpass1" }))
        .await;
    assert_eq!(old_login.status_code(), StatusCode::UNAUTHORIZED);

    let new_login = server
        .post("/api/auth/login")
        .json(&json!({ "email": email, "password": "newpass1" }))
        .await;
    assert_eq!(new_login.status_code(), StatusCode::OK);
}

/// A reset token past its expiry instant is rejected even when it is
/// otherwise correct, and the password stays unchanged
#[tokio::test]
async fn test_expired_reset_token_is_rejected() {
    let Some(pool) = try_test_pool().await else { return };
    let server = create_test_server(pool.clone());

    let email = format!("{}@test.meesha.co", unique("frank"));
    server
        .post("/api/auth/register")
        .json(&json!({ "name": "Frank", "email": email, "password": "oldpass1" }))
        .await;

    // Plant a token that expired a minute ago
    let users = UserRepository::new(pool);
    let user = users.find_by_email(&email).await.unwrap().unwrap();
    let token = unique("reset-token");
    users
        .set_reset_token(user.id, &token, Utc::now() - Duration::minutes(1))
        .await
        .unwrap();

    let response = server
        .post("/api/auth/reset-password")
        .json(&json!({ "token": token, "password": "newpass1" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

    // The password was not touched
    let old_login = server
        .post("/api/auth/login")
        .json(&json!({ "email": email, "password": "oldpass1" }))
        .await;
    assert_eq!(old_login.status_code(), StatusCode::OK);

    let new_login = server
        .post("/api/auth/login")
        .json(&json!({ "email": email, "password": "newpass1" }))
        .await;
    assert_eq!(new_login.status_code(), StatusCode::UNAUTHORIZED);
}

// ============================================================================
// Admin Gate Tests
// ============================================================================

/// Product writes require a token, and an ADMIN one at that
#[tokio::test]
async fn test_product_writes_require_admin() {
    let Some(pool) = try_test_pool().await else { return };
    let payload = product_payload(&pool, &unique("Buket"), 100_000).await;
    let server = create_test_server(pool);

    let anonymous = server.post("/api/products").json(&payload).await;
    assert_eq!(anonymous.status_code(), StatusCode::UNAUTHORIZED);

    let as_user = server
        .post("/api/products")
        .add_header(header::AUTHORIZATION, bearer(&user_token()))
        .json(&payload)
        .await;
    assert_eq!(as_user.status_code(), StatusCode::FORBIDDEN);

    let as_admin = server
        .post("/api/products")
        .add_header(header::AUTHORIZATION, bearer(&admin_token()))
        .json(&payload)
        .await;
    assert_eq!(as_admin.status_code(), StatusCode::CREATED);
}

// ============================================================================
// Catalog Tests
// ============================================================================

/// Create, read, partially update and delete a product through the API
#[tokio::test]
async fn test_product_crud_flow() {
    let Some(pool) = try_test_pool().await else { return };
    let name = unique("Buket Mawar");
    let payload = product_payload(&pool, &name, 250_000).await;
    let server = create_test_server(pool);
    let auth = bearer(&admin_token());

    let created = server
        .post("/api/products")
        .add_header(header::AUTHORIZATION, auth.clone())
        .json(&payload)
        .await;
    assert_eq!(created.status_code(), StatusCode::CREATED);
    let product: serde_json::Value = created.json();
    let id = product["id"].as_str().unwrap().to_string();

    assert_eq!(product["name"], name.as_str());
    assert_eq!(product["category"]["key"], "buket-bunga");
    assert_eq!(product["color"]["name"], "Merah");
    // The mock media store served the upload
    assert!(product["imageUrl"]["url"]
        .as_str()
        .unwrap()
        .starts_with("https://mock.media/"));

    let fetched = server.get(&format!("/api/products/{id}")).await;
    assert_eq!(fetched.status_code(), StatusCode::OK);

    // PATCH with just a price; everything else stays put
    let patched = server
        .patch(&format!("/api/products/{id}"))
        .add_header(header::AUTHORIZATION, auth.clone())
        .json(&json!({ "price": 199_000 }))
        .await;
    assert_eq!(patched.status_code(), StatusCode::OK);
    let patched_body: serde_json::Value = patched.json();
    assert_eq!(patched_body["price"], 199_000);
    assert_eq!(patched_body["name"], name.as_str());

    let deleted = server
        .delete(&format!("/api/products/{id}"))
        .add_header(header::AUTHORIZATION, auth)
        .await;
    assert_eq!(deleted.status_code(), StatusCode::NO_CONTENT);

    let gone = server.get(&format!("/api/products/{id}")).await;
    assert_eq!(gone.status_code(), StatusCode::NOT_FOUND);
}

/// Two products cannot share a name
#[tokio::test]
async fn test_product_duplicate_name_conflict() {
    let Some(pool) = try_test_pool().await else { return };
    let name = unique("Buket Unik");
    let payload = product_payload(&pool, &name, 120_000).await;
    let server = create_test_server(pool);
    let auth = bearer(&admin_token());

    let first = server
        .post("/api/products")
        .add_header(header::AUTHORIZATION, auth.clone())
        .json(&payload)
        .await;
    assert_eq!(first.status_code(), StatusCode::CREATED);

    let second = server
        .post("/api/products")
        .add_header(header::AUTHORIZATION, auth)
        .json(&payload)
        .await;
    assert_eq!(second.status_code(), StatusCode::CONFLICT);
}

/// A create referencing a nonexistent reference id is a 400, not a 500
#[tokio::test]
async fn test_product_unknown_reference_is_bad_request() {
    let Some(pool) = try_test_pool().await else { return };
    let mut payload = product_payload(&pool, &unique("Buket"), 90_000).await;
    payload["category_id"] = json!(Uuid::new_v4());
    let server = create_test_server(pool);

    let response = server
        .post("/api/products")
        .add_header(header::AUTHORIZATION, bearer(&admin_token()))
        .json(&payload)
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error_code"], "INVALID_REFERENCE");
}

/// Price-range filtering returns only in-range products and the total
/// counts the whole matching set
#[tokio::test]
async fn test_listing_price_filter_and_total() {
    let Some(pool) = try_test_pool().await else { return };

    // A price band no other test uses; clear leftovers from earlier runs
    sqlx::query("DELETE FROM products WHERE price BETWEEN 777000 AND 777999")
        .execute(&pool)
        .await
        .unwrap();

    let in_band = [777_100, 777_500, 777_900];
    let out_of_band = 50_000;

    let mut payloads = Vec::new();
    for price in in_band {
        payloads.push(product_payload(&pool, &unique("Band"), price).await);
    }
    payloads.push(product_payload(&pool, &unique("Cheap"), out_of_band).await);

    let server = create_test_server(pool);
    let auth = bearer(&admin_token());
    for payload in &payloads {
        let response = server
            .post("/api/products")
            .add_header(header::AUTHORIZATION, auth.clone())
            .json(payload)
            .await;
        assert_eq!(response.status_code(), StatusCode::CREATED);
    }

    let listing = server
        .get("/api/products?gte=777000&lte=777999&limit=2")
        .await;
    assert_eq!(listing.status_code(), StatusCode::OK);

    let page: serde_json::Value = listing.json();
    assert_eq!(page["total"], 3);
    assert_eq!(page["totalPages"], 2);
    assert_eq!(page["items"].as_array().unwrap().len(), 2);
    for item in page["items"].as_array().unwrap() {
        let price = item["price"].as_i64().unwrap();
        assert!((777_000..=777_999).contains(&price));
    }
}

/// Category filtering returns only products carrying the requested key
#[tokio::test]
async fn test_listing_category_filter() {
    let Some(pool) = try_test_pool().await else { return };

    // A price band no other test uses; clear leftovers from earlier runs
    sqlx::query("DELETE FROM products WHERE price BETWEEN 888000 AND 888999")
        .execute(&pool)
        .await
        .unwrap();

    let mut papan = product_payload(&pool, &unique("Papan"), 888_100).await;
    papan["category_id"] = json!(reference_id(&pool, "categories", "bunga-papan").await);
    let buket = product_payload(&pool, &unique("Buket"), 888_200).await;

    let server = create_test_server(pool);
    let auth = bearer(&admin_token());
    for payload in [&papan, &buket] {
        let response = server
            .post("/api/products")
            .add_header(header::AUTHORIZATION, auth.clone())
            .json(payload)
            .await;
        assert_eq!(response.status_code(), StatusCode::CREATED);
    }

    let listing = server
        .get("/api/products?categories=bunga-papan&gte=888000&lte=888999")
        .await;
    assert_eq!(listing.status_code(), StatusCode::OK);

    let page: serde_json::Value = listing.json();
    assert_eq!(page["total"], 1);
    for item in page["items"].as_array().unwrap() {
        assert_eq!(item["category"]["key"], "bunga-papan");
    }
}

/// A malformed filter value is rejected instead of ignored
#[tokio::test]
async fn test_listing_malformed_filter() {
    let Some(pool) = try_test_pool().await else { return };
    let server = create_test_server(pool);

    let response = server.get("/api/products?gte=abc").await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

    let response = server.get("/api/products?size=HUGE").await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

/// The meta endpoint serves all four seeded reference tables
#[tokio::test]
async fn test_products_meta() {
    let Some(pool) = try_test_pool().await else { return };
    let server = create_test_server(pool);

    let response = server.get("/api/products/meta").await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let meta: serde_json::Value = response.json();
    for table in ["categories", "types", "objectives", "colors"] {
        assert!(
            !meta[table].as_array().unwrap().is_empty(),
            "{table} should be seeded"
        );
    }
}

/// Within the TTL the cached snapshot is served as-is; a write to the
/// underlying table does not show up until expiry
#[tokio::test]
async fn test_meta_snapshot_is_cached() {
    let Some(pool) = try_test_pool().await else { return };
    let server = create_test_server(pool.clone());

    let warm = server.get("/api/products/meta").await;
    assert_eq!(warm.status_code(), StatusCode::OK);

    // Slip a new color in behind the cache's back
    let key = unique("warna");
    sqlx::query("INSERT INTO colors (key, name) VALUES ($1, $2)")
        .bind(&key)
        .bind("Warna Baru")
        .execute(&pool)
        .await
        .unwrap();

    let cached = server.get("/api/products/meta").await;
    let meta: serde_json::Value = cached.json();
    let seen = meta["colors"]
        .as_array()
        .unwrap()
        .iter()
        .any(|c| c["key"] == key.as_str());
    assert!(!seen, "fresh cache entry should not reflect the new row yet");
}

// ============================================================================
// Category Tests
// ============================================================================

/// Category creation derives the key from the name; the detail view
/// embeds the products filed under it
#[tokio::test]
async fn test_category_create_and_detail() {
    let Some(pool) = try_test_pool().await else { return };
    let server = create_test_server(pool);
    let auth = bearer(&admin_token());

    let name = format!("Custom {}", Uuid::new_v4().simple());
    let created = server
        .post("/api/categories")
        .add_header(header::AUTHORIZATION, auth)
        .json(&json!({ "name": name }))
        .await;
    assert_eq!(created.status_code(), StatusCode::CREATED);

    let category: serde_json::Value = created.json();
    let key = category["key"].as_str().unwrap();
    assert!(key.starts_with("custom-"));
    assert!(!key.contains(' '));

    let id = category["id"].as_str().unwrap();
    let detail = server.get(&format!("/api/categories/{id}")).await;
    assert_eq!(detail.status_code(), StatusCode::OK);

    let detail_body: serde_json::Value = detail.json();
    assert_eq!(detail_body["key"], key);
    assert!(detail_body["products"].as_array().unwrap().is_empty());
}

/// A category still referenced by products cannot be deleted
#[tokio::test]
async fn test_category_delete_conflict_when_in_use() {
    let Some(pool) = try_test_pool().await else { return };
    let server = create_test_server(pool.clone());
    let auth = bearer(&admin_token());

    let created = server
        .post("/api/categories")
        .add_header(header::AUTHORIZATION, auth.clone())
        .json(&json!({ "name": format!("Occupied {}", Uuid::new_v4().simple()) }))
        .await;
    let category: serde_json::Value = created.json();
    let category_id = category["id"].as_str().unwrap().to_string();

    let mut payload = product_payload(&pool, &unique("Occupant"), 80_000).await;
    payload["category_id"] = json!(category_id);
    let product_created = server
        .post("/api/products")
        .add_header(header::AUTHORIZATION, auth.clone())
        .json(&payload)
        .await;
    assert_eq!(product_created.status_code(), StatusCode::CREATED);
    let product: serde_json::Value = product_created.json();

    let blocked = server
        .delete(&format!("/api/categories/{category_id}"))
        .add_header(header::AUTHORIZATION, auth.clone())
        .await;
    assert_eq!(blocked.status_code(), StatusCode::CONFLICT);

    // Remove the product, then the delete goes through
    server
        .delete(&format!("/api/products/{}", product["id"].as_str().unwrap()))
        .add_header(header::AUTHORIZATION, auth.clone())
        .await;

    let allowed = server
        .delete(&format!("/api/categories/{category_id}"))
        .add_header(header::AUTHORIZATION, auth)
        .await;
    assert_eq!(allowed.status_code(), StatusCode::NO_CONTENT);
}

// ============================================================================
// Error Response Format Tests
// ============================================================================

/// Every error renders the standardized envelope
#[tokio::test]
async fn test_error_response_format() {
    let Some(pool) = try_test_pool().await else { return };
    let server = create_test_server(pool);

    let response = server.get(&format!("/api/products/{}", Uuid::new_v4())).await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);

    let body: serde_json::Value = response.json();
    assert!(body["error_code"].is_string());
    assert!(body["message"].is_string());
    assert!(body["timestamp"].is_string());
}
