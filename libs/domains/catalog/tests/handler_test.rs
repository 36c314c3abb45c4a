//! Handler tests for the catalog domain
//!
//! These drive the category and product routers end-to-end over the
//! in-memory repositories, with the optional JWT middleware applied the same
//! way the API binary wires it:
//! - anonymous reads succeed
//! - anonymous/customer writes are denied with a structured 403
//! - seller and admin writes follow the permission table
//! - filters, ordering, and validation errors surface as structured responses

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::{middleware, Router};
use domain_catalog::{
    handlers,
    repository::{CategoryRepository, InMemoryCatalog},
    Category, CategoryService, CreateCategory, Product, ProductService,
};
use axum_helpers::auth::{optional_jwt_auth_middleware, JwtAuth, JwtConfig};
use http_body_util::BodyExt;
use serde_json::json;
use tower::ServiceExt; // For oneshot()

const TEST_SECRET: &str = "catalog-test-secret-with-32-chars!!";

struct TestApp {
    router: Router,
    jwt: JwtAuth,
    store: InMemoryCatalog,
}

fn test_app() -> TestApp {
    let store = InMemoryCatalog::new();
    let jwt = JwtAuth::new(&JwtConfig::new(TEST_SECRET));

    let router = Router::new()
        .nest(
            "/categories",
            handlers::categories::router(CategoryService::new(store.clone())),
        )
        .nest(
            "/products",
            handlers::products::router(ProductService::new(store.clone())),
        )
        .layer(middleware::from_fn_with_state(
            jwt.clone(),
            optional_jwt_auth_middleware,
        ));

    TestApp { router, jwt, store }
}

impl TestApp {
    fn token(&self, roles: &[&str]) -> String {
        let roles: Vec<String> = roles.iter().map(|r| r.to_string()).collect();
        self.jwt
            .create_access_token("00000000-0000-0000-0000-000000000001", "tester", &roles)
            .unwrap()
    }

    async fn seed_category(&self, name: &str) -> Category {
        CategoryRepository::create(
            &self.store,
            CreateCategory {
                name: name.to_string(),
                description: String::new(),
            },
        )
        .await
        .unwrap()
    }
}

fn request(method: &str, uri: &str, token: Option<&str>, body: Option<serde_json::Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);

    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }

    match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_string(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn json_body<T: serde::de::DeserializeOwned>(body: Body) -> T {
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn product_body(category: &Category) -> serde_json::Value {
    json!({
        "name": "Mechanical keyboard",
        "description": "Tenkeyless, brown switches",
        "price": "79.99",
        "stock_quantity": 10,
        "image_urls": ["https://cdn.example.com/kb-1.jpg"],
        "category_id": category.id,
    })
}

#[tokio::test]
async fn test_anonymous_can_list_products() {
    let app = test_app();

    let response = app
        .router
        .oneshot(request("GET", "/products", None, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let products: Vec<Product> = json_body(response.into_body()).await;
    assert!(products.is_empty());
}

#[tokio::test]
async fn test_anonymous_cannot_create_product() {
    let app = test_app();
    let category = app.seed_category("Peripherals").await;

    let response = app
        .router
        .clone()
        .oneshot(request("POST", "/products", None, Some(product_body(&category))))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let body: serde_json::Value = json_body(response.into_body()).await;
    assert_eq!(body["error"], "FORBIDDEN");

    // No product was persisted
    let response = app
        .router
        .oneshot(request("GET", "/products", None, None))
        .await
        .unwrap();
    let products: Vec<Product> = json_body(response.into_body()).await;
    assert!(products.is_empty());
}

#[tokio::test]
async fn test_customer_cannot_create_product() {
    let app = test_app();
    let category = app.seed_category("Peripherals").await;
    let token = app.token(&["customer"]);

    let response = app
        .router
        .clone()
        .oneshot(request(
            "POST",
            "/products",
            Some(&token),
            Some(product_body(&category)),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_seller_can_create_product() {
    let app = test_app();
    let category = app.seed_category("Peripherals").await;
    let token = app.token(&["customer", "seller"]);

    let response = app
        .router
        .oneshot(request(
            "POST",
            "/products",
            Some(&token),
            Some(product_body(&category)),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);

    let product: Product = json_body(response.into_body()).await;
    assert_eq!(product.name, "Mechanical keyboard");
    assert_eq!(product.category_name, "Peripherals");
    // Timestamps are system-assigned
    assert!(product.created_at <= chrono::Utc::now());
}

#[tokio::test]
async fn test_create_product_rejects_zero_price() {
    let app = test_app();
    let category = app.seed_category("Peripherals").await;
    let token = app.token(&["seller"]);

    let mut body = product_body(&category);
    body["price"] = json!("0");

    let response = app
        .router
        .oneshot(request("POST", "/products", Some(&token), Some(body)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body: serde_json::Value = json_body(response.into_body()).await;
    assert_eq!(body["error"], "VALIDATION_ERROR");
    assert!(body["details"]["price"].is_array());
}

#[tokio::test]
async fn test_create_product_rejects_unknown_category() {
    let app = test_app();
    app.seed_category("Peripherals").await;
    let token = app.token(&["seller"]);

    let body = json!({
        "name": "Orphan product",
        "price": "10.00",
        "category_id": "00000000-0000-0000-0000-00000000dead",
    });

    let response = app
        .router
        .oneshot(request("POST", "/products", Some(&token), Some(body)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body: serde_json::Value = json_body(response.into_body()).await;
    assert!(body["details"]["category_id"].is_array());
}

#[tokio::test]
async fn test_price_filter_bounds_results() {
    let app = test_app();
    let category = app.seed_category("Peripherals").await;
    let token = app.token(&["seller"]);

    for (name, price) in [("cheap", "5.00"), ("mid", "25.00"), ("dear", "99.00")] {
        let mut body = product_body(&category);
        body["name"] = json!(name);
        body["price"] = json!(price);

        let response = app
            .router
            .clone()
            .oneshot(request("POST", "/products", Some(&token), Some(body)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = app
        .router
        .clone()
        .oneshot(request(
            "GET",
            "/products?min_price=10&max_price=50",
            None,
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let products: Vec<Product> = json_body(response.into_body()).await;
    assert_eq!(products.len(), 1);
    assert_eq!(products[0].name, "mid");

    // Non-numeric min_price is rejected with a field-scoped error, not ignored
    let response = app
        .router
        .oneshot(request("GET", "/products?min_price=cheap", None, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = json_body(response.into_body()).await;
    assert!(body["details"]["min_price"].is_array());
}

#[tokio::test]
async fn test_default_ordering_is_name_ascending() {
    let app = test_app();
    let category = app.seed_category("Peripherals").await;
    let token = app.token(&["seller"]);

    for name in ["webcam", "Keyboard", "mouse"] {
        let mut body = product_body(&category);
        body["name"] = json!(name);

        app.router
            .clone()
            .oneshot(request("POST", "/products", Some(&token), Some(body)))
            .await
            .unwrap();
    }

    let response = app
        .router
        .oneshot(request("GET", "/products", None, None))
        .await
        .unwrap();

    let products: Vec<Product> = json_body(response.into_body()).await;
    let names: Vec<_> = products.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, ["Keyboard", "mouse", "webcam"]);
}

#[tokio::test]
async fn test_ordering_by_price_descending() {
    let app = test_app();
    let category = app.seed_category("Peripherals").await;
    let token = app.token(&["seller"]);

    for (name, price) in [("a", "5.00"), ("b", "99.00"), ("c", "25.00")] {
        let mut body = product_body(&category);
        body["name"] = json!(name);
        body["price"] = json!(price);

        app.router
            .clone()
            .oneshot(request("POST", "/products", Some(&token), Some(body)))
            .await
            .unwrap();
    }

    let response = app
        .router
        .oneshot(request("GET", "/products?ordering=-price", None, None))
        .await
        .unwrap();

    let products: Vec<Product> = json_body(response.into_body()).await;
    let names: Vec<_> = products.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, ["b", "c", "a"]);
}

#[tokio::test]
async fn test_admin_can_delete_category_seller_cannot() {
    let app = test_app();
    let category = app.seed_category("Short-lived").await;

    let seller_token = app.token(&["seller"]);
    let response = app
        .router
        .clone()
        .oneshot(request(
            "DELETE",
            &format!("/categories/{}", category.id),
            Some(&seller_token),
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let admin_token = app.token(&["admin"]);
    let response = app
        .router
        .oneshot(request(
            "DELETE",
            &format!("/categories/{}", category.id),
            Some(&admin_token),
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_category_with_products_delete_conflicts() {
    let app = test_app();
    let category = app.seed_category("Peripherals").await;
    let seller_token = app.token(&["seller"]);
    let admin_token = app.token(&["admin"]);

    app.router
        .clone()
        .oneshot(request(
            "POST",
            "/products",
            Some(&seller_token),
            Some(product_body(&category)),
        ))
        .await
        .unwrap();

    let response = app
        .router
        .oneshot(request(
            "DELETE",
            &format!("/categories/{}", category.id),
            Some(&admin_token),
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_category_crud_round_trip() {
    let app = test_app();
    let admin_token = app.token(&["admin"]);

    // Anonymous create is denied
    let response = app
        .router
        .clone()
        .oneshot(request(
            "POST",
            "/categories",
            None,
            Some(json!({"name": "Audio"})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Admin create succeeds
    let response = app
        .router
        .clone()
        .oneshot(request(
            "POST",
            "/categories",
            Some(&admin_token),
            Some(json!({"name": "Audio", "description": "Speakers and headphones"})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let category: Category = json_body(response.into_body()).await;

    // Duplicate name conflicts
    let response = app
        .router
        .clone()
        .oneshot(request(
            "POST",
            "/categories",
            Some(&admin_token),
            Some(json!({"name": "Audio"})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // Anonymous read succeeds
    let response = app
        .router
        .clone()
        .oneshot(request(
            "GET",
            &format!("/categories/{}", category.id),
            None,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Admin rename
    let response = app
        .router
        .clone()
        .oneshot(request(
            "PUT",
            &format!("/categories/{}", category.id),
            Some(&admin_token),
            Some(json!({"name": "Audio equipment"})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let renamed: Category = json_body(response.into_body()).await;
    assert_eq!(renamed.name, "Audio equipment");

    // Missing id is a 404
    let response = app
        .router
        .oneshot(request(
            "GET",
            &format!("/categories/{}", uuid::Uuid::now_v7()),
            None,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_invalid_token_is_anonymous_on_reads_but_cannot_write() {
    let app = test_app();
    let category = app.seed_category("Peripherals").await;

    let response = app
        .router
        .clone()
        .oneshot(request("GET", "/products", Some("garbage-token"), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .router
        .oneshot(request(
            "POST",
            "/products",
            Some("garbage-token"),
            Some(product_body(&category)),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
