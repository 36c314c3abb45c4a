//! Catalog Domain
//!
//! Categories and products with role-based write permissions. Reads are
//! public; category writes require the admin role and product writes require
//! seller or admin. Listings support filtering, free-text search, and
//! ordering.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  ← HTTP endpoints, permission checks
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Service   │  ← Business logic, validation, filter building
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │ Repository  │  ← Data access (trait + implementations)
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Models    │  ← Entities, DTOs, filters
//! └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use domain_catalog::{
//!     handlers,
//!     repository::InMemoryCatalog,
//!     service::{CategoryService, ProductService},
//! };
//!
//! let store = InMemoryCatalog::new();
//! let categories = CategoryService::new(store.clone());
//! let products = ProductService::new(store);
//!
//! let category_routes = handlers::categories::router(categories);
//! let product_routes = handlers::products::router(products);
//! ```

pub mod entity;
pub mod error;
pub mod filters;
pub mod handlers;
pub mod models;
pub mod permissions;
pub mod postgres;
pub mod repository;
pub mod service;

// Re-export commonly used types
pub use error::{CatalogError, CatalogResult};
pub use filters::{OrderDirection, OrderField, Ordering, ProductFilter, ProductQuery};
pub use models::{
    Category, CreateCategory, CreateProduct, Product, UpdateCategory, UpdateProduct,
};
pub use permissions::{allow, authorize, ResourceKind, RoleSet};
pub use postgres::{PgCategoryRepository, PgProductRepository};
pub use repository::{CategoryRepository, InMemoryCatalog, ProductRepository};
pub use service::{CategoryService, ProductService};
