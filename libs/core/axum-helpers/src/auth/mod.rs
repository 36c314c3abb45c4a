//! Authentication and authorization module.
//!
//! This module provides:
//! - Stateless JWT access/refresh token creation and verification
//! - Authentication middleware for protected and optionally-protected routes
//!
//! Role evaluation is not done here: middleware only verifies tokens and
//! inserts the decoded [`JwtClaims`] into request extensions. Resource crates
//! decide what a caller's roles allow.
//!
//! # Example
//!
//! ```ignore
//! use axum_helpers::auth::{JwtAuth, JwtConfig, optional_jwt_auth_middleware};
//! use core_config::FromEnv;
//!
//! let config = JwtConfig::from_env()?;
//! let auth = JwtAuth::new(&config);
//!
//! // Catalog routes stay public for reads; handlers check roles on writes
//! let routes = Router::new()
//!     .route("/products", get(list).post(create))
//!     .layer(axum::middleware::from_fn_with_state(auth, optional_jwt_auth_middleware));
//! ```

pub mod config;
pub mod jwt;
pub mod middleware;

// Re-export commonly used types
pub use config::JwtConfig;
pub use jwt::{JwtAuth, JwtClaims, TokenType, ACCESS_TOKEN_TTL, REFRESH_TOKEN_TTL};
pub use middleware::{jwt_auth_middleware, optional_jwt_auth_middleware};
