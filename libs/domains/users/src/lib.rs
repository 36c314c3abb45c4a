//! Users Domain
//!
//! Self-service registration and JWT token issuance for the catalog API.
//!
//! Registration is public and create-only: there is no read, update, or
//! delete surface for user accounts. Role flags (`is_staff` for sellers,
//! `is_superuser` for admins) are never accepted from input — privileged
//! accounts are provisioned out of band.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  ← register / token / token refresh endpoints
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Service   │  ← validation, Argon2 password hashing, credential checks
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │ Repository  │  ← data access (trait + implementations)
//! └─────────────┘
//! ```

pub mod auth_handlers;
pub mod entity;
pub mod error;
pub mod models;
pub mod postgres;
pub mod repository;
pub mod service;

// Re-export commonly used types
pub use auth_handlers::AuthState;
pub use error::{UserError, UserResult};
pub use models::{RegisterRequest, RegisterResponse, Role, TokenObtainRequest, TokenPair, User};
pub use postgres::PgUserRepository;
pub use repository::{InMemoryUserRepository, UserRepository};
pub use service::UserService;
