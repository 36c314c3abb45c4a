//! PostgreSQL connector and utilities for the catalog service
//!
//! Provides pooled connection management over SeaORM, connection retry with
//! exponential backoff (covers the "wait for the database on startup" case),
//! migration running, and a health check for readiness probes.
//!
//! # Examples
//!
//! ```ignore
//! use core_config::FromEnv;
//! use database::postgres::{self, PostgresConfig};
//! use migration::Migrator;
//!
//! let config = PostgresConfig::from_env()?;
//! let db = postgres::connect_from_config_with_retry(config, None).await?;
//! postgres::run_migrations::<Migrator>(&db, "catalog_api").await?;
//! ```

pub mod common;
pub mod postgres;

pub use common::{DatabaseError, DatabaseResult, RetryConfig};
