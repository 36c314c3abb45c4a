//! HTTP handlers for the catalog resources.
//!
//! Both routers expect the optional JWT middleware to have run so verified
//! claims are available in request extensions; write handlers check
//! permissions against those claims before touching the service layer.

pub mod categories;
pub mod products;
