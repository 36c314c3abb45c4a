use axum_helpers::JwtAuth;
use sea_orm::DatabaseConnection;

/// Shared application state: the connection pool and the JWT signer.
/// Domain services are constructed from it per router.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub jwt: JwtAuth,
}
