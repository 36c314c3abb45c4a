use axum::{middleware, Router};
use axum_helpers::auth::optional_jwt_auth_middleware;
use domain_catalog::{
    handlers as catalog_handlers, CategoryService, PgCategoryRepository, PgProductRepository,
    ProductService,
};
use domain_users::{auth_handlers, AuthState, PgUserRepository, UserService};

pub mod health;

/// Creates the API routes without the `/api` prefix.
/// The `/api` prefix is added by the `create_router` helper.
///
/// Catalog routes get the optional JWT middleware: reads stay public and the
/// write handlers check roles from the decoded claims. The registration and
/// token routes are public by design.
pub fn routes(state: &crate::state::AppState) -> Router {
    let categories = CategoryService::new(PgCategoryRepository::new(state.db.clone()));
    let products = ProductService::new(PgProductRepository::new(state.db.clone()));
    let auth_state = AuthState {
        service: UserService::new(PgUserRepository::new(state.db.clone())),
        jwt: state.jwt.clone(),
    };

    let catalog = Router::new()
        .nest("/categories", catalog_handlers::categories::router(categories))
        .nest("/products", catalog_handlers::products::router(products))
        .layer(middleware::from_fn_with_state(
            state.jwt.clone(),
            optional_jwt_auth_middleware,
        ));

    Router::new()
        .merge(catalog)
        .nest(
            "/users",
            auth_handlers::registration_router(auth_state.clone()),
        )
        .nest("/auth", auth_handlers::token_router(auth_state))
}

/// Creates a router with the /ready endpoint that performs actual health
/// checks against the database.
pub fn ready_router(state: crate::state::AppState) -> Router {
    use axum::routing::get;

    Router::new()
        .route("/ready", get(health::ready_handler))
        .with_state(state)
}
