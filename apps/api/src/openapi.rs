use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Registers the bearer token security scheme referenced by the write
/// endpoints.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
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

#[derive(OpenApi)]
#[openapi(
    components(
        schemas(axum_helpers::ErrorResponse)
    ),
    info(
        title = "Catalog API",
        version = "0.1.0",
        description = "Product catalog API: public category/product reads, role-gated writes, JWT authentication"
    ),
    servers(
        (url = "/api", description = "API base path")
    ),
    modifiers(&SecurityAddon),
    nest(
        (path = "/categories", api = domain_catalog::handlers::categories::ApiDoc),
        (path = "/products", api = domain_catalog::handlers::products::ApiDoc),
        (path = "/users", api = domain_users::auth_handlers::RegistrationApiDoc),
        (path = "/auth", api = domain_users::auth_handlers::TokenApiDoc)
    )
)]
pub struct ApiDoc;
