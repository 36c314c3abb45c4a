use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use axum_helpers::{
    errors::responses::{
        BadRequestValidationResponse, ConflictResponse, InternalServerErrorResponse,
        UnauthorizedResponse,
    },
    JwtAuth, ValidatedJson,
};
use utoipa::OpenApi;

use crate::error::{UserError, UserResult};
use crate::models::{
    RegisterRequest, RegisterResponse, TokenObtainRequest, TokenPair, TokenRefreshRequest,
    TokenRefreshResponse,
};
use crate::repository::UserRepository;
use crate::service::UserService;

const TAG: &str = "auth";

/// OpenAPI documentation for the registration endpoint (mounted at /users)
#[derive(OpenApi)]
#[openapi(
    paths(register),
    components(
        schemas(RegisterRequest, RegisterResponse),
        responses(
            BadRequestValidationResponse,
            ConflictResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = TAG, description = "Registration and JWT token endpoints")
    )
)]
pub struct RegistrationApiDoc;

/// OpenAPI documentation for the token endpoints (mounted at /auth)
#[derive(OpenApi)]
#[openapi(
    paths(obtain_token, refresh_token),
    components(
        schemas(
            TokenObtainRequest,
            TokenPair,
            TokenRefreshRequest,
            TokenRefreshResponse
        ),
        responses(
            BadRequestValidationResponse,
            UnauthorizedResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = TAG, description = "Registration and JWT token endpoints")
    )
)]
pub struct TokenApiDoc;

/// Application state for auth handlers
#[derive(Clone)]
pub struct AuthState<R: UserRepository> {
    pub service: UserService<R>,
    pub jwt: JwtAuth,
}

/// Router for `POST /users/register`
pub fn registration_router<R: UserRepository + Clone + 'static>(state: AuthState<R>) -> Router {
    Router::new()
        .route("/register", post(register))
        .with_state(state)
}

/// Router for `POST /auth/token` and `POST /auth/token/refresh`
pub fn token_router<R: UserRepository + Clone + 'static>(state: AuthState<R>) -> Router {
    Router::new()
        .route("/token", post(obtain_token))
        .route("/token/refresh", post(refresh_token))
        .with_state(state)
}

/// Register a new user (public, create-only)
#[utoipa::path(
    post,
    path = "/register",
    tag = TAG,
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered successfully", body = RegisterResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 409, response = ConflictResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn register<R: UserRepository>(
    State(state): State<AuthState<R>>,
    ValidatedJson(input): ValidatedJson<RegisterRequest>,
) -> UserResult<impl IntoResponse> {
    let user = state.service.register(input).await?;

    let response = RegisterResponse {
        username: user.username,
        email: user.email,
        message: "User registered successfully.".to_string(),
    };

    Ok((StatusCode::CREATED, Json(response)))
}

/// Obtain an access/refresh token pair from credentials
#[utoipa::path(
    post,
    path = "/token",
    tag = TAG,
    request_body = TokenObtainRequest,
    responses(
        (status = 200, description = "Token pair issued", body = TokenPair),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn obtain_token<R: UserRepository>(
    State(state): State<AuthState<R>>,
    ValidatedJson(input): ValidatedJson<TokenObtainRequest>,
) -> UserResult<Json<TokenPair>> {
    let user = state
        .service
        .verify_credentials(&input.username, &input.password)
        .await?;

    let user_id = user.id.to_string();
    let roles = user.role_names();

    let access = state
        .jwt
        .create_access_token(&user_id, &user.username, &roles)
        .map_err(|e| {
            tracing::error!("Failed to create access token: {:?}", e);
            UserError::Internal("Failed to create token".to_string())
        })?;

    let refresh = state
        .jwt
        .create_refresh_token(&user_id, &user.username, &roles)
        .map_err(|e| {
            tracing::error!("Failed to create refresh token: {:?}", e);
            UserError::Internal("Failed to create token".to_string())
        })?;

    tracing::info!(user_id = %user_id, "Issued token pair");
    Ok(Json(TokenPair { access, refresh }))
}

/// Exchange a refresh token for a fresh access token
#[utoipa::path(
    post,
    path = "/token/refresh",
    tag = TAG,
    request_body = TokenRefreshRequest,
    responses(
        (status = 200, description = "Access token refreshed", body = TokenRefreshResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn refresh_token<R: UserRepository>(
    State(state): State<AuthState<R>>,
    ValidatedJson(input): ValidatedJson<TokenRefreshRequest>,
) -> UserResult<Json<TokenRefreshResponse>> {
    let claims = state
        .jwt
        .verify_refresh_token(&input.refresh)
        .map_err(|_| UserError::InvalidToken)?;

    let access = state
        .jwt
        .create_access_token(&claims.sub, &claims.username, &claims.roles)
        .map_err(|e| {
            tracing::error!("Failed to refresh access token: {:?}", e);
            UserError::Internal("Failed to create token".to_string())
        })?;

    Ok(Json(TokenRefreshResponse { access }))
}
