use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use thiserror::Error;
use uuid::Uuid;
use validator::{ValidationError, ValidationErrors};

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Category not found: {0}")]
    CategoryNotFound(Uuid),

    #[error("Product not found: {0}")]
    ProductNotFound(Uuid),

    /// A write referenced a category that does not exist
    #[error("Category {0} does not exist")]
    UnknownCategory(Uuid),

    #[error("Category with name '{0}' already exists")]
    DuplicateCategoryName(String),

    /// Categories still referenced by products cannot be deleted
    #[error("Category {0} still has products and cannot be deleted")]
    CategoryInUse(Uuid),

    #[error("Invalid input: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("Invalid value for query parameter '{field}': {message}")]
    InvalidFilter {
        field: &'static str,
        message: String,
    },

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type CatalogResult<T> = Result<T, CatalogError>;

/// Convert CatalogError to AppError for standardized error responses
impl From<CatalogError> for AppError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::CategoryNotFound(id) => {
                AppError::NotFound(format!("Category {} not found", id))
            }
            CatalogError::ProductNotFound(id) => {
                AppError::NotFound(format!("Product {} not found", id))
            }
            CatalogError::UnknownCategory(id) => {
                // Reference errors are field-scoped so clients can attach
                // them to the category input
                let mut errors = ValidationErrors::new();
                errors.add(
                    "category_id".into(),
                    ValidationError::new("exists")
                        .with_message(format!("Category {} does not exist.", id).into()),
                );
                AppError::ValidationError(errors)
            }
            CatalogError::DuplicateCategoryName(name) => {
                AppError::Conflict(format!("Category with name '{}' already exists", name))
            }
            CatalogError::CategoryInUse(id) => AppError::Conflict(format!(
                "Category {} still has products and cannot be deleted",
                id
            )),
            CatalogError::Validation(errors) => AppError::ValidationError(errors),
            CatalogError::InvalidFilter { field, message } => {
                let mut errors = ValidationErrors::new();
                errors.add(
                    field.into(),
                    ValidationError::new("invalid").with_message(message.into()),
                );
                AppError::ValidationError(errors)
            }
            CatalogError::PermissionDenied(msg) => AppError::Forbidden(msg),
            CatalogError::Internal(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl IntoResponse for CatalogError {
    fn into_response(self) -> Response {
        // Convert to AppError for the standardized error response format
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}
