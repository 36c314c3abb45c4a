use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::error::{CatalogError, CatalogResult};
use crate::filters::{ProductFilter, ProductQuery};
use crate::models::{
    Category, CreateCategory, CreateProduct, Product, UpdateCategory, UpdateProduct,
};
use crate::repository::{CategoryRepository, ProductRepository};

/// Service layer for Category business logic
#[derive(Clone)]
pub struct CategoryService<R: CategoryRepository> {
    repository: Arc<R>,
}

impl<R: CategoryRepository> CategoryService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    /// Create a new category with validation
    pub async fn create_category(&self, input: CreateCategory) -> CatalogResult<Category> {
        input.validate()?;
        self.repository.create(input).await
    }

    /// Get a category by ID
    pub async fn get_category(&self, id: Uuid) -> CatalogResult<Category> {
        self.repository
            .get_by_id(id)
            .await?
            .ok_or(CatalogError::CategoryNotFound(id))
    }

    /// List all categories, name ascending
    pub async fn list_categories(&self) -> CatalogResult<Vec<Category>> {
        self.repository.list().await
    }

    /// Update a category
    pub async fn update_category(
        &self,
        id: Uuid,
        input: UpdateCategory,
    ) -> CatalogResult<Category> {
        input.validate()?;
        self.repository.update(id, input).await
    }

    /// Delete a category; fails while products still reference it
    pub async fn delete_category(&self, id: Uuid) -> CatalogResult<()> {
        let deleted = self.repository.delete(id).await?;

        if !deleted {
            return Err(CatalogError::CategoryNotFound(id));
        }

        Ok(())
    }
}

/// Service layer for Product business logic
#[derive(Clone)]
pub struct ProductService<R: ProductRepository> {
    repository: Arc<R>,
}

impl<R: ProductRepository> ProductService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    /// Create a new product with validation
    pub async fn create_product(&self, input: CreateProduct) -> CatalogResult<Product> {
        input.validate()?;
        self.repository.create(input).await
    }

    /// Get a product by ID
    pub async fn get_product(&self, id: Uuid) -> CatalogResult<Product> {
        self.repository
            .get_by_id(id)
            .await?
            .ok_or(CatalogError::ProductNotFound(id))
    }

    /// List products: build the validated predicate set from the raw query
    /// parameters, then run it against the store
    pub async fn list_products(&self, query: ProductQuery) -> CatalogResult<Vec<Product>> {
        let filter = ProductFilter::build(query)?;
        self.repository.list(filter).await
    }

    /// Update a product
    pub async fn update_product(&self, id: Uuid, input: UpdateProduct) -> CatalogResult<Product> {
        input.validate()?;
        self.repository.update(id, input).await
    }

    /// Delete a product
    pub async fn delete_product(&self, id: Uuid) -> CatalogResult<()> {
        let deleted = self.repository.delete(id).await?;

        if !deleted {
            return Err(CatalogError::ProductNotFound(id));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{MockCategoryRepository, MockProductRepository};
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_create_product_rejects_invalid_input_before_persistence() {
        // No expectations set: reaching the repository would panic
        let mock_repo = MockProductRepository::new();
        let service = ProductService::new(mock_repo);

        let err = service
            .create_product(CreateProduct {
                name: "Keyboard".to_string(),
                description: String::new(),
                price: dec!(0),
                stock_quantity: 1,
                image_urls: vec![],
                category_id: Uuid::now_v7(),
            })
            .await
            .unwrap_err();

        match err {
            CatalogError::Validation(errors) => {
                assert!(errors.field_errors().contains_key("price"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_list_products_rejects_malformed_filter_before_persistence() {
        let mock_repo = MockProductRepository::new();
        let service = ProductService::new(mock_repo);

        let err = service
            .list_products(ProductQuery {
                min_price: Some("expensive".to_string()),
                limit: 50,
                ..Default::default()
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            CatalogError::InvalidFilter { field: "min_price", .. }
        ));
    }

    #[tokio::test]
    async fn test_get_product_maps_missing_to_not_found() {
        let mut mock_repo = MockProductRepository::new();
        let id = Uuid::now_v7();

        mock_repo
            .expect_get_by_id()
            .with(mockall::predicate::eq(id))
            .returning(|_| Ok(None));

        let service = ProductService::new(mock_repo);
        let err = service.get_product(id).await.unwrap_err();

        assert!(matches!(err, CatalogError::ProductNotFound(_)));
    }

    #[tokio::test]
    async fn test_delete_category_maps_missing_to_not_found() {
        let mut mock_repo = MockCategoryRepository::new();
        let id = Uuid::now_v7();

        mock_repo
            .expect_delete()
            .with(mockall::predicate::eq(id))
            .returning(|_| Ok(false));

        let service = CategoryService::new(mock_repo);
        let err = service.delete_category(id).await.unwrap_err();

        assert!(matches!(err, CatalogError::CategoryNotFound(_)));
    }

    #[tokio::test]
    async fn test_create_category_rejects_empty_name() {
        let mock_repo = MockCategoryRepository::new();
        let service = CategoryService::new(mock_repo);

        let err = service
            .create_category(CreateCategory {
                name: String::new(),
                description: String::new(),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, CatalogError::Validation(_)));
    }
}
