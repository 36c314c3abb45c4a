use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{CatalogError, CatalogResult};
use crate::filters::ProductFilter;
use crate::models::{
    Category, CreateCategory, CreateProduct, Product, UpdateCategory, UpdateProduct,
};

/// Repository trait for Category persistence
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    /// Create a new category
    async fn create(&self, input: CreateCategory) -> CatalogResult<Category>;

    /// Get a category by ID
    async fn get_by_id(&self, id: Uuid) -> CatalogResult<Option<Category>>;

    /// List all categories, name ascending
    async fn list(&self) -> CatalogResult<Vec<Category>>;

    /// Update an existing category
    async fn update(&self, id: Uuid, input: UpdateCategory) -> CatalogResult<Category>;

    /// Delete a category by ID; fails with `CategoryInUse` while products
    /// still reference it
    async fn delete(&self, id: Uuid) -> CatalogResult<bool>;
}

/// Repository trait for Product persistence
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Create a new product; the category reference must resolve
    async fn create(&self, input: CreateProduct) -> CatalogResult<Product>;

    /// Get a product by ID
    async fn get_by_id(&self, id: Uuid) -> CatalogResult<Option<Product>>;

    /// List products matching the filter, in its requested ordering
    async fn list(&self, filter: ProductFilter) -> CatalogResult<Vec<Product>>;

    /// Update an existing product
    async fn update(&self, id: Uuid, input: UpdateProduct) -> CatalogResult<Product>;

    /// Delete a product by ID
    async fn delete(&self, id: Uuid) -> CatalogResult<bool>;
}

/// In-memory implementation of both catalog repositories (for
/// development/testing). Categories and products share one store so the
/// category reference checks behave like the real foreign key.
#[derive(Debug, Default, Clone)]
pub struct InMemoryCatalog {
    categories: Arc<RwLock<HashMap<Uuid, Category>>>,
    products: Arc<RwLock<HashMap<Uuid, Product>>>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CategoryRepository for InMemoryCatalog {
    async fn create(&self, input: CreateCategory) -> CatalogResult<Category> {
        let mut categories = self.categories.write().await;

        if categories.values().any(|c| c.name == input.name) {
            return Err(CatalogError::DuplicateCategoryName(input.name));
        }

        let category = Category::new(input);
        categories.insert(category.id, category.clone());

        tracing::info!(category_id = %category.id, "Created category");
        Ok(category)
    }

    async fn get_by_id(&self, id: Uuid) -> CatalogResult<Option<Category>> {
        let categories = self.categories.read().await;
        Ok(categories.get(&id).cloned())
    }

    async fn list(&self) -> CatalogResult<Vec<Category>> {
        let categories = self.categories.read().await;

        let mut result: Vec<Category> = categories.values().cloned().collect();
        result.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));

        Ok(result)
    }

    async fn update(&self, id: Uuid, input: UpdateCategory) -> CatalogResult<Category> {
        let mut categories = self.categories.write().await;

        if !categories.contains_key(&id) {
            return Err(CatalogError::CategoryNotFound(id));
        }

        if let Some(ref new_name) = input.name {
            let name_taken = categories
                .values()
                .any(|c| c.id != id && c.name == *new_name);

            if name_taken {
                return Err(CatalogError::DuplicateCategoryName(new_name.clone()));
            }
        }

        let category = categories.get_mut(&id).expect("checked above");
        category.apply_update(input);
        let updated = category.clone();

        tracing::info!(category_id = %id, "Updated category");
        Ok(updated)
    }

    async fn delete(&self, id: Uuid) -> CatalogResult<bool> {
        // Lock order: categories before products, as everywhere else
        let mut categories = self.categories.write().await;
        let products = self.products.read().await;

        if products.values().any(|p| p.category_id == id) {
            return Err(CatalogError::CategoryInUse(id));
        }

        if categories.remove(&id).is_some() {
            tracing::info!(category_id = %id, "Deleted category");
            Ok(true)
        } else {
            Ok(false)
        }
    }
}

#[async_trait]
impl ProductRepository for InMemoryCatalog {
    async fn create(&self, input: CreateProduct) -> CatalogResult<Product> {
        let categories = self.categories.read().await;
        let category_name = categories
            .get(&input.category_id)
            .map(|c| c.name.clone())
            .ok_or(CatalogError::UnknownCategory(input.category_id))?;
        drop(categories);

        let product = Product::new(input, category_name);

        let mut products = self.products.write().await;
        products.insert(product.id, product.clone());

        tracing::info!(product_id = %product.id, "Created product");
        Ok(product)
    }

    async fn get_by_id(&self, id: Uuid) -> CatalogResult<Option<Product>> {
        let categories = self.categories.read().await;
        let products = self.products.read().await;

        // Re-resolve the category name so renames are reflected on reads
        Ok(products.get(&id).map(|p| {
            let mut product = p.clone();
            if let Some(category) = categories.get(&product.category_id) {
                product.category_name = category.name.clone();
            }
            product
        }))
    }

    async fn list(&self, filter: ProductFilter) -> CatalogResult<Vec<Product>> {
        let categories = self.categories.read().await;
        let products = self.products.read().await;

        let mut result: Vec<Product> = products
            .values()
            .map(|p| {
                let mut product = p.clone();
                if let Some(category) = categories.get(&product.category_id) {
                    product.category_name = category.name.clone();
                }
                product
            })
            .filter(|p| filter.matches(p))
            .collect();

        filter.sort(&mut result);

        let result: Vec<Product> = result
            .into_iter()
            .skip(filter.offset)
            .take(filter.limit)
            .collect();

        Ok(result)
    }

    async fn update(&self, id: Uuid, input: UpdateProduct) -> CatalogResult<Product> {
        let categories = self.categories.read().await;
        let mut products = self.products.write().await;

        let product = products
            .get_mut(&id)
            .ok_or(CatalogError::ProductNotFound(id))?;

        let target_category = input.category_id.unwrap_or(product.category_id);
        let category_name = categories
            .get(&target_category)
            .map(|c| c.name.clone())
            .ok_or(CatalogError::UnknownCategory(target_category))?;

        product.apply_update(input, category_name);
        let updated = product.clone();

        tracing::info!(product_id = %id, "Updated product");
        Ok(updated)
    }

    async fn delete(&self, id: Uuid) -> CatalogResult<bool> {
        let mut products = self.products.write().await;

        if products.remove(&id).is_some() {
            tracing::info!(product_id = %id, "Deleted product");
            Ok(true)
        } else {
            Ok(false)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::ProductQuery;
    use rust_decimal_macros::dec;

    fn category_input(name: &str) -> CreateCategory {
        CreateCategory {
            name: name.to_string(),
            description: String::new(),
        }
    }

    fn product_input(name: &str, price: rust_decimal::Decimal, category_id: Uuid) -> CreateProduct {
        CreateProduct {
            name: name.to_string(),
            description: String::new(),
            price,
            stock_quantity: 5,
            image_urls: vec![],
            category_id,
        }
    }

    fn default_filter() -> ProductFilter {
        ProductFilter::build(ProductQuery {
            limit: 50,
            ..Default::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_create_and_get_category() {
        let repo = InMemoryCatalog::new();

        let category = CategoryRepository::create(&repo, category_input("Books"))
            .await
            .unwrap();
        assert_eq!(category.name, "Books");

        let fetched = CategoryRepository::get_by_id(&repo, category.id)
            .await
            .unwrap();
        assert_eq!(fetched.unwrap().id, category.id);
    }

    #[tokio::test]
    async fn test_duplicate_category_name_rejected() {
        let repo = InMemoryCatalog::new();

        CategoryRepository::create(&repo, category_input("Books"))
            .await
            .unwrap();
        let err = CategoryRepository::create(&repo, category_input("Books"))
            .await
            .unwrap_err();

        assert!(matches!(err, CatalogError::DuplicateCategoryName(_)));
    }

    #[tokio::test]
    async fn test_categories_listed_name_ascending() {
        let repo = InMemoryCatalog::new();

        for name in ["monitors", "Books", "accessories"] {
            CategoryRepository::create(&repo, category_input(name))
                .await
                .unwrap();
        }

        let listed = CategoryRepository::list(&repo).await.unwrap();
        let names: Vec<_> = listed.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["accessories", "Books", "monitors"]);
    }

    #[tokio::test]
    async fn test_product_requires_existing_category() {
        let repo = InMemoryCatalog::new();

        let err = ProductRepository::create(
            &repo,
            product_input("Keyboard", dec!(10), Uuid::now_v7()),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, CatalogError::UnknownCategory(_)));
    }

    #[tokio::test]
    async fn test_product_carries_resolved_category_name() {
        let repo = InMemoryCatalog::new();
        let category = CategoryRepository::create(&repo, category_input("Peripherals"))
            .await
            .unwrap();

        let product =
            ProductRepository::create(&repo, product_input("Keyboard", dec!(10), category.id))
                .await
                .unwrap();

        assert_eq!(product.category_name, "Peripherals");

        // Category rename is reflected on subsequent reads
        CategoryRepository::update(
            &repo,
            category.id,
            UpdateCategory {
                name: Some("Accessories".to_string()),
                description: None,
            },
        )
        .await
        .unwrap();

        let fetched = ProductRepository::get_by_id(&repo, product.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(fetched.category_name, "Accessories");
    }

    #[tokio::test]
    async fn test_category_with_products_cannot_be_deleted() {
        let repo = InMemoryCatalog::new();
        let category = CategoryRepository::create(&repo, category_input("Peripherals"))
            .await
            .unwrap();
        let product =
            ProductRepository::create(&repo, product_input("Keyboard", dec!(10), category.id))
                .await
                .unwrap();

        let err = CategoryRepository::delete(&repo, category.id)
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::CategoryInUse(_)));

        // After the product is gone the category can be removed
        assert!(ProductRepository::delete(&repo, product.id).await.unwrap());
        assert!(CategoryRepository::delete(&repo, category.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_list_applies_price_filter_and_ordering() {
        let repo = InMemoryCatalog::new();
        let category = CategoryRepository::create(&repo, category_input("Peripherals"))
            .await
            .unwrap();

        for (name, price) in [("cheap", dec!(5)), ("mid", dec!(25)), ("dear", dec!(99))] {
            ProductRepository::create(&repo, product_input(name, price, category.id))
                .await
                .unwrap();
        }

        let filter = ProductFilter::build(ProductQuery {
            min_price: Some("10".to_string()),
            max_price: Some("50".to_string()),
            limit: 50,
            ..Default::default()
        })
        .unwrap();

        let listed = ProductRepository::list(&repo, filter).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].name, "mid");

        // Default ordering is name ascending
        let listed = ProductRepository::list(&repo, default_filter()).await.unwrap();
        let names: Vec<_> = listed.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["cheap", "dear", "mid"]);
    }

    #[tokio::test]
    async fn test_update_product_revalidates_category_reference() {
        let repo = InMemoryCatalog::new();
        let category = CategoryRepository::create(&repo, category_input("Peripherals"))
            .await
            .unwrap();
        let product =
            ProductRepository::create(&repo, product_input("Keyboard", dec!(10), category.id))
                .await
                .unwrap();

        let err = ProductRepository::update(
            &repo,
            product.id,
            UpdateProduct {
                category_id: Some(Uuid::now_v7()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, CatalogError::UnknownCategory(_)));

        let updated = ProductRepository::update(
            &repo,
            product.id,
            UpdateProduct {
                price: Some(dec!(12.50)),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(updated.price, dec!(12.50));
    }

    #[tokio::test]
    async fn test_pagination() {
        let repo = InMemoryCatalog::new();
        let category = CategoryRepository::create(&repo, category_input("Peripherals"))
            .await
            .unwrap();

        for i in 0..5 {
            ProductRepository::create(
                &repo,
                product_input(&format!("product-{}", i), dec!(10), category.id),
            )
            .await
            .unwrap();
        }

        let filter = ProductFilter::build(ProductQuery {
            limit: 2,
            offset: 2,
            ..Default::default()
        })
        .unwrap();

        let listed = ProductRepository::list(&repo, filter).await.unwrap();
        let names: Vec<_> = listed.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["product-2", "product-3"]);
    }
}
