use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// Price must be strictly positive; zero-priced products are not sellable.
fn validate_price(price: &Decimal) -> Result<(), ValidationError> {
    if *price <= Decimal::ZERO {
        return Err(ValidationError::new("positive")
            .with_message("Price must be a positive value.".into()));
    }
    Ok(())
}

/// Every image reference must look like an absolute HTTP(S) URL.
fn validate_image_urls(urls: &Vec<String>) -> Result<(), ValidationError> {
    for url in urls {
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ValidationError::new("url")
                .with_message("Image references must be absolute HTTP(S) URLs.".into()));
        }
    }
    Ok(())
}

/// Category entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Category {
    /// Unique identifier
    pub id: Uuid,
    /// Category name (unique, human-readable)
    pub name: String,
    /// Category description
    pub description: String,
    /// Creation timestamp (system-assigned)
    pub created_at: DateTime<Utc>,
    /// Last update timestamp (system-assigned)
    pub updated_at: DateTime<Utc>,
}

/// DTO for creating a new category
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateCategory {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// DTO for updating an existing category
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateCategory {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    pub description: Option<String>,
}

/// Product entity
///
/// `category_name` is resolved from the owning category at query time and is
/// never accepted on input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Product {
    /// Unique identifier
    pub id: Uuid,
    /// Product name
    pub name: String,
    /// Product description
    pub description: String,
    /// Unit price, strictly positive
    pub price: Decimal,
    /// Units in stock, never negative
    pub stock_quantity: i32,
    /// Ordered image URLs
    pub image_urls: Vec<String>,
    /// Owning category
    pub category_id: Uuid,
    /// Name of the owning category (read-only, resolved on read)
    pub category_name: String,
    /// Creation timestamp (system-assigned)
    pub created_at: DateTime<Utc>,
    /// Last update timestamp (system-assigned)
    pub updated_at: DateTime<Utc>,
}

/// DTO for creating a new product
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateProduct {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[validate(custom(function = "validate_price"))]
    pub price: Decimal,
    #[serde(default)]
    #[validate(range(min = 0, message = "Stock quantity cannot be negative."))]
    pub stock_quantity: i32,
    #[serde(default)]
    #[validate(custom(function = "validate_image_urls"))]
    pub image_urls: Vec<String>,
    /// Must reference an existing category
    pub category_id: Uuid,
}

/// DTO for updating an existing product
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateProduct {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    pub description: Option<String>,
    #[validate(custom(function = "validate_price"))]
    pub price: Option<Decimal>,
    #[validate(range(min = 0, message = "Stock quantity cannot be negative."))]
    pub stock_quantity: Option<i32>,
    #[validate(custom(function = "validate_image_urls"))]
    pub image_urls: Option<Vec<String>>,
    pub category_id: Option<Uuid>,
}

impl Category {
    /// Create a new category from a CreateCategory DTO
    pub fn new(input: CreateCategory) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            name: input.name,
            description: input.description,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply updates from an UpdateCategory DTO
    pub fn apply_update(&mut self, update: UpdateCategory) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(description) = update.description {
            self.description = description;
        }
        self.updated_at = Utc::now();
    }
}

impl Product {
    /// Create a new product from a CreateProduct DTO; the caller supplies the
    /// resolved category name.
    pub fn new(input: CreateProduct, category_name: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            name: input.name,
            description: input.description,
            price: input.price,
            stock_quantity: input.stock_quantity,
            image_urls: input.image_urls,
            category_id: input.category_id,
            category_name,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply updates from an UpdateProduct DTO; `category_name` must be the
    /// resolved name of the (possibly changed) owning category.
    pub fn apply_update(&mut self, update: UpdateProduct, category_name: String) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(description) = update.description {
            self.description = description;
        }
        if let Some(price) = update.price {
            self.price = price;
        }
        if let Some(stock_quantity) = update.stock_quantity {
            self.stock_quantity = stock_quantity;
        }
        if let Some(image_urls) = update.image_urls {
            self.image_urls = image_urls;
        }
        if let Some(category_id) = update.category_id {
            self.category_id = category_id;
        }
        self.category_name = category_name;
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn valid_product() -> CreateProduct {
        CreateProduct {
            name: "Mechanical keyboard".to_string(),
            description: String::new(),
            price: dec!(79.99),
            stock_quantity: 10,
            image_urls: vec![],
            category_id: Uuid::now_v7(),
        }
    }

    #[test]
    fn test_product_accepts_positive_price() {
        let mut input = valid_product();
        input.price = dec!(0.01);
        assert!(input.validate().is_ok());
    }

    #[test]
    fn test_product_rejects_zero_price() {
        let mut input = valid_product();
        input.price = dec!(0);

        let errors = input.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("price"));
    }

    #[test]
    fn test_product_rejects_negative_price() {
        let mut input = valid_product();
        input.price = dec!(-1);

        let errors = input.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("price"));
    }

    #[test]
    fn test_product_stock_boundaries() {
        for (stock, ok) in [(-1, false), (0, true), (1, true)] {
            let mut input = valid_product();
            input.stock_quantity = stock;

            let result = input.validate();
            assert_eq!(result.is_ok(), ok, "stock_quantity = {}", stock);
            if let Err(errors) = result {
                assert!(errors.field_errors().contains_key("stock_quantity"));
            }
        }
    }

    #[test]
    fn test_product_rejects_non_http_image_urls() {
        let mut input = valid_product();
        input.image_urls = vec!["ftp://example.com/img.png".to_string()];

        let errors = input.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("image_urls"));
    }

    #[test]
    fn test_update_product_validates_optional_fields() {
        let update = UpdateProduct {
            price: Some(dec!(-5)),
            ..Default::default()
        };

        let errors = update.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("price"));

        // None fields are skipped
        assert!(UpdateProduct::default().validate().is_ok());
    }

    #[test]
    fn test_category_rejects_empty_name() {
        let input = CreateCategory {
            name: String::new(),
            description: String::new(),
        };

        let errors = input.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("name"));
    }

    #[test]
    fn test_category_apply_update_touches_timestamp() {
        let mut category = Category::new(CreateCategory {
            name: "Peripherals".to_string(),
            description: String::new(),
        });
        let created = category.updated_at;

        category.apply_update(UpdateCategory {
            name: Some("Accessories".to_string()),
            description: None,
        });

        assert_eq!(category.name, "Accessories");
        assert!(category.updated_at >= created);
    }
}
