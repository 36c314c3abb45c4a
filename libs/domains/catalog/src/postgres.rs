use async_trait::async_trait;
use sea_orm::sea_query::{extension::postgres::PgExpr, Expr};
use sea_orm::ActiveValue::Set;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, Order,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
};
use uuid::Uuid;

use crate::{
    entity::{category, product},
    error::{CatalogError, CatalogResult},
    filters::{escape_like, OrderDirection, OrderField, ProductFilter},
    models::{Category, CreateCategory, CreateProduct, Product, UpdateCategory, UpdateProduct},
    repository::{CategoryRepository, ProductRepository},
};

fn db_error(e: sea_orm::DbErr) -> CatalogError {
    CatalogError::Internal(format!("Database error: {}", e))
}

/// PostgreSQL-backed Category repository
#[derive(Clone)]
pub struct PgCategoryRepository {
    db: DatabaseConnection,
}

impl PgCategoryRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CategoryRepository for PgCategoryRepository {
    async fn create(&self, input: CreateCategory) -> CatalogResult<Category> {
        let name_taken = category::Entity::find()
            .filter(category::Column::Name.eq(&input.name))
            .one(&self.db)
            .await
            .map_err(db_error)?
            .is_some();

        if name_taken {
            return Err(CatalogError::DuplicateCategoryName(input.name));
        }

        let active_model: category::ActiveModel = input.into();
        let model = active_model.insert(&self.db).await.map_err(db_error)?;

        tracing::info!(category_id = %model.id, "Created category");
        Ok(model.into())
    }

    async fn get_by_id(&self, id: Uuid) -> CatalogResult<Option<Category>> {
        let model = category::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_error)?;

        Ok(model.map(|m| m.into()))
    }

    async fn list(&self) -> CatalogResult<Vec<Category>> {
        let models = category::Entity::find()
            .order_by(category::Column::Name, Order::Asc)
            .all(&self.db)
            .await
            .map_err(db_error)?;

        Ok(models.into_iter().map(|m| m.into()).collect())
    }

    async fn update(&self, id: Uuid, input: UpdateCategory) -> CatalogResult<Category> {
        let model = category::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_error)?
            .ok_or(CatalogError::CategoryNotFound(id))?;

        if let Some(ref new_name) = input.name {
            let name_taken = category::Entity::find()
                .filter(category::Column::Name.eq(new_name))
                .filter(category::Column::Id.ne(id))
                .one(&self.db)
                .await
                .map_err(db_error)?
                .is_some();

            if name_taken {
                return Err(CatalogError::DuplicateCategoryName(new_name.clone()));
            }
        }

        let mut domain: Category = model.into();
        domain.apply_update(input);

        let active_model = category::ActiveModel {
            id: Set(domain.id),
            name: Set(domain.name.clone()),
            description: Set(domain.description.clone()),
            created_at: Set(domain.created_at.into()),
            updated_at: Set(domain.updated_at.into()),
        };

        let updated = active_model.update(&self.db).await.map_err(db_error)?;

        tracing::info!(category_id = %id, "Updated category");
        Ok(updated.into())
    }

    async fn delete(&self, id: Uuid) -> CatalogResult<bool> {
        // The FK is ON DELETE RESTRICT; this pre-check turns the constraint
        // violation into a structured conflict
        let references = product::Entity::find()
            .filter(product::Column::CategoryId.eq(id))
            .count(&self.db)
            .await
            .map_err(db_error)?;

        if references > 0 {
            return Err(CatalogError::CategoryInUse(id));
        }

        let result = category::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(db_error)?;

        if result.rows_affected > 0 {
            tracing::info!(category_id = %id, "Deleted category");
            Ok(true)
        } else {
            Ok(false)
        }
    }
}

/// PostgreSQL-backed Product repository
#[derive(Clone)]
pub struct PgProductRepository {
    db: DatabaseConnection,
}

impl PgProductRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn resolve_category(&self, id: Uuid) -> CatalogResult<category::Model> {
        category::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_error)?
            .ok_or(CatalogError::UnknownCategory(id))
    }
}

#[async_trait]
impl ProductRepository for PgProductRepository {
    async fn create(&self, input: CreateProduct) -> CatalogResult<Product> {
        let category = self.resolve_category(input.category_id).await?;

        let active_model: product::ActiveModel = input.into();
        let model = active_model.insert(&self.db).await.map_err(db_error)?;

        tracing::info!(product_id = %model.id, "Created product");
        Ok(model.into_product(category.name))
    }

    async fn get_by_id(&self, id: Uuid) -> CatalogResult<Option<Product>> {
        let found = product::Entity::find_by_id(id)
            .find_also_related(category::Entity)
            .one(&self.db)
            .await
            .map_err(db_error)?;

        Ok(found.map(|(model, category)| {
            model.into_product(category.map(|c| c.name).unwrap_or_default())
        }))
    }

    async fn list(&self, filter: ProductFilter) -> CatalogResult<Vec<Product>> {
        let mut query = product::Entity::find().find_also_related(category::Entity);

        if let Some(category_id) = filter.category {
            query = query.filter(product::Column::CategoryId.eq(category_id));
        }

        if let Some(ref name) = filter.category_name {
            // ILIKE with escaped wildcards is a case-insensitive exact match
            query = query.filter(
                Expr::col((category::Entity, category::Column::Name)).ilike(escape_like(name)),
            );
        }

        if let Some(min_price) = filter.min_price {
            query = query.filter(product::Column::Price.gte(min_price));
        }

        if let Some(max_price) = filter.max_price {
            query = query.filter(product::Column::Price.lte(max_price));
        }

        if let Some(min_stock) = filter.min_stock {
            query = query.filter(product::Column::StockQuantity.gte(min_stock));
        }

        if let Some(ref search) = filter.search {
            let pattern = format!("%{}%", escape_like(search));
            query = query.filter(
                Condition::any()
                    .add(
                        Expr::col((product::Entity, product::Column::Name)).ilike(pattern.clone()),
                    )
                    .add(
                        Expr::col((product::Entity, product::Column::Description)).ilike(pattern),
                    ),
            );
        }

        let order_column = match filter.ordering.field {
            OrderField::Name => product::Column::Name,
            OrderField::Price => product::Column::Price,
            OrderField::StockQuantity => product::Column::StockQuantity,
            OrderField::CreatedAt => product::Column::CreatedAt,
        };
        let order = match filter.ordering.direction {
            OrderDirection::Asc => Order::Asc,
            OrderDirection::Desc => Order::Desc,
        };

        let models = query
            .order_by(order_column, order)
            .limit(filter.limit as u64)
            .offset(filter.offset as u64)
            .all(&self.db)
            .await
            .map_err(db_error)?;

        Ok(models
            .into_iter()
            .map(|(model, category)| {
                model.into_product(category.map(|c| c.name).unwrap_or_default())
            })
            .collect())
    }

    async fn update(&self, id: Uuid, input: UpdateProduct) -> CatalogResult<Product> {
        let (model, joined_category) = product::Entity::find_by_id(id)
            .find_also_related(category::Entity)
            .one(&self.db)
            .await
            .map_err(db_error)?
            .ok_or(CatalogError::ProductNotFound(id))?;

        // Resolve the (possibly changed) owning category before writing
        let category_name = match input.category_id {
            Some(new_category) if new_category != model.category_id => {
                self.resolve_category(new_category).await?.name
            }
            _ => joined_category.map(|c| c.name).unwrap_or_default(),
        };

        let mut domain = model.into_product(category_name.clone());
        domain.apply_update(input, category_name);

        let image_urls =
            serde_json::to_value(&domain.image_urls).expect("Failed to serialize image urls");

        let active_model = product::ActiveModel {
            id: Set(domain.id),
            name: Set(domain.name.clone()),
            description: Set(domain.description.clone()),
            price: Set(domain.price),
            stock_quantity: Set(domain.stock_quantity),
            image_urls: Set(image_urls),
            category_id: Set(domain.category_id),
            created_at: Set(domain.created_at.into()),
            updated_at: Set(domain.updated_at.into()),
        };

        let updated = active_model.update(&self.db).await.map_err(db_error)?;

        tracing::info!(product_id = %id, "Updated product");
        Ok(updated.into_product(domain.category_name))
    }

    async fn delete(&self, id: Uuid) -> CatalogResult<bool> {
        let result = product::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(db_error)?;

        if result.rows_affected > 0 {
            tracing::info!(product_id = %id, "Deleted product");
            Ok(true)
        } else {
            Ok(false)
        }
    }
}
