//! Product listing filters.
//!
//! Raw query parameters arrive as strings ([`ProductQuery`]) and are turned
//! into a validated predicate set ([`ProductFilter`]) before any query is
//! issued. Malformed values are rejected with a field-scoped error rather
//! than silently ignored. All predicates combine with logical AND.

use crate::error::{CatalogError, CatalogResult};
use crate::models::Product;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::str::FromStr;
use strum::{Display, EnumString};
use utoipa::IntoParams;
use uuid::Uuid;

fn default_limit() -> usize {
    50
}

/// Raw query parameters for `GET /products`.
///
/// Numeric and identifier parameters are kept as strings here so parse
/// failures surface as field-scoped validation errors.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ProductQuery {
    /// Exact category id
    pub category: Option<String>,
    /// Case-insensitive exact category name
    pub category_name: Option<String>,
    /// Minimum price, inclusive
    pub min_price: Option<String>,
    /// Maximum price, inclusive
    pub max_price: Option<String>,
    /// Minimum stock quantity, inclusive
    pub stock_quantity: Option<String>,
    /// Case-insensitive substring over name and description
    pub search: Option<String>,
    /// Ordering field, optionally prefixed with `-` for descending
    /// (one of name, price, stock_quantity, created_at)
    pub ordering: Option<String>,
    /// Page size
    #[serde(default = "default_limit")]
    pub limit: usize,
    /// Page offset
    #[serde(default)]
    pub offset: usize,
}

/// Fields a product listing can be ordered by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum OrderField {
    Name,
    Price,
    StockQuantity,
    CreatedAt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderDirection {
    Asc,
    Desc,
}

/// A parsed `ordering` parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ordering {
    pub field: OrderField,
    pub direction: OrderDirection,
}

impl Default for Ordering {
    /// The stable default: name ascending
    fn default() -> Self {
        Self {
            field: OrderField::Name,
            direction: OrderDirection::Asc,
        }
    }
}

impl Ordering {
    /// Parse an ordering expression such as `price` or `-created_at`
    fn parse(raw: &str) -> CatalogResult<Self> {
        let (direction, field_str) = match raw.strip_prefix('-') {
            Some(rest) => (OrderDirection::Desc, rest),
            None => (OrderDirection::Asc, raw),
        };

        let field = OrderField::from_str(field_str).map_err(|_| CatalogError::InvalidFilter {
            field: "ordering",
            message: format!(
                "'{}' is not a sortable field (expected one of name, price, stock_quantity, created_at)",
                field_str
            ),
        })?;

        Ok(Self { field, direction })
    }
}

/// The validated predicate set applied to product listings
#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    pub category: Option<Uuid>,
    pub category_name: Option<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub min_stock: Option<i32>,
    pub search: Option<String>,
    pub ordering: Ordering,
    pub limit: usize,
    pub offset: usize,
}

impl ProductFilter {
    /// Validate raw query parameters into a predicate set.
    ///
    /// Each malformed value is rejected with an error scoped to the parameter
    /// that carried it.
    pub fn build(query: ProductQuery) -> CatalogResult<Self> {
        let category = query
            .category
            .map(|raw| {
                Uuid::parse_str(&raw).map_err(|_| CatalogError::InvalidFilter {
                    field: "category",
                    message: format!("'{}' is not a valid category id", raw),
                })
            })
            .transpose()?;

        let min_price = parse_price(query.min_price, "min_price")?;
        let max_price = parse_price(query.max_price, "max_price")?;

        let min_stock = query
            .stock_quantity
            .map(|raw| {
                raw.parse::<i32>().map_err(|_| CatalogError::InvalidFilter {
                    field: "stock_quantity",
                    message: format!("'{}' is not a valid integer", raw),
                })
            })
            .transpose()?;

        let ordering = query
            .ordering
            .as_deref()
            .map(Ordering::parse)
            .transpose()?
            .unwrap_or_default();

        Ok(Self {
            category,
            category_name: query.category_name,
            min_price,
            max_price,
            min_stock,
            search: query.search,
            ordering,
            limit: query.limit,
            offset: query.offset,
        })
    }

    /// Whether a product satisfies every predicate in this filter.
    ///
    /// Used by the in-memory repository; the postgres repository translates
    /// the same predicates into SQL.
    pub fn matches(&self, product: &Product) -> bool {
        if let Some(category) = self.category {
            if product.category_id != category {
                return false;
            }
        }

        if let Some(ref name) = self.category_name {
            if !product.category_name.eq_ignore_ascii_case(name) {
                return false;
            }
        }

        if let Some(min_price) = self.min_price {
            if product.price < min_price {
                return false;
            }
        }

        if let Some(max_price) = self.max_price {
            if product.price > max_price {
                return false;
            }
        }

        if let Some(min_stock) = self.min_stock {
            if product.stock_quantity < min_stock {
                return false;
            }
        }

        if let Some(ref search) = self.search {
            let needle = search.to_lowercase();
            let in_name = product.name.to_lowercase().contains(&needle);
            let in_description = product.description.to_lowercase().contains(&needle);
            if !in_name && !in_description {
                return false;
            }
        }

        true
    }

    /// Sort products per the requested ordering
    pub fn sort(&self, products: &mut [Product]) {
        let Ordering { field, direction } = self.ordering;

        products.sort_by(|a, b| {
            let ordering = match field {
                OrderField::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
                OrderField::Price => a.price.cmp(&b.price),
                OrderField::StockQuantity => a.stock_quantity.cmp(&b.stock_quantity),
                OrderField::CreatedAt => a.created_at.cmp(&b.created_at),
            };

            match direction {
                OrderDirection::Asc => ordering,
                OrderDirection::Desc => ordering.reverse(),
            }
        });
    }
}

fn parse_price(raw: Option<String>, field: &'static str) -> CatalogResult<Option<Decimal>> {
    raw.map(|raw| {
        Decimal::from_str(&raw).map_err(|_| CatalogError::InvalidFilter {
            field,
            message: format!("'{}' is not a number", raw),
        })
    })
    .transpose()
}

/// Escape LIKE/ILIKE wildcards in user input so a search for "100%" matches
/// the literal text.
pub(crate) fn escape_like(input: &str) -> String {
    input
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}
