// storefront/src/models/query.rs

//! Typed list filters. Only the keys named here are accepted from a query
//! string; anything else is rejected with a validation error.

use serde::{de, Deserialize, Deserializer};
use std::cmp::Ordering;
use std::fmt;

use crate::models::{Category, Order, OrderStatus, Product};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
  Ascending,
  Descending,
}

/// A field that list results can be ordered by.
pub trait SortField: Sized + Copy {
  type Record;

  /// Default ordering when the caller gives no `sort`.
  const DEFAULT: Sort<Self>;

  fn parse(name: &str) -> Option<Self>;

  fn accepted() -> &'static str;

  /// SQL column backing this field.
  fn column(self) -> &'static str;

  fn compare(self, a: &Self::Record, b: &Self::Record) -> Ordering;
}

/// `field` sorts ascending, `-field` descending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sort<F> {
  pub field: F,
  pub direction: SortDirection,
}

impl<F: SortField> Sort<F> {
  pub fn parse(raw: &str) -> Result<Self, String> {
    let raw = raw.trim();
    let (direction, name) = match raw.strip_prefix('-') {
      Some(rest) => (SortDirection::Descending, rest),
      None => (SortDirection::Ascending, raw.strip_prefix('+').unwrap_or(raw)),
    };
    let field = F::parse(name)
      .ok_or_else(|| format!("Unsupported sort field '{}'. Expected one of: {}", name, F::accepted()))?;
    Ok(Sort { field, direction })
  }

  pub fn compare(&self, a: &F::Record, b: &F::Record) -> Ordering {
    let ordering = self.field.compare(a, b);
    match self.direction {
      SortDirection::Ascending => ordering,
      SortDirection::Descending => ordering.reverse(),
    }
  }

  pub fn sql(&self) -> &'static str {
    match self.direction {
      SortDirection::Ascending => "ASC",
      SortDirection::Descending => "DESC",
    }
  }
}

impl<'de, F: SortField> Deserialize<'de> for Sort<F> {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    let raw = String::deserialize(deserializer)?;
    Sort::parse(&raw).map_err(de::Error::custom)
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductSortField {
  CreatedAt,
  UpdatedAt,
  Name,
  Price,
  Stock,
  Category,
}

impl SortField for ProductSortField {
  type Record = Product;

  const DEFAULT: Sort<Self> = Sort {
    field: ProductSortField::CreatedAt,
    direction: SortDirection::Descending,
  };

  fn parse(name: &str) -> Option<Self> {
    match name {
      "createdAt" | "created_at" => Some(Self::CreatedAt),
      "updatedAt" | "updated_at" => Some(Self::UpdatedAt),
      "name" => Some(Self::Name),
      "price" => Some(Self::Price),
      "stock" => Some(Self::Stock),
      "category" => Some(Self::Category),
      _ => None,
    }
  }

  fn accepted() -> &'static str {
    "createdAt, updatedAt, name, price, stock, category"
  }

  fn column(self) -> &'static str {
    match self {
      Self::CreatedAt => "created_at",
      Self::UpdatedAt => "updated_at",
      Self::Name => "name",
      Self::Price => "price_cents",
      Self::Stock => "stock",
      // enum columns sort by declaration order in Postgres
      Self::Category => "category::text",
    }
  }

  fn compare(self, a: &Product, b: &Product) -> Ordering {
    match self {
      Self::CreatedAt => a.created_at.cmp(&b.created_at),
      Self::UpdatedAt => a.updated_at.cmp(&b.updated_at),
      Self::Name => a.name.cmp(&b.name),
      Self::Price => a.price.cmp(&b.price),
      Self::Stock => a.stock.cmp(&b.stock),
      Self::Category => a.category.as_str().cmp(b.category.as_str()),
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderSortField {
  CreatedAt,
  UpdatedAt,
  TotalAmount,
  Status,
  CustomerName,
}

impl SortField for OrderSortField {
  type Record = Order;

  const DEFAULT: Sort<Self> = Sort {
    field: OrderSortField::CreatedAt,
    direction: SortDirection::Descending,
  };

  fn parse(name: &str) -> Option<Self> {
    match name {
      "createdAt" | "created_at" => Some(Self::CreatedAt),
      "updatedAt" | "updated_at" => Some(Self::UpdatedAt),
      "total_amount" | "totalAmount" => Some(Self::TotalAmount),
      "status" => Some(Self::Status),
      "customer_name" | "customerName" => Some(Self::CustomerName),
      _ => None,
    }
  }

  fn accepted() -> &'static str {
    "createdAt, updatedAt, total_amount, status, customer_name"
  }

  fn column(self) -> &'static str {
    match self {
      Self::CreatedAt => "created_at",
      Self::UpdatedAt => "updated_at",
      Self::TotalAmount => "total_amount_cents",
      Self::Status => "status::text",
      Self::CustomerName => "customer_name",
    }
  }

  fn compare(self, a: &Order, b: &Order) -> Ordering {
    match self {
      Self::CreatedAt => a.created_at.cmp(&b.created_at),
      Self::UpdatedAt => a.updated_at.cmp(&b.updated_at),
      Self::TotalAmount => a.total_amount.cmp(&b.total_amount),
      Self::Status => a.status.as_str().cmp(b.status.as_str()),
      Self::CustomerName => a.customer_name.cmp(&b.customer_name),
    }
  }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CategoryFilter {
  #[default]
  All,
  Only(Category),
}

impl CategoryFilter {
  pub fn category(self) -> Option<Category> {
    match self {
      CategoryFilter::All => None,
      CategoryFilter::Only(category) => Some(category),
    }
  }
}

impl fmt::Display for CategoryFilter {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      CategoryFilter::All => f.write_str("all"),
      CategoryFilter::Only(category) => f.write_str(category.as_str()),
    }
  }
}

impl<'de> Deserialize<'de> for CategoryFilter {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    let raw = String::deserialize(deserializer)?;
    match raw.trim() {
      "" | "all" => Ok(CategoryFilter::All),
      other => Category::ALL
        .into_iter()
        .find(|c| c.as_str() == other)
        .map(CategoryFilter::Only)
        .ok_or_else(|| {
          de::Error::custom(format!(
            "Invalid category '{}'. Expected all, electronics, clothing, home, beauty or sports",
            other
          ))
        }),
    }
  }
}

/// Query of `GET /products`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProductQuery {
  #[serde(default)]
  pub category: CategoryFilter,
  #[serde(default)]
  pub search: Option<String>,
  #[serde(default)]
  pub sort: Option<Sort<ProductSortField>>,
}

impl ProductQuery {
  pub fn sort(&self) -> Sort<ProductSortField> {
    self.sort.unwrap_or(ProductSortField::DEFAULT)
  }

  /// Search term, with blank terms treated as absent.
  pub fn search_term(&self) -> Option<&str> {
    self.search.as_deref().map(str::trim).filter(|s| !s.is_empty())
  }

  pub fn matches(&self, product: &Product) -> bool {
    if let Some(category) = self.category.category() {
      if product.category != category {
        return false;
      }
    }
    match self.search_term() {
      None => true,
      Some(term) => {
        let needle = term.to_lowercase();
        product.name.to_lowercase().contains(&needle)
          || product
            .description
            .as_deref()
            .is_some_and(|d| d.to_lowercase().contains(&needle))
      }
    }
  }
}

/// Query of `GET /orders`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OrderQuery {
  #[serde(default)]
  pub status: Option<OrderStatus>,
  #[serde(default)]
  pub customer_email: Option<String>,
  #[serde(default)]
  pub sort: Option<Sort<OrderSortField>>,
}

impl OrderQuery {
  pub fn sort(&self) -> Sort<OrderSortField> {
    self.sort.unwrap_or(OrderSortField::DEFAULT)
  }

  /// Stored emails are lowercased, so the filter is normalised the same way.
  pub fn customer_email(&self) -> Option<String> {
    self
      .customer_email
      .as_deref()
      .map(|e| e.trim().to_lowercase())
      .filter(|e| !e.is_empty())
  }

  pub fn matches(&self, order: &Order) -> bool {
    if let Some(status) = self.status {
      if order.status != status {
        return false;
      }
    }
    match self.customer_email() {
      Some(email) => order.customer_email == email,
      None => true,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn product_query(qs: &str) -> Result<ProductQuery, serde_urlencoded::de::Error> {
    serde_urlencoded::from_str(qs)
  }

  #[test]
  fn sort_prefix_selects_direction() {
    let sort = Sort::<ProductSortField>::parse("-price").unwrap();
    assert_eq!(sort.field, ProductSortField::Price);
    assert_eq!(sort.direction, SortDirection::Descending);

    let sort = Sort::<ProductSortField>::parse("name").unwrap();
    assert_eq!(sort.direction, SortDirection::Ascending);

    assert!(Sort::<ProductSortField>::parse("-colour").is_err());
  }

  #[test]
  fn product_query_defaults_to_newest_first() {
    let query = product_query("").unwrap();
    assert_eq!(query.category, CategoryFilter::All);
    assert_eq!(query.sort(), ProductSortField::DEFAULT);
    assert_eq!(query.sort().direction, SortDirection::Descending);
  }

  #[test]
  fn product_query_parses_known_keys() {
    let query = product_query("category=clothing&search=Leather&sort=price").unwrap();
    assert_eq!(query.category, CategoryFilter::Only(Category::Clothing));
    assert_eq!(query.search_term(), Some("Leather"));
    assert_eq!(query.sort().field, ProductSortField::Price);

    assert_eq!(product_query("category=all").unwrap().category, CategoryFilter::All);
  }

  #[test]
  fn product_query_rejects_unknown_keys_and_values() {
    let err = product_query("colour=red").unwrap_err();
    assert!(err.to_string().contains("unknown field"));
    assert!(product_query("category=toys").is_err());
    assert!(product_query("sort=-popularity").is_err());
  }

  #[test]
  fn order_query_normalises_email_and_checks_status() {
    let query: OrderQuery = serde_urlencoded::from_str("customer_email=%20Ada@Example.com&status=shipped").unwrap();
    assert_eq!(query.customer_email().as_deref(), Some("ada@example.com"));
    assert_eq!(query.status, Some(OrderStatus::Shipped));

    assert!(serde_urlencoded::from_str::<OrderQuery>("status=lost").is_err());
    assert!(serde_urlencoded::from_str::<OrderQuery>("page=2").is_err());
  }
}
