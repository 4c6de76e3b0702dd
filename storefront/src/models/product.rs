// storefront/src/models/product.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type as SqlxType};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::errors::{AppError, Result};
use crate::models::Money;

pub const DEFAULT_STOCK: i32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, SqlxType)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "product_category", rename_all = "lowercase")]
pub enum Category {
  Electronics,
  Clothing,
  Home,
  Beauty,
  Sports,
}

impl Category {
  pub const ALL: [Category; 5] = [
    Category::Electronics,
    Category::Clothing,
    Category::Home,
    Category::Beauty,
    Category::Sports,
  ];

  pub fn as_str(self) -> &'static str {
    match self {
      Category::Electronics => "electronics",
      Category::Clothing => "clothing",
      Category::Home => "home",
      Category::Beauty => "beauty",
      Category::Sports => "sports",
    }
  }
}

impl fmt::Display for Category {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for Category {
  type Err = AppError;

  fn from_str(s: &str) -> Result<Self> {
    Category::ALL
      .into_iter()
      .find(|c| c.as_str() == s)
      .ok_or_else(|| {
        AppError::Validation(format!(
          "Invalid category '{}'. Expected one of: electronics, clothing, home, beauty, sports",
          s
        ))
      })
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Product {
  pub id: Uuid,
  pub name: String,
  #[sqlx(rename = "price_cents")]
  pub price: Money,
  pub image_url: String,
  pub description: Option<String>,
  pub category: Category,
  pub stock: i32,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl Product {
  pub fn from_draft(draft: ProductDraft, now: DateTime<Utc>) -> Self {
    Self {
      id: Uuid::new_v4(),
      name: draft.name,
      price: draft.price,
      image_url: draft.image_url,
      description: draft.description,
      category: draft.category,
      stock: draft.stock,
      created_at: now,
      updated_at: now,
    }
  }

  pub fn apply(&mut self, changes: ProductChanges, now: DateTime<Utc>) {
    if let Some(name) = changes.name {
      self.name = name;
    }
    if let Some(price) = changes.price {
      self.price = price;
    }
    if let Some(image_url) = changes.image_url {
      self.image_url = image_url;
    }
    if let Some(description) = changes.description {
      self.description = description;
    }
    if let Some(category) = changes.category {
      self.category = category;
    }
    if let Some(stock) = changes.stock {
      self.stock = stock;
    }
    self.updated_at = now;
  }
}

/// Body of `POST /products`. Every field is optional here so that a missing
/// field is reported with a readable message by `validate`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewProduct {
  pub name: Option<String>,
  pub price: Option<Money>,
  pub image_url: Option<String>,
  pub description: Option<String>,
  pub category: Option<Category>,
  pub stock: Option<i32>,
}

/// A product that passed validation and is ready to be stored.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductDraft {
  pub name: String,
  pub price: Money,
  pub image_url: String,
  pub description: Option<String>,
  pub category: Category,
  pub stock: i32,
}

impl NewProduct {
  pub fn validate(self) -> Result<ProductDraft> {
    let name = required_text(self.name, "Product name is required")?;
    let price = self
      .price
      .ok_or_else(|| AppError::Validation("Product price is required".to_string()))?;
    check_price(price)?;
    let image_url = required_text(self.image_url, "Product image is required")?;
    let category = self
      .category
      .ok_or_else(|| AppError::Validation("Product category is required".to_string()))?;
    let stock = self.stock.unwrap_or(DEFAULT_STOCK);
    check_stock(stock)?;

    Ok(ProductDraft {
      name,
      price,
      image_url,
      description: optional_text(self.description),
      category,
      stock,
    })
  }
}

/// Body of `PUT /products/:id`: field-level overwrite of whatever is present.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductPatch {
  pub name: Option<String>,
  pub price: Option<Money>,
  pub image_url: Option<String>,
  /// Absent leaves the description alone; `null` or `""` clears it.
  #[serde(default, deserialize_with = "present_or_null")]
  pub description: Option<Option<String>>,
  pub category: Option<Category>,
  pub stock: Option<i32>,
}

/// Only runs for keys present in the body, so `null` arrives as `Some(None)`.
fn present_or_null<'de, D>(deserializer: D) -> std::result::Result<Option<Option<String>>, D::Error>
where
  D: serde::Deserializer<'de>,
{
  Option::<String>::deserialize(deserializer).map(Some)
}

/// Validated overwrite set. `description: Some(None)` clears the description.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductChanges {
  pub name: Option<String>,
  pub price: Option<Money>,
  pub image_url: Option<String>,
  pub description: Option<Option<String>>,
  pub category: Option<Category>,
  pub stock: Option<i32>,
}

impl ProductPatch {
  pub fn validate(self) -> Result<ProductChanges> {
    let name = self
      .name
      .map(|n| required_text(Some(n), "Product name is required"))
      .transpose()?;
    if let Some(price) = self.price {
      check_price(price)?;
    }
    let image_url = self
      .image_url
      .map(|u| required_text(Some(u), "Product image is required"))
      .transpose()?;
    if let Some(stock) = self.stock {
      check_stock(stock)?;
    }

    Ok(ProductChanges {
      name,
      price: self.price,
      image_url,
      description: self.description.map(optional_text),
      category: self.category,
      stock: self.stock,
    })
  }
}

/// Body of `PATCH /products/:id/stock`: `quantity` units leave stock
/// (negative restocks).
#[derive(Debug, Clone, Deserialize)]
pub struct StockAdjustment {
  pub quantity: i32,
}

fn required_text(value: Option<String>, message: &str) -> Result<String> {
  match value.as_deref().map(str::trim) {
    Some(v) if !v.is_empty() => Ok(v.to_string()),
    _ => Err(AppError::Validation(message.to_string())),
  }
}

fn optional_text(value: Option<String>) -> Option<String> {
  value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn check_price(price: Money) -> Result<()> {
  if price.is_negative() {
    return Err(AppError::Validation("Price cannot be negative".to_string()));
  }
  Ok(())
}

fn check_stock(stock: i32) -> Result<()> {
  if stock < 0 {
    return Err(AppError::Validation("Stock cannot be negative".to_string()));
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  fn headphones() -> NewProduct {
    NewProduct {
      name: Some("  Wireless Headphones ".to_string()),
      price: Some(Money::from_cents(29999)),
      image_url: Some("https://img.example/h.jpg".to_string()),
      description: Some("   ".to_string()),
      category: Some(Category::Electronics),
      stock: None,
    }
  }

  #[test]
  fn new_product_is_trimmed_and_defaults_stock() {
    let draft = headphones().validate().unwrap();
    assert_eq!(draft.name, "Wireless Headphones");
    assert_eq!(draft.description, None);
    assert_eq!(draft.stock, DEFAULT_STOCK);
  }

  #[test]
  fn new_product_rejects_missing_and_negative_fields() {
    let mut p = headphones();
    p.image_url = None;
    assert!(matches!(p.validate(), Err(AppError::Validation(m)) if m == "Product image is required"));

    let mut p = headphones();
    p.price = Some(Money::from_cents(-1));
    assert!(matches!(p.validate(), Err(AppError::Validation(m)) if m == "Price cannot be negative"));

    let mut p = headphones();
    p.stock = Some(-3);
    assert!(matches!(p.validate(), Err(AppError::Validation(m)) if m == "Stock cannot be negative"));
  }

  #[test]
  fn unknown_category_is_rejected_by_deserialisation() {
    let body = r#"{"name":"Yo-yo","price":3.5,"image_url":"x","category":"toys"}"#;
    assert!(serde_json::from_str::<NewProduct>(body).is_err());
    assert!("toys".parse::<Category>().is_err());
    assert_eq!("beauty".parse::<Category>().unwrap(), Category::Beauty);
  }

  #[test]
  fn patch_reruns_field_rules() {
    let blank_name = ProductPatch {
      name: Some(" ".to_string()),
      ..Default::default()
    };
    assert!(blank_name.validate().is_err());

    let clear_description = ProductPatch {
      description: Some(Some(String::new())),
      ..Default::default()
    };
    assert_eq!(clear_description.validate().unwrap().description, Some(None));
  }

  #[test]
  fn patch_distinguishes_null_from_absent_description() {
    let patch: ProductPatch = serde_json::from_str(r#"{"description": null}"#).unwrap();
    assert_eq!(patch.validate().unwrap().description, Some(None));

    let patch: ProductPatch = serde_json::from_str(r#"{"price": 12.5}"#).unwrap();
    assert_eq!(patch.validate().unwrap().description, None);

    let patch: ProductPatch = serde_json::from_str(r#"{"description": " Soft cotton "}"#).unwrap();
    assert_eq!(patch.validate().unwrap().description, Some(Some("Soft cotton".to_string())));
  }
}
