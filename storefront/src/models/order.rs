// storefront/src/models/order.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type as SqlxType};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::errors::{AppError, Result};
use crate::models::Money;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, SqlxType)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "order_status", rename_all = "lowercase")]
pub enum OrderStatus {
  Pending,
  #[default]
  Confirmed,
  Shipped,
  Delivered,
  Cancelled,
}

impl OrderStatus {
  pub const ALL: [OrderStatus; 5] = [
    OrderStatus::Pending,
    OrderStatus::Confirmed,
    OrderStatus::Shipped,
    OrderStatus::Delivered,
    OrderStatus::Cancelled,
  ];

  pub fn as_str(self) -> &'static str {
    match self {
      OrderStatus::Pending => "pending",
      OrderStatus::Confirmed => "confirmed",
      OrderStatus::Shipped => "shipped",
      OrderStatus::Delivered => "delivered",
      OrderStatus::Cancelled => "cancelled",
    }
  }
}

impl fmt::Display for OrderStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for OrderStatus {
  type Err = AppError;

  fn from_str(s: &str) -> Result<Self> {
    OrderStatus::ALL
      .into_iter()
      .find(|status| status.as_str() == s)
      .ok_or_else(|| {
        AppError::Validation(format!(
          "Invalid status '{}'. Expected one of: pending, confirmed, shipped, delivered, cancelled",
          s
        ))
      })
  }
}

/// A line of a stored order. Name and price are copied at order time and never
/// re-derived from the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
  pub product_id: Uuid,
  pub product_name: String,
  pub quantity: i32,
  pub price: Money,
}

impl OrderItem {
  pub fn subtotal(&self) -> Money {
    self.price.times(self.quantity)
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Order {
  pub id: Uuid,
  #[sqlx(json)]
  pub items: Vec<OrderItem>,
  #[sqlx(rename = "total_amount_cents")]
  pub total_amount: Money,
  pub status: OrderStatus,
  pub customer_name: String,
  pub customer_email: String,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl Order {
  pub fn from_new(new_order: NewOrder, now: DateTime<Utc>) -> Self {
    Self {
      id: Uuid::new_v4(),
      items: new_order.items,
      total_amount: new_order.total_amount,
      status: new_order.status,
      customer_name: new_order.customer_name,
      customer_email: new_order.customer_email,
      created_at: now,
      updated_at: now,
    }
  }
}

/// Order data handed to `OrderStore::create`. Only the placement pipeline
/// builds these; `validate` is re-run by every store before writing.
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrder {
  pub items: Vec<OrderItem>,
  pub total_amount: Money,
  pub status: OrderStatus,
  pub customer_name: String,
  pub customer_email: String,
}

impl NewOrder {
  pub fn validate(mut self) -> Result<Self> {
    if self.items.is_empty() {
      return Err(AppError::Validation("Order must contain at least one item".to_string()));
    }
    for item in &self.items {
      check_line(item.quantity, item.price)?;
    }
    if self.total_amount.is_negative() {
      return Err(AppError::Validation("Total amount cannot be negative".to_string()));
    }
    self.customer_name = normalize_customer_name(&self.customer_name)?;
    self.customer_email = normalize_customer_email(&self.customer_email)?;
    Ok(self)
  }
}

/// A line as the client sends it in `POST /orders`. The id is kept as sent;
/// one that is not a UUID names no product and is reported as not found.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestedLineItem {
  pub product_id: String,
  #[serde(default)]
  pub product_name: String,
  pub quantity: i32,
  pub price: Money,
}

impl RequestedLineItem {
  pub fn product_uuid(&self) -> Option<Uuid> {
    Uuid::parse_str(self.product_id.trim()).ok()
  }

  /// Name used in error messages: the client's product name, else its id.
  pub fn claimed_name(&self) -> &str {
    match self.product_name.trim() {
      "" => self.product_id.trim(),
      name => name,
    }
  }
}

/// Body of `POST /orders`. `total_amount` is accepted for compatibility with
/// the browser client and ignored; the server computes the total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceOrderRequest {
  #[serde(default)]
  pub items: Vec<RequestedLineItem>,
  #[serde(default)]
  pub customer_name: String,
  #[serde(default)]
  pub customer_email: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub total_amount: Option<Money>,
}

/// Body of `PATCH /orders/:id/status`. The status stays a string so an
/// unknown value is reported as a validation failure rather than a parse error.
#[derive(Debug, Clone, Deserialize)]
pub struct StatusUpdate {
  pub status: String,
}

impl StatusUpdate {
  pub fn parse(&self) -> Result<OrderStatus> {
    self.status.parse()
  }
}

pub(crate) fn check_line(quantity: i32, price: Money) -> Result<()> {
  if quantity < 1 {
    return Err(AppError::Validation("Quantity must be at least 1".to_string()));
  }
  if price.is_negative() {
    return Err(AppError::Validation("Price cannot be negative".to_string()));
  }
  Ok(())
}

pub fn normalize_customer_name(name: &str) -> Result<String> {
  let name = name.trim();
  if name.is_empty() {
    return Err(AppError::Validation("Customer name is required".to_string()));
  }
  Ok(name.to_string())
}

pub fn normalize_customer_email(email: &str) -> Result<String> {
  let email = email.trim().to_lowercase();
  if email.is_empty() {
    return Err(AppError::Validation("Customer email is required".to_string()));
  }
  Ok(email)
}

#[cfg(test)]
mod tests {
  use super::*;

  fn line(quantity: i32, cents: i64) -> OrderItem {
    OrderItem {
      product_id: Uuid::new_v4(),
      product_name: "Smart Fitness Watch".to_string(),
      quantity,
      price: Money::from_cents(cents),
    }
  }

  fn new_order(items: Vec<OrderItem>) -> NewOrder {
    NewOrder {
      total_amount: items.iter().map(OrderItem::subtotal).sum(),
      items,
      status: OrderStatus::default(),
      customer_name: "  Ada Lovelace ".to_string(),
      customer_email: " Ada@Example.COM ".to_string(),
    }
  }

  #[test]
  fn customer_fields_are_normalised() {
    let order = new_order(vec![line(1, 24999)]).validate().unwrap();
    assert_eq!(order.customer_name, "Ada Lovelace");
    assert_eq!(order.customer_email, "ada@example.com");
    assert_eq!(order.status, OrderStatus::Confirmed);
  }

  #[test]
  fn empty_or_invalid_lines_are_rejected() {
    let err = new_order(vec![]).validate().unwrap_err();
    assert!(matches!(err, AppError::Validation(m) if m == "Order must contain at least one item"));

    let err = new_order(vec![line(0, 100)]).validate().unwrap_err();
    assert!(matches!(err, AppError::Validation(m) if m == "Quantity must be at least 1"));

    let err = new_order(vec![line(1, -100)]).validate().unwrap_err();
    assert!(matches!(err, AppError::Validation(m) if m == "Price cannot be negative"));
  }

  #[test]
  fn missing_customer_fields_are_rejected() {
    let mut order = new_order(vec![line(1, 100)]);
    order.customer_email = "   ".to_string();
    let err = order.validate().unwrap_err();
    assert!(matches!(err, AppError::Validation(m) if m == "Customer email is required"));
  }

  #[test]
  fn status_parsing_is_strict() {
    let update = StatusUpdate {
      status: "shipped".to_string(),
    };
    assert_eq!(update.parse().unwrap(), OrderStatus::Shipped);

    let update = StatusUpdate {
      status: "lost".to_string(),
    };
    assert!(matches!(update.parse(), Err(AppError::Validation(_))));
  }

  #[test]
  fn place_order_request_accepts_client_total() {
    let body = format!(
      r#"{{"items":[{{"product_id":"{}","product_name":"Chair","quantity":2,"price":10.0}}],
          "customer_name":"Ada","customer_email":"ada@example.com","total_amount":1.0}}"#,
      Uuid::new_v4()
    );
    let request: PlaceOrderRequest = serde_json::from_str(&body).unwrap();
    assert_eq!(request.items[0].price, Money::from_cents(1000));
    assert_eq!(request.total_amount, Some(Money::from_cents(100)));
  }
}
