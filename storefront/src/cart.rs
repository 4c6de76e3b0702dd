// storefront/src/cart.rs

//! The shopping cart the browser keeps in local storage.
//!
//! The server never stores carts. It only re-checks one against the current
//! catalog on request (`POST /api/cart/validate`) so the client can fix stale
//! prices and quantities before it places the order.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::instrument;
use uuid::Uuid;

use crate::errors::Result;
use crate::models::{Money, PlaceOrderRequest, Product, RequestedLineItem};
use crate::store::ProductStore;

/// Local storage key the cart is saved under.
pub const CART_STORAGE_KEY: &str = "shopping_cart";

#[derive(Debug, Error)]
pub enum CartError {
  #[error("Cannot add more items than available in stock ({available} of {product})")]
  ExceedsStock { product: String, available: i32 },

  #[error("Quantity cannot be negative: {0}")]
  InvalidQuantity(i32),

  #[error("Product {0} is not in the cart")]
  NotInCart(Uuid),

  #[error("Stored cart is unreadable: {0}")]
  Storage(#[from] serde_json::Error),
}

/// One cart line: the product as it was when added, plus a quantity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
  #[serde(flatten)]
  pub product: Product,
  pub quantity: i32,
}

impl CartLine {
  pub fn subtotal(&self) -> Money {
    self.product.price.times(self.quantity)
  }
}

/// Serialises as a bare JSON array of lines.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
  lines: Vec<CartLine>,
}

impl Cart {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn from_lines(lines: Vec<CartLine>) -> Self {
    Self { lines }
  }

  pub fn lines(&self) -> &[CartLine] {
    &self.lines
  }

  pub fn is_empty(&self) -> bool {
    self.lines.is_empty()
  }

  /// Adds one unit of `product`, refusing to go beyond its stock.
  pub fn add(&mut self, product: &Product) -> std::result::Result<(), CartError> {
    match self.lines.iter_mut().find(|line| line.product.id == product.id) {
      Some(line) => {
        if line.quantity >= product.stock {
          return Err(CartError::ExceedsStock {
            product: product.name.clone(),
            available: product.stock,
          });
        }
        line.quantity += 1;
        line.product = product.clone();
      }
      None => {
        if product.stock < 1 {
          return Err(CartError::ExceedsStock {
            product: product.name.clone(),
            available: product.stock,
          });
        }
        self.lines.push(CartLine {
          product: product.clone(),
          quantity: 1,
        });
      }
    }
    Ok(())
  }

  /// Sets the quantity of a line. Zero removes it.
  pub fn update_quantity(&mut self, product_id: Uuid, quantity: i32) -> std::result::Result<(), CartError> {
    if quantity < 0 {
      return Err(CartError::InvalidQuantity(quantity));
    }
    if quantity == 0 {
      return self.remove(product_id);
    }
    let line = self
      .lines
      .iter_mut()
      .find(|line| line.product.id == product_id)
      .ok_or(CartError::NotInCart(product_id))?;
    if quantity > line.product.stock {
      return Err(CartError::ExceedsStock {
        product: line.product.name.clone(),
        available: line.product.stock,
      });
    }
    line.quantity = quantity;
    Ok(())
  }

  pub fn remove(&mut self, product_id: Uuid) -> std::result::Result<(), CartError> {
    let before = self.lines.len();
    self.lines.retain(|line| line.product.id != product_id);
    if self.lines.len() == before {
      return Err(CartError::NotInCart(product_id));
    }
    Ok(())
  }

  pub fn clear(&mut self) {
    self.lines.clear();
  }

  /// Units across all lines.
  pub fn item_count(&self) -> i32 {
    self.lines.iter().map(|line| line.quantity).sum()
  }

  pub fn total(&self) -> Money {
    self.lines.iter().map(CartLine::subtotal).sum()
  }

  /// The `POST /orders` body for this cart.
  pub fn to_order_request(&self, customer_name: &str, customer_email: &str) -> PlaceOrderRequest {
    PlaceOrderRequest {
      items: self
        .lines
        .iter()
        .map(|line| RequestedLineItem {
          product_id: line.product.id.to_string(),
          product_name: line.product.name.clone(),
          quantity: line.quantity,
          price: line.product.price,
        })
        .collect(),
      customer_name: customer_name.to_string(),
      customer_email: customer_email.to_string(),
      total_amount: Some(self.total()),
    }
  }

  /// Reads a cart saved under [`CART_STORAGE_KEY`]. A missing entry is an empty cart.
  pub fn from_storage(saved: Option<&str>) -> std::result::Result<Self, CartError> {
    match saved {
      None => Ok(Self::new()),
      Some(raw) => Ok(serde_json::from_str(raw)?),
    }
  }

  pub fn to_storage(&self) -> std::result::Result<String, CartError> {
    Ok(serde_json::to_string(self)?)
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemovalReason {
  NotFound,
  OutOfStock,
  InvalidQuantity,
}

/// A change made to a cart while re-validating it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CartAdjustment {
  Removed {
    product_id: Uuid,
    product_name: String,
    reason: RemovalReason,
  },
  QuantityReduced {
    product_id: Uuid,
    product_name: String,
    requested: i32,
    available: i32,
  },
  PriceChanged {
    product_id: Uuid,
    product_name: String,
    previous: Money,
    current: Money,
  },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartValidation {
  pub cart: Cart,
  pub adjustments: Vec<CartAdjustment>,
  pub total: Money,
  pub item_count: i32,
}

/// Re-checks every line against the catalog: lines take the current product
/// snapshot, quantities are capped at current stock, vanished or sold-out
/// products are dropped. Lines with a quantity below one are dropped too.
#[instrument(name = "cart::revalidate", skip_all, fields(lines = cart.lines.len()))]
pub async fn revalidate(products: &dyn ProductStore, cart: &Cart) -> Result<CartValidation> {
  let mut lines = Vec::with_capacity(cart.lines.len());
  let mut adjustments = Vec::new();

  for line in &cart.lines {
    if line.quantity < 1 {
      adjustments.push(CartAdjustment::Removed {
        product_id: line.product.id,
        product_name: line.product.name.clone(),
        reason: RemovalReason::InvalidQuantity,
      });
      continue;
    }
    let Some(current) = products.find(line.product.id).await? else {
      adjustments.push(CartAdjustment::Removed {
        product_id: line.product.id,
        product_name: line.product.name.clone(),
        reason: RemovalReason::NotFound,
      });
      continue;
    };

    if current.stock < 1 {
      adjustments.push(CartAdjustment::Removed {
        product_id: current.id,
        product_name: current.name.clone(),
        reason: RemovalReason::OutOfStock,
      });
      continue;
    }
    if current.price != line.product.price {
      adjustments.push(CartAdjustment::PriceChanged {
        product_id: current.id,
        product_name: current.name.clone(),
        previous: line.product.price,
        current: current.price,
      });
    }
    let quantity = line.quantity.min(current.stock);
    if quantity < line.quantity {
      adjustments.push(CartAdjustment::QuantityReduced {
        product_id: current.id,
        product_name: current.name.clone(),
        requested: line.quantity,
        available: current.stock,
      });
    }
    lines.push(CartLine {
      product: current,
      quantity,
    });
  }

  let cart = Cart::from_lines(lines);
  Ok(CartValidation {
    total: cart.total(),
    item_count: cart.item_count(),
    cart,
    adjustments,
  })
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::models::Category;
  use chrono::Utc;

  fn product(name: &str, cents: i64, stock: i32) -> Product {
    let now = Utc::now();
    Product {
      id: Uuid::new_v4(),
      name: name.to_string(),
      price: Money::from_cents(cents),
      image_url: "https://img.example/p.jpg".to_string(),
      description: None,
      category: Category::Sports,
      stock,
      created_at: now,
      updated_at: now,
    }
  }

  #[test]
  fn add_increments_until_stock_runs_out() {
    let ball = product("Ball", 1500, 2);
    let mut cart = Cart::new();
    cart.add(&ball).unwrap();
    cart.add(&ball).unwrap();
    assert!(matches!(cart.add(&ball), Err(CartError::ExceedsStock { available: 2, .. })));
    assert_eq!(cart.item_count(), 2);
    assert_eq!(cart.total(), Money::from_cents(3000));
  }

  #[test]
  fn zero_quantity_removes_the_line() {
    let ball = product("Ball", 1500, 5);
    let mut cart = Cart::new();
    cart.add(&ball).unwrap();
    cart.update_quantity(ball.id, 4).unwrap();
    assert_eq!(cart.item_count(), 4);
    assert!(cart.update_quantity(ball.id, 6).is_err());
    cart.update_quantity(ball.id, 0).unwrap();
    assert!(cart.is_empty());
    assert!(matches!(cart.remove(ball.id), Err(CartError::NotInCart(_))));
  }

  #[test]
  fn storage_is_a_list_of_product_fields_with_quantity() {
    let ball = product("Ball", 1500, 5);
    let mut cart = Cart::new();
    cart.add(&ball).unwrap();

    let saved = cart.to_storage().unwrap();
    let value: serde_json::Value = serde_json::from_str(&saved).unwrap();
    assert_eq!(value[0]["name"], "Ball");
    assert_eq!(value[0]["quantity"], 1);
    assert_eq!(value[0]["price"], 15.0);

    assert_eq!(Cart::from_storage(Some(&saved)).unwrap(), cart);
    assert!(Cart::from_storage(None).unwrap().is_empty());
    assert!(Cart::from_storage(Some("{not json")).is_err());
  }

  #[test]
  fn order_request_carries_every_line() {
    let ball = product("Ball", 1500, 5);
    let bat = product("Bat", 4000, 5);
    let mut cart = Cart::new();
    cart.add(&ball).unwrap();
    cart.add(&ball).unwrap();
    cart.add(&bat).unwrap();

    let request = cart.to_order_request("Ada", "ada@example.com");
    assert_eq!(request.items.len(), 2);
    assert_eq!(request.items[0].quantity, 2);
    assert_eq!(request.total_amount, Some(Money::from_cents(7000)));
  }
}
