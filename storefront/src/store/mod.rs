// storefront/src/store/mod.rs

//! Persistence seams for the catalog and the order book. Handlers and the
//! placement pipeline only see these traits; `memory` and `postgres` provide
//! the backends.

use async_trait::async_trait;
use uuid::Uuid;

use crate::errors::{AppError, Result};
use crate::models::{NewOrder, Order, OrderQuery, OrderStatus, Product, ProductChanges, ProductDraft, ProductQuery};

pub mod memory;
pub mod postgres;

pub use memory::{InMemoryOrderStore, InMemoryProductStore};
pub use postgres::{PgOrderStore, PgProductStore};

#[async_trait]
pub trait ProductStore: Send + Sync {
  async fn list(&self, query: &ProductQuery) -> Result<Vec<Product>>;

  async fn find(&self, id: Uuid) -> Result<Option<Product>>;

  async fn get(&self, id: Uuid) -> Result<Product> {
    self.find(id).await?.ok_or_else(product_not_found)
  }

  async fn create(&self, draft: ProductDraft) -> Result<Product>;

  /// Bulk load used by seeding.
  async fn insert_many(&self, drafts: Vec<ProductDraft>) -> Result<Vec<Product>>;

  async fn update(&self, id: Uuid, changes: ProductChanges) -> Result<Product>;

  async fn delete(&self, id: Uuid) -> Result<()>;

  /// Removes every product.
  async fn clear(&self) -> Result<u64>;

  /// Adds `delta` to the stock of `id` as one atomic conditional update.
  ///
  /// Fails with `InsufficientStock` and leaves stock unchanged when the result
  /// would be negative.
  async fn adjust_stock(&self, id: Uuid, delta: i32) -> Result<Product>;

  /// Takes `quantity` units only if that many are available.
  async fn decrement_if_sufficient(&self, id: Uuid, quantity: i32) -> Result<Product> {
    if quantity < 0 {
      return Err(AppError::Validation("Quantity must be at least 1".to_string()));
    }
    self.adjust_stock(id, -quantity).await
  }

  /// Returns `quantity` units to stock.
  async fn restock(&self, id: Uuid, quantity: i32) -> Result<Product> {
    if quantity < 0 {
      return Err(AppError::Validation("Restock quantity cannot be negative".to_string()));
    }
    self.adjust_stock(id, quantity).await
  }
}

#[async_trait]
pub trait OrderStore: Send + Sync {
  async fn list(&self, query: &OrderQuery) -> Result<Vec<Order>>;

  async fn find(&self, id: Uuid) -> Result<Option<Order>>;

  async fn get(&self, id: Uuid) -> Result<Order> {
    self.find(id).await?.ok_or_else(order_not_found)
  }

  /// Validates and writes a new order. Stock and totals are not checked here.
  async fn create(&self, new_order: NewOrder) -> Result<Order>;

  async fn update_status(&self, id: Uuid, status: OrderStatus) -> Result<Order>;

  /// Removes the order. Catalog stock is left as it is.
  async fn delete(&self, id: Uuid) -> Result<()>;
}

pub(crate) fn product_not_found() -> AppError {
  AppError::NotFound("Product not found".to_string())
}

pub(crate) fn order_not_found() -> AppError {
  AppError::NotFound("Order not found".to_string())
}

/// New stock of `product` after adding `delta`.
///
/// A result past `i32::MAX` is a validation error; a negative one is
/// `InsufficientStock` naming what is on hand.
pub(crate) fn apply_stock_delta(product: &Product, delta: i32) -> Result<i32> {
  let stock = product
    .stock
    .checked_add(delta)
    .ok_or_else(|| AppError::Validation("Stock is out of range".to_string()))?;
  if stock < 0 {
    return Err(AppError::InsufficientStock {
      product: product.name.clone(),
      available: product.stock,
    });
  }
  Ok(stock)
}
