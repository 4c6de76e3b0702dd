// storefront/src/store/memory.rs

//! Process-local stores behind a `parking_lot::RwLock`. Every mutation,
//! including the conditional stock update, happens under one write guard, so
//! the check and the write cannot interleave with another request.

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use std::collections::HashMap;
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::errors::Result;
use crate::models::query::SortField;
use crate::models::{NewOrder, Order, OrderQuery, OrderStatus, Product, ProductChanges, ProductDraft, ProductQuery};
use crate::store::{apply_stock_delta, order_not_found, product_not_found, OrderStore, ProductStore};

/// Rows keyed by id, each tagged with its insertion sequence. Equal sort keys
/// fall back to insertion order.
struct Table<T> {
  next_seq: u64,
  rows: HashMap<Uuid, (u64, T)>,
}

impl<T: Clone> Table<T> {
  fn new() -> Self {
    Self {
      next_seq: 0,
      rows: HashMap::new(),
    }
  }

  fn insert(&mut self, id: Uuid, row: T) {
    let seq = self.next_seq;
    self.next_seq += 1;
    self.rows.insert(id, (seq, row));
  }

  fn sorted<F>(&self, keep: impl Fn(&T) -> bool, sort: crate::models::Sort<F>) -> Vec<T>
  where
    F: SortField<Record = T>,
  {
    let mut rows: Vec<&(u64, T)> = self.rows.values().filter(|(_, row)| keep(row)).collect();
    rows.sort_by(|(seq_a, a), (seq_b, b)| {
      let ordering = sort.field.compare(a, b).then(seq_a.cmp(seq_b));
      match sort.direction {
        crate::models::SortDirection::Ascending => ordering,
        crate::models::SortDirection::Descending => ordering.reverse(),
      }
    });
    rows.into_iter().map(|(_, row)| row.clone()).collect()
  }
}

pub struct InMemoryProductStore {
  table: RwLock<Table<Product>>,
}

impl Default for InMemoryProductStore {
  fn default() -> Self {
    Self::new()
  }
}

impl InMemoryProductStore {
  pub fn new() -> Self {
    Self {
      table: RwLock::new(Table::new()),
    }
  }
}

#[async_trait]
impl ProductStore for InMemoryProductStore {
  #[instrument(name = "store::memory::list_products", skip(self))]
  async fn list(&self, query: &ProductQuery) -> Result<Vec<Product>> {
    Ok(self.table.read().sorted(|p| query.matches(p), query.sort()))
  }

  async fn find(&self, id: Uuid) -> Result<Option<Product>> {
    Ok(self.table.read().rows.get(&id).map(|(_, p)| p.clone()))
  }

  #[instrument(name = "store::memory::create_product", skip(self, draft), fields(name = %draft.name))]
  async fn create(&self, draft: ProductDraft) -> Result<Product> {
    let product = Product::from_draft(draft, Utc::now());
    self.table.write().insert(product.id, product.clone());
    debug!(product_id = %product.id, "Product created.");
    Ok(product)
  }

  async fn insert_many(&self, drafts: Vec<ProductDraft>) -> Result<Vec<Product>> {
    let now = Utc::now();
    let products: Vec<Product> = drafts.into_iter().map(|d| Product::from_draft(d, now)).collect();
    let mut table = self.table.write();
    for product in &products {
      table.insert(product.id, product.clone());
    }
    Ok(products)
  }

  #[instrument(name = "store::memory::update_product", skip(self, changes))]
  async fn update(&self, id: Uuid, changes: ProductChanges) -> Result<Product> {
    let mut table = self.table.write();
    let (_, product) = table.rows.get_mut(&id).ok_or_else(product_not_found)?;
    product.apply(changes, Utc::now());
    Ok(product.clone())
  }

  async fn delete(&self, id: Uuid) -> Result<()> {
    self
      .table
      .write()
      .rows
      .remove(&id)
      .map(|_| ())
      .ok_or_else(product_not_found)
  }

  async fn clear(&self) -> Result<u64> {
    let mut table = self.table.write();
    let removed = table.rows.len() as u64;
    table.rows.clear();
    Ok(removed)
  }

  #[instrument(name = "store::memory::adjust_stock", skip(self))]
  async fn adjust_stock(&self, id: Uuid, delta: i32) -> Result<Product> {
    let mut table = self.table.write();
    let (_, product) = table.rows.get_mut(&id).ok_or_else(product_not_found)?;
    let stock = apply_stock_delta(product, delta)?;
    product.stock = stock;
    product.updated_at = Utc::now();
    Ok(product.clone())
  }
}

pub struct InMemoryOrderStore {
  table: RwLock<Table<Order>>,
}

impl Default for InMemoryOrderStore {
  fn default() -> Self {
    Self::new()
  }
}

impl InMemoryOrderStore {
  pub fn new() -> Self {
    Self {
      table: RwLock::new(Table::new()),
    }
  }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
  #[instrument(name = "store::memory::list_orders", skip(self))]
  async fn list(&self, query: &OrderQuery) -> Result<Vec<Order>> {
    Ok(self.table.read().sorted(|o| query.matches(o), query.sort()))
  }

  async fn find(&self, id: Uuid) -> Result<Option<Order>> {
    Ok(self.table.read().rows.get(&id).map(|(_, o)| o.clone()))
  }

  #[instrument(name = "store::memory::create_order", skip_all)]
  async fn create(&self, new_order: NewOrder) -> Result<Order> {
    let order = Order::from_new(new_order.validate()?, Utc::now());
    self.table.write().insert(order.id, order.clone());
    debug!(order_id = %order.id, "Order created.");
    Ok(order)
  }

  #[instrument(name = "store::memory::update_order_status", skip(self))]
  async fn update_status(&self, id: Uuid, status: OrderStatus) -> Result<Order> {
    let mut table = self.table.write();
    let (_, order) = table.rows.get_mut(&id).ok_or_else(order_not_found)?;
    order.status = status;
    order.updated_at = Utc::now();
    Ok(order.clone())
  }

  async fn delete(&self, id: Uuid) -> Result<()> {
    self
      .table
      .write()
      .rows
      .remove(&id)
      .map(|_| ())
      .ok_or_else(order_not_found)
  }
}
