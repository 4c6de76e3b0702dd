// storefront/src/store/postgres.rs

//! Postgres stores using runtime-checked `sqlx` queries.
//!
//! Stock changes are a single `UPDATE ... WHERE stock + $delta >= 0`, so two
//! requests racing for the last units cannot both succeed.

use async_trait::async_trait;
use sqlx::postgres::PgPool;
use sqlx::types::Json;
use sqlx::{Postgres, QueryBuilder};
use tracing::{error, info, instrument};
use uuid::Uuid;

use crate::errors::{AppError, Result};
use crate::models::query::SortField;
use crate::models::{NewOrder, Order, OrderQuery, OrderStatus, Product, ProductChanges, ProductDraft, ProductQuery};
use crate::store::{apply_stock_delta, order_not_found, product_not_found, OrderStore, ProductStore};

const PRODUCT_COLUMNS: &str = "id, name, price_cents, image_url, description, category, stock, created_at, updated_at";
const STOCK_UPDATE_ATTEMPTS: usize = 3;
const ORDER_COLUMNS: &str =
  "id, items, total_amount_cents, status, customer_name, customer_email, created_at, updated_at";

/// Applies the migrations under `storefront/migrations`.
pub async fn run_migrations(pool: &PgPool) -> Result<()> {
  sqlx::migrate!("./migrations").run(pool).await?;
  info!("Database migrations applied.");
  Ok(())
}

/// Escapes `%`, `_` and `\` so a search term matches literally under ILIKE.
fn like_pattern(term: &str) -> String {
  let mut escaped = String::with_capacity(term.len() + 2);
  escaped.push('%');
  for c in term.chars() {
    if matches!(c, '%' | '_' | '\\') {
      escaped.push('\\');
    }
    escaped.push(c);
  }
  escaped.push('%');
  escaped
}

fn push_order_by<F: SortField>(builder: &mut QueryBuilder<'_, Postgres>, sort: crate::models::Sort<F>) {
  // seq breaks ties in insertion order
  builder.push(format!(
    " ORDER BY {} {}, seq {}",
    sort.field.column(),
    sort.sql(),
    sort.sql()
  ));
}

#[derive(Clone)]
pub struct PgProductStore {
  pool: PgPool,
}

impl PgProductStore {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }

  async fn insert(&self, executor: impl sqlx::PgExecutor<'_>, draft: ProductDraft) -> Result<Product> {
    let product: Product = sqlx::query_as(&format!(
      "INSERT INTO products (id, name, price_cents, image_url, description, category, stock) \
       VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING {}",
      PRODUCT_COLUMNS
    ))
    .bind(Uuid::new_v4())
    .bind(draft.name)
    .bind(draft.price)
    .bind(draft.image_url)
    .bind(draft.description)
    .bind(draft.category)
    .bind(draft.stock)
    .fetch_one(executor)
    .await?;
    Ok(product)
  }
}

#[async_trait]
impl ProductStore for PgProductStore {
  #[instrument(name = "store::pg::list_products", skip(self))]
  async fn list(&self, query: &ProductQuery) -> Result<Vec<Product>> {
    let mut builder = QueryBuilder::<Postgres>::new(format!("SELECT {} FROM products WHERE TRUE", PRODUCT_COLUMNS));
    if let Some(category) = query.category.category() {
      builder.push(" AND category = ").push_bind(category);
    }
    if let Some(term) = query.search_term() {
      let pattern = like_pattern(term);
      builder
        .push(" AND (name ILIKE ")
        .push_bind(pattern.clone())
        .push(" OR description ILIKE ")
        .push_bind(pattern)
        .push(")");
    }
    push_order_by(&mut builder, query.sort());

    let products = builder.build_query_as::<Product>().fetch_all(&self.pool).await.map_err(|e| {
      error!("Failed to fetch products from database: {}", e);
      AppError::Sqlx(e)
    })?;
    Ok(products)
  }

  async fn find(&self, id: Uuid) -> Result<Option<Product>> {
    let product = sqlx::query_as(&format!("SELECT {} FROM products WHERE id = $1", PRODUCT_COLUMNS))
      .bind(id)
      .fetch_optional(&self.pool)
      .await?;
    Ok(product)
  }

  #[instrument(name = "store::pg::create_product", skip(self, draft), fields(name = %draft.name))]
  async fn create(&self, draft: ProductDraft) -> Result<Product> {
    self.insert(&self.pool, draft).await
  }

  #[instrument(name = "store::pg::insert_products", skip_all, fields(count = drafts.len()))]
  async fn insert_many(&self, drafts: Vec<ProductDraft>) -> Result<Vec<Product>> {
    let mut tx = self.pool.begin().await?;
    let mut products = Vec::with_capacity(drafts.len());
    for draft in drafts {
      products.push(self.insert(&mut *tx, draft).await?);
    }
    tx.commit().await?;
    Ok(products)
  }

  #[instrument(name = "store::pg::update_product", skip(self, changes))]
  async fn update(&self, id: Uuid, changes: ProductChanges) -> Result<Product> {
    let clears_or_sets_description = changes.description.is_some();
    let product: Option<Product> = sqlx::query_as(&format!(
      "UPDATE products SET \
         name = COALESCE($2, name), \
         price_cents = COALESCE($3, price_cents), \
         image_url = COALESCE($4, image_url), \
         description = CASE WHEN $5 THEN $6 ELSE description END, \
         category = COALESCE($7, category), \
         stock = COALESCE($8, stock), \
         updated_at = NOW() \
       WHERE id = $1 RETURNING {}",
      PRODUCT_COLUMNS
    ))
    .bind(id)
    .bind(changes.name)
    .bind(changes.price)
    .bind(changes.image_url)
    .bind(clears_or_sets_description)
    .bind(changes.description.flatten())
    .bind(changes.category)
    .bind(changes.stock)
    .fetch_optional(&self.pool)
    .await?;
    product.ok_or_else(product_not_found)
  }

  async fn delete(&self, id: Uuid) -> Result<()> {
    let result = sqlx::query("DELETE FROM products WHERE id = $1")
      .bind(id)
      .execute(&self.pool)
      .await?;
    if result.rows_affected() == 0 {
      return Err(product_not_found());
    }
    Ok(())
  }

  async fn clear(&self) -> Result<u64> {
    let result = sqlx::query("DELETE FROM products").execute(&self.pool).await?;
    Ok(result.rows_affected())
  }

  #[instrument(name = "store::pg::adjust_stock", skip(self))]
  async fn adjust_stock(&self, id: Uuid, delta: i32) -> Result<Product> {
    // The sum is taken in bigint so an overflowing restock fails the guard
    // instead of raising "integer out of range".
    for _ in 0..STOCK_UPDATE_ATTEMPTS {
      let updated: Option<Product> = sqlx::query_as(&format!(
        "UPDATE products SET stock = stock + $2, updated_at = NOW() \
         WHERE id = $1 AND stock::bigint + $2::bigint BETWEEN 0 AND {} RETURNING {}",
        i32::MAX,
        PRODUCT_COLUMNS
      ))
      .bind(id)
      .bind(delta)
      .fetch_optional(&self.pool)
      .await?;

      if let Some(product) = updated {
        return Ok(product);
      }
      // Nothing matched: the product is gone or the guard refused.
      let current = self.find(id).await?.ok_or_else(product_not_found)?;
      apply_stock_delta(&current, delta)?;
      // Stock moved between the update and the read; try again.
    }
    Err(AppError::Internal(format!("Stock of product {} kept changing during adjustment", id)))
  }
}

#[derive(Clone)]
pub struct PgOrderStore {
  pool: PgPool,
}

impl PgOrderStore {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }
}

#[async_trait]
impl OrderStore for PgOrderStore {
  #[instrument(name = "store::pg::list_orders", skip(self))]
  async fn list(&self, query: &OrderQuery) -> Result<Vec<Order>> {
    let mut builder = QueryBuilder::<Postgres>::new(format!("SELECT {} FROM orders WHERE TRUE", ORDER_COLUMNS));
    if let Some(status) = query.status {
      builder.push(" AND status = ").push_bind(status);
    }
    if let Some(email) = query.customer_email() {
      builder.push(" AND customer_email = ").push_bind(email);
    }
    push_order_by(&mut builder, query.sort());

    let orders = builder.build_query_as::<Order>().fetch_all(&self.pool).await?;
    Ok(orders)
  }

  async fn find(&self, id: Uuid) -> Result<Option<Order>> {
    let order = sqlx::query_as(&format!("SELECT {} FROM orders WHERE id = $1", ORDER_COLUMNS))
      .bind(id)
      .fetch_optional(&self.pool)
      .await?;
    Ok(order)
  }

  #[instrument(name = "store::pg::create_order", skip_all)]
  async fn create(&self, new_order: NewOrder) -> Result<Order> {
    let new_order = new_order.validate()?;
    let order: Order = sqlx::query_as(&format!(
      "INSERT INTO orders (id, items, total_amount_cents, status, customer_name, customer_email) \
       VALUES ($1, $2, $3, $4, $5, $6) RETURNING {}",
      ORDER_COLUMNS
    ))
    .bind(Uuid::new_v4())
    .bind(Json(&new_order.items))
    .bind(new_order.total_amount)
    .bind(new_order.status)
    .bind(&new_order.customer_name)
    .bind(&new_order.customer_email)
    .fetch_one(&self.pool)
    .await?;
    Ok(order)
  }

  #[instrument(name = "store::pg::update_order_status", skip(self))]
  async fn update_status(&self, id: Uuid, status: OrderStatus) -> Result<Order> {
    let order: Option<Order> = sqlx::query_as(&format!(
      "UPDATE orders SET status = $2, updated_at = NOW() WHERE id = $1 RETURNING {}",
      ORDER_COLUMNS
    ))
    .bind(id)
    .bind(status)
    .fetch_optional(&self.pool)
    .await?;
    order.ok_or_else(order_not_found)
  }

  async fn delete(&self, id: Uuid) -> Result<()> {
    let result = sqlx::query("DELETE FROM orders WHERE id = $1")
      .bind(id)
      .execute(&self.pool)
      .await?;
    if result.rows_affected() == 0 {
      return Err(order_not_found());
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::like_pattern;

  #[test]
  fn like_pattern_escapes_wildcards() {
    assert_eq!(like_pattern("chair"), "%chair%");
    assert_eq!(like_pattern("50%_off\\"), "%50\\%\\_off\\\\%");
  }
}
