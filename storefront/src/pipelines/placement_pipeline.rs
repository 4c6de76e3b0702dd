// storefront/src/pipelines/placement_pipeline.rs

//! Order placement: validate, load, check, re-price, reserve, persist.
//!
//! Stock is taken with a conditional decrement per product before the order
//! is written. If anything fails after the first unit was taken, the
//! `reserve_stock` compensation puts every taken unit back.

use crate::errors::{AppError, Result as AppResult};
use crate::models::order::{check_line, normalize_customer_email, normalize_customer_name};
use crate::models::{NewOrder, Order, OrderItem, OrderStatus, PlaceOrderRequest};
use crate::pipelines::contexts::{PlaceOrderCtxData, Reservation};
use crate::state::AppState;
use futures_util::future::try_join_all;
use std::collections::HashMap;
use tracing::{error, info, instrument, warn};
use workflow::{ContextData, Pipeline, PipelineControl, PipelineResult, Registry};

pub const PLACEMENT_STEPS: [&str; 7] = [
  "validate_order_request",
  "load_catalog_products",
  "check_stock_availability",
  "price_line_items",
  "reserve_stock",
  "persist_order",
  "announce_order",
];

pub fn register_placement_pipeline(registry: &Registry<AppError>) {
  let mut p = Pipeline::<PlaceOrderCtxData, AppError>::new(&[
    ("validate_order_request", false, None),
    ("load_catalog_products", false, None),
    ("check_stock_availability", false, None),
    ("price_line_items", false, None),
    ("reserve_stock", false, None),
    ("persist_order", false, None),
    ("announce_order", true, None), // Optional
  ]);

  p.on_root("validate_order_request", |ctx_data: ContextData<PlaceOrderCtxData>| {
    Box::pin(async move {
      let (name, email) = {
        let guard = ctx_data.read();
        if guard.request.items.is_empty() {
          return Err(AppError::Validation("Order must contain at least one item".to_string()));
        }
        for item in &guard.request.items {
          check_line(item.quantity, item.price)?;
        }
        (
          normalize_customer_name(&guard.request.customer_name)?,
          normalize_customer_email(&guard.request.customer_email)?,
        )
      };
      let mut guard = ctx_data.write();
      guard.customer_name = name;
      guard.customer_email = email;
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  });

  p.on_root("load_catalog_products", |ctx_data: ContextData<PlaceOrderCtxData>| {
    Box::pin(async move {
      let (products, wanted) = {
        let guard = ctx_data.read();
        if let Some(item) = guard.request.items.iter().find(|item| item.product_uuid().is_none()) {
          warn!(product_id = %item.product_id, "Order references a malformed product id.");
          return Err(AppError::NotFound(format!("Product {} not found", item.claimed_name())));
        }
        (guard.app_state.products.clone(), guard.requested_quantities())
      };

      let found = try_join_all(wanted.iter().map(|(id, _)| products.find(*id))).await?;

      let mut catalog = HashMap::with_capacity(found.len());
      for ((id, _), product) in wanted.iter().zip(found) {
        match product {
          Some(product) => {
            catalog.insert(*id, product);
          }
          None => {
            let claimed = ctx_data.with(|data| {
              data
                .request
                .items
                .iter()
                .find(|item| item.product_uuid() == Some(*id))
                .map(|item| item.claimed_name().to_string())
                .unwrap_or_else(|| id.to_string())
            });
            warn!(product_id = %id, "Order references a missing product.");
            return Err(AppError::NotFound(format!("Product {} not found", claimed)));
          }
        }
      }
      ctx_data.write().catalog = catalog;
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  });

  // Advisory: every line is checked before any stock moves. reserve_stock
  // holds the authoritative guard.
  p.on_root("check_stock_availability", |ctx_data: ContextData<PlaceOrderCtxData>| {
    Box::pin(async move {
      let guard = ctx_data.read();
      for (id, quantity) in guard.requested_quantities() {
        let Some(product) = guard.catalog.get(&id) else {
          return Err(AppError::Internal(format!("Product {} was not loaded", id)));
        };
        if product.stock < quantity {
          return Err(AppError::InsufficientStock {
            product: product.name.clone(),
            available: product.stock,
          });
        }
      }
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  });

  p.on_root("price_line_items", |ctx_data: ContextData<PlaceOrderCtxData>| {
    Box::pin(async move {
      let (priced, total) = {
        let guard = ctx_data.read();
        let tolerance = guard.app_state.config.price_tolerance;
        let mut priced = Vec::with_capacity(guard.request.items.len());
        for item in &guard.request.items {
          let Some(product) = item.product_uuid().and_then(|id| guard.catalog.get(&id)) else {
            return Err(AppError::Internal(format!("Product {} was not loaded", item.product_id)));
          };
          if item.price.abs_diff(product.price) > tolerance {
            return Err(AppError::PriceMismatch {
              product: product.name.clone(),
              catalog: product.price,
              requested: item.price,
            });
          }
          priced.push(OrderItem {
            product_id: product.id,
            product_name: product.name.clone(),
            quantity: item.quantity,
            price: product.price,
          });
        }
        let total = priced.iter().map(OrderItem::subtotal).sum();
        (priced, total)
      };
      let mut guard = ctx_data.write();
      guard.priced_items = priced;
      guard.total_amount = total;
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  });

  p.on_root("reserve_stock", |ctx_data: ContextData<PlaceOrderCtxData>| {
    Box::pin(async move {
      let (products, wanted) = {
        let guard = ctx_data.read();
        (guard.app_state.products.clone(), guard.requested_quantities())
      };
      for (product_id, quantity) in wanted {
        products.decrement_if_sufficient(product_id, quantity).await?;
        ctx_data.write().reservations.push(Reservation { product_id, quantity });
      }
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  });

  p.compensate_root("reserve_stock", |ctx_data: ContextData<PlaceOrderCtxData>| {
    Box::pin(async move {
      let (products, reservations) = {
        let mut guard = ctx_data.write();
        (guard.app_state.products.clone(), std::mem::take(&mut guard.reservations))
      };
      for reservation in reservations.iter().rev() {
        match products.restock(reservation.product_id, reservation.quantity).await {
          Ok(product) => info!(
            product_id = %reservation.product_id,
            quantity = reservation.quantity,
            stock = product.stock,
            "Returned reserved stock."
          ),
          Err(e) => error!(
            product_id = %reservation.product_id,
            quantity = reservation.quantity,
            error = %e,
            "Failed to return reserved stock."
          ),
        }
      }
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  });

  p.on_root("persist_order", |ctx_data: ContextData<PlaceOrderCtxData>| {
    Box::pin(async move {
      let (orders, new_order) = {
        let guard = ctx_data.read();
        (
          guard.app_state.orders.clone(),
          NewOrder {
            items: guard.priced_items.clone(),
            total_amount: guard.total_amount,
            status: OrderStatus::Confirmed,
            customer_name: guard.customer_name.clone(),
            customer_email: guard.customer_email.clone(),
          },
        )
      };
      let order = orders.create(new_order).await?;
      ctx_data.write().order = Some(order);
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  });

  p.on_root("announce_order", |ctx_data: ContextData<PlaceOrderCtxData>| {
    Box::pin(async move {
      let guard = ctx_data.read();
      if let Some(order) = &guard.order {
        info!(
          order_id = %order.id,
          customer = %order.customer_name,
          email = %order.customer_email,
          items = order.items.len(),
          total = %order.total_amount,
          "New order received."
        );
      }
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  });

  registry.register_pipeline(p);
}

/// Runs the placement pipeline for `request` and returns the stored order.
#[instrument(name = "pipeline::place_order", skip_all, fields(items = request.items.len()))]
pub async fn place_order(app_state: &AppState, request: PlaceOrderRequest) -> AppResult<Order> {
  let ctx_data = ContextData::new(PlaceOrderCtxData::new(app_state.clone(), request));

  match app_state.workflows.run(ctx_data.clone()).await? {
    PipelineResult::Completed => {}
    PipelineResult::Stopped => {
      return Err(AppError::Internal("Order placement stopped before completion".to_string()));
    }
  }

  let order = ctx_data.read().order.clone();
  order.ok_or_else(|| AppError::Internal("Order placement finished without an order".to_string()))
}
