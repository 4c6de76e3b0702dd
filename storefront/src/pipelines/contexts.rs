// storefront/src/pipelines/contexts.rs

//! Underlying data structs carried through pipelines.
//! Handlers receive these wrapped in `workflow::ContextData`.

use crate::models::{Money, Order, OrderItem, PlaceOrderRequest, Product};
use crate::state::AppState;
use std::collections::HashMap;
use uuid::Uuid;

/// A unit count taken from a product's stock by `reserve_stock`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reservation {
  pub product_id: Uuid,
  pub quantity: i32,
}

#[derive(Clone)]
pub struct PlaceOrderCtxData {
  pub app_state: AppState,
  pub request: PlaceOrderRequest,

  // Set by validate_order_request
  pub customer_name: String,
  pub customer_email: String,

  // Set by load_catalog_products
  pub catalog: HashMap<Uuid, Product>,

  // Set by price_line_items
  pub priced_items: Vec<OrderItem>,
  pub total_amount: Money,

  /// Applied stock decrements, in the order they were taken. Compensation
  /// returns exactly these.
  pub reservations: Vec<Reservation>,

  pub order: Option<Order>,
}

impl PlaceOrderCtxData {
  pub fn new(app_state: AppState, request: PlaceOrderRequest) -> Self {
    Self {
      app_state,
      request,
      customer_name: String::new(),
      customer_email: String::new(),
      catalog: HashMap::new(),
      priced_items: Vec::new(),
      total_amount: Money::ZERO,
      reservations: Vec::new(),
      order: None,
    }
  }

  /// Requested quantity per product, summed over duplicate lines, in first
  /// appearance order. Lines whose id is not a UUID are left out.
  pub fn requested_quantities(&self) -> Vec<(Uuid, i32)> {
    let mut totals: Vec<(Uuid, i32)> = Vec::new();
    for item in &self.request.items {
      let Some(product_id) = item.product_uuid() else {
        continue;
      };
      match totals.iter_mut().find(|(id, _)| *id == product_id) {
        Some((_, quantity)) => *quantity = quantity.saturating_add(item.quantity),
        None => totals.push((product_id, item.quantity)),
      }
    }
    totals
  }
}
