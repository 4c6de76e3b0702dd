// storefront/src/web/handlers/order_handlers.rs

use actix_web::{web, HttpResponse};
use tracing::{info, instrument};

use crate::errors::AppError;
use crate::models::{OrderQuery, PlaceOrderRequest, StatusUpdate};
use crate::pipelines::place_order;
use crate::state::AppState;
use crate::store::order_not_found;
use crate::web::envelope::ApiResponse;
use crate::web::handlers::parse_id;

#[instrument(name = "handler::list_orders", skip(app_state))]
pub async fn list_orders_handler(
  app_state: web::Data<AppState>,
  query: web::Query<OrderQuery>,
) -> Result<HttpResponse, AppError> {
  let orders = app_state.orders.list(&query).await?;
  Ok(HttpResponse::Ok().json(ApiResponse::list(orders)))
}

#[instrument(name = "handler::get_order", skip(app_state, path), fields(order_id = %path.as_str()))]
pub async fn get_order_handler(
  app_state: web::Data<AppState>,
  path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
  let id = parse_id(&path, order_not_found)?;
  let order = app_state.orders.get(id).await?;
  Ok(HttpResponse::Ok().json(ApiResponse::data(order)))
}

/// Runs the placement pipeline.
#[instrument(name = "handler::place_order", skip_all)]
pub async fn place_order_handler(
  app_state: web::Data<AppState>,
  body: web::Json<PlaceOrderRequest>,
) -> Result<HttpResponse, AppError> {
  let order = place_order(&app_state, body.into_inner()).await?;
  info!(order_id = %order.id, total = %order.total_amount, "Order placed.");
  Ok(HttpResponse::Created().json(ApiResponse::with_message(order, "Order placed successfully")))
}

#[instrument(name = "handler::update_order_status", skip(app_state, path, body), fields(order_id = %path.as_str()))]
pub async fn update_order_status_handler(
  app_state: web::Data<AppState>,
  path: web::Path<String>,
  body: web::Json<StatusUpdate>,
) -> Result<HttpResponse, AppError> {
  let id = parse_id(&path, order_not_found)?;
  // Rejected before the store is touched
  let status = body.parse()?;
  let order = app_state.orders.update_status(id, status).await?;
  Ok(HttpResponse::Ok().json(ApiResponse::data(order)))
}

#[instrument(name = "handler::delete_order", skip(app_state, path), fields(order_id = %path.as_str()))]
pub async fn delete_order_handler(
  app_state: web::Data<AppState>,
  path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
  let id = parse_id(&path, order_not_found)?;
  app_state.orders.delete(id).await?;
  Ok(HttpResponse::Ok().json(ApiResponse::message("Order deleted successfully")))
}
