// storefront/src/web/handlers/product_handlers.rs

use actix_web::{web, HttpResponse};
use tracing::{info, instrument};

use crate::errors::AppError;
use crate::models::{NewProduct, ProductPatch, ProductQuery, StockAdjustment};
use crate::state::AppState;
use crate::store::product_not_found;
use crate::web::envelope::ApiResponse;
use crate::web::handlers::parse_id;

#[instrument(name = "handler::list_products", skip(app_state))]
pub async fn list_products_handler(
  app_state: web::Data<AppState>,
  query: web::Query<ProductQuery>,
) -> Result<HttpResponse, AppError> {
  let products = app_state.products.list(&query).await?;
  info!("Fetched {} products.", products.len());
  Ok(HttpResponse::Ok().json(ApiResponse::list(products)))
}

#[instrument(name = "handler::get_product", skip(app_state, path), fields(product_id = %path.as_str()))]
pub async fn get_product_handler(
  app_state: web::Data<AppState>,
  path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
  let id = parse_id(&path, product_not_found)?;
  let product = app_state.products.get(id).await?;
  Ok(HttpResponse::Ok().json(ApiResponse::data(product)))
}

#[instrument(name = "handler::create_product", skip_all)]
pub async fn create_product_handler(
  app_state: web::Data<AppState>,
  body: web::Json<NewProduct>,
) -> Result<HttpResponse, AppError> {
  let draft = body.into_inner().validate()?;
  let product = app_state.products.create(draft).await?;
  info!(product_id = %product.id, "Product created.");
  Ok(HttpResponse::Created().json(ApiResponse::data(product)))
}

#[instrument(name = "handler::update_product", skip(app_state, path, body), fields(product_id = %path.as_str()))]
pub async fn update_product_handler(
  app_state: web::Data<AppState>,
  path: web::Path<String>,
  body: web::Json<ProductPatch>,
) -> Result<HttpResponse, AppError> {
  let id = parse_id(&path, product_not_found)?;
  let changes = body.into_inner().validate()?;
  let product = app_state.products.update(id, changes).await?;
  Ok(HttpResponse::Ok().json(ApiResponse::data(product)))
}

#[instrument(name = "handler::delete_product", skip(app_state, path), fields(product_id = %path.as_str()))]
pub async fn delete_product_handler(
  app_state: web::Data<AppState>,
  path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
  let id = parse_id(&path, product_not_found)?;
  app_state.products.delete(id).await?;
  Ok(HttpResponse::Ok().json(ApiResponse::message("Product deleted successfully")))
}

/// `quantity` units are removed from stock; a negative quantity adds them.
#[instrument(name = "handler::adjust_stock", skip(app_state, path, body), fields(product_id = %path.as_str(), quantity = body.quantity))]
pub async fn adjust_stock_handler(
  app_state: web::Data<AppState>,
  path: web::Path<String>,
  body: web::Json<StockAdjustment>,
) -> Result<HttpResponse, AppError> {
  let id = parse_id(&path, product_not_found)?;
  let delta = body
    .quantity
    .checked_neg()
    .ok_or_else(|| AppError::Validation("Quantity is out of range".to_string()))?;
  let product = app_state.products.adjust_stock(id, delta).await?;
  Ok(HttpResponse::Ok().json(ApiResponse::data(product)))
}
