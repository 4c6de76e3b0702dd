// storefront/src/web/handlers/cart_handlers.rs

use actix_web::{web, HttpResponse};
use tracing::{info, instrument};

use crate::cart::{revalidate, Cart};
use crate::errors::AppError;
use crate::state::AppState;
use crate::web::envelope::ApiResponse;

/// Re-checks a client cart against the catalog. Nothing is stored.
#[instrument(name = "handler::validate_cart", skip_all)]
pub async fn validate_cart_handler(
  app_state: web::Data<AppState>,
  body: web::Json<Cart>,
) -> Result<HttpResponse, AppError> {
  let validation = revalidate(app_state.products.as_ref(), &body).await?;
  if !validation.adjustments.is_empty() {
    info!(adjustments = validation.adjustments.len(), "Cart changed during validation.");
  }
  Ok(HttpResponse::Ok().json(ApiResponse::data(validation)))
}
