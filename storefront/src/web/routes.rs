// storefront/src/web/routes.rs

use actix_web::error::QueryPayloadError;
use actix_web::{web, HttpResponse};

use crate::errors::AppError;
use crate::web::envelope::ApiResponse;
use crate::web::handlers::{cart_handlers, order_handlers, product_handlers};

async fn health_check_handler() -> HttpResponse {
  HttpResponse::Ok().json(ApiResponse::data(serde_json::json!({ "status": "ok" })))
}

async fn route_not_found_handler() -> HttpResponse {
  HttpResponse::NotFound().json(ApiResponse::<()>::failure("Route not found"))
}

/// Malformed bodies become the same 400 envelope as any other validation failure.
fn json_config() -> web::JsonConfig {
  web::JsonConfig::default().error_handler(|err, _req| AppError::Validation(err.to_string()).into())
}

fn query_config() -> web::QueryConfig {
  web::QueryConfig::default().error_handler(|err, _req| {
    let message = match &err {
      QueryPayloadError::Deserialize(inner) => inner.to_string(),
      other => other.to_string(),
    };
    AppError::Validation(message).into()
  })
}

// Called in `main.rs` and by the integration tests to mount every endpoint.
pub fn configure_app_routes(cfg: &mut web::ServiceConfig) {
  cfg.app_data(json_config()).app_data(query_config()).service(
    web::scope("/api")
      .route("/health", web::get().to(health_check_handler))
      .service(
        web::scope("/products")
          .service(
            web::resource("")
              .route(web::get().to(product_handlers::list_products_handler))
              .route(web::post().to(product_handlers::create_product_handler)),
          )
          .service(
            web::resource("/{product_id}")
              .route(web::get().to(product_handlers::get_product_handler))
              .route(web::put().to(product_handlers::update_product_handler))
              .route(web::delete().to(product_handlers::delete_product_handler)),
          )
          .service(
            web::resource("/{product_id}/stock").route(web::patch().to(product_handlers::adjust_stock_handler)),
          ),
      )
      .service(
        web::scope("/orders")
          .service(
            web::resource("")
              .route(web::get().to(order_handlers::list_orders_handler))
              .route(web::post().to(order_handlers::place_order_handler)),
          )
          .service(
            web::resource("/{order_id}")
              .route(web::get().to(order_handlers::get_order_handler))
              .route(web::delete().to(order_handlers::delete_order_handler)),
          )
          .service(
            web::resource("/{order_id}/status").route(web::patch().to(order_handlers::update_order_status_handler)),
          ),
      )
      .route("/cart/validate", web::post().to(cart_handlers::validate_cart_handler))
      .default_service(web::to(route_not_found_handler)),
  );
}
