// tests/common/mod.rs
#![allow(dead_code)]

use actix_web::dev::ServiceResponse;
use actix_web::test;
use once_cell::sync::Lazy;
use serde_json::Value;
use storefront::config::AppConfig;
use storefront::models::{Category, Money, Product, ProductDraft};
use storefront::state::AppState;
use tracing::Level;

/// Builds the full route table over `$state`, the way `main` does.
macro_rules! init_app {
  ($state:expr) => {
    actix_web::test::init_service(
      actix_web::App::new()
        .app_data(actix_web::web::Data::new($state.clone()))
        .configure(storefront::web::configure_app_routes),
    )
    .await
  };
}

static TRACING: Lazy<()> = Lazy::new(|| {
  let filter = tracing_subscriber::EnvFilter::try_from_default_env()
    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(Level::WARN.to_string()));
  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_test_writer()
    .try_init()
    .ok();
});

pub fn setup_tracing() {
  Lazy::force(&TRACING);
}

pub fn memory_state() -> AppState {
  setup_tracing();
  AppState::in_memory(AppConfig::default())
}

pub fn draft(name: &str, cents: i64, category: Category, stock: i32) -> ProductDraft {
  ProductDraft {
    name: name.to_string(),
    price: Money::from_cents(cents),
    image_url: format!("https://images.example/{}.jpg", name.to_lowercase().replace(' ', "-")),
    description: Some(format!("{} for everyday use", name)),
    category,
    stock,
  }
}

pub async fn add_product(state: &AppState, name: &str, cents: i64, category: Category, stock: i32) -> Product {
  state
    .products
    .create(draft(name, cents, category, stock))
    .await
    .expect("test product should be created")
}

pub async fn stock_of(state: &AppState, product: &Product) -> i32 {
  state.products.get(product.id).await.expect("product should exist").stock
}

/// Status and parsed envelope of a response.
pub async fn envelope<B>(resp: ServiceResponse<B>) -> (u16, Value)
where
  B: actix_web::body::MessageBody,
{
  let status = resp.status().as_u16();
  let body: Value = test::read_body_json(resp).await;
  (status, body)
}
