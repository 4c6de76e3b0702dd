// storefront/src/main.rs

use actix_web::{web as actix_data, App, HttpServer};
use anyhow::Context;
use storefront::config::AppConfig;
use storefront::state::AppState;
use storefront::{seed, telemetry, web};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
  let app_config = AppConfig::from_env().context("Failed to load application configuration")?;
  telemetry::init_tracing(app_config.log_format);

  tracing::info!(backend = ?app_config.store_backend, "Starting storefront server...");

  let app_state = AppState::from_config(app_config)
    .await
    .context("Failed to initialise stores")?;

  if app_state.config.seed_db {
    seed::seed_catalog(app_state.products.as_ref())
      .await
      .context("Failed to seed the catalog")?;
  }

  let server_address = app_state.config.bind_address();
  tracing::info!("Attempting to bind server to {}...", server_address);

  HttpServer::new(move || {
    App::new()
      .app_data(actix_data::Data::new(app_state.clone())) // Share AppState with handlers
      .wrap(tracing_actix_web::TracingLogger::default()) // Actix middleware for tracing requests
      .configure(web::configure_app_routes)
  })
  .bind(&server_address)
  .with_context(|| format!("Failed to bind {}", server_address))?
  .run()
  .await?;

  Ok(())
}
