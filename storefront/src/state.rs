// storefront/src/state.rs

use crate::config::{AppConfig, StoreBackend};
use crate::errors::{AppError, Result};
use crate::pipelines;
use crate::store::{self, InMemoryOrderStore, InMemoryProductStore, OrderStore, PgOrderStore, PgProductStore, ProductStore};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use workflow::Registry;

#[derive(Clone)]
pub struct AppState {
  pub products: Arc<dyn ProductStore>,
  pub orders: Arc<dyn OrderStore>,
  pub workflows: Arc<Registry<AppError>>,
  pub config: Arc<AppConfig>, // Share loaded config
}

impl AppState {
  /// Wires the given stores and registers every pipeline.
  pub fn new(products: Arc<dyn ProductStore>, orders: Arc<dyn OrderStore>, config: AppConfig) -> Self {
    let workflows = Arc::new(Registry::<AppError>::new());
    pipelines::register_all_pipelines(&workflows);
    Self {
      products,
      orders,
      workflows,
      config: Arc::new(config),
    }
  }

  pub fn in_memory(config: AppConfig) -> Self {
    Self::new(
      Arc::new(InMemoryProductStore::new()),
      Arc::new(InMemoryOrderStore::new()),
      config,
    )
  }

  /// Builds the backend named by `config.store_backend`. For Postgres this
  /// connects the pool and applies migrations.
  pub async fn from_config(config: AppConfig) -> Result<Self> {
    match config.store_backend {
      StoreBackend::Memory => {
        tracing::info!("Using in-memory stores.");
        Ok(Self::in_memory(config))
      }
      StoreBackend::Postgres => {
        let url = config
          .database_url
          .clone()
          .ok_or_else(|| AppError::Config("DATABASE_URL is required for the postgres backend".to_string()))?;
        let pool = PgPoolOptions::new()
          .max_connections(config.database_max_connections)
          .connect(&url)
          .await
          .map_err(|e| {
            tracing::error!(error = %e, "Failed to connect to the database.");
            AppError::Sqlx(e)
          })?;
        tracing::info!("Successfully connected to the database.");
        store::postgres::run_migrations(&pool).await?;
        Ok(Self::new(
          Arc::new(PgProductStore::new(pool.clone())),
          Arc::new(PgOrderStore::new(pool)),
          config,
        ))
      }
    }
  }
}
