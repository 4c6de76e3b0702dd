// storefront/src/config.rs

use crate::errors::{AppError, Result};
use crate::models::Money;
use dotenvy::dotenv;
use std::env;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
  Memory,
  Postgres,
}

impl FromStr for StoreBackend {
  type Err = AppError;

  fn from_str(s: &str) -> Result<Self> {
    match s.to_ascii_lowercase().as_str() {
      "memory" => Ok(StoreBackend::Memory),
      "postgres" => Ok(StoreBackend::Postgres),
      other => Err(AppError::Config(format!(
        "Invalid STORE_BACKEND '{}': expected memory or postgres",
        other
      ))),
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
  Pretty,
  Json,
}

impl FromStr for LogFormat {
  type Err = AppError;

  fn from_str(s: &str) -> Result<Self> {
    match s.to_ascii_lowercase().as_str() {
      "pretty" => Ok(LogFormat::Pretty),
      "json" => Ok(LogFormat::Json),
      other => Err(AppError::Config(format!(
        "Invalid LOG_FORMAT '{}': expected pretty or json",
        other
      ))),
    }
  }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
  pub server_host: String,
  pub server_port: u16,
  pub store_backend: StoreBackend,
  pub database_url: Option<String>,
  pub database_max_connections: u32,

  // Replace the catalog with the sample products on startup
  pub seed_db: bool,

  /// Largest accepted gap between a client's unit price and the catalog's.
  pub price_tolerance: Money,
  pub log_format: LogFormat,
}

impl Default for AppConfig {
  fn default() -> Self {
    Self {
      server_host: "127.0.0.1".to_string(),
      server_port: 8080,
      store_backend: StoreBackend::Memory,
      database_url: None,
      database_max_connections: 5,
      seed_db: false,
      price_tolerance: Money::ZERO,
      log_format: LogFormat::Pretty,
    }
  }
}

impl AppConfig {
  pub fn from_env() -> Result<Self> {
    dotenv().ok(); // Load .env file if present
    Self::from_lookup(|name| env::var(name).ok())
  }

  /// Builds the configuration from any variable source.
  pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
    let get_env = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
    let defaults = Self::default();

    let server_host = get_env("SERVER_HOST").unwrap_or(defaults.server_host);
    let server_port = parse_or(get_env("SERVER_PORT"), "SERVER_PORT", defaults.server_port)?;
    let database_url = get_env("DATABASE_URL");

    let store_backend = match get_env("STORE_BACKEND") {
      Some(raw) => raw.parse()?,
      None if database_url.is_some() => StoreBackend::Postgres,
      None => StoreBackend::Memory,
    };
    if store_backend == StoreBackend::Postgres && database_url.is_none() {
      return Err(AppError::Config(
        "Missing environment variable 'DATABASE_URL' required by the postgres backend".to_string(),
      ));
    }

    let database_max_connections = parse_or(
      get_env("DATABASE_MAX_CONNECTIONS"),
      "DATABASE_MAX_CONNECTIONS",
      defaults.database_max_connections,
    )?;
    if database_max_connections == 0 {
      return Err(AppError::Config("DATABASE_MAX_CONNECTIONS must be at least 1".to_string()));
    }

    let seed_db = parse_or(get_env("SEED_DB"), "SEED_DB", defaults.seed_db)?;

    let tolerance_cents: i64 = parse_or(get_env("PRICE_TOLERANCE_CENTS"), "PRICE_TOLERANCE_CENTS", 0)?;
    if tolerance_cents < 0 {
      return Err(AppError::Config("PRICE_TOLERANCE_CENTS cannot be negative".to_string()));
    }

    let log_format = match get_env("LOG_FORMAT") {
      Some(raw) => raw.parse()?,
      None => defaults.log_format,
    };

    Ok(Self {
      server_host,
      server_port,
      store_backend,
      database_url,
      database_max_connections,
      seed_db,
      price_tolerance: Money::from_cents(tolerance_cents),
      log_format,
    })
  }

  pub fn bind_address(&self) -> String {
    format!("{}:{}", self.server_host, self.server_port)
  }
}

fn parse_or<T>(raw: Option<String>, name: &str, default: T) -> Result<T>
where
  T: FromStr,
  T::Err: std::fmt::Display,
{
  match raw {
    None => Ok(default),
    Some(raw) => raw
      .parse::<T>()
      .map_err(|e| AppError::Config(format!("Invalid {} value '{}': {}", name, raw, e))),
  }
}
