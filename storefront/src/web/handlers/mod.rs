// storefront/src/web/handlers/mod.rs

pub mod cart_handlers;
pub mod order_handlers;
pub mod product_handlers;

use crate::errors::AppError;
use uuid::Uuid;

/// Path ids that are not UUIDs cannot name a stored record.
pub(crate) fn parse_id(raw: &str, not_found: fn() -> AppError) -> Result<Uuid, AppError> {
  Uuid::parse_str(raw).map_err(|_| not_found())
}
