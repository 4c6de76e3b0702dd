// storefront/src/web/mod.rs

pub mod envelope;
pub mod handlers;
pub mod routes;

pub use envelope::ApiResponse;
pub use routes::configure_app_routes;
