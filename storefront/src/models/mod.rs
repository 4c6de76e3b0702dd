// storefront/src/models/mod.rs

//! Catalog and order records, their request bodies and list queries.

pub mod money;
pub mod order;
pub mod product;
pub mod query;

pub use money::Money;
pub use order::{NewOrder, Order, OrderItem, OrderStatus, PlaceOrderRequest, RequestedLineItem, StatusUpdate};
pub use product::{Category, NewProduct, Product, ProductChanges, ProductDraft, ProductPatch, StockAdjustment};
pub use query::{CategoryFilter, OrderQuery, OrderSortField, ProductQuery, ProductSortField, Sort, SortDirection};
