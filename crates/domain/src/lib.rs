//! Domain layer for order creation.
//!
//! This crate holds the pure parts of the workflow:
//! - Customer, catalog product and order types
//! - The `OrderError` rejection taxonomy
//! - `ProductResolution`, which checks a request against the catalog and prices it

pub mod customer;
pub mod error;
pub mod order;
pub mod product;
pub mod resolution;
pub mod value_objects;

pub use common::{CustomerId, OrderId, ProductId};
pub use customer::Customer;
pub use error::OrderError;
pub use order::{NewOrder, Order};
pub use product::CatalogProduct;
pub use resolution::{
    ProductResolution, ensure_positive_quantities, requested_product_ids, stock_decrements,
};
pub use value_objects::{Money, OrderLine, RequestedLine, StockDecrement};
