//! Order creation workflow.
//!
//! Confirms the customer and every requested product exist, checks stock,
//! prices lines from the catalog, persists the order and decrements stock.
//! The stores are injected as trait implementations from the `store` crate.

pub mod config;
pub mod error;
pub mod service;
pub mod telemetry;

pub use config::{LogFormat, OrderingConfig};
pub use error::CreateOrderError;
pub use service::{CreateOrder, CreateOrderService};
pub use telemetry::init_tracing;
