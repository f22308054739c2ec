//! Store interfaces consumed by the order creation workflow, with in-memory
//! and PostgreSQL implementations.

pub mod error;
pub mod memory;
pub mod postgres;
pub mod store;

pub use error::{Result, StoreError};
pub use memory::{InMemoryCustomerStore, InMemoryOrderStore, InMemoryProductCatalog};
pub use postgres::PostgresStore;
pub use store::{
    CustomerLookup, OrderStore, ProductCatalog, aggregate_demand, ensure_valid_price,
};
