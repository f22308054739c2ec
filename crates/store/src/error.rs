use common::{OrderId, ProductId};
use domain::Money;
use thiserror::Error;

/// Errors that can occur when interacting with a store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A stock decrement named a product the catalog does not hold.
    #[error("Product not found: {0}")]
    ProductNotFound(ProductId),

    /// The order does not exist.
    #[error("Order not found: {0}")]
    OrderNotFound(OrderId),

    /// A conditional stock decrement found less stock than demanded.
    /// Nothing was decremented.
    #[error(
        "Stock conflict for product {product_id}: requested {requested}, available {available}"
    )]
    StockConflict {
        product_id: ProductId,
        requested: u64,
        available: u64,
    },

    /// A product was offered to the catalog with a negative price.
    #[error("Invalid price for product {product_id}: {price}")]
    InvalidPrice { product_id: ProductId, price: Money },

    /// The backing store could not serve the request.
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// A stored value could not be mapped back into a domain type.
    #[error("Decode error: {0}")]
    Decode(String),

    /// A database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A database migration error occurred.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
