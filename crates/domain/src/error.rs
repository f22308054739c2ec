//! Order creation rejection taxonomy.

use common::{CustomerId, ProductId};
use thiserror::Error;

/// Reasons an order request is rejected before anything is persisted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderError {
    /// The customer id does not resolve.
    #[error("Invalid customer id: {customer_id}")]
    InvalidCustomer { customer_id: CustomerId },

    /// None of the requested product ids resolve.
    #[error("All products are invalid")]
    NoValidProducts,

    /// A requested product id does not resolve (first offender in request order).
    #[error("There is an invalid product in the list: {product_id}")]
    InvalidProductInList { product_id: ProductId },

    /// A resolved product has less stock than requested (first offender in catalog order).
    #[error(
        "There is a product without available quantity: {product_id} (requested {requested}, available {available})"
    )]
    InsufficientStock {
        product_id: ProductId,
        requested: u32,
        available: u32,
    },

    /// A requested line has a zero quantity.
    #[error("Invalid quantity for product {product_id}: must be greater than 0")]
    InvalidQuantity { product_id: ProductId },
}

impl OrderError {
    /// Stable label used for metrics and structured logs.
    pub fn reason(&self) -> &'static str {
        match self {
            OrderError::InvalidCustomer { .. } => "invalid_customer",
            OrderError::NoValidProducts => "no_valid_products",
            OrderError::InvalidProductInList { .. } => "invalid_product_in_list",
            OrderError::InsufficientStock { .. } => "insufficient_stock",
            OrderError::InvalidQuantity { .. } => "invalid_quantity",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_carry_offending_product_and_quantity() {
        let err = OrderError::InvalidProductInList {
            product_id: ProductId::new("SKU-404"),
        };
        assert_eq!(
            err.to_string(),
            "There is an invalid product in the list: SKU-404"
        );

        let err = OrderError::InsufficientStock {
            product_id: ProductId::new("SKU-001"),
            requested: 5,
            available: 3,
        };
        assert!(err.to_string().contains("available 3"));
        assert_eq!(err.reason(), "insufficient_stock");
    }
}
