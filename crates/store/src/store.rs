use async_trait::async_trait;
use common::{CustomerId, OrderId, ProductId};
use domain::{CatalogProduct, Customer, Money, NewOrder, Order, StockDecrement};

use crate::{Result, StoreError};

/// Read access to registered customers.
#[async_trait]
pub trait CustomerLookup: Send + Sync {
    /// Returns the customer, or None if the id does not resolve.
    async fn find_by_id(&self, id: CustomerId) -> Result<Option<Customer>>;
}

/// Read and stock-update access to the product catalog.
#[async_trait]
pub trait ProductCatalog: Send + Sync {
    /// Returns the subset of `ids` that exist. Unknown ids are simply absent.
    async fn find_all_by_id(&self, ids: &[ProductId]) -> Result<Vec<CatalogProduct>>;

    /// Reduces available quantity for every decrement.
    ///
    /// Implementations apply all decrements or none. Decrements naming the same
    /// product are summed, and the update fails with `StockConflict` if the sum
    /// exceeds the quantity available at the time of the update.
    async fn update_quantity(&self, decrements: &[StockDecrement]) -> Result<()>;
}

/// Persistence for created orders.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Persists the order, assigning its id and creation timestamp.
    async fn create(&self, order: NewOrder) -> Result<Order>;

    /// Loads a persisted order.
    async fn find_by_id(&self, id: OrderId) -> Result<Option<Order>>;

    /// Removes a persisted order and its lines.
    ///
    /// Used as the compensating action when stock cannot be decremented.
    async fn discard(&self, id: OrderId) -> Result<()>;
}

/// Rejects catalog products whose price is below zero.
pub fn ensure_valid_price(product: &CatalogProduct) -> Result<()> {
    if product.price < Money::zero() {
        return Err(StoreError::InvalidPrice {
            product_id: product.id.clone(),
            price: product.price,
        });
    }
    Ok(())
}

/// Sums decrements per product, keeping first-occurrence order.
pub fn aggregate_demand(decrements: &[StockDecrement]) -> Vec<(ProductId, u64)> {
    let mut demand: Vec<(ProductId, u64)> = Vec::new();
    for decrement in decrements {
        let quantity = u64::from(decrement.quantity);
        match demand.iter_mut().find(|(id, _)| id == &decrement.product_id) {
            Some((_, total)) => *total += quantity,
            None => demand.push((decrement.product_id.clone(), quantity)),
        }
    }
    demand
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_valid_price() {
        let free = CatalogProduct::new("A", "Sample", Money::zero(), 1);
        assert!(ensure_valid_price(&free).is_ok());

        let negative = CatalogProduct::new("B", "Refund", Money::from_cents(-1), 1);
        let err = ensure_valid_price(&negative).unwrap_err();
        assert!(matches!(err, StoreError::InvalidPrice { .. }));
        assert_eq!(err.to_string(), "Invalid price for product B: -$0.01");
    }

    #[test]
    fn test_aggregate_demand_sums_duplicates_in_first_occurrence_order() {
        let decrements = vec![
            StockDecrement::new("B", 1),
            StockDecrement::new("A", 2),
            StockDecrement::new("B", 3),
        ];

        assert_eq!(
            aggregate_demand(&decrements),
            vec![(ProductId::new("B"), 4), (ProductId::new("A"), 2)]
        );
    }

    #[test]
    fn test_aggregate_demand_does_not_overflow_u32() {
        let decrements = vec![
            StockDecrement::new("A", u32::MAX),
            StockDecrement::new("A", u32::MAX),
        ];
        assert_eq!(
            aggregate_demand(&decrements)[0].1,
            2 * u64::from(u32::MAX)
        );
    }
}
