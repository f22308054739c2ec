//! The order creation workflow.

use std::time::Instant;

use common::{CustomerId, OrderId};
use domain::{
    NewOrder, Order, OrderError, ProductResolution, RequestedLine, ensure_positive_quantities,
    requested_product_ids, stock_decrements,
};
use store::{CustomerLookup, OrderStore, ProductCatalog, StoreError};
use tracing::{debug, error, info, warn};

use crate::config::OrderingConfig;
use crate::error::{CreateOrderError, Result};

/// Command to create an order for a customer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateOrder {
    pub customer_id: CustomerId,
    pub lines: Vec<RequestedLine>,
}

impl CreateOrder {
    pub fn new(customer_id: CustomerId, lines: impl IntoIterator<Item = RequestedLine>) -> Self {
        Self {
            customer_id,
            lines: lines.into_iter().collect(),
        }
    }
}

/// Validates order requests and turns them into persisted orders.
///
/// Steps run strictly in sequence and the first failure stops the workflow:
/// 1. Resolve the customer
/// 2. Resolve all requested products in one catalog call
/// 3. Check every requested product exists
/// 4. Check stock for every resolved product
/// 5. Price the lines from the catalog
/// 6. Persist the order
/// 7. Decrement stock, discarding the order if that fails
pub struct CreateOrderService<C, P, O>
where
    C: CustomerLookup,
    P: ProductCatalog,
    O: OrderStore,
{
    customers: C,
    catalog: P,
    orders: O,
    config: OrderingConfig,
}

impl<C, P, O> CreateOrderService<C, P, O>
where
    C: CustomerLookup,
    P: ProductCatalog,
    O: OrderStore,
{
    /// Creates a service with the default configuration.
    pub fn new(customers: C, catalog: P, orders: O) -> Self {
        Self::with_config(customers, catalog, orders, OrderingConfig::default())
    }

    pub fn with_config(customers: C, catalog: P, orders: O, config: OrderingConfig) -> Self {
        Self {
            customers,
            catalog,
            orders,
            config,
        }
    }

    pub fn config(&self) -> &OrderingConfig {
        &self.config
    }

    /// Creates an order, or explains why it cannot be created.
    #[tracing::instrument(
        skip(self, cmd),
        fields(customer_id = %cmd.customer_id, lines = cmd.lines.len())
    )]
    pub async fn execute(&self, cmd: CreateOrder) -> Result<Order> {
        metrics::counter!("orders_create_total").increment(1);
        let started = Instant::now();

        let result = self.create(cmd).await;

        metrics::histogram!("order_create_duration_seconds")
            .record(started.elapsed().as_secs_f64());

        match &result {
            Ok(order) => {
                metrics::counter!("orders_created").increment(1);
                info!(order_id = %order.id, total = %order.total(), "order created");
            }
            Err(err) if err.is_rejection() => {
                let reason = rejection_reason(err);
                metrics::counter!("orders_rejected", "reason" => reason).increment(1);
                warn!(reason, error = %err, "order rejected");
            }
            Err(err) => {
                warn!(error = %err, "order creation failed");
            }
        }

        result
    }

    async fn create(&self, cmd: CreateOrder) -> Result<Order> {
        let CreateOrder { customer_id, lines } = cmd;

        let customer = self
            .customers
            .find_by_id(customer_id)
            .await?
            .ok_or(OrderError::InvalidCustomer { customer_id })?;
        debug!("customer resolved");

        if self.config.reject_zero_quantity {
            ensure_positive_quantities(&lines)?;
        }

        let ids = requested_product_ids(&lines);
        let resolution = ProductResolution::new(self.catalog.find_all_by_id(&ids).await?)?;
        debug!(
            requested = ids.len(),
            resolved = resolution.products().len(),
            "products resolved"
        );

        let priced = resolution.check_and_price(&lines)?;

        let order = self.orders.create(NewOrder::new(&customer, priced)).await?;
        debug!(order_id = %order.id, "order persisted");

        if let Err(err) = self.catalog.update_quantity(&stock_decrements(&lines)).await {
            return Err(self.compensate(order.id, err).await);
        }
        debug!(order_id = %order.id, "stock decremented");

        Ok(order)
    }

    /// Undoes the persisted order after a failed stock decrement.
    async fn compensate(&self, order_id: OrderId, err: StoreError) -> CreateOrderError {
        if !self.config.compensate_on_stock_failure {
            warn!(%order_id, error = %err, "stock decrement failed, order left in place");
            return CreateOrderError::Store(err);
        }

        match self.orders.discard(order_id).await {
            Ok(()) => {
                metrics::counter!("orders_compensated").increment(1);
                warn!(%order_id, error = %err, "stock decrement failed, order discarded");
                CreateOrderError::Store(err)
            }
            Err(compensation) => {
                metrics::counter!("orders_compensation_failed").increment(1);
                error!(
                    %order_id,
                    error = %err,
                    compensation_error = %compensation,
                    "stock decrement failed and order could not be discarded"
                );
                CreateOrderError::CompensationFailed {
                    order_id,
                    source: err,
                    compensation,
                }
            }
        }
    }
}

fn rejection_reason(err: &CreateOrderError) -> &'static str {
    match err {
        CreateOrderError::Rejected(err) => err.reason(),
        CreateOrderError::Store(StoreError::StockConflict { .. }) => "stock_conflict",
        _ => "other",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::{CatalogProduct, Customer, Money};
    use store::{InMemoryCustomerStore, InMemoryOrderStore, InMemoryProductCatalog};

    type TestService =
        CreateOrderService<InMemoryCustomerStore, InMemoryProductCatalog, InMemoryOrderStore>;

    fn service_with(customer: &Customer, products: Vec<CatalogProduct>) -> TestService {
        CreateOrderService::new(
            InMemoryCustomerStore::with_customers([customer.clone()]),
            InMemoryProductCatalog::with_products(products),
            InMemoryOrderStore::new(),
        )
    }

    #[tokio::test]
    async fn test_execute_creates_priced_order() {
        let customer = Customer::new("Alice", "alice@example.com");
        let service = service_with(
            &customer,
            vec![CatalogProduct::new("SKU-001", "Widget", Money::from_cents(1000), 5)],
        );

        let order = service
            .execute(CreateOrder::new(
                customer.id,
                [RequestedLine::new("SKU-001", 2)],
            ))
            .await
            .unwrap();

        assert_eq!(order.customer_id, customer.id);
        assert_eq!(order.total().cents(), 2000);
    }

    #[tokio::test]
    async fn test_unknown_customer_is_rejected() {
        let customer = Customer::new("Alice", "alice@example.com");
        let service = service_with(&customer, vec![]);
        let stranger = CustomerId::new();

        let err = service
            .execute(CreateOrder::new(stranger, []))
            .await
            .unwrap_err();

        assert_eq!(
            err.as_order_error(),
            Some(&OrderError::InvalidCustomer {
                customer_id: stranger
            })
        );
    }

    #[test]
    fn test_rejection_reason_labels() {
        assert_eq!(
            rejection_reason(&OrderError::NoValidProducts.into()),
            "no_valid_products"
        );
        assert_eq!(
            rejection_reason(
                &StoreError::StockConflict {
                    product_id: "A".into(),
                    requested: 2,
                    available: 1,
                }
                .into()
            ),
            "stock_conflict"
        );
    }
}
