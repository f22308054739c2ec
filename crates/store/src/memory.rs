//! In-memory store implementations.
//!
//! They honour the same contracts as the PostgreSQL store, including the
//! all-or-nothing conditional stock decrement, and add failure injection and
//! call recording for tests.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use common::{CustomerId, OrderId, ProductId};
use domain::{CatalogProduct, Customer, NewOrder, Order, StockDecrement};
use tokio::sync::RwLock;
use tracing::debug;

use crate::store::{
    CustomerLookup, OrderStore, ProductCatalog, aggregate_demand, ensure_valid_price,
};
use crate::{Result, StoreError};

#[derive(Debug, Default)]
struct CustomerState {
    customers: HashMap<CustomerId, Customer>,
    fail_on_lookup: bool,
}

/// In-memory customer store.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCustomerStore {
    state: Arc<RwLock<CustomerState>>,
}

impl InMemoryCustomerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with the given customers.
    pub fn with_customers(customers: impl IntoIterator<Item = Customer>) -> Self {
        let customers = customers.into_iter().map(|c| (c.id, c)).collect();
        Self {
            state: Arc::new(RwLock::new(CustomerState {
                customers,
                fail_on_lookup: false,
            })),
        }
    }

    pub async fn insert(&self, customer: Customer) {
        self.state
            .write()
            .await
            .customers
            .insert(customer.id, customer);
    }

    /// Configures lookups to fail as if the store were unreachable.
    pub async fn set_fail_on_lookup(&self, fail: bool) {
        self.state.write().await.fail_on_lookup = fail;
    }
}

#[async_trait]
impl CustomerLookup for InMemoryCustomerStore {
    async fn find_by_id(&self, id: CustomerId) -> Result<Option<Customer>> {
        let state = self.state.read().await;

        if state.fail_on_lookup {
            return Err(StoreError::Unavailable("customer lookup failed".to_string()));
        }

        Ok(state.customers.get(&id).cloned())
    }
}

#[derive(Debug, Default)]
struct CatalogState {
    /// Products in insertion order, which is the order lookups return them in.
    products: Vec<CatalogProduct>,
    update_calls: Vec<Vec<StockDecrement>>,
    fail_on_find: bool,
    fail_on_update: bool,
}

/// In-memory product catalog.
#[derive(Debug, Clone, Default)]
pub struct InMemoryProductCatalog {
    state: Arc<RwLock<CatalogState>>,
}

impl InMemoryProductCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a catalog pre-populated with the given products, in order.
    ///
    /// Seeds are taken as-is; use [`insert`](Self::insert) to have prices checked.
    pub fn with_products(products: impl IntoIterator<Item = CatalogProduct>) -> Self {
        Self {
            state: Arc::new(RwLock::new(CatalogState {
                products: products.into_iter().collect(),
                ..CatalogState::default()
            })),
        }
    }

    /// Adds a product, replacing any existing product with the same id in place.
    ///
    /// Fails with `InvalidPrice` if the price is negative.
    pub async fn insert(&self, product: CatalogProduct) -> Result<()> {
        ensure_valid_price(&product)?;

        let mut state = self.state.write().await;
        match state.products.iter_mut().find(|p| p.id == product.id) {
            Some(existing) => *existing = product,
            None => state.products.push(product),
        }
        Ok(())
    }

    /// Returns the current state of a product.
    pub async fn get(&self, product_id: &ProductId) -> Option<CatalogProduct> {
        self.state
            .read()
            .await
            .products
            .iter()
            .find(|p| &p.id == product_id)
            .cloned()
    }

    /// Returns every `update_quantity` call received, including failed ones.
    pub async fn update_calls(&self) -> Vec<Vec<StockDecrement>> {
        self.state.read().await.update_calls.clone()
    }

    pub async fn set_fail_on_find(&self, fail: bool) {
        self.state.write().await.fail_on_find = fail;
    }

    /// Configures `update_quantity` to fail before touching any stock.
    pub async fn set_fail_on_update(&self, fail: bool) {
        self.state.write().await.fail_on_update = fail;
    }
}

#[async_trait]
impl ProductCatalog for InMemoryProductCatalog {
    async fn find_all_by_id(&self, ids: &[ProductId]) -> Result<Vec<CatalogProduct>> {
        let state = self.state.read().await;

        if state.fail_on_find {
            return Err(StoreError::Unavailable("catalog lookup failed".to_string()));
        }

        Ok(state
            .products
            .iter()
            .filter(|p| ids.contains(&p.id))
            .cloned()
            .collect())
    }

    async fn update_quantity(&self, decrements: &[StockDecrement]) -> Result<()> {
        let mut state = self.state.write().await;
        state.update_calls.push(decrements.to_vec());

        if state.fail_on_update {
            return Err(StoreError::Unavailable("catalog update failed".to_string()));
        }

        // Validate everything before mutating anything.
        let mut remaining = Vec::new();
        for (product_id, requested) in aggregate_demand(decrements) {
            let (position, product) = state
                .products
                .iter()
                .enumerate()
                .find(|(_, p)| p.id == product_id)
                .ok_or_else(|| StoreError::ProductNotFound(product_id.clone()))?;

            let available = u64::from(product.quantity);
            if requested > available {
                return Err(StoreError::StockConflict {
                    product_id,
                    requested,
                    available,
                });
            }

            let left = u32::try_from(available - requested)
                .map_err(|e| StoreError::Decode(e.to_string()))?;
            remaining.push((position, left));
        }

        for (position, left) in remaining {
            let product = &mut state.products[position];
            debug!(product_id = %product.id, from = product.quantity, to = left, "stock decremented");
            product.quantity = left;
        }

        Ok(())
    }
}

#[derive(Debug, Default)]
struct OrderState {
    orders: Vec<Order>,
    fail_on_create: bool,
    fail_on_discard: bool,
}

/// In-memory order store.
#[derive(Debug, Clone, Default)]
pub struct InMemoryOrderStore {
    state: Arc<RwLock<OrderState>>,
}

impl InMemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of persisted orders.
    pub async fn order_count(&self) -> usize {
        self.state.read().await.orders.len()
    }

    /// Returns all persisted orders in creation order.
    pub async fn orders(&self) -> Vec<Order> {
        self.state.read().await.orders.clone()
    }

    pub async fn set_fail_on_create(&self, fail: bool) {
        self.state.write().await.fail_on_create = fail;
    }

    pub async fn set_fail_on_discard(&self, fail: bool) {
        self.state.write().await.fail_on_discard = fail;
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn create(&self, order: NewOrder) -> Result<Order> {
        let mut state = self.state.write().await;

        if state.fail_on_create {
            return Err(StoreError::Unavailable("order insert failed".to_string()));
        }

        let order = order.into_order(OrderId::new(), Utc::now());
        state.orders.push(order.clone());
        Ok(order)
    }

    async fn find_by_id(&self, id: OrderId) -> Result<Option<Order>> {
        let state = self.state.read().await;
        Ok(state.orders.iter().find(|o| o.id == id).cloned())
    }

    async fn discard(&self, id: OrderId) -> Result<()> {
        let mut state = self.state.write().await;

        if state.fail_on_discard {
            return Err(StoreError::Unavailable("order delete failed".to_string()));
        }

        let position = state
            .orders
            .iter()
            .position(|o| o.id == id)
            .ok_or(StoreError::OrderNotFound(id))?;
        state.orders.remove(position);
        Ok(())
    }
}
