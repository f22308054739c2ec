//! Order aggregate and its creation payload.

use chrono::{DateTime, Utc};
use common::{CustomerId, OrderId, ProductId};
use serde::{Deserialize, Serialize};

use crate::customer::Customer;
use crate::value_objects::{Money, OrderLine};

/// Payload handed to the order store. The store assigns identity and timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewOrder {
    pub customer_id: CustomerId,
    pub lines: Vec<OrderLine>,
}

impl NewOrder {
    /// Creates a payload referencing a resolved customer.
    pub fn new(customer: &Customer, lines: Vec<OrderLine>) -> Self {
        Self {
            customer_id: customer.id,
            lines,
        }
    }

    /// Builds the persisted order once the store has assigned its identity.
    pub fn into_order(self, id: OrderId, created_at: DateTime<Utc>) -> Order {
        Order {
            id,
            customer_id: self.customer_id,
            lines: self.lines,
            created_at,
        }
    }
}

/// A persisted sales order. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub customer_id: CustomerId,
    /// Lines in the order they were requested.
    pub lines: Vec<OrderLine>,
    pub created_at: DateTime<Utc>,
}

impl Order {
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Sum of all line totals.
    pub fn total(&self) -> Money {
        self.lines.iter().map(OrderLine::total).sum()
    }

    /// Returns the first line for the given product, if any.
    pub fn line(&self, product_id: &ProductId) -> Option<&OrderLine> {
        self.lines.iter().find(|l| &l.product_id == product_id)
    }
}
