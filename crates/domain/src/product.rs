use common::ProductId;
use serde::{Deserialize, Serialize};

use crate::value_objects::Money;

/// Authoritative catalog record of a sellable item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogProduct {
    pub id: ProductId,
    pub name: String,
    /// Unit price.
    pub price: Money,
    /// Available quantity.
    pub quantity: u32,
}

impl CatalogProduct {
    pub fn new(
        id: impl Into<ProductId>,
        name: impl Into<String>,
        price: Money,
        quantity: u32,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            price,
            quantity,
        }
    }

    /// Returns true if `requested` units can be taken from the available quantity.
    pub fn can_supply(&self, requested: u32) -> bool {
        requested <= self.quantity
    }
}
