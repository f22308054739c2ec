//! Pure checks and pricing applied to a requested order.
//!
//! Everything here is deterministic and free of I/O: the workflow resolves
//! customers and products through the stores, then hands the results to
//! [`ProductResolution`] to decide whether the request can become an order.

use std::collections::{HashMap, HashSet};

use common::ProductId;

use crate::error::OrderError;
use crate::product::CatalogProduct;
use crate::value_objects::{OrderLine, RequestedLine, StockDecrement};

/// Distinct product ids of a request, in first-occurrence order.
pub fn requested_product_ids(lines: &[RequestedLine]) -> Vec<ProductId> {
    let mut seen = HashSet::new();
    lines
        .iter()
        .filter(|l| seen.insert(&l.product_id))
        .map(|l| l.product_id.clone())
        .collect()
}

/// Rejects the first line whose quantity is zero.
pub fn ensure_positive_quantities(lines: &[RequestedLine]) -> Result<(), OrderError> {
    match lines.iter().find(|l| l.quantity == 0) {
        Some(line) => Err(OrderError::InvalidQuantity {
            product_id: line.product_id.clone(),
        }),
        None => Ok(()),
    }
}

/// One decrement per requested line, in request order.
pub fn stock_decrements(lines: &[RequestedLine]) -> Vec<StockDecrement> {
    lines.iter().map(StockDecrement::from).collect()
}

/// The catalog products that matched a request, in the order the catalog returned them.
#[derive(Debug, Clone)]
pub struct ProductResolution {
    products: Vec<CatalogProduct>,
    index: HashMap<ProductId, usize>,
}

impl ProductResolution {
    /// Wraps the catalog result. An empty result means no requested product exists.
    pub fn new(products: Vec<CatalogProduct>) -> Result<Self, OrderError> {
        if products.is_empty() {
            return Err(OrderError::NoValidProducts);
        }

        let mut index = HashMap::with_capacity(products.len());
        for (i, product) in products.iter().enumerate() {
            index.entry(product.id.clone()).or_insert(i);
        }

        Ok(Self { products, index })
    }

    pub fn products(&self) -> &[CatalogProduct] {
        &self.products
    }

    pub fn get(&self, product_id: &ProductId) -> Option<&CatalogProduct> {
        self.index.get(product_id).map(|&i| &self.products[i])
    }

    /// Fails on the first requested line, in request order, whose product did not resolve.
    pub fn ensure_all_present(&self, lines: &[RequestedLine]) -> Result<(), OrderError> {
        match lines.iter().find(|l| !self.index.contains_key(&l.product_id)) {
            Some(line) => Err(OrderError::InvalidProductInList {
                product_id: line.product_id.clone(),
            }),
            None => Ok(()),
        }
    }

    /// Fails on the first resolved product, in catalog order, that cannot supply
    /// the quantity of the first requested line naming it.
    ///
    /// Later lines repeating the same product are not added to the demand.
    pub fn ensure_stock(&self, lines: &[RequestedLine]) -> Result<(), OrderError> {
        for product in &self.products {
            let Some(line) = lines.iter().find(|l| l.product_id == product.id) else {
                continue;
            };

            if !product.can_supply(line.quantity) {
                return Err(OrderError::InsufficientStock {
                    product_id: product.id.clone(),
                    requested: line.quantity,
                    available: product.quantity,
                });
            }
        }

        Ok(())
    }

    /// Builds one line per requested line, priced from the catalog.
    pub fn price_lines(&self, lines: &[RequestedLine]) -> Result<Vec<OrderLine>, OrderError> {
        lines
            .iter()
            .map(|line| {
                let product =
                    self.get(&line.product_id)
                        .ok_or_else(|| OrderError::InvalidProductInList {
                            product_id: line.product_id.clone(),
                        })?;
                Ok(OrderLine::new(
                    line.product_id.clone(),
                    line.quantity,
                    product.price,
                ))
            })
            .collect()
    }

    /// Runs the existence check, the stock check and pricing, in that order.
    pub fn check_and_price(&self, lines: &[RequestedLine]) -> Result<Vec<OrderLine>, OrderError> {
        self.ensure_all_present(lines)?;
        self.ensure_stock(lines)?;
        self.price_lines(lines)
    }
}
