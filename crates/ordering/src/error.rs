//! Workflow error types.

use common::OrderId;
use domain::OrderError;
use store::StoreError;
use thiserror::Error;

/// Errors returned by the order creation workflow.
#[derive(Debug, Error)]
pub enum CreateOrderError {
    /// The request broke a business rule. Nothing was persisted.
    #[error(transparent)]
    Rejected(#[from] OrderError),

    /// A store call failed.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Stock could not be decremented and the persisted order could not be discarded.
    #[error(
        "Order {order_id} was persisted but stock was not decremented ({source}); discarding it failed: {compensation}"
    )]
    CompensationFailed {
        order_id: OrderId,
        source: StoreError,
        compensation: StoreError,
    },
}

impl CreateOrderError {
    /// True when the request itself was at fault: a rule violation, or stock
    /// that ran out between the check and the decrement.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            CreateOrderError::Rejected(_)
                | CreateOrderError::Store(StoreError::StockConflict { .. })
        )
    }

    /// The rejection reason, if this is a rule violation.
    pub fn as_order_error(&self) -> Option<&OrderError> {
        match self {
            CreateOrderError::Rejected(err) => Some(err),
            _ => None,
        }
    }
}

/// Convenience type alias for workflow results.
pub type Result<T> = std::result::Result<T, CreateOrderError>;
