//! Identifier newtypes shared by every crate in the workspace.

pub mod types;

pub use types::{CustomerId, OrderId, ProductId};
