//! `stockdesk-core`: domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns):
//! record identifiers, the domain error model and the `Entity` trait shared by
//! every stored record.

pub mod entity;
pub mod error;
pub mod id;
pub mod text;

pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::{CategoryId, InventoryId, ProductId, SupplierId, TransactionId};
pub use text::{contains_ci, non_blank};
