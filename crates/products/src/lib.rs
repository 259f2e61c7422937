//! Products domain module (catalog: products and categories).
//!
//! Product and category records plus the validation the forms apply before
//! anything is written, implemented purely as deterministic domain logic.

pub mod category;
pub mod product;

pub use category::{Category, CategoryDraft};
pub use product::{NamedRef, Product, ProductDraft, parse_price};
