//! Parties domain module (suppliers).
//!
//! Supplier records and the validation applied by the supplier form,
//! implemented purely as deterministic domain logic (no IO, no storage).

pub mod supplier;

pub use supplier::{ContactInfo, Supplier, SupplierDraft};
