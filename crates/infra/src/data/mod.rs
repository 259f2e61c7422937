//! Table access: query model, the client seam and its two implementations.

pub mod client;
pub mod in_memory;
pub mod query;
pub mod rest;

pub use client::{DataClient, count, fetch_all, fetch_one, fetch_optional, insert_record, update_by_id};
pub use in_memory::InMemoryDataStore;
pub use query::{Filter, Order, Select, Table};
pub use rest::RestDataClient;
