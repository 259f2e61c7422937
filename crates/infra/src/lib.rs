//! `stockdesk-infra`: everything that talks to the remote store.
//!
//! - `data`: table/view access behind the [`DataClient`] seam
//! - `auth`: sign-in/sign-up/session behind the [`AuthClient`] seam
//! - `config`: connection settings
//!
//! Each seam has an HTTP implementation and an in-memory one for tests/dev.

pub mod auth;
pub mod config;
pub mod data;
pub mod error;
pub mod rest;

pub use auth::{AuthClient, InMemoryAuth, RestAuthClient};
pub use config::{ClientConfig, ConfigError};
pub use data::{
    DataClient, Filter, InMemoryDataStore, Order, RestDataClient, Select, Table, count, fetch_all,
    fetch_one, fetch_optional, insert_record, update_by_id,
};
pub use error::{ClientError, ClientResult};
pub use rest::RestConnection;
