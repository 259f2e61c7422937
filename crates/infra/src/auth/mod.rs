//! Auth service clients.

pub mod client;
pub mod in_memory;
pub mod rest;

pub use client::{AuthClient, SessionListener};
pub use in_memory::InMemoryAuth;
pub use rest::RestAuthClient;
