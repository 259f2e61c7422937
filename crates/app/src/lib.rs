//! Inventory management client: screens, routing and the application
//! context that wires them to the data-access and auth clients.

pub mod config;
pub mod context;
pub mod i18n;
pub mod notice;
pub mod routes;
pub mod screens;

pub use config::AppConfig;
pub use context::AppContext;
pub use i18n::{Locale, Msg};
pub use notice::{Redirect, ScreenError, ScreenStatus};
pub use routes::{Navigation, Route};
